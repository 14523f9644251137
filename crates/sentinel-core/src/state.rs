use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Local;
use chrono::TimeZone;
use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;

pub const DEFAULT_TRANSCRIPT_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    Autonomous,
    ManualPaused,
    CliFallback,
}

impl AgentMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Autonomous => "autonomous",
            Self::ManualPaused => "manual-paused",
            Self::CliFallback => "cli-fallback",
        }
    }

    pub fn badge_title(self) -> &'static str {
        match self {
            Self::Autonomous => "AI Agent Active",
            Self::ManualPaused => "AI Agent Paused",
            Self::CliFallback => "CLI MODE - MAIN AGENT OFFLINE",
        }
    }

    pub fn badge_detail(self) -> &'static str {
        match self {
            Self::Autonomous => "Autonomous Protection",
            Self::ManualPaused => "Manual Control Only",
            Self::CliFallback => "Local CLI fallback",
        }
    }

    pub fn uses_cli(self) -> bool {
        !matches!(self, Self::Autonomous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Agent => "sentinel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Normal,
    System,
}

/// A message that has not been appended yet; the transcript stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub text: Arc<str>,
    pub sender: Sender,
    pub kind: MessageKind,
}

impl MessageDraft {
    pub fn user(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            kind: MessageKind::Normal,
        }
    }

    pub fn agent(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Agent,
            kind: MessageKind::Normal,
        }
    }

    pub fn system(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Agent,
            kind: MessageKind::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub seq: u64,
    pub text: String,
    pub sender: Sender,
    pub kind: MessageKind,
    pub ts_ms: u64,
}

impl ChatMessage {
    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }

    pub fn time_label(&self) -> String {
        i64::try_from(self.ts_ms)
            .ok()
            .and_then(|ms| Local.timestamp_millis_opt(ms).single())
            .map(|time| time.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<ChatMessage>,
}

impl Transcript {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap.min(DEFAULT_TRANSCRIPT_CAPACITY)),
        }
    }

    pub fn append(&mut self, draft: MessageDraft, ts_ms: u64) -> &ChatMessage {
        let message = ChatMessage {
            seq: self.next_seq,
            text: draft.text.to_string(),
            sender: draft.sender,
            kind: draft.kind,
            ts_ms,
        };
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(message);
        &self.buf[self.buf.len() - 1]
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChatMessage> {
        self.buf.iter()
    }

    pub fn since(&self, seq: u64) -> impl Iterator<Item = &ChatMessage> {
        self.buf.iter().filter(move |message| message.seq > seq)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.buf.back()
    }

    pub fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT_CAPACITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlags {
    pub agent_active: bool,
    pub cli_mode: bool,
}

impl SessionFlags {
    pub fn mode(self) -> AgentMode {
        if !self.agent_active {
            AgentMode::ManualPaused
        } else if self.cli_mode {
            AgentMode::CliFallback
        } else {
            AgentMode::Autonomous
        }
    }
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            agent_active: true,
            cli_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOverlay {
    None,
    ShutdownPrompt,
}

#[derive(Debug, Clone)]
pub struct ChatInteraction {
    pub chat_open: bool,
    pub overlay: ChatOverlay,
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub flags: SessionFlags,
    pub interaction: ChatInteraction,
    pub transcript: Transcript,
    pub pending_replies: usize,
    pub config: Config,
}

impl SessionState {
    pub fn new(config: Config) -> Self {
        Self {
            flags: SessionFlags::default(),
            interaction: ChatInteraction {
                chat_open: config.chat.start_open,
                overlay: ChatOverlay::None,
                input: String::new(),
            },
            transcript: Transcript::new(config.chat.transcript_capacity),
            pending_replies: 0,
            config,
        }
    }

    pub fn mode(&self) -> AgentMode {
        self.flags.mode()
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn shutdown_prompt_open(&self) -> bool {
        self.interaction.overlay == ChatOverlay::ShutdownPrompt
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
