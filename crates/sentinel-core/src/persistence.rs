use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::state::AgentMode;
use crate::state::ChatMessage;
use crate::state::Sender;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    SessionStarted { mode: AgentMode, chat_open: bool },
    MessageAppended { message: ChatMessage },
    ModeChanged { mode: AgentMode },
    ShutdownPrompted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub ts_ms: i64,
    #[serde(flatten)]
    pub event: JournalEvent,
}

/// Append-only JSONL record of a session, kept for inspection only.
#[derive(Debug)]
pub struct TranscriptJournal {
    path: PathBuf,
    next_seq: u64,
}

impl TranscriptJournal {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let existing = load_records(path.as_path())?;
        let next_seq = existing
            .iter()
            .map(|record| record.seq)
            .max()
            .map_or(1, |seq| seq.saturating_add(1));
        Ok(Self { path, next_seq })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, event: JournalEvent) -> std::io::Result<u64> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        let record = JournalRecord {
            seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            event,
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| std::io::Error::other(format!("serialize: {err}")))?;
        append_line(self.path.as_path(), line.as_str())?;
        Ok(seq)
    }

    pub fn load(&self) -> std::io::Result<Vec<JournalRecord>> {
        load_records(self.path.as_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JournalSummary {
    pub sessions: usize,
    pub user_messages: usize,
    pub agent_messages: usize,
    pub mode_changes: usize,
    pub shutdown_prompts: usize,
    pub last_mode: Option<AgentMode>,
}

pub fn summarize_journal(records: &[JournalRecord]) -> JournalSummary {
    let mut sorted: Vec<&JournalRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.seq);

    let mut summary = JournalSummary::default();
    for record in sorted {
        match &record.event {
            JournalEvent::SessionStarted { mode, .. } => {
                summary.sessions += 1;
                summary.last_mode = Some(*mode);
            }
            JournalEvent::MessageAppended { message } => match message.sender {
                Sender::User => summary.user_messages += 1,
                Sender::Agent => summary.agent_messages += 1,
            },
            JournalEvent::ModeChanged { mode } => {
                summary.mode_changes += 1;
                summary.last_mode = Some(*mode);
            }
            JournalEvent::ShutdownPrompted => summary.shutdown_prompts += 1,
        }
    }
    summary
}

fn load_records(path: &Path) -> std::io::Result<Vec<JournalRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(record) = serde_json::from_str::<JournalRecord>(&line) {
            records.push(record);
        }
    }
    Ok(records)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(())
}
