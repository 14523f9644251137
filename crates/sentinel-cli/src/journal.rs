use std::path::Path;

use sentinel_core::summarize_journal;
use sentinel_core::AgentMode;
use sentinel_core::ChatMessage;
use sentinel_core::JournalEvent;
use sentinel_core::SessionState;
use sentinel_core::TranscriptJournal;
use sentinel_exec::SessionObserver;
use tracing::warn;

use crate::error::CliError;

/// Mirrors a session into a JSONL journal. Write failures are logged, never fatal.
pub struct JournalObserver {
    journal: TranscriptJournal,
}

impl JournalObserver {
    pub fn start(path: &Path, state: &SessionState) -> Result<Self, CliError> {
        let journal_err = |source| CliError::Journal {
            path: path.to_path_buf(),
            source,
        };
        let mut journal = TranscriptJournal::open(path).map_err(journal_err)?;
        journal
            .append(JournalEvent::SessionStarted {
                mode: state.mode(),
                chat_open: state.interaction.chat_open,
            })
            .map_err(journal_err)?;
        Ok(Self { journal })
    }

    fn record(&mut self, event: JournalEvent) {
        if let Err(err) = self.journal.append(event) {
            warn!(path = %self.journal.path().display(), %err, "journal append failed");
        }
    }
}

impl SessionObserver for JournalObserver {
    fn on_message(&mut self, message: &ChatMessage) {
        self.record(JournalEvent::MessageAppended {
            message: message.clone(),
        });
    }

    fn on_mode_changed(&mut self, mode: AgentMode) {
        self.record(JournalEvent::ModeChanged { mode });
    }

    fn on_shutdown_prompt(&mut self) {
        self.record(JournalEvent::ShutdownPrompted);
    }
}

pub fn describe_journal(path: &Path) -> Result<String, CliError> {
    if !path.is_file() {
        return Err(CliError::Journal {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such journal"),
        });
    }
    let journal = TranscriptJournal::open(path).map_err(|source| CliError::Journal {
        path: path.to_path_buf(),
        source,
    })?;
    let records = journal.load().map_err(|source| CliError::Journal {
        path: path.to_path_buf(),
        source,
    })?;
    let summary = summarize_journal(&records);
    let last_mode = summary
        .last_mode
        .map_or("unknown", |mode| mode.label());
    Ok(format!(
        "journal: {}\nrecords: {}\nsessions: {}\nuser messages: {}\nagent messages: {}\nshutdown prompts: {}\nmode changes: {}\nlast mode: {}",
        path.display(),
        records.len(),
        summary.sessions,
        summary.user_messages,
        summary.agent_messages,
        summary.shutdown_prompts,
        summary.mode_changes,
        last_mode,
    ))
}
