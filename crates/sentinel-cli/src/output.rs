use std::io::Write;

use sentinel_core::ChatMessage;
use sentinel_core::JournalEvent;
use sentinel_core::MessageKind;
use sentinel_core::Sender;
use sentinel_exec::SessionObserver;

const SPEAKER_WIDTH: usize = 8;

pub fn speaker(message: &ChatMessage) -> &'static str {
    match (message.sender, message.kind) {
        (_, MessageKind::System) => "system",
        (sender, MessageKind::Normal) => sender.label(),
    }
}

/// `[HH:MM] speaker | text`, continuation lines aligned under the text.
pub fn format_message(message: &ChatMessage) -> String {
    let head = format!("[{}] {:>SPEAKER_WIDTH$} | ", message.time_label(), speaker(message));
    let indent = format!("{:width$}| ", "", width = head.len() - 2);
    let mut out = String::new();
    for (idx, line) in message.text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
            out.push_str(&indent);
        } else {
            out.push_str(&head);
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out.push_str(head.trim_end());
    }
    out
}

pub fn format_event(event: &JournalEvent) -> String {
    match event {
        JournalEvent::SessionStarted { mode, .. } => format!("-- session started ({})", mode.label()),
        JournalEvent::MessageAppended { message } => format_message(message),
        JournalEvent::ModeChanged { mode } => {
            format!("-- {} / {}", mode.badge_title(), mode.badge_detail())
        }
        JournalEvent::ShutdownPrompted => {
            "-- Pause the Main Agent? Answer with :confirm or :cancel".to_string()
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct EventCollector {
    pub events: Vec<JournalEvent>,
}

impl SessionObserver for EventCollector {
    fn on_message(&mut self, message: &ChatMessage) {
        self.events.push(JournalEvent::MessageAppended {
            message: message.clone(),
        });
    }

    fn on_mode_changed(&mut self, mode: sentinel_core::AgentMode) {
        self.events.push(JournalEvent::ModeChanged { mode });
    }

    fn on_shutdown_prompt(&mut self) {
        self.events.push(JournalEvent::ShutdownPrompted);
    }
}

/// Prints agent-side events as they happen. User lines are already on screen.
pub struct PrintObserver<W: Write> {
    out: W,
}

impl<W: Write> PrintObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, event: &JournalEvent) {
        if writeln!(self.out, "{}", format_event(event)).is_err() {
            return;
        }
        let _ = self.out.flush();
    }
}

impl<W: Write> SessionObserver for PrintObserver<W> {
    fn on_message(&mut self, message: &ChatMessage) {
        if message.sender == Sender::User {
            return;
        }
        self.emit(&JournalEvent::MessageAppended {
            message: message.clone(),
        });
    }

    fn on_mode_changed(&mut self, mode: sentinel_core::AgentMode) {
        self.emit(&JournalEvent::ModeChanged { mode });
    }

    fn on_shutdown_prompt(&mut self) {
        self.emit(&JournalEvent::ShutdownPrompted);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sentinel_core::AgentMode;

    use super::*;

    fn message(text: &str, sender: Sender, kind: MessageKind) -> ChatMessage {
        ChatMessage {
            seq: 1,
            text: text.to_string(),
            sender,
            kind,
            ts_ms: 0,
        }
    }

    #[test]
    fn multi_line_text_is_aligned() {
        let msg = message("line one\nline two", Sender::Agent, MessageKind::Normal);
        let rendered = format_message(&msg);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("sentinel | line one"));
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
        assert!(lines[1].ends_with("| line two"));
    }

    #[test]
    fn system_messages_use_system_speaker() {
        let msg = message("Routing", Sender::Agent, MessageKind::System);
        assert_eq!(speaker(&msg), "system");
        assert_eq!(speaker(&message("hi", Sender::User, MessageKind::Normal)), "you");
    }

    #[test]
    fn mode_events_show_the_badge() {
        let line = format_event(&JournalEvent::ModeChanged {
            mode: AgentMode::CliFallback,
        });
        assert!(line.contains("CLI MODE - MAIN AGENT OFFLINE"));
    }

    #[test]
    fn print_observer_skips_user_echo() {
        let mut sink = Vec::new();
        {
            let mut printer = PrintObserver::new(&mut sink);
            printer.on_message(&message("status", Sender::User, MessageKind::Normal));
            printer.on_message(&message("ok", Sender::Agent, MessageKind::Normal));
        }
        let text = String::from_utf8(sink).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("sentinel | ok"));
    }
}
