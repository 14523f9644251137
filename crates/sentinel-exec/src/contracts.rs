use std::cell::RefCell;
use std::rc::Rc;

use sentinel_core::AgentMode;
use sentinel_core::ChatMessage;
use sentinel_core::StepPayload;

/// Items the driver keeps on its timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Deliver(StepPayload),
    ConnectionCheck,
}

/// Sink for what a session produces. Every hook defaults to doing nothing.
pub trait SessionObserver {
    fn on_message(&mut self, _message: &ChatMessage) {}

    fn on_mode_changed(&mut self, _mode: AgentMode) {}

    fn on_shutdown_prompt(&mut self) {}
}

/// Observer that keeps everything it sees, for tests and the scripted run.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub messages: Vec<ChatMessage>,
    pub modes: Vec<AgentMode>,
    pub prompts: usize,
}

impl SessionObserver for RecordingObserver {
    fn on_message(&mut self, message: &ChatMessage) {
        self.messages.push(message.clone());
    }

    fn on_mode_changed(&mut self, mode: AgentMode) {
        self.modes.push(mode);
    }

    fn on_shutdown_prompt(&mut self) {
        self.prompts += 1;
    }
}

impl<T: SessionObserver> SessionObserver for Rc<RefCell<T>> {
    fn on_message(&mut self, message: &ChatMessage) {
        self.borrow_mut().on_message(message);
    }

    fn on_mode_changed(&mut self, mode: AgentMode) {
        self.borrow_mut().on_mode_changed(mode);
    }

    fn on_shutdown_prompt(&mut self) {
        self.borrow_mut().on_shutdown_prompt();
    }
}
