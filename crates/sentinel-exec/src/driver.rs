use sentinel_core::reduce;
use sentinel_core::AgentMode;
use sentinel_core::Config;
use sentinel_core::RuntimeAction;
use sentinel_core::SentinelEffect;
use sentinel_core::SessionState;
use sentinel_core::ShellAction;
use sentinel_core::UserAction;
use tracing::debug;

use crate::clock::Clock;
use crate::contracts::DriverEvent;
use crate::contracts::SessionObserver;
use crate::probe::ConnectionProbe;
use crate::timeline::Timeline;

/// Runs a session: feeds user input into the reducer, keeps scheduled steps
/// on a timeline and hands them back to the reducer when they come due.
pub struct SessionDriver<C: Clock, P: ConnectionProbe> {
    state: SessionState,
    timeline: Timeline<DriverEvent>,
    probe: P,
    clock: C,
    observers: Vec<Box<dyn SessionObserver>>,
    seen_seq: u64,
    needs_frame: bool,
}

impl<C: Clock, P: ConnectionProbe> SessionDriver<C, P> {
    pub fn new(config: Config, clock: C, probe: P) -> Self {
        let mut timeline = Timeline::new();
        timeline.schedule_every(
            clock.now_ms(),
            config.connection.check_interval_ms,
            DriverEvent::ConnectionCheck,
        );
        Self {
            state: SessionState::new(config),
            timeline,
            probe,
            clock,
            observers: Vec::new(),
            seen_seq: 0,
            needs_frame: true,
        }
    }

    pub fn observe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn mode(&self) -> AgentMode {
        self.state.mode()
    }

    pub fn dispatch(&mut self, action: UserAction) {
        let now_ms = self.clock.now_ms();
        self.apply(ShellAction::User(action), now_ms);
    }

    pub fn submit(&mut self, command: &str) {
        self.dispatch(UserAction::SubmitCommand(command.to_string()));
    }

    pub fn toggle_chat(&mut self) {
        self.dispatch(UserAction::ToggleChat);
    }

    pub fn show_shutdown_prompt(&mut self) {
        self.dispatch(UserAction::ShowShutdownPrompt);
    }

    pub fn confirm_shutdown(&mut self) {
        self.dispatch(UserAction::ConfirmShutdown);
    }

    pub fn cancel_shutdown(&mut self) {
        self.dispatch(UserAction::CancelShutdown);
    }

    /// Delivers a failed connection check immediately, bypassing the probe.
    pub fn force_connection_loss(&mut self) {
        let now_ms = self.clock.now_ms();
        self.apply(
            ShellAction::Runtime(RuntimeAction::ConnectionCheck { lost: true }),
            now_ms,
        );
    }

    /// Processes everything due by the clock's current time.
    pub fn tick(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        self.advance_to(now_ms)
    }

    /// Processes every timeline entry due at or before `now_ms`, each at its
    /// own due time. Returns how many entries fired.
    pub fn advance_to(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some((due_ms, event)) = self.timeline.pop_due(now_ms) {
            fired += 1;
            let action = match event {
                DriverEvent::Deliver(payload) => {
                    debug!(due_ms, ?payload, "delivering scheduled step");
                    RuntimeAction::DeliverStep(payload)
                }
                DriverEvent::ConnectionCheck => {
                    let lost = self.probe.connection_lost();
                    debug!(due_ms, lost, mode = self.state.mode().label(), "connection check");
                    RuntimeAction::ConnectionCheck { lost }
                }
            };
            self.apply(ShellAction::Runtime(action), due_ms);
        }
        fired
    }

    /// Waits out every pending one-shot step. The periodic connection check
    /// keeps firing while time passes but does not hold the flush open.
    pub fn flush(&mut self) {
        while let Some(due_ms) = self.timeline.next_once_due() {
            self.clock.sleep_until(due_ms);
            let now_ms = self.clock.now_ms().max(due_ms);
            self.advance_to(now_ms);
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timeline.next_due()
    }

    pub fn pending_steps(&self) -> usize {
        self.timeline.pending_once()
    }

    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_frame)
    }

    fn apply(&mut self, action: ShellAction, now_ms: u64) {
        let effects = reduce(&mut self.state, action, now_ms);
        self.publish_messages();
        for effect in effects {
            match effect {
                SentinelEffect::Schedule { delay_ms, payload } => {
                    self.timeline
                        .schedule_after(now_ms, delay_ms, DriverEvent::Deliver(payload));
                }
                SentinelEffect::ModeChanged(mode) => {
                    for observer in &mut self.observers {
                        observer.on_mode_changed(mode);
                    }
                }
                SentinelEffect::ShowShutdownPrompt => {
                    for observer in &mut self.observers {
                        observer.on_shutdown_prompt();
                    }
                }
                SentinelEffect::RequestFrame => self.needs_frame = true,
            }
        }
    }

    fn publish_messages(&mut self) {
        let seen_seq = self.seen_seq;
        for message in self.state.transcript.since(seen_seq) {
            for observer in &mut self.observers {
                observer.on_message(message);
            }
        }
        if let Some(last) = self.state.transcript.last() {
            self.seen_seq = last.seq;
        }
    }
}
