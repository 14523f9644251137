use std::cell::RefCell;
use std::rc::Rc;

use sentinel_core::Config;
use sentinel_core::JournalEvent;
use sentinel_exec::ScriptedProbe;
use sentinel_exec::SessionDriver;
use sentinel_exec::SessionObserver;
use sentinel_exec::SimulatedClock;
use tracing::info;
use tracing::warn;

use crate::error::CliError;
use crate::input::apply_input;
use crate::input::ConsoleInput;
use crate::input::Flow;
use crate::output::format_event;
use crate::output::EventCollector;

#[derive(Debug, Clone, Default)]
pub struct ScriptRun {
    pub inputs: Vec<ConsoleInput>,
    /// Force a connection loss right after this many commands have been answered.
    pub disconnect_after: Option<usize>,
}

/// Replays `run.inputs` on a simulated clock. Each command's chain is
/// delivered in full before the next input is read.
pub fn execute(
    config: Config,
    run: &ScriptRun,
    extra: Option<Box<dyn SessionObserver>>,
) -> Vec<JournalEvent> {
    let collector = Rc::new(RefCell::new(EventCollector::default()));
    let mut driver = SessionDriver::new(config, SimulatedClock::starting_now(), ScriptedProbe::stable());
    driver.observe(Box::new(Rc::clone(&collector)));
    if let Some(observer) = extra {
        driver.observe(observer);
    }

    let mut commands = 0;
    for input in &run.inputs {
        match apply_input(&mut driver, input) {
            Flow::Quit => break,
            Flow::Unrecognized => {
                warn!(?input, "ignoring unknown meta command in script");
                continue;
            }
            Flow::Continue => {}
        }
        driver.flush();

        if matches!(input, ConsoleInput::Command(_)) {
            commands += 1;
            if run.disconnect_after == Some(commands) {
                info!(commands, "forcing connection loss");
                driver.force_connection_loss();
            }
        }
    }

    let events = std::mem::take(&mut collector.borrow_mut().events);
    events
}

pub fn render(events: &[JournalEvent], json: bool) -> Result<String, CliError> {
    let mut lines = Vec::with_capacity(events.len());
    for event in events {
        if json {
            lines.push(serde_json::to_string(event)?);
        } else {
            lines.push(format_event(event));
        }
    }
    Ok(lines.join("\n"))
}
