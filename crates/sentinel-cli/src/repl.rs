use std::io::BufRead;
use std::io::Write;

use sentinel_core::Config;
use sentinel_exec::RandomProbe;
use sentinel_exec::SessionDriver;
use sentinel_exec::SessionObserver;
use sentinel_exec::SystemClock;
use tracing::info;

use crate::error::CliError;
use crate::input::apply_input;
use crate::input::meta_help;
use crate::input::parse_line;
use crate::input::Flow;
use crate::output::PrintObserver;

const BANNER: &str = "AI Sentinel-X console. Type a command, or :quit to leave.";

pub fn run(
    config: Config,
    seed: Option<u64>,
    journal: Option<Box<dyn SessionObserver>>,
) -> Result<(), CliError> {
    let probe = RandomProbe::new(config.connection.loss_probability, seed);
    let mut driver = SessionDriver::new(config, SystemClock, probe);
    driver.observe(Box::new(PrintObserver::new(std::io::stdout())));
    if let Some(observer) = journal {
        driver.observe(observer);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    println!("{BANNER}");
    loop {
        print!("{}> ", driver.mode().label());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        // Connection checks that came due while we were blocked on stdin.
        driver.tick();

        match apply_input(&mut driver, &parse_line(&line)) {
            Flow::Quit => break,
            Flow::Unrecognized => {
                println!("unknown meta command; available:\n{}", meta_help());
                continue;
            }
            Flow::Continue => {}
        }
        driver.flush();
    }
    info!(messages = driver.state().transcript.last_seq(), "repl session ended");
    Ok(())
}
