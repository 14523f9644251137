mod error;
mod input;
mod journal;
mod output;
mod repl;
mod script;
mod settings;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use sentinel_core::Config;
use sentinel_core::SessionState;
use sentinel_core::ENV_SENTINEL_CONFIG;
use sentinel_exec::SessionObserver;
use tracing::info;

use crate::error::CliError;
use crate::journal::JournalObserver;
use crate::settings::ConfigSource;

/// Sentinel - simulated AI security agent console
#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (overrides $SENTINEL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where to write the log (default: <data dir>/sentinel/sentinel.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Append transcript and mode changes to this JSONL journal
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    /// Seed for the simulated connection-loss probe
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen chat console (default)
    Chat,

    /// Line-mode console on stdin/stdout
    Repl,

    /// Replay commands against a simulated clock and print the transcript
    Run {
        /// Commands to send, in order. Lines starting with ':' are meta commands
        commands: Vec<String>,

        /// Read commands from a file, one per line (# for comments)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Drop the Main Agent connection after this many commands
        #[arg(long)]
        disconnect_after: Option<usize>,

        /// Print one JSON record per event instead of text
        #[arg(long)]
        json: bool,
    },

    /// Summarize a journal written with --journal
    Journal {
        /// Path to the JSONL journal
        path: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| settings::default_log_path(dirs::data_dir()));
    settings::init_logging(&log_path)?;

    let source = ConfigSource::resolve(
        cli.config.clone(),
        std::env::var_os(ENV_SENTINEL_CONFIG),
        dirs::config_dir(),
    );
    let config = source.load()?;
    info!(version = env!("CARGO_PKG_VERSION"), log = %log_path.display(), "sentinel starting");

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let journal = open_journal(cli.journal.as_deref(), &config)?;
            ui::run(config, cli.seed, journal)
        }
        Commands::Repl => {
            let journal = open_journal(cli.journal.as_deref(), &config)?;
            repl::run(config, cli.seed, journal)
        }
        Commands::Run {
            commands,
            script: script_path,
            disconnect_after,
            json,
        } => {
            let mut inputs: Vec<input::ConsoleInput> = commands
                .iter()
                .map(String::as_str)
                .map(input::parse_line)
                .collect();
            if let Some(path) = script_path {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| CliError::Script { path, source })?;
                inputs.extend(input::parse_script(&raw));
            }
            inputs.retain(|line| *line != input::ConsoleInput::Blank);

            let journal = open_journal(cli.journal.as_deref(), &config)?;
            let run = script::ScriptRun {
                inputs,
                disconnect_after,
            };
            let events = script::execute(config, &run, journal);
            println!("{}", script::render(&events, json)?);
            Ok(())
        }
        Commands::Journal { path } => {
            println!("{}", journal::describe_journal(&path)?);
            Ok(())
        }
    }
}

fn open_journal(
    path: Option<&std::path::Path>,
    config: &Config,
) -> Result<Option<Box<dyn SessionObserver>>, CliError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let state = SessionState::new(config.clone());
    let observer = JournalObserver::start(path, &state)?;
    info!(path = %path.display(), "journal enabled");
    Ok(Some(Box::new(observer)))
}
