use sentinel_exec::Clock;
use sentinel_exec::ConnectionProbe;
use sentinel_exec::SessionDriver;

/// One line typed into the REPL or read from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(String),
    Meta(MetaCommand),
    UnknownMeta(String),
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Pause,
    Confirm,
    Cancel,
    Toggle,
    Disconnect,
    Quit,
}

impl MetaCommand {
    pub const ALL: [MetaCommand; 6] = [
        MetaCommand::Pause,
        MetaCommand::Confirm,
        MetaCommand::Cancel,
        MetaCommand::Toggle,
        MetaCommand::Disconnect,
        MetaCommand::Quit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Toggle => "toggle",
            Self::Disconnect => "disconnect",
            Self::Quit => "quit",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::Pause => "open the shutdown prompt",
            Self::Confirm => "confirm the shutdown prompt",
            Self::Cancel => "dismiss the shutdown prompt",
            Self::Toggle => "show or hide the chat panel",
            Self::Disconnect => "simulate losing the Main Agent connection",
            Self::Quit => "leave the session",
        }
    }
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleInput::Blank;
    }
    let Some(name) = trimmed.strip_prefix(':') else {
        return ConsoleInput::Command(trimmed.to_string());
    };
    let name = name.trim().to_ascii_lowercase();
    MetaCommand::ALL
        .into_iter()
        .find(|meta| meta.name() == name || (name == "q" && *meta == MetaCommand::Quit))
        .map_or(ConsoleInput::UnknownMeta(name.clone()), ConsoleInput::Meta)
}

pub fn meta_help() -> String {
    MetaCommand::ALL
        .iter()
        .map(|meta| format!("  :{:<11} {}", meta.name(), meta.help()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Script files hold one input per line; `#` starts a comment line.
pub fn parse_script(raw: &str) -> Vec<ConsoleInput> {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .map(parse_line)
        .filter(|input| *input != ConsoleInput::Blank)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Unrecognized,
    Quit,
}

/// Feeds one input into the session. Does not wait for replies.
pub fn apply_input<C: Clock, P: ConnectionProbe>(
    driver: &mut SessionDriver<C, P>,
    input: &ConsoleInput,
) -> Flow {
    match input {
        ConsoleInput::Command(command) => driver.submit(command),
        ConsoleInput::Meta(MetaCommand::Pause) => driver.show_shutdown_prompt(),
        ConsoleInput::Meta(MetaCommand::Confirm) => driver.confirm_shutdown(),
        ConsoleInput::Meta(MetaCommand::Cancel) => driver.cancel_shutdown(),
        ConsoleInput::Meta(MetaCommand::Toggle) => driver.toggle_chat(),
        ConsoleInput::Meta(MetaCommand::Disconnect) => driver.force_connection_loss(),
        ConsoleInput::Meta(MetaCommand::Quit) => return Flow::Quit,
        ConsoleInput::UnknownMeta(_) => return Flow::Unrecognized,
        ConsoleInput::Blank => {}
    }
    Flow::Continue
}
