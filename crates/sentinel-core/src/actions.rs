use super::router::StepPayload;

#[derive(Debug, Clone)]
pub enum ShellAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SubmitCommand(String),
    InputChar(char),
    InputBackspace,
    /// Enter key: submits the input buffer.
    SubmitInput,
    ToggleChat,
    ShowShutdownPrompt,
    ConfirmShutdown,
    CancelShutdown,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    DeliverStep(StepPayload),
    ConnectionCheck { lost: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickCommand {
    pub label: &'static str,
    pub command: &'static str,
}

pub const AGENT_QUICK_COMMANDS: [QuickCommand; 6] = [
    QuickCommand {
        label: "Threats",
        command: "show active threats",
    },
    QuickCommand {
        label: "Network",
        command: "network devices",
    },
    QuickCommand {
        label: "Encryption",
        command: "encryption status",
    },
    QuickCommand {
        label: "Analytics",
        command: "analytics report",
    },
    QuickCommand {
        label: "Status",
        command: "status",
    },
    QuickCommand {
        label: "Pause",
        command: "pause agent",
    },
];

pub const CLI_QUICK_COMMANDS: [QuickCommand; 6] = [
    QuickCommand {
        label: "Help",
        command: "help",
    },
    QuickCommand {
        label: "Threats",
        command: "list threats",
    },
    QuickCommand {
        label: "Network",
        command: "scan network",
    },
    QuickCommand {
        label: "Logs",
        command: "view logs",
    },
    QuickCommand {
        label: "Status",
        command: "status",
    },
    QuickCommand {
        label: "Enable",
        command: "enable agent",
    },
];

pub fn quick_commands(uses_cli: bool) -> &'static [QuickCommand] {
    if uses_cli {
        &CLI_QUICK_COMMANDS
    } else {
        &AGENT_QUICK_COMMANDS
    }
}
