use tracing::debug;

use crate::catalog;
use crate::catalog::SubAgent;
use crate::config::TimingConfig;
use crate::quarantine::extract_target;
use crate::state::MessageDraft;
use crate::state::SessionFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPayload {
    Message(MessageDraft),
    ShutdownPrompt,
    /// Clears both mode flags, then announces the restored agent.
    RestoreAgent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStep {
    /// Milliseconds after the command was submitted.
    pub offset_ms: u64,
    pub payload: StepPayload,
}

impl ScheduledStep {
    fn message(offset_ms: u64, draft: MessageDraft) -> Self {
        Self {
            offset_ms,
            payload: StepPayload::Message(draft),
        }
    }

    pub fn is_reply(&self) -> bool {
        !matches!(self.payload, StepPayload::ShutdownPrompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    MainAgent,
    Cli,
}

impl Handler {
    pub fn for_flags(flags: SessionFlags) -> Self {
        if !flags.agent_active || flags.cli_mode {
            Self::Cli
        } else {
            Self::MainAgent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MainAgent => "main-agent",
            Self::Cli => "cli",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
}

impl Matcher {
    /// `lower` must already be lowercased.
    pub fn matches(self, lower: &str) -> bool {
        match self {
            Self::Any(keywords) => keywords.iter().any(|keyword| lower.contains(keyword)),
            Self::All(keywords) => keywords.iter().all(|keyword| lower.contains(keyword)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRoute {
    SubAgent(SubAgent),
    PauseAgent,
    Quarantine,
    Status,
    Help,
}

impl AgentRoute {
    pub fn label(self) -> &'static str {
        match self {
            Self::SubAgent(agent) => agent.name(),
            Self::PauseAgent => "pause-agent",
            Self::Quarantine => "quarantine",
            Self::Status => "status",
            Self::Help => "help",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRule {
    pub matcher: Matcher,
    pub route: AgentRoute,
}

pub const AGENT_RULES: [AgentRule; 10] = [
    AgentRule {
        matcher: Matcher::Any(&["threat", "attack"]),
        route: AgentRoute::SubAgent(SubAgent::ThreatScanner),
    },
    AgentRule {
        matcher: Matcher::Any(&["network", "device"]),
        route: AgentRoute::SubAgent(SubAgent::NetworkMapper),
    },
    AgentRule {
        matcher: Matcher::Any(&["encrypt", "crypto"]),
        route: AgentRoute::SubAgent(SubAgent::EncryptionManager),
    },
    AgentRule {
        matcher: Matcher::Any(&["defense", "response"]),
        route: AgentRoute::SubAgent(SubAgent::DefenseOrchestrator),
    },
    AgentRule {
        matcher: Matcher::Any(&["log", "audit"]),
        route: AgentRoute::SubAgent(SubAgent::LogAgent),
    },
    AgentRule {
        matcher: Matcher::Any(&["analytics", "report"]),
        route: AgentRoute::SubAgent(SubAgent::AnalyticsEngine),
    },
    AgentRule {
        matcher: Matcher::All(&["pause", "agent"]),
        route: AgentRoute::PauseAgent,
    },
    AgentRule {
        matcher: Matcher::Any(&["quarantine"]),
        route: AgentRoute::Quarantine,
    },
    AgentRule {
        matcher: Matcher::Any(&["status"]),
        route: AgentRoute::Status,
    },
    AgentRule {
        matcher: Matcher::Any(&["help"]),
        route: AgentRoute::Help,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliRoute {
    Help,
    ListThreats,
    ScanNetwork,
    ShowEncryption,
    ViewLogs,
    Quarantine,
    EnableAgent,
    Status,
}

impl CliRoute {
    pub fn label(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ListThreats => "list threats",
            Self::ScanNetwork => "scan network",
            Self::ShowEncryption => "show encryption",
            Self::ViewLogs => "view logs",
            Self::Quarantine => "quarantine",
            Self::EnableAgent => "enable agent",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliRule {
    pub matcher: Matcher,
    pub route: CliRoute,
}

pub const CLI_RULES: [CliRule; 8] = [
    CliRule {
        matcher: Matcher::Any(&["help"]),
        route: CliRoute::Help,
    },
    CliRule {
        matcher: Matcher::Any(&["list threats"]),
        route: CliRoute::ListThreats,
    },
    CliRule {
        matcher: Matcher::Any(&["scan network"]),
        route: CliRoute::ScanNetwork,
    },
    CliRule {
        matcher: Matcher::Any(&["show encryption"]),
        route: CliRoute::ShowEncryption,
    },
    CliRule {
        matcher: Matcher::Any(&["view logs"]),
        route: CliRoute::ViewLogs,
    },
    CliRule {
        matcher: Matcher::Any(&["quarantine"]),
        route: CliRoute::Quarantine,
    },
    CliRule {
        matcher: Matcher::Any(&["enable agent"]),
        route: CliRoute::EnableAgent,
    },
    CliRule {
        matcher: Matcher::Any(&["status"]),
        route: CliRoute::Status,
    },
];

pub fn match_agent_route(lower: &str) -> Option<AgentRoute> {
    AGENT_RULES
        .iter()
        .find(|rule| rule.matcher.matches(lower))
        .map(|rule| rule.route)
}

pub fn match_cli_route(lower: &str) -> Option<CliRoute> {
    CLI_RULES
        .iter()
        .find(|rule| rule.matcher.matches(lower))
        .map(|rule| rule.route)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    pub handler: Handler,
    pub rule: &'static str,
    pub steps: Vec<ScheduledStep>,
}

pub fn route_command(flags: SessionFlags, command: &str, timing: &TimingConfig) -> ResponsePlan {
    let lower = command.to_lowercase();
    let handler = Handler::for_flags(flags);
    let plan = match handler {
        Handler::Cli => {
            let route = match_cli_route(&lower);
            ResponsePlan {
                handler,
                rule: route.map_or("fallback", CliRoute::label),
                steps: cli_steps(route, command, timing),
            }
        }
        Handler::MainAgent => {
            let route = match_agent_route(&lower);
            ResponsePlan {
                handler,
                rule: route.map_or("fallback", AgentRoute::label),
                steps: agent_steps(route, command, timing),
            }
        }
    };
    debug!(
        handler = plan.handler.label(),
        rule = plan.rule,
        steps = plan.steps.len(),
        "routed command"
    );
    plan
}

fn agent_steps(
    route: Option<AgentRoute>,
    command: &str,
    timing: &TimingConfig,
) -> Vec<ScheduledStep> {
    let branch_at = timing.branch_offset();
    let payload_at = timing.payload_offset();
    let mut steps = vec![ScheduledStep::message(
        timing.dispatch_ms,
        MessageDraft::system(catalog::MAIN_AGENT_ROUTING),
    )];

    match route {
        Some(AgentRoute::SubAgent(agent)) => {
            steps.push(ScheduledStep::message(
                branch_at,
                MessageDraft::system(catalog::sub_agent_handoff(agent)),
            ));
            steps.push(ScheduledStep::message(
                payload_at,
                MessageDraft::agent(agent.payload()),
            ));
        }
        Some(AgentRoute::PauseAgent) => steps.push(ScheduledStep {
            offset_ms: branch_at,
            payload: StepPayload::ShutdownPrompt,
        }),
        Some(AgentRoute::Quarantine) => match extract_target(command) {
            Some(ip) => {
                let agent = SubAgent::DefenseOrchestrator;
                steps.push(ScheduledStep::message(
                    branch_at,
                    MessageDraft::system(catalog::sub_agent_handoff(agent)),
                ));
                steps.push(ScheduledStep::message(
                    payload_at,
                    MessageDraft::agent(catalog::agent_quarantine(ip)),
                ));
            }
            None => steps.push(ScheduledStep::message(
                branch_at,
                MessageDraft::agent(catalog::AGENT_QUARANTINE_USAGE),
            )),
        },
        Some(AgentRoute::Status) => steps.push(ScheduledStep::message(
            branch_at,
            MessageDraft::agent(catalog::agent_status()),
        )),
        Some(AgentRoute::Help) => steps.push(ScheduledStep::message(
            branch_at,
            MessageDraft::agent(catalog::agent_help()),
        )),
        None => steps.push(ScheduledStep::message(
            branch_at,
            MessageDraft::agent(catalog::agent_fallback()),
        )),
    }
    steps
}

fn cli_steps(route: Option<CliRoute>, command: &str, timing: &TimingConfig) -> Vec<ScheduledStep> {
    let at = timing.cli_ms;
    let step = match route {
        Some(CliRoute::Help) => ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_HELP)),
        Some(CliRoute::ListThreats) => {
            ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_THREATS))
        }
        Some(CliRoute::ScanNetwork) => {
            ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_NETWORK))
        }
        Some(CliRoute::ShowEncryption) => {
            ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_ENCRYPTION))
        }
        Some(CliRoute::ViewLogs) => ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_LOGS)),
        Some(CliRoute::Quarantine) => match extract_target(command) {
            Some(ip) => ScheduledStep::message(at, MessageDraft::agent(catalog::cli_quarantine(ip))),
            None => ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_QUARANTINE_USAGE)),
        },
        Some(CliRoute::EnableAgent) => ScheduledStep {
            offset_ms: at,
            payload: StepPayload::RestoreAgent,
        },
        Some(CliRoute::Status) => ScheduledStep::message(at, MessageDraft::agent(catalog::CLI_STATUS)),
        None => ScheduledStep::message(at, MessageDraft::agent(catalog::cli_fallback(command))),
    };
    vec![step]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const AUTONOMOUS: SessionFlags = SessionFlags {
        agent_active: true,
        cli_mode: false,
    };
    const PAUSED: SessionFlags = SessionFlags {
        agent_active: false,
        cli_mode: false,
    };
    const FALLBACK: SessionFlags = SessionFlags {
        agent_active: true,
        cli_mode: true,
    };

    fn texts(plan: &ResponsePlan) -> Vec<String> {
        plan.steps
            .iter()
            .filter_map(|step| match &step.payload {
                StepPayload::Message(draft) => Some(draft.text.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn handler_follows_flags() {
        assert_eq!(Handler::for_flags(AUTONOMOUS), Handler::MainAgent);
        assert_eq!(Handler::for_flags(PAUSED), Handler::Cli);
        assert_eq!(Handler::for_flags(FALLBACK), Handler::Cli);
        assert_eq!(
            Handler::for_flags(SessionFlags {
                agent_active: false,
                cli_mode: true,
            }),
            Handler::Cli
        );
    }

    #[test]
    fn agent_rules_are_evaluated_in_priority_order() {
        assert_eq!(
            match_agent_route("attack on the network"),
            Some(AgentRoute::SubAgent(SubAgent::ThreatScanner))
        );
        assert_eq!(
            match_agent_route("device inventory"),
            Some(AgentRoute::SubAgent(SubAgent::NetworkMapper))
        );
        assert_eq!(
            match_agent_route("crypto posture"),
            Some(AgentRoute::SubAgent(SubAgent::EncryptionManager))
        );
        assert_eq!(
            match_agent_route("incident response"),
            Some(AgentRoute::SubAgent(SubAgent::DefenseOrchestrator))
        );
        assert_eq!(
            match_agent_route("audit trail"),
            Some(AgentRoute::SubAgent(SubAgent::LogAgent))
        );
        assert_eq!(
            match_agent_route("weekly report"),
            Some(AgentRoute::SubAgent(SubAgent::AnalyticsEngine))
        );
        assert_eq!(match_agent_route("pause the agent"), Some(AgentRoute::PauseAgent));
        assert_eq!(match_agent_route("pause"), None);
        assert_eq!(match_agent_route("quarantine 1.2.3.4"), Some(AgentRoute::Quarantine));
        assert_eq!(match_agent_route("status"), Some(AgentRoute::Status));
        assert_eq!(match_agent_route("help"), Some(AgentRoute::Help));
        assert_eq!(match_agent_route("hello there"), None);
    }

    #[test]
    fn cli_rules_are_evaluated_in_priority_order() {
        assert_eq!(match_cli_route("help status"), Some(CliRoute::Help));
        assert_eq!(match_cli_route("list threats"), Some(CliRoute::ListThreats));
        assert_eq!(match_cli_route("scan network now"), Some(CliRoute::ScanNetwork));
        assert_eq!(match_cli_route("show encryption"), Some(CliRoute::ShowEncryption));
        assert_eq!(match_cli_route("view logs"), Some(CliRoute::ViewLogs));
        assert_eq!(match_cli_route("quarantine"), Some(CliRoute::Quarantine));
        assert_eq!(match_cli_route("enable agent"), Some(CliRoute::EnableAgent));
        assert_eq!(match_cli_route("status"), Some(CliRoute::Status));
        assert_eq!(match_cli_route("threats"), None);
    }

    #[test]
    fn threat_command_hands_off_to_threat_scanner() {
        let timing = TimingConfig::default();
        let plan = route_command(AUTONOMOUS, "Any THREATS today?", &timing);

        assert_eq!(plan.handler, Handler::MainAgent);
        assert_eq!(plan.rule, "ThreatScanner");
        let offsets: Vec<u64> = plan.steps.iter().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![300, 800, 1_600]);
        assert_eq!(
            texts(&plan),
            vec![
                "Routing to Main Agent...".to_string(),
                "Main Agent: Routing to ThreatScanner sub-agent...".to_string(),
                SubAgent::ThreatScanner.payload().to_string(),
            ]
        );
        assert!(matches!(
            &plan.steps[1].payload,
            StepPayload::Message(draft) if draft.kind == crate::state::MessageKind::System
        ));
    }

    #[test]
    fn pause_agent_requests_prompt_instead_of_reply() {
        let plan = route_command(AUTONOMOUS, "pause agent", &TimingConfig::default());
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].payload, StepPayload::ShutdownPrompt);
        assert_eq!(plan.steps[1].offset_ms, 800);
    }

    #[test]
    fn agent_quarantine_includes_target_verbatim() {
        let plan = route_command(AUTONOMOUS, "quarantine 192.168.1.105", &TimingConfig::default());
        let texts = texts(&plan);
        assert_eq!(texts.len(), 3);
        assert!(texts[1].contains("DefenseOrchestrator"));
        assert!(texts[2].contains("192.168.1.105"));
    }

    #[test]
    fn agent_quarantine_without_target_returns_usage() {
        let plan = route_command(AUTONOMOUS, "quarantine", &TimingConfig::default());
        assert_eq!(
            texts(&plan),
            vec![
                catalog::MAIN_AGENT_ROUTING.to_string(),
                catalog::AGENT_QUARANTINE_USAGE.to_string(),
            ]
        );
    }

    #[test]
    fn cli_handler_never_routes_to_main_agent() {
        for command in ["threat report", "status", "hello", "pause agent", "help"] {
            for flags in [PAUSED, FALLBACK] {
                let plan = route_command(flags, command, &TimingConfig::default());
                assert_eq!(plan.handler, Handler::Cli);
                assert!(texts(&plan)
                    .iter()
                    .all(|text| !text.contains("Main Agent:") && text != catalog::MAIN_AGENT_ROUTING));
            }
        }
    }

    #[test]
    fn cli_status_reports_manual_control() {
        let plan = route_command(PAUSED, "status", &TimingConfig::default());
        let texts = texts(&plan);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Manual Control"));
        assert!(texts[0].contains("CLI"));
        assert_eq!(plan.steps[0].offset_ms, 300);
    }

    #[test]
    fn cli_enable_agent_schedules_restore() {
        let plan = route_command(FALLBACK, "Enable Agent", &TimingConfig::default());
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].payload, StepPayload::RestoreAgent);
    }

    #[test]
    fn cli_quarantine_extracts_target_or_shows_usage() {
        let plan = route_command(PAUSED, "quarantine 10.0.0.9 now", &TimingConfig::default());
        assert_eq!(texts(&plan), vec![catalog::cli_quarantine("10.0.0.9")]);

        let plan = route_command(PAUSED, "quarantine", &TimingConfig::default());
        assert_eq!(texts(&plan), vec![catalog::CLI_QUARANTINE_USAGE.to_string()]);
    }

    #[test]
    fn cli_fallback_echoes_original_command() {
        let plan = route_command(PAUSED, "Reboot Firewall", &TimingConfig::default());
        assert_eq!(plan.rule, "fallback");
        assert_eq!(
            texts(&plan),
            vec!["[CLI] Command executed: Reboot Firewall".to_string()]
        );
    }

    #[test]
    fn routing_is_deterministic() {
        let timing = TimingConfig::default();
        for command in ["network", "status", "quarantine 1.1.1.1", "???"] {
            assert_eq!(
                route_command(AUTONOMOUS, command, &timing),
                route_command(AUTONOMOUS, command, &timing)
            );
        }
    }

    #[test]
    fn custom_timing_shifts_offsets() {
        let timing = TimingConfig {
            dispatch_ms: 10,
            handoff_ms: 20,
            subagent_ms: 30,
            cli_ms: 5,
        };
        let plan = route_command(AUTONOMOUS, "encrypt", &timing);
        let offsets: Vec<u64> = plan.steps.iter().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![10, 30, 60]);

        let plan = route_command(PAUSED, "status", &timing);
        assert_eq!(plan.steps[0].offset_ms, 5);
    }
}
