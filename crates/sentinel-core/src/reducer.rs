use tracing::debug;
use tracing::info;

use super::actions::RuntimeAction;
use super::actions::ShellAction;
use super::actions::UserAction;
use super::catalog;
use super::router::route_command;
use super::router::StepPayload;
use super::state::AgentMode;
use super::state::ChatOverlay;
use super::state::MessageDraft;
use super::state::SessionFlags;
use super::state::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentinelEffect {
    /// Deliver `payload` back as `RuntimeAction::DeliverStep` after `delay_ms`.
    Schedule { delay_ms: u64, payload: StepPayload },
    ModeChanged(AgentMode),
    ShowShutdownPrompt,
    RequestFrame,
}

pub fn reduce(state: &mut SessionState, action: ShellAction, now_ms: u64) -> Vec<SentinelEffect> {
    match action {
        ShellAction::User(user) => reduce_user(state, user, now_ms),
        ShellAction::Runtime(runtime) => reduce_runtime(state, runtime, now_ms),
    }
}

fn reduce_user(state: &mut SessionState, action: UserAction, now_ms: u64) -> Vec<SentinelEffect> {
    match action {
        UserAction::SubmitCommand(command) => submit_command(state, &command, now_ms),
        UserAction::InputChar(c) => {
            state.interaction.input.push(c);
            vec![SentinelEffect::RequestFrame]
        }
        UserAction::InputBackspace => {
            state.interaction.input.pop();
            vec![SentinelEffect::RequestFrame]
        }
        UserAction::SubmitInput => {
            let input = std::mem::take(&mut state.interaction.input);
            let mut effects = submit_command(state, &input, now_ms);
            if effects.is_empty() {
                effects.push(SentinelEffect::RequestFrame);
            }
            effects
        }
        UserAction::ToggleChat => {
            state.interaction.chat_open = !state.interaction.chat_open;
            debug!(chat_open = state.interaction.chat_open, "chat toggled");
            vec![SentinelEffect::RequestFrame]
        }
        UserAction::ShowShutdownPrompt => {
            state.interaction.overlay = ChatOverlay::ShutdownPrompt;
            vec![
                SentinelEffect::ShowShutdownPrompt,
                SentinelEffect::RequestFrame,
            ]
        }
        UserAction::ConfirmShutdown => {
            let prompt_was_open = state.shutdown_prompt_open();
            state.interaction.overlay = ChatOverlay::None;

            if !state.flags.agent_active {
                return if prompt_was_open {
                    vec![SentinelEffect::RequestFrame]
                } else {
                    Vec::new()
                };
            }

            let before = state.mode();
            state.flags.agent_active = false;
            info!(from = before.label(), to = AgentMode::ManualPaused.label(), "main agent paused");
            if state.interaction.chat_open {
                state
                    .transcript
                    .append(MessageDraft::system(catalog::AGENT_PAUSED_NOTICE), now_ms);
            }
            vec![
                SentinelEffect::ModeChanged(AgentMode::ManualPaused),
                SentinelEffect::RequestFrame,
            ]
        }
        UserAction::CancelShutdown => {
            if !state.shutdown_prompt_open() {
                return Vec::new();
            }
            state.interaction.overlay = ChatOverlay::None;
            vec![SentinelEffect::RequestFrame]
        }
    }
}

fn submit_command(state: &mut SessionState, raw: &str, now_ms: u64) -> Vec<SentinelEffect> {
    let command = raw.trim();
    if command.is_empty() {
        return Vec::new();
    }

    state.transcript.append(MessageDraft::user(command), now_ms);

    let plan = route_command(state.flags, command, &state.config.timing);
    let mut effects = Vec::with_capacity(plan.steps.len() + 1);
    for step in plan.steps {
        if step.is_reply() {
            state.pending_replies += 1;
        }
        effects.push(SentinelEffect::Schedule {
            delay_ms: step.offset_ms,
            payload: step.payload,
        });
    }
    effects.push(SentinelEffect::RequestFrame);
    effects
}

fn reduce_runtime(
    state: &mut SessionState,
    action: RuntimeAction,
    now_ms: u64,
) -> Vec<SentinelEffect> {
    match action {
        RuntimeAction::DeliverStep(payload) => {
            let is_reply = !matches!(payload, StepPayload::ShutdownPrompt);
            if is_reply {
                state.pending_replies = state.pending_replies.saturating_sub(1);
            }
            match payload {
                StepPayload::Message(draft) => {
                    state.transcript.append(draft, now_ms);
                    vec![SentinelEffect::RequestFrame]
                }
                StepPayload::ShutdownPrompt => {
                    state.interaction.overlay = ChatOverlay::ShutdownPrompt;
                    vec![
                        SentinelEffect::ShowShutdownPrompt,
                        SentinelEffect::RequestFrame,
                    ]
                }
                StepPayload::RestoreAgent => {
                    let before = state.mode();
                    state.flags = SessionFlags::default();
                    state
                        .transcript
                        .append(MessageDraft::system(catalog::AGENT_RESTORED_NOTICE), now_ms);

                    let mut effects = Vec::new();
                    if before != AgentMode::Autonomous {
                        info!(from = before.label(), to = AgentMode::Autonomous.label(), "main agent restored");
                        effects.push(SentinelEffect::ModeChanged(AgentMode::Autonomous));
                    }
                    effects.push(SentinelEffect::RequestFrame);
                    effects
                }
            }
        }
        RuntimeAction::ConnectionCheck { lost } => {
            if !lost || state.mode() != AgentMode::Autonomous {
                return Vec::new();
            }
            state.flags.cli_mode = true;
            info!(
                from = AgentMode::Autonomous.label(),
                to = AgentMode::CliFallback.label(),
                "main agent connection lost"
            );
            state
                .transcript
                .append(MessageDraft::system(catalog::CONNECTION_LOST_NOTICE), now_ms);
            vec![
                SentinelEffect::ModeChanged(AgentMode::CliFallback),
                SentinelEffect::RequestFrame,
            ]
        }
    }
}

#[cfg(test)]
mod tests;
