use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use super::SentinelEffect;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::ShellAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::catalog;
pub(super) use crate::catalog::SubAgent;
pub(super) use crate::config::Config;
pub(super) use crate::router::StepPayload;
pub(super) use crate::state::AgentMode;
pub(super) use crate::state::ChatOverlay;
pub(super) use crate::state::MessageKind;
pub(super) use crate::state::Sender;
pub(super) use crate::state::SessionState;

mod chat_interaction;

fn state() -> SessionState {
    SessionState::new(Config::default())
}

fn user(state: &mut SessionState, action: UserAction) -> Vec<SentinelEffect> {
    reduce(state, ShellAction::User(action), 0)
}

fn runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<SentinelEffect> {
    reduce(state, ShellAction::Runtime(action), 0)
}

/// Delivers scheduled payloads in due order; ties keep emission order.
fn deliver_all(state: &mut SessionState, effects: &[SentinelEffect], base_ms: u64) -> Vec<SentinelEffect> {
    let mut scheduled: Vec<(u64, StepPayload)> = effects
        .iter()
        .filter_map(|effect| match effect {
            SentinelEffect::Schedule { delay_ms, payload } => Some((*delay_ms, payload.clone())),
            _ => None,
        })
        .collect();
    scheduled.sort_by_key(|(delay_ms, _)| *delay_ms);

    let mut delivered = Vec::new();
    for (delay_ms, payload) in scheduled {
        delivered.extend(reduce(
            state,
            ShellAction::Runtime(RuntimeAction::DeliverStep(payload)),
            base_ms + delay_ms,
        ));
    }
    delivered
}

/// Submits `command` and runs its whole response chain.
fn run_command(state: &mut SessionState, command: &str) -> Vec<SentinelEffect> {
    let base_ms = state.transcript.last().map_or(0, |m| m.ts_ms) + 1;
    let effects = reduce(
        state,
        ShellAction::User(UserAction::SubmitCommand(command.to_string())),
        base_ms,
    );
    let mut all = effects.clone();
    all.extend(deliver_all(state, &effects, base_ms));
    all
}

fn replies_after(state: &SessionState, seq: u64) -> Vec<(MessageKind, String)> {
    state
        .transcript
        .since(seq)
        .filter(|message| message.sender == Sender::Agent)
        .map(|message| (message.kind, message.text.clone()))
        .collect()
}

fn confirm_shutdown(state: &mut SessionState) -> Vec<SentinelEffect> {
    user(state, UserAction::ShowShutdownPrompt);
    user(state, UserAction::ConfirmShutdown)
}

fn assert_pending_cleared(state: &SessionState) {
    assert_eq!(state.pending_replies, 0);
    assert!(!state.is_typing());
}
