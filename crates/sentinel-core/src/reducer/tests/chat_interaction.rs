use super::*;
use pretty_assertions::assert_eq;

#[test]
fn toggling_chat_twice_restores_visibility() {
    let mut state = state();
    let original = state.interaction.chat_open;

    let effects = user(&mut state, UserAction::ToggleChat);
    assert_eq!(effects, vec![SentinelEffect::RequestFrame]);
    assert_eq!(state.interaction.chat_open, !original);

    user(&mut state, UserAction::ToggleChat);
    assert_eq!(state.interaction.chat_open, original);
}

#[test]
fn chat_starts_open_and_pause_notice_is_shown() {
    let mut state = state();
    assert!(state.interaction.chat_open);
    confirm_shutdown(&mut state);
    assert_eq!(
        state.transcript.last().unwrap().text,
        catalog::AGENT_PAUSED_NOTICE
    );
}

#[test]
fn chat_start_state_follows_config() {
    let mut config = Config::default();
    config.chat.start_open = false;
    let state = SessionState::new(config);
    assert!(!state.interaction.chat_open);
}

#[test]
fn enter_submits_and_clears_input() {
    let mut state = state();
    for c in "statuz".chars() {
        user(&mut state, UserAction::InputChar(c));
    }
    user(&mut state, UserAction::InputBackspace);
    user(&mut state, UserAction::InputChar('s'));
    assert_eq!(state.interaction.input, "status");

    let effects = user(&mut state, UserAction::SubmitInput);
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, SentinelEffect::Schedule { .. })));
    assert!(state.interaction.input.is_empty());

    let first = state.transcript.iter().next().unwrap();
    assert_eq!(first.text, "status");
    assert_eq!(first.sender, Sender::User);
    assert_eq!(state.transcript.len(), 1);
}

#[test]
fn blank_input_is_ignored() {
    let mut state = state();
    for c in "   ".chars() {
        user(&mut state, UserAction::InputChar(c));
    }
    let effects = user(&mut state, UserAction::SubmitInput);
    assert_eq!(effects, vec![SentinelEffect::RequestFrame]);
    assert!(state.transcript.is_empty());

    assert!(user(&mut state, UserAction::SubmitCommand(String::new())).is_empty());
    assert!(state.transcript.is_empty());
    assert_eq!(state.pending_replies, 0);
}

#[test]
fn messages_are_stamped_with_delivery_time() {
    let mut state = state();
    let effects = reduce(
        &mut state,
        ShellAction::User(UserAction::SubmitCommand("help".to_string())),
        1_000,
    );
    deliver_all(&mut state, &effects, 1_000);

    let stamps: Vec<u64> = state.transcript.iter().map(|m| m.ts_ms).collect();
    assert_eq!(stamps, vec![1_000, 1_300, 1_800]);
}

#[test]
fn transcript_is_append_only() {
    let mut state = state();
    run_command(&mut state, "threat");
    let before: Vec<(u64, String)> = state
        .transcript
        .iter()
        .map(|m| (m.seq, m.text.clone()))
        .collect();

    run_command(&mut state, "status");
    let after: Vec<(u64, String)> = state
        .transcript
        .iter()
        .take(before.len())
        .map(|m| (m.seq, m.text.clone()))
        .collect();
    assert_eq!(before, after);
}
