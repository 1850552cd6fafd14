use crawlboard_core::{update, AppState, Msg, PushMessage};

#[test]
fn keep_alive_frame_changes_nothing() {
    let mut state = AppState::new();
    let _ = state.consume_dirty();
    let before = state.clone();

    let (mut next, effects) = update(state, Msg::Push(PushMessage::KeepAlive));

    assert_eq!(next, before);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert!(next.take_alerts().is_empty());
}
