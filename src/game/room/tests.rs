use super::*;
use crate::game::types::{GroundBounds, Point};
use tokio::sync::mpsc;

fn make_state() -> RoomState {
    RoomState::new(EngineConfig::default(), StdRng::seed_from_u64(11))
}

fn add_session(state: &mut RoomState, id: &str) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .sessions
        .insert(id.to_string(), SessionEntry { sender: tx });
    rx
}

fn last_payload(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<serde_json::Value> {
    let mut last = None;
    while let Ok(text) = rx.try_recv() {
        last = Some(text);
    }
    last.and_then(|text| serde_json::from_str(&text).ok())
}

#[test]
fn new_room_starts_with_one_minimum_segment_and_a_bonus() {
    let state = make_state();
    assert_eq!(state.chain.values(), vec![MIN_SEGMENT_VALUE]);
    assert_eq!(state.chain.bonus_items().len(), 1);
    assert_eq!(state.head, state.chain.head_id());
    assert_eq!(state.score, 0);
}

#[test]
fn direction_message_snaps_to_cardinal() {
    let mut state = make_state();
    state.handle_client_message(ClientMessage::Direction {
        axis: Point::new(-0.9, 0.0, 0.3),
    });
    assert_eq!(state.chain.direction(), Point::new(-1.0, 0.0, 0.0));

    state.handle_client_message(ClientMessage::Direction { axis: Point::ZERO });
    assert_eq!(state.chain.direction(), Point::new(-1.0, 0.0, 0.0));
}

#[test]
fn spawn_request_merges_and_scores_on_next_frame() {
    let mut state = make_state();
    state.handle_client_message(ClientMessage::Spawn);
    assert_eq!(state.chain.values(), vec![4]);
    assert_eq!(state.score, 0);

    state.frame_tick(0.016);
    assert_eq!(state.score, 4);

    state.handle_client_message(ClientMessage::Spawn);
    state.handle_client_message(ClientMessage::Spawn);
    assert_eq!(state.chain.values(), vec![8]);
    state.frame_tick(0.016);
    assert_eq!(state.score, 4 + 4 + 8);
}

#[test]
fn frame_tick_broadcasts_state_to_every_session() {
    let mut state = make_state();
    let mut first = add_session(&mut state, "a");
    let mut second = add_session(&mut state, "b");
    state.handle_client_message(ClientMessage::Spawn);
    state.frame_tick(0.016);

    for rx in [&mut first, &mut second] {
        let payload = last_payload(rx).expect("state payload");
        assert_eq!(payload["type"], "state");
        assert_eq!(payload["score"], 4);
        assert_eq!(payload["segments"][0]["value"], 4);
        assert_eq!(payload["events"][0]["type"], "merged");
    }
}

#[test]
fn closed_sessions_are_dropped_on_broadcast() {
    let mut state = make_state();
    let _kept = add_session(&mut state, "kept");
    drop(add_session(&mut state, "gone"));
    state.frame_tick(0.016);
    assert_eq!(state.sessions.len(), 1);
    assert!(state.sessions.contains_key("kept"));
}

#[test]
fn ticks_move_head_and_report_head_changes() {
    let mut state = make_state();
    state.chain.bonus.clear();
    let head = state.chain.head_id();
    let start = state.chain.segments()[0].position;
    for _ in 0..10 {
        state.fixed_tick();
        state.frame_tick(0.02);
    }
    let now = state.chain.segments()[0].position;
    assert!((now.z - start.z - 10.0 * 0.05).abs() < 1e-9);
    assert_eq!(state.head, head);
}

#[test]
fn bonus_timer_tops_up_items() {
    let config = EngineConfig {
        bonus_spawn_interval: 0.1,
        ground: GroundBounds {
            min_x: 10.0,
            max_x: 40.0,
            min_z: 10.0,
            max_z: 40.0,
            y: 0.5,
        },
        ..EngineConfig::default()
    };
    let mut state = RoomState::new(config, StdRng::seed_from_u64(5));
    let before = state.chain.bonus_items().len();
    state.frame_tick(0.1);
    assert_eq!(state.chain.bonus_items().len(), before + 1);
}

#[tokio::test]
async fn room_tracks_sessions_and_messages() {
    let room = Arc::new(Room::new(EngineConfig::default()));
    let (tx, _rx) = mpsc::unbounded_channel();
    let session_id = room.add_session(tx).await;
    room.handle_text_message(r#"{"type":"spawn"}"#).await;
    room.handle_text_message("garbage").await;

    let stats = room.stats().await;
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.segments, 1);
    assert_eq!(stats.bonus, 1);
    assert!(!stats.merging);

    room.remove_session(&session_id).await;
    assert_eq!(room.stats().await.sessions, 0);
}
