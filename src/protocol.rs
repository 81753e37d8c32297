use crate::game::types::{ChainEvent, ChainSnapshot, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "direction")]
    Direction { axis: Point },
    #[serde(rename = "spawn")]
    Spawn,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage<'a> {
    #[serde(rename = "state")]
    State {
        score: i64,
        events: &'a [ChainEvent],
        #[serde(flatten)]
        snapshot: &'a ChainSnapshot,
    },
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}

pub fn encode_state(score: i64, events: &[ChainEvent], snapshot: &ChainSnapshot) -> String {
    let message = ServerMessage::State {
        score,
        events,
        snapshot,
    };
    serde_json::to_string(&message).unwrap_or_default()
}
