use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::types::{Collectible, Direction, Player};

/// Frames pushed to clients. On the wire each one is
/// `{"event": "<name>", "data": <payload>}`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Welcome { id: String },
    UpdatePlayers(BTreeMap<String, Player>),
    UpdateCollectibles(Vec<Collectible>),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::UpdatePlayers(_) => "updatePlayers",
            Self::UpdateCollectibles(_) => "updateCollectibles",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveIntent {
    pub direction: Direction,
    pub speed: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParsedClientMessage {
    MovePlayer(MoveIntent),
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let event = object.get("event")?.as_str()?;
    let data = object.get("data")?.as_object()?;

    match event {
        "movePlayer" => {
            let direction = Direction::parse(data.get("dir")?.as_str()?)?;
            let speed = parse_speed(data.get("speed")?)?;
            Some(ParsedClientMessage::MovePlayer(MoveIntent { direction, speed }))
        }
        _ => None,
    }
}

fn parse_speed(value: &Value) -> Option<i64> {
    const MAX_SAFE_INTEGER_F64: f64 = 9_007_199_254_740_991.0;

    let speed = if let Some(number) = value.as_i64() {
        number
    } else if let Some(number) = value.as_u64() {
        i64::try_from(number).ok()?
    } else {
        let number = value.as_f64()?;
        if !number.is_finite() {
            return None;
        }
        let floored = number.floor();
        if floored.abs() > MAX_SAFE_INTEGER_F64 {
            return None;
        }
        floored as i64
    };
    (speed >= 1).then_some(speed)
}
