use serde::Serialize;

use crate::constants::{PLAYER_SPAWN_X, PLAYER_SPAWN_Y};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit step along the axis; `Up` points towards smaller `y`.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub score: u64,
}

impl Player {
    pub fn spawn(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
            score: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Collectible {
    pub id: u64,
    pub x: i64,
    pub y: i64,
    pub value: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayArea {
    pub width: i64,
    pub height: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub position: usize,
    pub total: usize,
}

/// Body of `GET /_api/players/{id}/rank`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerRank {
    pub id: String,
    #[serde(flatten)]
    pub rank: Rank,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: String,
    pub score: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardResponse {
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    pub total: usize,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AppInfo {
    #[serde(rename = "appName")]
    pub app_name: &'static str,
    pub version: &'static str,
}
