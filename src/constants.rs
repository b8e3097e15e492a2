pub const PLAYER_SIZE: i64 = 50;
pub const COLLECTIBLE_SIZE: i64 = 50;

pub const PLAYER_SPAWN_X: i64 = 100;
pub const PLAYER_SPAWN_Y: i64 = 100;

pub const PLAY_AREA_WIDTH: i64 = 600;
pub const PLAY_AREA_HEIGHT: i64 = 400;

pub const COLLECTIBLE_MIN_VALUE: u64 = 1;
pub const COLLECTIBLE_MAX_VALUE: u64 = 10;

pub const SPAWN_INTERVAL_MS: u64 = 10_000;

pub const DEFAULT_PORT: u16 = 3000;
pub const CLIENT_QUEUE_CAPACITY: usize = 256;
pub const MAX_DROPPED_FRAMES: u32 = 64;

pub const HEARTBEAT_INTERVAL_MS: u64 = 10_000;
pub const CLIENT_TIMEOUT_MS: u64 = 30_000;
pub const SOCKET_WRITE_TIMEOUT_MS: u64 = 5_000;

pub const APP_NAME: &str = "Secure Real-Time Multiplayer Game";

pub const LEADERBOARD_DEFAULT_LIMIT: usize = 10;
pub const LEADERBOARD_MAX_LIMIT: usize = 100;
