use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::broadcast::{self, Broadcaster};
use crate::config::ServerConfig;
use crate::constants::{
    CLIENT_QUEUE_CAPACITY, CLIENT_TIMEOUT_MS, HEARTBEAT_INTERVAL_MS, SOCKET_WRITE_TIMEOUT_MS,
};
use crate::spawner::{Spawner, SpawnerOptions};
use crate::types::{Collectible, PlayArea};
use crate::world::World;

pub type SharedState = Arc<Mutex<ServerState>>;

/// Per-socket limits used by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub queue_capacity: usize,
    /// How often the writer pings an idle client.
    pub heartbeat_interval: Duration,
    /// Silence from the client (no frame, no pong) longer than this ends the
    /// session.
    pub client_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            queue_capacity: CLIENT_QUEUE_CAPACITY,
            heartbeat_interval: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            client_timeout: Duration::from_millis(CLIENT_TIMEOUT_MS),
            write_timeout: Duration::from_millis(SOCKET_WRITE_TIMEOUT_MS),
        }
    }
}

/// Everything the realtime engine mutates. Always accessed through one lock
/// so a mutation and the snapshot broadcast after it are never interleaved
/// with another mutation.
pub struct ServerState {
    pub world: World,
    pub clients: Broadcaster,
    pub spawner: Spawner,
    pub connection: ConnectionSettings,
}

impl ServerState {
    pub fn new(world: World, spawner: Spawner) -> Self {
        Self {
            world,
            clients: Broadcaster::new(),
            spawner,
            connection: ConnectionSettings::default(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let area = PlayArea {
            width: config.play_area_width,
            height: config.play_area_height,
        };
        let world = if config.clamp_to_play_area {
            World::new().with_clamp_area(area)
        } else {
            World::new()
        };
        let spawner = Spawner::new(SpawnerOptions {
            area,
            values: config.collectible_min_value..=config.collectible_max_value,
            seed: config.spawn_seed,
        });
        let mut state = Self::new(world, spawner);
        state.clients = Broadcaster::with_max_dropped(config.max_dropped_frames);
        state.connection = ConnectionSettings {
            queue_capacity: config.client_queue_capacity,
            heartbeat_interval: Duration::from_millis(config.heartbeat_interval_ms),
            client_timeout: Duration::from_millis(config.client_timeout_ms),
            write_timeout: Duration::from_millis(SOCKET_WRITE_TIMEOUT_MS),
        };
        state
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

/// Spawns one collectible and pushes the new collectible list. Players are
/// not re-checked for collisions here; only movement claims collectibles.
pub fn spawn_tick(state: &mut ServerState) -> Collectible {
    let item = state.spawner.spawn(&mut state.world);
    debug!(
        collectible_id = item.id,
        x = item.x,
        y = item.y,
        value = item.value,
        "collectible spawned"
    );
    broadcast::publish_collectibles(state);
    item
}

pub fn start_spawn_loop(state: SharedState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            spawn_tick(&mut guard);
        }
    })
}
