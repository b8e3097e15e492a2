use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::constants::MAX_DROPPED_FRAMES;
use crate::protocol::ServerEvent;
use crate::session;
use crate::state::ServerState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ClientQueue {
    tx: mpsc::Sender<OutboundMessage>,
    dropped: u32,
}

/// Outbound queues of every connected client, keyed by player id.
///
/// Sends never wait: each client owns a bounded queue drained by its own
/// writer task, so a stalled socket only ever affects its own client. A
/// client whose queue stays full for more than `max_dropped` frames in a row
/// is reported as failed even under `DropOnFull`.
pub struct Broadcaster {
    clients: HashMap<String, ClientQueue>,
    max_dropped: u32,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::with_max_dropped(MAX_DROPPED_FRAMES)
    }

    pub fn with_max_dropped(max_dropped: u32) -> Self {
        Self {
            clients: HashMap::new(),
            max_dropped,
        }
    }

    pub fn register(&mut self, id: &str, tx: mpsc::Sender<OutboundMessage>) {
        self.clients
            .insert(id.to_string(), ClientQueue { tx, dropped: 0 });
    }

    pub fn unregister(&mut self, id: &str) -> Option<mpsc::Sender<OutboundMessage>> {
        self.clients.remove(id).map(|queue| queue.tx)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Queues `event` for one client. Returns `false` when the client has to be
    /// dropped.
    pub fn send_to(&mut self, id: &str, event: &ServerEvent, policy: QueuePolicy) -> bool {
        let Some(payload) = encode(event) else {
            return true;
        };
        let max_dropped = self.max_dropped;
        let Some(queue) = self.clients.get_mut(id) else {
            return true;
        };
        deliver(
            id,
            queue,
            OutboundMessage::Text(payload),
            event,
            policy,
            max_dropped,
        )
    }

    /// Queues `event` for every client and returns the ids whose queue is gone,
    /// full under `DisconnectOnFull`, or full for too many frames in a row.
    pub fn broadcast(&mut self, event: &ServerEvent, policy: QueuePolicy) -> Vec<String> {
        let Some(payload) = encode(event) else {
            return Vec::new();
        };
        let max_dropped = self.max_dropped;
        let mut failed = Vec::new();
        for (id, queue) in &mut self.clients {
            let message = OutboundMessage::Text(payload.clone());
            if !deliver(id, queue, message, event, policy, max_dropped) {
                failed.push(id.clone());
            }
        }
        failed
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(error) => {
            warn!(event = event.name(), %error, "failed to encode server event");
            None
        }
    }
}

fn deliver(
    id: &str,
    queue: &mut ClientQueue,
    message: OutboundMessage,
    event: &ServerEvent,
    policy: QueuePolicy,
    max_dropped: u32,
) -> bool {
    match queue.tx.try_send(message) {
        Ok(()) => {
            queue.dropped = 0;
            true
        }
        Err(TrySendError::Full(_)) => {
            queue.dropped = queue.dropped.saturating_add(1);
            warn!(
                player_id = id,
                event = event.name(),
                dropped = queue.dropped,
                "client queue full, dropping update"
            );
            policy == QueuePolicy::DropOnFull && queue.dropped <= max_dropped
        }
        Err(TrySendError::Closed(_)) => {
            debug!(player_id = id, "client queue closed");
            false
        }
    }
}

pub fn publish_players(state: &mut ServerState) {
    let event = ServerEvent::UpdatePlayers(state.world.snapshot_players());
    publish(state, &event);
}

pub fn publish_collectibles(state: &mut ServerState) {
    let event = ServerEvent::UpdateCollectibles(state.world.snapshot_collectibles());
    publish(state, &event);
}

/// Pushes `event` to everyone. Clients found dead while sending are released
/// and the survivors get a fresh player map, repeated until no send fails.
pub fn publish(state: &mut ServerState, event: &ServerEvent) {
    let mut dead = state.clients.broadcast(event, QueuePolicy::DropOnFull);
    while !dead.is_empty() {
        for id in &dead {
            session::release(state, id);
        }
        let players = ServerEvent::UpdatePlayers(state.world.snapshot_players());
        dead = state.clients.broadcast(&players, QueuePolicy::DropOnFull);
    }
}
