use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::broadcast::{self, OutboundMessage, QueuePolicy};
use crate::error::WorldError;
use crate::protocol::ServerEvent;
use crate::state::ServerState;
use crate::types::Player;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

/// Binds a fresh connection to a new player and brings every client, the new
/// one included, up to date.
pub fn connect(
    state: &mut ServerState,
    id: &str,
    tx: mpsc::Sender<OutboundMessage>,
) -> Result<Player, WorldError> {
    let player = state.world.add_player(id)?.clone();
    state.clients.register(id, tx);
    info!(player_id = id, players = state.world.player_count(), "player connected");

    let welcome = ServerEvent::Welcome { id: id.to_string() };
    if !state
        .clients
        .send_to(id, &welcome, QueuePolicy::DisconnectOnFull)
    {
        release(state, id);
        broadcast::publish_players(state);
        return Ok(player);
    }

    broadcast::publish_players(state);
    broadcast::publish_collectibles(state);
    Ok(player)
}

/// Ends a session. Safe to call more than once; only the first call
/// broadcasts.
pub fn disconnect(state: &mut ServerState, id: &str) -> bool {
    if !release(state, id) {
        return false;
    }
    broadcast::publish_players(state);
    true
}

/// Removes the client queue and its player without broadcasting.
pub(crate) fn release(state: &mut ServerState, id: &str) -> bool {
    let tx = state.clients.unregister(id);
    let player = state.world.remove_player(id);
    if let Some(tx) = tx.as_ref() {
        let _ = tx.try_send(OutboundMessage::Close);
    }
    let released = tx.is_some() || player.is_some();
    if released {
        info!(
            player_id = id,
            score = player.map(|p| p.score).unwrap_or_default(),
            players = state.world.player_count(),
            "player disconnected"
        );
    } else {
        debug!(player_id = id, "disconnect for unknown session ignored");
    }
    released
}
