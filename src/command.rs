use tracing::debug;

use crate::broadcast;
use crate::collision::{resolve_collisions, CollisionOutcome};
use crate::protocol::MoveIntent;
use crate::state::ServerState;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub collisions: CollisionOutcome,
}

/// Applies one movement intent: move, claim overlapping collectibles, then
/// push the player map and, when something was claimed, the collectible list.
pub fn handle_move(state: &mut ServerState, player_id: &str, intent: MoveIntent) -> MoveOutcome {
    if !state
        .world
        .move_player(player_id, intent.direction, intent.speed)
    {
        debug!(player_id, "move from unknown player ignored");
        return MoveOutcome::default();
    }

    let collisions = resolve_collisions(&mut state.world, player_id);
    if !collisions.is_empty() {
        debug!(
            player_id,
            claimed = collisions.awarded.len(),
            points = collisions.points,
            "collectibles claimed"
        );
    }

    broadcast::publish_players(state);
    if !collisions.is_empty() {
        broadcast::publish_collectibles(state);
    }

    MoveOutcome {
        moved: true,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session;
    use crate::state::tests::{drain, test_state};
    use crate::types::Direction;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn right(speed: i64) -> MoveIntent {
        MoveIntent {
            direction: Direction::Right,
            speed,
        }
    }

    #[test]
    fn move_without_collision_broadcasts_players_only() {
        let mut state = test_state();
        let (tx, mut rx) = mpsc::channel(16);
        session::connect(&mut state, "a", tx).expect("connect");
        drain(&mut rx);

        let outcome = handle_move(&mut state, "a", right(5));
        assert!(outcome.moved);
        assert!(outcome.collisions.is_empty());

        let frames = drain(&mut rx);
        assert_eq!(
            frames,
            vec![json!({
                "event": "updatePlayers",
                "data": { "a": { "id": "a", "x": 105, "y": 100, "score": 0 } }
            })]
        );
    }

    #[test]
    fn move_onto_collectible_scores_and_broadcasts_both() {
        let mut state = test_state();
        let (tx, mut rx) = mpsc::channel(16);
        session::connect(&mut state, "a", tx).expect("connect");
        state.world.add_collectible(120, 120, 5);
        drain(&mut rx);

        let outcome = handle_move(&mut state, "a", right(5));
        assert_eq!(outcome.collisions.points, 5);

        let frames = drain(&mut rx);
        assert_eq!(
            frames,
            vec![
                json!({
                    "event": "updatePlayers",
                    "data": { "a": { "id": "a", "x": 105, "y": 100, "score": 5 } }
                }),
                json!({ "event": "updateCollectibles", "data": [] }),
            ]
        );
    }

    #[test]
    fn move_from_unknown_player_is_silent() {
        let mut state = test_state();
        let (tx, mut rx) = mpsc::channel(16);
        session::connect(&mut state, "a", tx).expect("connect");
        drain(&mut rx);

        let outcome = handle_move(&mut state, "gone", right(5));
        assert_eq!(outcome, MoveOutcome::default());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn second_player_cannot_claim_taken_collectible() {
        let mut state = test_state();
        let (tx_a, _rx_a) = mpsc::channel(64);
        let (tx_b, _rx_b) = mpsc::channel(64);
        session::connect(&mut state, "a", tx_a).expect("connect a");
        session::connect(&mut state, "b", tx_b).expect("connect b");
        state.world.add_collectible(110, 100, 7);

        let first = handle_move(&mut state, "a", right(1));
        let second = handle_move(&mut state, "b", right(1));
        assert_eq!(first.collisions.points, 7);
        assert!(second.collisions.is_empty());
        assert_eq!(state.world.player("b").map(|p| p.score), Some(0));
    }

    #[test]
    fn stalled_client_is_released_while_others_keep_playing() {
        let mut state = test_state();
        let (tx_a, mut rx_a) = mpsc::channel(4096);
        let (tx_b, _rx_b) = mpsc::channel(4);
        session::connect(&mut state, "a", tx_a).expect("connect a");
        session::connect(&mut state, "b", tx_b).expect("connect b");

        for _ in 0..1000 {
            handle_move(&mut state, "a", right(1));
        }

        assert!(state.world.player("b").is_none());
        assert!(!state.clients.contains("b"));
        assert_eq!(state.clients.len(), 1);
        assert_eq!(state.world.player("a").map(|p| p.x), Some(1100));
        let last_players = drain(&mut rx_a)
            .into_iter()
            .rev()
            .find(|frame| frame["event"] == "updatePlayers")
            .expect("a keeps receiving player maps");
        assert!(last_players["data"].get("b").is_none());
    }
}
