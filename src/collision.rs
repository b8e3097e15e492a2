use crate::constants::{COLLECTIBLE_SIZE, PLAYER_SIZE};
use crate::types::{Collectible, Player};
use crate::world::World;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub awarded: Vec<Collectible>,
    pub points: u64,
}

impl CollisionOutcome {
    pub fn is_empty(&self) -> bool {
        self.awarded.is_empty()
    }
}

/// Axis-aligned overlap of two square boxes. Boxes that only share an edge do
/// not overlap.
pub fn boxes_overlap(ax: i64, ay: i64, a_size: i64, bx: i64, by: i64, b_size: i64) -> bool {
    ax < bx.saturating_add(b_size)
        && ax.saturating_add(a_size) > bx
        && ay < by.saturating_add(b_size)
        && ay.saturating_add(a_size) > by
}

pub fn player_touches(player: &Player, item: &Collectible) -> bool {
    boxes_overlap(
        player.x,
        player.y,
        PLAYER_SIZE,
        item.x,
        item.y,
        COLLECTIBLE_SIZE,
    )
}

/// Awards every collectible the player currently overlaps and removes it from
/// the world. Matches are gathered first and removed afterwards so removal
/// never disturbs the scan.
pub fn resolve_collisions(world: &mut World, player_id: &str) -> CollisionOutcome {
    let Some(player) = world.player(player_id) else {
        return CollisionOutcome::default();
    };
    let hits: Vec<u64> = world
        .collectibles()
        .iter()
        .filter(|item| player_touches(player, item))
        .map(|item| item.id)
        .collect();

    let mut outcome = CollisionOutcome::default();
    for id in hits {
        let Some(item) = world.remove_collectible(id) else {
            continue;
        };
        outcome.points = outcome.points.saturating_add(item.value);
        outcome.awarded.push(item);
    }
    if outcome.points > 0 {
        world.award(player_id, outcome.points);
    }
    outcome
}
