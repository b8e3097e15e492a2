use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::constants::PLAYER_SIZE;
use crate::error::WorldError;
use crate::types::{Collectible, Direction, LeaderboardEntry, PlayArea, Player, Rank};

/// Authoritative state of the arena: connected players keyed by id and the
/// live collectibles in spawn order.
#[derive(Clone, Debug)]
pub struct World {
    players: BTreeMap<String, Player>,
    collectibles: Vec<Collectible>,
    next_collectible_id: u64,
    clamp_area: Option<PlayArea>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            collectibles: Vec::new(),
            next_collectible_id: 1,
            clamp_area: None,
        }
    }

    /// Keeps every player box inside `area` after each move.
    pub fn with_clamp_area(mut self, area: PlayArea) -> Self {
        self.clamp_area = Some(area);
        self
    }

    pub fn add_player(&mut self, id: &str) -> Result<&Player, WorldError> {
        if self.players.contains_key(id) {
            return Err(WorldError::DuplicatePlayer(id.to_string()));
        }
        Ok(self
            .players
            .entry(id.to_string())
            .or_insert_with(|| Player::spawn(id)))
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn move_player(&mut self, id: &str, direction: Direction, speed: i64) -> bool {
        let clamp_area = self.clamp_area;
        let Some(player) = self.players.get_mut(id) else {
            return false;
        };
        let (dx, dy) = direction.delta();
        player.x = player.x.saturating_add(dx.saturating_mul(speed));
        player.y = player.y.saturating_add(dy.saturating_mul(speed));

        if let Some(area) = clamp_area {
            player.x = player.x.clamp(0, (area.width - PLAYER_SIZE).max(0));
            player.y = player.y.clamp(0, (area.height - PLAYER_SIZE).max(0));
        }
        true
    }

    pub(crate) fn award(&mut self, id: &str, points: u64) {
        if let Some(player) = self.players.get_mut(id) {
            player.score = player.score.saturating_add(points);
        }
    }

    pub fn add_collectible(&mut self, x: i64, y: i64, value: u64) -> u64 {
        let id = self.next_collectible_id;
        self.next_collectible_id += 1;
        self.collectibles.push(Collectible { id, x, y, value });
        id
    }

    pub fn remove_collectible(&mut self, id: u64) -> Option<Collectible> {
        let index = self.collectibles.iter().position(|item| item.id == id)?;
        Some(self.collectibles.remove(index))
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn collectible_count(&self) -> usize {
        self.collectibles.len()
    }

    pub fn snapshot_players(&self) -> BTreeMap<String, Player> {
        self.players.clone()
    }

    pub fn snapshot_collectibles(&self) -> Vec<Collectible> {
        self.collectibles.clone()
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ordered: Vec<&Player> = self.players.values().collect();
        ordered.sort_by(|a, b| cmp_by_score(a, b));
        ordered
            .into_iter()
            .enumerate()
            .map(|(index, player)| LeaderboardEntry {
                rank: index + 1,
                id: player.id.clone(),
                score: player.score,
            })
            .collect()
    }

    pub fn rank_of(&self, id: &str) -> Option<Rank> {
        let player = self.players.get(id)?;
        let ahead = self
            .players
            .values()
            .filter(|other| cmp_by_score(other, player) == Ordering::Less)
            .count();
        Some(Rank {
            position: ahead + 1,
            total: self.players.len(),
        })
    }
}

fn cmp_by_score(a: &Player, b: &Player) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_player_uses_default_spawn() {
        let mut world = World::new();
        let player = world.add_player("a").expect("first insert should succeed");
        assert_eq!((player.x, player.y, player.score), (100, 100, 0));
    }

    #[test]
    fn add_player_rejects_duplicate_id() {
        let mut world = World::new();
        world.add_player("a").expect("first insert should succeed");
        assert!(matches!(
            world.add_player("a"),
            Err(WorldError::DuplicatePlayer(id)) if id == "a"
        ));
        assert_eq!(world.player_count(), 1);
    }

    #[test]
    fn remove_player_is_safe_when_absent() {
        let mut world = World::new();
        assert!(world.remove_player("ghost").is_none());
        world.add_player("a").expect("insert");
        assert!(world.remove_player("a").is_some());
        assert!(world.player("a").is_none());
    }

    #[test]
    fn move_player_follows_screen_axes() {
        let mut world = World::new();
        world.add_player("a").expect("insert");
        assert!(world.move_player("a", Direction::Up, 5));
        assert!(world.move_player("a", Direction::Right, 7));
        let player = world.player("a").expect("player exists");
        assert_eq!((player.x, player.y), (107, 95));

        world.move_player("a", Direction::Down, 10);
        world.move_player("a", Direction::Left, 200);
        let player = world.player("a").expect("player exists");
        assert_eq!((player.x, player.y), (-93, 105));
    }

    #[test]
    fn move_unknown_player_changes_nothing() {
        let mut world = World::new();
        world.add_player("a").expect("insert");
        assert!(!world.move_player("b", Direction::Up, 5));
        assert_eq!(world.player("a").map(|p| (p.x, p.y)), Some((100, 100)));
    }

    #[test]
    fn clamp_area_keeps_player_box_inside() {
        let mut world = World::new().with_clamp_area(PlayArea {
            width: 600,
            height: 400,
        });
        world.add_player("a").expect("insert");
        world.move_player("a", Direction::Left, 1_000);
        world.move_player("a", Direction::Down, 1_000);
        let player = world.player("a").expect("player exists");
        assert_eq!((player.x, player.y), (0, 350));
    }

    #[test]
    fn collectible_ids_are_sequential_and_never_reused() {
        let mut world = World::new();
        let first = world.add_collectible(1, 2, 3);
        let second = world.add_collectible(4, 5, 6);
        assert_eq!((first, second), (1, 2));

        assert!(world.remove_collectible(second).is_some());
        assert!(world.remove_collectible(second).is_none());
        let third = world.add_collectible(7, 8, 9);
        assert_eq!(third, 3);
        let ids: Vec<u64> = world.collectibles().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn snapshots_are_detached_copies() {
        let mut world = World::new();
        world.add_player("a").expect("insert");
        world.add_collectible(10, 10, 2);
        let players = world.snapshot_players();
        let collectibles = world.snapshot_collectibles();

        world.move_player("a", Direction::Right, 5);
        world.remove_collectible(1);

        assert_eq!(players.get("a").map(|p| p.x), Some(100));
        assert_eq!(collectibles.len(), 1);
    }

    #[test]
    fn leaderboard_orders_by_score_then_id() {
        let mut world = World::new();
        for id in ["c", "a", "b"] {
            world.add_player(id).expect("insert");
        }
        world.award("b", 7);
        world.award("c", 3);

        let order: Vec<(usize, String)> = world
            .leaderboard()
            .into_iter()
            .map(|entry| (entry.rank, entry.id))
            .collect();
        assert_eq!(
            order,
            vec![(1, "b".to_string()), (2, "c".to_string()), (3, "a".to_string())]
        );
        assert_eq!(
            world.rank_of("c"),
            Some(Rank {
                position: 2,
                total: 3
            })
        );
        assert_eq!(world.rank_of("missing"), None);
    }
}
