use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{
    COLLECTIBLE_MAX_VALUE, COLLECTIBLE_MIN_VALUE, PLAY_AREA_HEIGHT, PLAY_AREA_WIDTH,
};
use crate::types::{Collectible, PlayArea};
use crate::world::World;

#[derive(Clone, Debug)]
pub struct SpawnerOptions {
    pub area: PlayArea,
    pub values: RangeInclusive<u64>,
    pub seed: Option<u64>,
}

impl Default for SpawnerOptions {
    fn default() -> Self {
        Self {
            area: PlayArea {
                width: PLAY_AREA_WIDTH,
                height: PLAY_AREA_HEIGHT,
            },
            values: COLLECTIBLE_MIN_VALUE..=COLLECTIBLE_MAX_VALUE,
            seed: None,
        }
    }
}

pub struct Spawner {
    rng: StdRng,
    area: PlayArea,
    values: RangeInclusive<u64>,
}

impl Spawner {
    pub fn new(options: SpawnerOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let min_value = (*options.values.start()).max(1);
        let max_value = (*options.values.end()).max(min_value);
        Self {
            rng,
            area: PlayArea {
                width: options.area.width.max(1),
                height: options.area.height.max(1),
            },
            values: min_value..=max_value,
        }
    }

    /// Draws position and value uniformly and inserts the result into `world`.
    pub fn spawn(&mut self, world: &mut World) -> Collectible {
        let x = self.rng.random_range(0..self.area.width);
        let y = self.rng.random_range(0..self.area.height);
        let value = self.rng.random_range(self.values.clone());
        let id = world.add_collectible(x, y, value);
        Collectible { id, x, y, value }
    }
}
