//! Procedural chunk item generation.
//!
//! A chunk's items depend only on its seed and coordinates. The draw order
//! below is part of the world format: changing it changes every planet.

use crate::chunk::{ChunkItem, ChunkItems, Element, ItemKind};
use crate::planet::{ChunkId, Planet};
use crate::random::Randomizer;
use crate::types::ChunkCoord;

/// Largest item size is `MAX_ITEM_SIZE - 1`.
pub const MAX_ITEM_SIZE: u32 = 7;

pub const VEHICLE_MODEL: &str = "rasa";
pub const VEHICLE_HP: i32 = 1000;
pub const VEHICLE_ROTATION: f64 = -0.9;
/// Where the spawn vehicle is parked inside the join chunk.
pub const SPAWN_VEHICLE_OFFSET: (i64, i64) = (18, 18);

/// Number of items for an item-count roll in `[0, 100)`.
///
/// Ten percent of chunks are empty, eighty percent hold one item, and the
/// top ten percent hold `101 - roll` (2 to 11) items.
pub fn item_count_for_roll(roll: u32) -> u32 {
    if roll < 10 {
        0
    } else if roll < 90 {
        1
    } else {
        101 - roll
    }
}

pub struct ChunkGenerator {
    chunk_size: i64,
}

impl ChunkGenerator {
    pub fn new(chunk_size: i64) -> Self {
        Self { chunk_size }
    }

    pub fn for_planet(planet: &Planet) -> Self {
        Self::new(planet.chunk_size)
    }

    fn origin(&self, coord: ChunkCoord) -> (i64, i64) {
        (
            coord.x as i64 * self.chunk_size,
            coord.y as i64 * self.chunk_size,
        )
    }

    /// Generate the initial item list of a chunk.
    pub fn generate(&self, chunk_id: &ChunkId, chunk_seed: i64, coord: ChunkCoord) -> ChunkItems {
        let mut rng = Randomizer::new(chunk_seed);
        let count = item_count_for_roll(rng.next_int(100));
        let (origin_x, origin_y) = self.origin(coord);
        let span = self.chunk_size as u32;

        let mut items = Vec::with_capacity(count as usize);
        for index in 0..count {
            let offset_x = rng.next_int(span) as i64;
            let offset_y = rng.next_int(span) as i64;
            let size = 1 + rng.next_int(MAX_ITEM_SIZE - 1);
            let hp = 10 + size as i32 * 2;
            let element = rng.pick(&Element::ALL).copied().unwrap_or(Element::C);

            items.push(ChunkItem {
                id: format!("{}-{}", chunk_id, index),
                offset_x,
                offset_y,
                x: (origin_x + offset_x) as f64,
                y: (origin_y + offset_y) as f64,
                size,
                hp,
                removed: false,
                kind: ItemKind::Resource { element },
            });
        }

        ChunkItems::new(items)
    }

    /// A parked vehicle at a chunk-local offset.
    pub fn vehicle(
        &self,
        id: impl Into<String>,
        coord: ChunkCoord,
        offset: (i64, i64),
        rotation: f64,
    ) -> ChunkItem {
        let (origin_x, origin_y) = self.origin(coord);
        ChunkItem {
            id: id.into(),
            offset_x: offset.0,
            offset_y: offset.1,
            x: (origin_x + offset.0) as f64,
            y: (origin_y + offset.1) as f64,
            size: 1,
            hp: VEHICLE_HP,
            removed: false,
            kind: ItemKind::Vehicle {
                model: VEHICLE_MODEL.to_string(),
                rotation,
            },
        }
    }

    /// Id for the `seq`-th vehicle placed into a chunk after generation.
    pub fn vehicle_id(chunk_id: &ChunkId, seq: u64) -> String {
        format!("{}-v{}", chunk_id, seq)
    }

    /// The vehicle placed in the chunk where a nomad first joins.
    pub fn spawn_vehicle(&self, chunk_id: &ChunkId, coord: ChunkCoord, seq: u64) -> ChunkItem {
        self.vehicle(
            Self::vehicle_id(chunk_id, seq),
            coord,
            SPAWN_VEHICLE_OFFSET,
            VEHICLE_ROTATION,
        )
    }
}
