//! Planet identity and the planet ↔ chunk coordinate mapper.
//!
//! The surface is a torus: every planet coordinate is reduced modulo the
//! planet size, and chunk coordinates are reduced modulo the number of
//! chunks per side.

use crate::random::pseudo_rand_int;
use crate::types::ChunkCoord;
use serde::{Deserialize, Serialize};

/// Modulus used when hashing a chunk axis into the chunk seed.
const CHUNK_SEED_MODULUS: u32 = 999;

/// Structural address of a planet. Always zero for now; reserved for
/// multi-planet worlds.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlanetId {
    pub galaxy: i32,
    pub sector_x: i32,
    pub sector_y: i32,
    pub index: i32,
}

/// Identity of one chunk on one planet.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkId {
    pub planet: PlanetId,
    pub x: i32,
    pub y: i32,
}

impl ChunkId {
    pub fn coord(&self) -> ChunkCoord {
        ChunkCoord::new(self.x, self.y)
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}_{}",
            self.planet.galaxy,
            self.planet.sector_x,
            self.planet.sector_y,
            self.planet.index,
            self.x,
            self.y
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub seed: i64,
    /// Side length of one chunk in planet units.
    pub chunk_size: i64,
    /// Number of chunks along each side of the planet.
    pub planet_chunks: i64,
}

impl Planet {
    pub fn new(seed: i64, chunk_size: i64, planet_chunks: i64) -> Self {
        Self {
            id: PlanetId::default(),
            seed,
            chunk_size,
            planet_chunks,
        }
    }

    /// Side length of the planet surface in planet units.
    pub fn size(&self) -> i64 {
        self.chunk_size * self.planet_chunks
    }

    pub fn center(&self) -> (f64, f64) {
        let half = (self.size() as f64 / 2.0).round();
        (half, half)
    }

    // -----------------------------------------------------------------------
    // Coordinate mapping
    // -----------------------------------------------------------------------

    /// Reduce one axis into `[0, size)`.
    pub fn wrap_axis(&self, n: f64) -> f64 {
        let wrapped = n.rem_euclid(self.size() as f64);
        // rem_euclid can round up to exactly `size` for tiny negative inputs
        if wrapped >= self.size() as f64 {
            0.0
        } else {
            wrapped
        }
    }

    pub fn wrap_coordinates(&self, x: f64, y: f64) -> (f64, f64) {
        (self.wrap_axis(x), self.wrap_axis(y))
    }

    /// Chunk containing the planet position `(x, y)`.
    pub fn chunk_coordinates_at(&self, x: f64, y: f64) -> ChunkCoord {
        let axis = |n: f64| (self.wrap_axis(n) / self.chunk_size as f64).floor() as i32;
        ChunkCoord::new(axis(x), axis(y))
    }

    /// Planet position of a chunk's top-left corner.
    pub fn chunk_origin(&self, coord: ChunkCoord) -> (i64, i64) {
        (
            coord.x as i64 * self.chunk_size,
            coord.y as i64 * self.chunk_size,
        )
    }

    /// Bring chunk coordinates back into `[0, planet_chunks)`.
    pub fn wrap_chunk(&self, coord: ChunkCoord) -> ChunkCoord {
        let n = self.planet_chunks;
        ChunkCoord::new(
            (coord.x as i64).rem_euclid(n) as i32,
            (coord.y as i64).rem_euclid(n) as i32,
        )
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    pub fn chunk_id(&self, coord: ChunkCoord) -> ChunkId {
        ChunkId {
            planet: self.id,
            x: coord.x,
            y: coord.y,
        }
    }

    /// Seed for a chunk's generator. Same planet seed and coordinates always
    /// give the same chunk seed.
    pub fn chunk_seed(&self, coord: ChunkCoord) -> i64 {
        self.seed
            + pseudo_rand_int(coord.x as i64, CHUNK_SEED_MODULUS) as i64
            + pseudo_rand_int(coord.y as i64, CHUNK_SEED_MODULUS) as i64
    }
}
