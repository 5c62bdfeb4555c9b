//! Planet height field: Perlin fBm sampled into per-chunk height grids.
//!
//! Height is cosmetic. It classifies ground for the renderer and colours
//! drill sparks, but no gameplay rule reads it.

use crate::types::ChunkCoord;
use noise::{NoiseFn, Perlin};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundKind {
    Lowland,
    Plains,
    Highland,
}

/// Heights at or below this are lowland.
pub const LOWLAND_MAX: f64 = -3.0;
/// Heights above this are highland.
pub const HIGHLAND_MIN: f64 = 3.0;

/// Anything that can provide a terrain height.
pub trait TerrainSource: Send + Sync {
    fn height_at(&self, x: f64, y: f64) -> f64;

    fn ground_at(&self, x: f64, y: f64) -> GroundKind {
        let h = self.height_at(x, y);
        if h <= LOWLAND_MAX {
            GroundKind::Lowland
        } else if h > HIGHLAND_MIN {
            GroundKind::Highland
        } else {
            GroundKind::Plains
        }
    }

    /// Colour of the sparks thrown when drilling at `(x, y)`.
    fn spark_color(&self, x: f64, y: f64) -> &'static str {
        match self.ground_at(x, y) {
            GroundKind::Lowland => "#73c0c9",
            GroundKind::Plains => "#dd7261",
            GroundKind::Highland => "#f1d56c",
        }
    }
}

// ---------------------------------------------------------------------------
// Height chunk
// ---------------------------------------------------------------------------

pub struct HeightChunk {
    pub heights: Vec<f64>,
    pub resolution: usize,
    pub world_origin_x: f64,
    pub world_origin_y: f64,
    pub cell_size: f64,
}

// ---------------------------------------------------------------------------
// Heightmap terrain
// ---------------------------------------------------------------------------

pub struct HeightmapTerrain {
    pub seed: i64,
    /// World-space width/height of a single terrain chunk.
    pub chunk_size: f64,
    /// Samples per chunk side.
    pub resolution: usize,
    noise: Perlin,
    cache: RwLock<HashMap<(i32, i32), Arc<HeightChunk>>>,
}

impl HeightmapTerrain {
    const FREQUENCY: f64 = 0.004;
    const OCTAVES: usize = 4;
    const AMPLITUDE: f64 = 10.0;

    pub fn new(seed: i64, chunk_size: f64, resolution: usize) -> Self {
        Self {
            seed,
            chunk_size,
            resolution: resolution.max(2),
            noise: Perlin::new(seed as u32),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn chunk_coord(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.chunk_size).floor() as i32,
            (y / self.chunk_size).floor() as i32,
        )
    }

    pub fn cached_chunks(&self) -> usize {
        self.cache.read().len()
    }

    // -----------------------------------------------------------------------
    // Cache helpers
    // -----------------------------------------------------------------------

    pub fn get_or_generate_chunk(&self, cx: i32, cy: i32) -> Arc<HeightChunk> {
        if let Some(chunk) = self.cache.read().get(&(cx, cy)) {
            return chunk.clone();
        }
        let mut cache = self.cache.write();
        match cache.entry((cx, cy)) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(v) => {
                let chunk = Arc::new(self.generate_chunk(cx, cy));
                v.insert(chunk.clone());
                chunk
            }
        }
    }

    /// Evict every height chunk further than `max_chunks` (Chebyshev) from
    /// all of `origins`.
    pub fn evict_distant_chunks(&self, origins: &[ChunkCoord], max_chunks: i32) {
        let mut cache = self.cache.write();
        cache.retain(|(cx, cy), _| {
            origins
                .iter()
                .any(|o| (cx - o.x).abs() <= max_chunks && (cy - o.y).abs() <= max_chunks)
        });
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    fn generate_chunk(&self, cx: i32, cy: i32) -> HeightChunk {
        let resolution = self.resolution;
        let cell_size = self.chunk_size / resolution as f64;
        let world_origin_x = cx as f64 * self.chunk_size;
        let world_origin_y = cy as f64 * self.chunk_size;

        let mut heights = Vec::with_capacity(resolution * resolution);
        for row in 0..resolution {
            for col in 0..resolution {
                let wx = world_origin_x + col as f64 * cell_size;
                let wy = world_origin_y + row as f64 * cell_size;
                heights.push(self.sample_noise(wx, wy));
            }
        }

        HeightChunk {
            heights,
            resolution,
            world_origin_x,
            world_origin_y,
            cell_size,
        }
    }

    /// Fractal Brownian motion over Perlin noise, roughly in [-10, 10].
    fn sample_noise(&self, x: f64, y: f64) -> f64 {
        let mut frequency = Self::FREQUENCY;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut norm = 0.0;
        for _ in 0..Self::OCTAVES {
            total += self.noise.get([x * frequency, y * frequency]) * amplitude;
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        total / norm * Self::AMPLITUDE
    }
}

// ---------------------------------------------------------------------------
// TerrainSource impl
// ---------------------------------------------------------------------------

impl TerrainSource for HeightmapTerrain {
    fn height_at(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.chunk_coord(x, y);
        let chunk = self.get_or_generate_chunk(cx, cy);

        let local_x = x - chunk.world_origin_x;
        let local_y = y - chunk.world_origin_y;

        let gx = (local_x / chunk.cell_size).clamp(0.0, (chunk.resolution - 1) as f64);
        let gy = (local_y / chunk.cell_size).clamp(0.0, (chunk.resolution - 1) as f64);

        let ix = gx.floor() as usize;
        let iy = gy.floor() as usize;

        chunk.heights[iy * chunk.resolution + ix]
    }
}
