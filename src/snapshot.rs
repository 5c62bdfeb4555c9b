//! Per-tick world snapshots: everything that leaves the simulator.
//!
//! ## Design rules
//!
//! 1. Every struct is `Serialize + Deserialize` with snake_case JSON.
//! 2. Snapshots are deep copies. Nothing in here aliases live simulation
//!    state, so renderers cannot mutate the world through them.
//! 3. Terrain is never sent as height arrays, only `(x, y, seed, ground)`.

use crate::actor::Nomad;
use crate::chunk::ChunkItem;
use crate::resolver::DrillSpark;
use crate::terrain::GroundKind;
use crate::types::ChunkCoord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Common envelope
// ---------------------------------------------------------------------------

/// Every outbound event is wrapped in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldEvent<T> {
    /// Nomad the payload was built for.
    pub nomad_id: String,
    pub tick: u64,
    pub payload: T,
}

impl<T> WorldEvent<T> {
    pub fn new(nomad_id: impl Into<String>, tick: u64, payload: T) -> Self {
        Self {
            nomad_id: nomad_id.into(),
            tick,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkView {
    /// Chunk identity string (`galaxy_sectorX_sectorY_index_x_y`).
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub seed: i64,
    /// Ground classification at the chunk centre.
    pub ground: GroundKind,
    pub items: Vec<ChunkItem>,
}

// ---------------------------------------------------------------------------
// Nomad world data
// ---------------------------------------------------------------------------

/// What one nomad's renderer receives each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NomadWorldData {
    pub planet_seed: i64,
    pub tick: u64,
    pub chunk_on: ChunkCoord,
    /// Radius of the chunk window around `chunk_on`.
    pub extra_chunks: i32,
    /// Window chunks, row by row.
    pub chunks: Vec<ChunkView>,
    pub nomads: BTreeMap<String, Nomad>,
    /// The requesting nomad, x and y rounded.
    pub nomad: Nomad,
}

// ---------------------------------------------------------------------------
// Tick result
// ---------------------------------------------------------------------------

/// Events produced by a single `WorldService::tick` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickEvents {
    /// The tick counter that produced this set of events.
    pub tick: u64,
    /// One snapshot per nomad, in join order.
    pub snapshots: Vec<WorldEvent<NomadWorldData>>,
    /// Drill effects resolved this tick.
    pub sparks: Vec<DrillSpark>,
    /// Actions resolved this tick (ignored ones included).
    pub actions_resolved: usize,
}
