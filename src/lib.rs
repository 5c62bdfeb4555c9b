//! Nomad World Simulator
//!
//! A deterministic, tick-based simulator for a procedurally generated
//! toroidal planet. Nomads walk, jump, drill crystals out of the ground and
//! fly parked vehicles; the world is reproducible from a seed plus the
//! ordered action log.
//!
//! ## Architecture
//!
//! ```text
//! runner (runner.rs)            ← async fixed-interval loop, broadcast
//!   └── WorldService (service.rs) ← join, enqueue, tick, snapshots
//!         ├── resolver.rs         ← action state machine
//!         ├── physics.rs          ← integrator
//!         ├── ChunkItemCache (cache.rs)
//!         │     └── ChunkGenerator (generator.rs) ← Randomizer (random.rs)
//!         ├── Planet (planet.rs)  ← coordinate mapper, chunk ids/seeds
//!         └── HeightmapTerrain (terrain.rs) ← cosmetic height field
//! ```

// Simulation core is always available.
pub mod action;
pub mod actor;
pub mod cache;
pub mod chunk;
pub mod error;
pub mod generator;
pub mod physics;
pub mod planet;
pub mod random;
pub mod replay;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod snapshot;
pub mod terrain;
pub mod types;

// The realtime loop requires the `server` feature.
#[cfg(feature = "server")]
pub mod runner;

// Convenience re-exports
pub use action::{Action, ActionKind, ActionQueue, ActionTriple};
pub use actor::{Inventory, JoinDetails, Locomotion, Nomad, Tool};
pub use cache::ChunkItemCache;
pub use chunk::{ChunkItem, ChunkItems, Element, ItemKind};
pub use error::{Result, SimError};
pub use generator::ChunkGenerator;
pub use planet::{ChunkId, Planet, PlanetId};
pub use random::{pseudo_rand_int, Randomizer};
pub use service::WorldService;
pub use settings::{MountPolicy, SimConfig};
pub use snapshot::{ChunkView, NomadWorldData, TickEvents, WorldEvent};
pub use terrain::{GroundKind, HeightmapTerrain, TerrainSource};
pub use types::{ChunkCoord, SimStats, Vec3};
#[cfg(feature = "server")]
pub use runner::SimHandle;
