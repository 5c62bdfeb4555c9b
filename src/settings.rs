//! Simulator configuration.
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `NOMAD_*` environment variables. The binary applies CLI flags last.

use crate::error::{Result, SimError};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which vehicle `mount` picks when several are in reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountPolicy {
    /// The first vehicle in chunk order.
    #[default]
    FirstMatch,
    /// The closest vehicle.
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Instance name, used in logs.
    pub name: String,
    /// Planet seed.
    pub seed: i64,
    /// Side length of one chunk in planet units.
    pub chunk_size: i64,
    /// Chunks along each side of the planet.
    pub planet_chunks: i64,
    /// Logical tick length in milliseconds.
    pub tick_ms: u64,
    /// Chunk item cache capacity in chunks (0 = unbounded).
    pub chunk_cache_capacity: usize,
    pub max_inventory_stacks: usize,
    /// Upper bound on actions resolved in one tick.
    pub max_actions_per_tick: usize,
    /// Chebyshev radius of the chunk window sent with each snapshot.
    pub view_radius: i32,
    pub mount_policy: MountPolicy,
    /// Height-field samples per chunk side.
    pub terrain_resolution: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "nomad-world".into(),
            seed: 1000,
            chunk_size: 64,
            planet_chunks: 1000,
            tick_ms: 12,
            chunk_cache_capacity: 4096,
            max_inventory_stacks: 24,
            max_actions_per_tick: 4096,
            view_radius: 1,
            mount_policy: MountPolicy::FirstMatch,
            terrain_resolution: 16,
        }
    }
}

impl SimConfig {
    /// Load defaults, then `path` (if any), then `NOMAD_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&SimConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config: SimConfig = builder
            .add_source(Environment::with_prefix("NOMAD").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Chunks in one snapshot window.
    pub fn window_chunks(&self) -> usize {
        let side = (2 * self.view_radius.max(0) + 1) as usize;
        side * side
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(SimError::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.planet_chunks <= 0 {
            return Err(SimError::InvalidConfig(
                "planet_chunks must be positive".into(),
            ));
        }
        if self.tick_ms == 0 {
            return Err(SimError::InvalidConfig("tick_ms must be positive".into()));
        }
        if self.view_radius < 0 {
            return Err(SimError::InvalidConfig(
                "view_radius must not be negative".into(),
            ));
        }
        if self.max_actions_per_tick == 0 {
            return Err(SimError::InvalidConfig(
                "max_actions_per_tick must be positive".into(),
            ));
        }
        if self.chunk_cache_capacity != 0 && self.chunk_cache_capacity < self.window_chunks() {
            return Err(SimError::InvalidConfig(format!(
                "chunk_cache_capacity {} is smaller than the {}-chunk snapshot window",
                self.chunk_cache_capacity,
                self.window_chunks()
            )));
        }
        Ok(())
    }
}
