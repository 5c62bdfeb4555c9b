//! WorldService – nomads, the action queue, the chunk cache and the tick.

use crate::action::{Action, ActionQueue, ActionTriple};
use crate::actor::{JoinDetails, Nomad};
use crate::cache::ChunkItemCache;
use crate::error::Result;
use crate::generator::ChunkGenerator;
use crate::physics;
use crate::planet::Planet;
use crate::resolver::{self, ActionContext, DrillSpark};
use crate::settings::SimConfig;
use crate::snapshot::{ChunkView, NomadWorldData, TickEvents, WorldEvent};
use crate::terrain::{HeightmapTerrain, TerrainSource};
use crate::types::{ChunkCoord, SimStats};
use log::{debug, warn};
use std::collections::BTreeMap;

/// The tick counter wraps back to 0 after this value.
pub const MAX_TICK: u64 = 999_999;

/// Ticks between `then` and `now`, allowing for one counter wrap.
pub fn ticks_since(now: u64, then: u64) -> u64 {
    let period = MAX_TICK + 1;
    (now % period + period - then % period) % period
}

pub struct WorldService {
    config: SimConfig,
    planet: Planet,
    generator: ChunkGenerator,
    cache: ChunkItemCache,
    terrain: HeightmapTerrain,
    nomads: BTreeMap<String, Nomad>,
    /// Join order; snapshots and physics follow it.
    nomad_ids: Vec<String>,
    queue: ActionQueue,
    tick: u64,
    total_ticks: u64,
    vehicle_seq: u64,
}

impl WorldService {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let planet = Planet::new(config.seed, config.chunk_size, config.planet_chunks);
        let generator = ChunkGenerator::for_planet(&planet);
        let cache = ChunkItemCache::new(config.chunk_cache_capacity);
        let terrain = HeightmapTerrain::new(
            config.seed,
            config.chunk_size as f64,
            config.terrain_resolution,
        );

        Ok(Self {
            config,
            planet,
            generator,
            cache,
            terrain,
            nomads: BTreeMap::new(),
            nomad_ids: Vec::new(),
            queue: ActionQueue::new(),
            tick: 0,
            total_ticks: 0,
            vehicle_seq: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    pub fn terrain(&self) -> &HeightmapTerrain {
        &self.terrain
    }

    pub fn cache(&self) -> &ChunkItemCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ChunkItemCache {
        &mut self.cache
    }

    pub fn nomad(&self, id: &str) -> Option<&Nomad> {
        self.nomads.get(id)
    }

    pub fn nomads(&self) -> &BTreeMap<String, Nomad> {
        &self.nomads
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            cached_chunks: self.cache.len(),
            actors: self.nomads.len(),
            pending_actions: self.queue.len(),
            total_ticks: self.total_ticks,
            tick: self.tick,
        }
    }

    // -----------------------------------------------------------------------
    // Participant management
    // -----------------------------------------------------------------------

    /// Add a nomad at the planet centre and park a vehicle in its chunk.
    /// Returns `false` (and changes nothing) if the id already joined.
    pub fn join(&mut self, id: impl Into<String>, details: JoinDetails) -> bool {
        let id = id.into();
        if self.nomads.contains_key(&id) {
            debug!("Nomad {} already joined", id);
            return false;
        }

        let (x, y) = self.planet.center();
        let coord = self.planet.chunk_coordinates_at(x, y);
        let chunk_id = self.planet.chunk_id(coord);
        self.vehicle_seq += 1;
        let vehicle = self
            .generator
            .spawn_vehicle(&chunk_id, coord, self.vehicle_seq);
        self.cache
            .get_or_create(&self.planet, &self.generator, coord)
            .push(vehicle);

        debug!("Nomad {} joined at ({}, {}) in chunk {}", id, x, y, chunk_id);
        self.nomad_ids.push(id.clone());
        self.nomads.insert(id.clone(), Nomad::new(id, details, x, y));
        self.pin_windows();
        true
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn enqueue(&mut self, action: ActionTriple) {
        self.queue.push(action);
    }

    pub fn enqueue_action(
        &mut self,
        name: impl Into<String>,
        actor_id: impl Into<String>,
        details: serde_json::Value,
    ) {
        self.enqueue(ActionTriple::new(name, actor_id).with_details(details));
    }

    /// Resolve the actions queued at tick start, oldest first, up to the
    /// per-tick cap. Returns how many were taken off the queue.
    fn resolve_actions(&mut self, sparks: &mut Vec<DrillSpark>) -> usize {
        let limit = self.queue.len().min(self.config.max_actions_per_tick);
        let batch = self.queue.drain_batch(limit);

        let mut ctx = ActionContext {
            planet: &self.planet,
            generator: &self.generator,
            cache: &mut self.cache,
            terrain: &self.terrain,
            tick: self.tick,
            mount_policy: self.config.mount_policy,
            max_inventory_stacks: self.config.max_inventory_stacks,
            vehicle_seq: &mut self.vehicle_seq,
            sparks,
        };

        for triple in &batch {
            let action = match Action::parse(triple.name(), triple.details()) {
                Ok(Some(action)) => action,
                Ok(None) => {
                    debug!("Ignoring unknown action '{}'", triple.name());
                    continue;
                }
                Err(e) => {
                    warn!("Dropping action from {}: {}", triple.actor_id(), e);
                    continue;
                }
            };
            let Some(nomad) = self.nomads.get_mut(triple.actor_id()) else {
                debug!(
                    "Ignoring '{}' for unknown nomad {}",
                    triple.name(),
                    triple.actor_id()
                );
                continue;
            };
            resolver::resolve(&mut ctx, nomad, &action);
        }

        batch.len()
    }

    // -----------------------------------------------------------------------
    // Main tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick of `time_ms` milliseconds.
    pub fn tick(&mut self, time_ms: u64) -> TickEvents {
        self.tick = if self.tick >= MAX_TICK { 0 } else { self.tick + 1 };
        self.total_ticks += 1;

        let mut sparks = Vec::new();
        let actions_resolved = self.resolve_actions(&mut sparks);

        for id in &self.nomad_ids {
            if let Some(nomad) = self.nomads.get_mut(id) {
                physics::integrate(&self.planet, nomad, time_ms as f64);
            }
        }
        self.cool_tools();
        self.pin_windows();

        let tick = self.tick;
        let ids = self.nomad_ids.clone();
        let snapshots = ids
            .iter()
            .filter_map(|id| {
                self.snapshot_for(id)
                    .map(|data| WorldEvent::new(id.clone(), tick, data))
            })
            .collect();

        self.evict_terrain();

        TickEvents {
            tick,
            snapshots,
            sparks,
            actions_resolved,
        }
    }

    fn cool_tools(&mut self) {
        let now = self.tick;
        for nomad in self.nomads.values_mut() {
            for tool in nomad.tools.values_mut() {
                tool.cool_down(ticks_since(now, tool.tick));
            }
        }
    }

    /// Keep height chunks around nomads, drop the rest.
    fn evict_terrain(&self) {
        let origins: Vec<ChunkCoord> = self
            .nomads
            .values()
            .map(|n| {
                let (cx, cy) = self.terrain.chunk_coord(n.x, n.y);
                ChunkCoord::new(cx, cy)
            })
            .collect();
        self.terrain
            .evict_distant_chunks(&origins, self.config.view_radius + 1);
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Chunk a nomad's snapshot window is centred on.
    fn window_center(&self, nomad: &Nomad) -> ChunkCoord {
        let (x, y) = self
            .planet
            .wrap_coordinates(nomad.x.round(), nomad.y.round());
        self.planet.chunk_coordinates_at(x, y)
    }

    /// Wrapped chunk coordinates of the window around `center`, row by row.
    pub fn window_coords(&self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let r = self.config.view_radius;
        let mut coords = Vec::with_capacity(self.config.window_chunks());
        for dy in -r..=r {
            for dx in -r..=r {
                coords.push(self.planet.wrap_chunk(center.offset(dx, dy)));
            }
        }
        coords
    }

    /// Pin every chunk inside some nomad's window so the item cache keeps it.
    fn pin_windows(&mut self) {
        let pinned: Vec<_> = self
            .nomads
            .values()
            .flat_map(|n| self.window_coords(self.window_center(n)))
            .map(|coord| self.planet.chunk_id(coord))
            .collect();
        self.cache.pin_only(pinned);
    }

    /// The chunk window around a nomad, generating chunks as needed.
    pub fn chunk_window(&mut self, center: ChunkCoord) -> Vec<ChunkView> {
        let half = self.planet.chunk_size as f64 / 2.0;
        let mut chunks = Vec::with_capacity(self.config.window_chunks());

        for coord in self.window_coords(center) {
            let id = self.planet.chunk_id(coord);
            let seed = self.planet.chunk_seed(coord);
            let (ox, oy) = self.planet.chunk_origin(coord);
            let ground = self.terrain.ground_at(ox as f64 + half, oy as f64 + half);
            let items = self
                .cache
                .get_or_create(&self.planet, &self.generator, coord)
                .iter()
                .filter(|item| item.is_alive())
                .cloned()
                .collect();

            chunks.push(ChunkView {
                id: id.to_string(),
                x: coord.x,
                y: coord.y,
                seed,
                ground,
                items,
            });
        }

        chunks
    }

    /// Deep-copied world view for one nomad.
    pub fn snapshot_for(&mut self, id: &str) -> Option<NomadWorldData> {
        let nomad = self.nomads.get(id)?.rounded(&self.planet);
        let chunk_on = self.window_center(&nomad);
        let chunks = self.chunk_window(chunk_on);

        Some(NomadWorldData {
            planet_seed: self.planet.seed,
            tick: self.tick,
            chunk_on,
            extra_chunks: self.config.view_radius,
            chunks,
            nomads: self.nomads.clone(),
            nomad,
        })
    }
}
