//! Chunk item cache.
//!
//! Holds the live item list of every visited chunk so that drilling damage,
//! mounted vehicles and dropped vehicles persist across ticks. Bounded by an
//! LRU policy; an evicted chunk regenerates from its seed on the next visit
//! and loses its mutations.
//!
//! Chunks inside an actor's snapshot window are pinned and never evicted.
//! When every cached chunk is pinned the cache grows instead.

use crate::chunk::ChunkItems;
use crate::generator::ChunkGenerator;
use crate::planet::{ChunkId, Planet};
use crate::types::ChunkCoord;
use log::{debug, warn};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;

pub struct ChunkItemCache {
    entries: LruCache<ChunkId, ChunkItems>,
    pinned: HashSet<ChunkId>,
}

impl ChunkItemCache {
    /// `capacity == 0` disables eviction.
    pub fn new(capacity: usize) -> Self {
        let entries = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries,
            pinned: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Replace the pinned set. Pinned chunks are skipped by eviction.
    pub fn pin_only(&mut self, ids: impl IntoIterator<Item = ChunkId>) {
        self.pinned.clear();
        self.pinned.extend(ids);
    }

    pub fn is_pinned(&self, id: &ChunkId) -> bool {
        self.pinned.contains(id)
    }

    pub fn contains(&self, id: &ChunkId) -> bool {
        self.entries.contains(id)
    }

    /// Read a cached chunk without generating or touching its LRU slot.
    pub fn peek(&self, id: &ChunkId) -> Option<&ChunkItems> {
        self.entries.peek(id)
    }

    /// Live items of the chunk at `coord`, generated on first access.
    pub fn get_or_create(
        &mut self,
        planet: &Planet,
        generator: &ChunkGenerator,
        coord: ChunkCoord,
    ) -> &mut ChunkItems {
        let id = planet.chunk_id(coord);
        if !self.entries.contains(&id) {
            let items = generator.generate(&id, planet.chunk_seed(coord), coord);
            self.store(id, items);
        }
        self.entries.get_or_insert_mut(id, || {
            warn!("Chunk {} missing after generation; using an empty list", id);
            ChunkItems::default()
        })
    }

    /// Replace a chunk's items outright.
    pub fn insert(&mut self, id: ChunkId, items: ChunkItems) {
        self.store(id, items);
    }

    /// Live items of an already cached chunk.
    pub fn get_mut(&mut self, id: &ChunkId) -> Option<&mut ChunkItems> {
        self.entries.get_mut(id)
    }

    fn store(&mut self, id: ChunkId, items: ChunkItems) {
        if !self.entries.contains(&id) {
            self.make_room();
        }
        self.entries.put(id, items);
    }

    /// Free one slot if the cache is full, evicting the least recently used
    /// unpinned chunk.
    fn make_room(&mut self) {
        let cap = self.entries.cap();
        if self.entries.len() < cap.get() {
            return;
        }

        let victim = self
            .entries
            .iter()
            .rev()
            .map(|(id, _)| *id)
            .find(|id| !self.pinned.contains(id));
        match victim {
            Some(id) => {
                self.entries.pop(&id);
                debug!("Evicted chunk {} from item cache", id);
            }
            None => {
                let grown = cap.saturating_add(1);
                debug!("All {} cached chunks pinned; growing to {}", cap, grown);
                self.entries.resize(grown);
            }
        }
    }
}
