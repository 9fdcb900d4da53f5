//! Bounded shortest-path cache.

use std::collections::{HashMap, VecDeque};

use rw_core::RoomId;
use rw_spatial::RoomPath;

/// `(from, to) → Some(path)` or `None` for a known-unreachable pair.
///
/// Entries are evicted oldest-first once `capacity` is reached.  The cache
/// remembers the graph generation it was filled against; [`sync`][Self::sync]
/// empties it when that generation moves on.
#[derive(Debug)]
pub struct PathCache {
    capacity:      usize,
    generation:    u64,
    entries:       HashMap<(RoomId, RoomId), Option<RoomPath>>,
    /// Insertion order for eviction.
    order:         VecDeque<(RoomId, RoomId)>,
    hits:          u64,
    misses:        u64,
    invalidations: u64,
}

impl PathCache {
    /// A capacity of `0` disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            generation:    0,
            entries:       HashMap::with_capacity(capacity.min(4096)),
            order:         VecDeque::new(),
            hits:          0,
            misses:        0,
            invalidations: 0,
        }
    }

    /// Drop every entry if `generation` differs from the one the cache was
    /// filled against.
    pub fn sync(&mut self, generation: u64) {
        if generation != self.generation {
            if !self.entries.is_empty() {
                self.invalidations += 1;
            }
            self.entries.clear();
            self.order.clear();
            self.generation = generation;
        }
    }

    /// Look up a pair, counting the hit or miss.
    ///
    /// `Some(None)` is a cached "unreachable".
    pub fn get(&mut self, from: RoomId, to: RoomId) -> Option<&Option<RoomPath>> {
        match self.entries.get(&(from, to)) {
            Some(entry) => {
                self.hits += 1;
                Some(entry)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, from: RoomId, to: RoomId, path: Option<RoomPath>) {
        if self.capacity == 0 {
            return;
        }
        let key = (from, to);
        if self.entries.insert(key, path).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    /// Hits over lookups; `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }

    /// Rough heap footprint of the stored paths and keys.
    pub fn estimated_bytes(&self) -> usize {
        let key = std::mem::size_of::<(RoomId, RoomId)>();
        let slot = key + std::mem::size_of::<Option<RoomPath>>();
        let rooms: usize = self.entries.values().flatten().map(|p| p.rooms.len()).sum();
        self.entries.len() * slot + self.order.len() * key + rooms * std::mem::size_of::<RoomId>()
    }
}
