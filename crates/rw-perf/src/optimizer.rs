//! The `PerformanceOptimizer`: cached routing plus cheap self-metrics.

use std::collections::VecDeque;

use rw_core::RoomId;
use rw_spatial::{BfsRouter, RoomGraph, RoomPath, Router, SpatialError};
use tracing::trace;

use crate::{MovementRecord, ObjectPool, PathCache, PerfResult};

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// Maximum cached `(from, to)` pairs.  `0` disables the cache.
    pub cache_capacity:      usize,
    /// Maximum idle movement records kept for reuse.
    pub pool_max_idle:       usize,
    /// Number of recent move latencies in the moving average.
    pub latency_window:      usize,
    /// Suggest action when the average move latency exceeds this.
    pub latency_warn_ms:     f64,
    /// Suggest action when the hit rate drops below this (after warm-up).
    pub min_cache_hit_rate:  f64,
    /// Suggest action when the memory estimate exceeds this.
    pub memory_warn_bytes:   usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            cache_capacity:     1024,
            pool_max_idle:      64,
            latency_window:     128,
            latency_warn_ms:    5.0,
            min_cache_hit_rate: 0.5,
            memory_warn_bytes:  8 * 1024 * 1024,
        }
    }
}

/// Lookups needed before a low hit rate is worth mentioning.
const HIT_RATE_WARMUP: u64 = 100;

// ── Metrics ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceMetrics {
    pub memory_estimate_bytes: usize,
    pub avg_move_latency_ms:   f64,
    pub cache_hit_rate:        f64,
    pub cache_entries:         usize,
    pub pool_idle:             usize,
    pub moves_recorded:        u64,
}

// ── Optimizer ─────────────────────────────────────────────────────────────────

/// Shortest-path cache in front of a [`Router`], a [`MovementRecord`] pool,
/// and a moving average of move latency.
pub struct PerformanceOptimizer<R: Router = BfsRouter> {
    config:         OptimizerConfig,
    router:         R,
    cache:          PathCache,
    pool:           ObjectPool<MovementRecord>,
    latencies:      VecDeque<f64>,
    latency_sum:    f64,
    moves_recorded: u64,
}

impl PerformanceOptimizer<BfsRouter> {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_router(BfsRouter, config)
    }
}

impl Default for PerformanceOptimizer<BfsRouter> {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl<R: Router> PerformanceOptimizer<R> {
    pub fn with_router(router: R, config: OptimizerConfig) -> Self {
        Self {
            cache:          PathCache::new(config.cache_capacity),
            pool:           ObjectPool::new(config.pool_max_idle),
            latencies:      VecDeque::with_capacity(config.latency_window),
            latency_sum:    0.0,
            moves_recorded: 0,
            router,
            config,
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    // ── Paths ─────────────────────────────────────────────────────────────

    /// Shortest path from `from` to `to`, or `Ok(None)` if unreachable.
    ///
    /// Repeated queries are served from the cache, negatives included.
    ///
    /// # Errors
    ///
    /// Router errors other than "no route" (e.g. an unknown room) are
    /// returned and not cached.
    pub fn shortest_path(&mut self, graph: &RoomGraph, from: RoomId, to: RoomId) -> PerfResult<Option<RoomPath>> {
        self.cache.sync(graph.generation());
        if let Some(cached) = self.cache.get(from, to) {
            return Ok(cached.clone());
        }

        let path = match self.router.route(graph, from, to) {
            Ok(path) => Some(path),
            Err(SpatialError::NoRoute { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        trace!(%from, %to, hops = path.as_ref().map(RoomPath::hops), "path computed");
        self.cache.insert(from, to, path.clone());
        Ok(path)
    }

    /// The first room on the shortest path, if there is one to take.
    pub fn first_step(&mut self, graph: &RoomGraph, from: RoomId, to: RoomId) -> PerfResult<Option<RoomId>> {
        Ok(self.shortest_path(graph, from, to)?.and_then(|p| p.first_step()))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    // ── Records ───────────────────────────────────────────────────────────

    pub fn acquire_record(&mut self) -> MovementRecord {
        self.pool.acquire()
    }

    pub fn release_record(&mut self, record: MovementRecord) {
        self.pool.release(record);
    }

    pub fn pool(&self) -> &ObjectPool<MovementRecord> {
        &self.pool
    }

    // ── Latency ───────────────────────────────────────────────────────────

    pub fn record_move_latency(&mut self, latency_ms: f64) {
        self.moves_recorded += 1;
        if self.config.latency_window == 0 {
            return;
        }
        if self.latencies.len() == self.config.latency_window {
            if let Some(old) = self.latencies.pop_front() {
                self.latency_sum -= old;
            }
        }
        self.latencies.push_back(latency_ms);
        self.latency_sum += latency_ms;
    }

    pub fn avg_move_latency_ms(&self) -> f64 {
        if self.latencies.is_empty() {
            0.0
        } else {
            self.latency_sum / self.latencies.len() as f64
        }
    }

    // ── Reporting ─────────────────────────────────────────────────────────

    pub fn metrics(&self) -> PerformanceMetrics {
        let memory = self.cache.estimated_bytes()
            + self.pool.idle() * std::mem::size_of::<MovementRecord>()
            + self.latencies.capacity() * std::mem::size_of::<f64>();
        PerformanceMetrics {
            memory_estimate_bytes: memory,
            avg_move_latency_ms:   self.avg_move_latency_ms(),
            cache_hit_rate:        self.cache.hit_rate(),
            cache_entries:         self.cache.len(),
            pool_idle:             self.pool.idle(),
            moves_recorded:        self.moves_recorded,
        }
    }

    /// Human-readable hints derived from threshold checks.  No side effects.
    pub fn suggestions(&self) -> Vec<String> {
        let m = self.metrics();
        let mut out = Vec::new();

        if m.avg_move_latency_ms > self.config.latency_warn_ms {
            out.push(format!(
                "Average move latency {:.2} ms exceeds {:.2} ms; consider fewer agents per tick or a longer base tick",
                m.avg_move_latency_ms, self.config.latency_warn_ms
            ));
        }
        let lookups = self.cache.hits() + self.cache.misses();
        if lookups >= HIT_RATE_WARMUP && m.cache_hit_rate < self.config.min_cache_hit_rate {
            out.push(format!(
                "Path cache hit rate {:.0}% is low; consider raising cache_capacity above {}",
                m.cache_hit_rate * 100.0,
                self.config.cache_capacity
            ));
        }
        if self.config.cache_capacity > 0 && m.cache_entries >= self.config.cache_capacity {
            out.push("Path cache is full; older paths are being evicted".to_owned());
        }
        if m.memory_estimate_bytes > self.config.memory_warn_bytes {
            out.push(format!(
                "Estimated memory {} KiB exceeds {} KiB; consider a smaller cache",
                m.memory_estimate_bytes / 1024,
                self.config.memory_warn_bytes / 1024
            ));
        }
        if self.pool.created() > 0 && self.pool.reused() == 0 && self.moves_recorded > self.config.pool_max_idle as u64 {
            out.push("Movement records are never reused; check that records are released".to_owned());
        }
        out
    }
}
