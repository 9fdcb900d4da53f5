//! Reusable allocations for the tick loop.

use rw_core::{AgentId, RoomId};

/// A value that can be wiped and handed out again.
pub trait Poolable: Default {
    /// Return to the just-constructed state, keeping allocations.
    fn reset(&mut self);
}

/// A free-list of `T` with a bounded number of idle values.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    idle:     Vec<T>,
    max_idle: usize,
    created:  u64,
    reused:   u64,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new(max_idle: usize) -> Self {
        Self { idle: Vec::with_capacity(max_idle), max_idle, created: 0, reused: 0 }
    }

    pub fn acquire(&mut self) -> T {
        match self.idle.pop() {
            Some(value) => {
                self.reused += 1;
                value
            }
            None => {
                self.created += 1;
                T::default()
            }
        }
    }

    /// Reset `value` and keep it for reuse, or drop it when the pool is full.
    pub fn release(&mut self, mut value: T) {
        if self.idle.len() < self.max_idle {
            value.reset();
            self.idle.push(value);
        }
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn reused(&self) -> u64 {
        self.reused
    }
}

// ── MovementRecord ────────────────────────────────────────────────────────────

/// Scratch record describing one move attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementRecord {
    pub agent:      AgentId,
    pub from:       RoomId,
    pub to:         Option<RoomId>,
    pub at_ms:      u64,
    pub reason:     String,
    pub teleport:   bool,
    pub succeeded:  bool,
    pub latency_ms: f64,
}

impl Poolable for MovementRecord {
    fn reset(&mut self) {
        self.agent = AgentId::INVALID;
        self.from = RoomId::INVALID;
        self.to = None;
        self.at_ms = 0;
        self.reason.clear();
        self.teleport = false;
        self.succeeded = false;
        self.latency_ms = 0.0;
    }
}
