//! `WakeQueue`: agents keyed by the simulated time they are next due.
//!
//! Only due agents are touched each tick.  Entries are never removed in
//! place: when an agent is rescheduled or unregistered its old entry stays
//! behind and the scheduler skips it on drain by comparing against the
//! agent's current `next_move_ms`.

use std::collections::BTreeMap;

use rw_core::AgentId;

#[derive(Default, Debug)]
pub struct WakeQueue {
    inner: BTreeMap<u64, Vec<AgentId>>,
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due_ms: u64, agent: AgentId) {
        self.inner.entry(due_ms).or_default().push(agent);
        self.total += 1;
    }

    /// Remove and return every `(due_ms, agent)` with `due_ms <= now_ms`,
    /// earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(u64, AgentId)> {
        let later = match now_ms.checked_add(1) {
            Some(split) => self.inner.split_off(&split),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.inner, later);
        let out: Vec<(u64, AgentId)> = due
            .into_iter()
            .flat_map(|(t, agents)| agents.into_iter().map(move |a| (t, a)))
            .collect();
        self.total -= out.len();
        out
    }

    /// The earliest due time, or `None` if empty.
    pub fn next_due(&self) -> Option<u64> {
        self.inner.keys().next().copied()
    }

    /// Total entries, stale ones included.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }
}
