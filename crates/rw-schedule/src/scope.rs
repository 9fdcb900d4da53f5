//! Pause scopes.
//!
//! Several scopes can be active at once.  An agent is paused while at least
//! one active scope covers it; resuming a scope lifts only that scope.

use std::collections::BTreeSet;

use rw_core::AgentId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PauseTarget {
    Global,
    Agents(BTreeSet<AgentId>),
}

/// A scope is identified by its whole value: pausing the same target with
/// a different reason creates a second, independent scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseScope {
    pub target: PauseTarget,
    pub reason: String,
}

impl PauseScope {
    pub fn global(reason: impl Into<String>) -> Self {
        Self { target: PauseTarget::Global, reason: reason.into() }
    }

    pub fn agents(agents: impl IntoIterator<Item = AgentId>, reason: impl Into<String>) -> Self {
        Self { target: PauseTarget::Agents(agents.into_iter().collect()), reason: reason.into() }
    }

    pub fn covers(&self, agent: AgentId) -> bool {
        match &self.target {
            PauseTarget::Global => true,
            PauseTarget::Agents(set) => set.contains(&agent),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.target, PauseTarget::Global)
    }
}
