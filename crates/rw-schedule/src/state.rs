//! Per-agent scheduling state.

use rw_core::AgentId;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentWanderState {
    pub agent:        AgentId,
    pub next_move_ms: u64,
    pub last_move_ms: Option<u64>,
    /// Fixed at registration from `(seed, agent)`.
    pub jitter_ms:    u64,
    pub is_paused:    bool,
    /// Reason of the first active scope covering this agent.
    pub pause_reason: Option<String>,
}

impl AgentWanderState {
    pub fn new(agent: AgentId, next_move_ms: u64, jitter_ms: u64) -> Self {
        Self {
            agent,
            next_move_ms,
            last_move_ms: None,
            jitter_ms,
            is_paused:    false,
            pause_reason: None,
        }
    }
}
