//! Per-agent registration records.

use rw_core::{AgentId, AgentType, RoomId};
use rw_policy::{MovePolicyConfig, PolicyResult};

/// Everything the orchestrator knows about one registered agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentConfig {
    pub agent:           AgentId,
    pub agent_type:      AgentType,
    pub home_room:       RoomId,
    /// Maximum policy distance from `home_room`.  `None` = unbounded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roam_radius:     Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preferred_rooms: Vec<RoomId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub avoided_rooms:   Vec<RoomId>,
    /// Overrides the orchestrator's default policy for this agent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy:          Option<MovePolicyConfig>,
    /// Inactive agents keep their presence but are never moved.
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub is_active:       bool,
}

#[cfg(feature = "serde")]
fn default_active() -> bool {
    true
}

impl AgentConfig {
    pub fn new(agent: AgentId, agent_type: impl Into<AgentType>, home_room: RoomId) -> Self {
        Self {
            agent,
            agent_type:      agent_type.into(),
            home_room,
            roam_radius:     None,
            preferred_rooms: Vec::new(),
            avoided_rooms:   Vec::new(),
            policy:          None,
            is_active:       true,
        }
    }

    pub fn with_roam_radius(mut self, radius: u32) -> Self {
        self.roam_radius = Some(radius);
        self
    }

    pub fn with_policy(mut self, policy: MovePolicyConfig) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn prefer(mut self, rooms: impl IntoIterator<Item = RoomId>) -> Self {
        self.preferred_rooms.extend(rooms);
        self
    }

    pub fn avoid(mut self, rooms: impl IntoIterator<Item = RoomId>) -> Self {
        self.avoided_rooms.extend(rooms);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub(crate) fn validate(&self) -> PolicyResult<()> {
        match &self.policy {
            Some(policy) => policy.validate(),
            None => Ok(()),
        }
    }
}

// ── AgentPatch ────────────────────────────────────────────────────────────────

/// Partial update for [`MovementOrchestrator::update_agent`][crate::MovementOrchestrator::update_agent].
///
/// `None` leaves a field alone.  The doubly optional fields clear the value
/// with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentPatch {
    pub agent_type:      Option<AgentType>,
    pub home_room:       Option<RoomId>,
    pub roam_radius:     Option<Option<u32>>,
    pub preferred_rooms: Option<Vec<RoomId>>,
    pub avoided_rooms:   Option<Vec<RoomId>>,
    pub policy:          Option<Option<MovePolicyConfig>>,
    pub is_active:       Option<bool>,
}

impl AgentPatch {
    /// Apply to `config`, returning the patched copy.
    pub(crate) fn applied_to(self, config: &AgentConfig) -> AgentConfig {
        AgentConfig {
            agent:           config.agent,
            agent_type:      self.agent_type.unwrap_or_else(|| config.agent_type.clone()),
            home_room:       self.home_room.unwrap_or(config.home_room),
            roam_radius:     self.roam_radius.unwrap_or(config.roam_radius),
            preferred_rooms: self.preferred_rooms.unwrap_or_else(|| config.preferred_rooms.clone()),
            avoided_rooms:   self.avoided_rooms.unwrap_or_else(|| config.avoided_rooms.clone()),
            policy:          self.policy.unwrap_or_else(|| config.policy.clone()),
            is_active:       self.is_active.unwrap_or(config.is_active),
        }
    }
}
