//! Zone configuration records.
//!
//! All of these are loaded once through [`ZoneSetup`] and read-only
//! afterwards.

use rw_core::{AgentId, AgentType, RoomId, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneInfo {
    pub id:               ZoneId,
    pub name:             String,
    /// Empty = every type not restricted may enter.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allowed_types:    Vec<AgentType>,
    /// Wins over `allowed_types`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub restricted_types: Vec<AgentType>,
}

impl ZoneInfo {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), allowed_types: Vec::new(), restricted_types: Vec::new() }
    }

    pub fn allow(mut self, agent_type: impl Into<AgentType>) -> Self {
        self.allowed_types.push(agent_type.into());
        self
    }

    pub fn restrict(mut self, agent_type: impl Into<AgentType>) -> Self {
        self.restricted_types.push(agent_type.into());
        self
    }

    /// Type-level admission, ignoring per-agent preferences.
    pub fn admits(&self, agent_type: &AgentType) -> bool {
        !self.restricted_types.contains(agent_type)
            && (self.allowed_types.is_empty() || self.allowed_types.contains(agent_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomZoneMapping {
    pub room:        RoomId,
    pub zone:        ZoneId,
    /// Non-empty for boundary rooms: the zones this room connects to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub boundary_to: Vec<ZoneId>,
}

impl RoomZoneMapping {
    pub fn new(room: RoomId, zone: ZoneId) -> Self {
        Self { room, zone, boundary_to: Vec::new() }
    }

    pub fn boundary(mut self, to: ZoneId) -> Self {
        self.boundary_to.push(to);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneTransitionRule {
    pub from_zone:         ZoneId,
    pub to_zone:           ZoneId,
    /// Types that may cross.  An empty list admits nobody.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allowed_types:     Vec<AgentType>,
    /// The origin room must be a boundary room listing `to_zone`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_boundary: bool,
}

impl ZoneTransitionRule {
    pub fn new(from_zone: ZoneId, to_zone: ZoneId) -> Self {
        Self { from_zone, to_zone, allowed_types: Vec::new(), requires_boundary: false }
    }

    pub fn for_type(mut self, agent_type: impl Into<AgentType>) -> Self {
        self.allowed_types.push(agent_type.into());
        self
    }

    pub fn via_boundary(mut self) -> Self {
        self.requires_boundary = true;
        self
    }

    pub fn permits(&self, agent_type: &AgentType) -> bool {
        self.allowed_types.contains(agent_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentZonePreference {
    pub agent:           AgentId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preferred_zones: Vec<ZoneId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forbidden_zones: Vec<ZoneId>,
}

/// Bulk zone configuration supplied once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoneSetup {
    pub zones:       Vec<ZoneInfo>,
    pub mappings:    Vec<RoomZoneMapping>,
    pub rules:       Vec<ZoneTransitionRule>,
    pub preferences: Vec<AgentZonePreference>,
}
