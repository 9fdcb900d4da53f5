//! The `ZoneConstraintProvider`: answers "may this agent go there?".

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rw_core::{AgentId, AgentType, RoomId, ZoneId};
use tracing::{debug, info};

use crate::{
    AgentZonePreference, RoomZoneMapping, ZoneError, ZoneInfo, ZoneResult, ZoneSetup,
    ZoneTransitionRule,
};

/// Most alternatives returned with a blocked verdict.
const MAX_ALTERNATIVES: usize = 3;

/// Result of [`ZoneConstraintProvider::can_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneVerdict {
    pub allowed:      bool,
    pub reason:       Option<String>,
    /// Up to three rooms the agent could go to instead.  Empty when allowed.
    pub alternatives: Vec<RoomId>,
}

impl ZoneVerdict {
    fn allowed() -> Self {
        Self { allowed: true, reason: None, alternatives: Vec::new() }
    }
}

/// Zone definitions, room mapping, transition rules, and per-agent
/// preferences.  An empty provider allows every move.
#[derive(Debug, Default)]
pub struct ZoneConstraintProvider {
    zones:       HashMap<ZoneId, ZoneInfo>,
    room_zone:   HashMap<RoomId, RoomZoneMapping>,
    zone_rooms:  BTreeMap<ZoneId, BTreeSet<RoomId>>,
    /// Rules keyed by origin zone.
    rules:       HashMap<ZoneId, Vec<ZoneTransitionRule>>,
    preferences: HashMap<AgentId, AgentZonePreference>,
    agent_types: HashMap<AgentId, AgentType>,
}

impl ZoneConstraintProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider from a bulk setup.
    ///
    /// # Errors
    ///
    /// `UnknownZone` if any mapping, boundary, rule, or preference names an
    /// undefined zone; `DuplicateZone` / `DuplicateMapping` on repeats.
    pub fn from_setup(setup: ZoneSetup) -> ZoneResult<Self> {
        let mut provider = Self::new();
        provider.configure(setup)?;
        Ok(provider)
    }

    /// Replace all zone data with `setup`.  Agent types recorded through
    /// [`set_agent_type`][Self::set_agent_type] are kept.  On error the
    /// provider is left unchanged.
    pub fn configure(&mut self, setup: ZoneSetup) -> ZoneResult<()> {
        let ZoneSetup { zones, mappings, rules, preferences } = setup;

        let mut zone_map = HashMap::with_capacity(zones.len());
        for zone in zones {
            let id = zone.id;
            if zone_map.insert(id, zone).is_some() {
                return Err(ZoneError::DuplicateZone(id));
            }
        }
        let known = |z: ZoneId| {
            if zone_map.contains_key(&z) { Ok(()) } else { Err(ZoneError::UnknownZone(z)) }
        };

        let mut room_zone = HashMap::with_capacity(mappings.len());
        let mut zone_rooms: BTreeMap<ZoneId, BTreeSet<RoomId>> = BTreeMap::new();
        for mapping in mappings {
            known(mapping.zone)?;
            mapping.boundary_to.iter().try_for_each(|&z| known(z))?;
            zone_rooms.entry(mapping.zone).or_default().insert(mapping.room);
            let room = mapping.room;
            if room_zone.insert(room, mapping).is_some() {
                return Err(ZoneError::DuplicateMapping(room));
            }
        }

        let mut rule_map: HashMap<ZoneId, Vec<ZoneTransitionRule>> = HashMap::new();
        for rule in rules {
            known(rule.from_zone)?;
            known(rule.to_zone)?;
            rule_map.entry(rule.from_zone).or_default().push(rule);
        }

        let mut pref_map = HashMap::with_capacity(preferences.len());
        for pref in preferences {
            pref.preferred_zones.iter().chain(&pref.forbidden_zones).try_for_each(|&z| known(z))?;
            pref_map.insert(pref.agent, pref);
        }

        info!(
            zones = zone_map.len(),
            rooms = room_zone.len(),
            rules = rule_map.values().map(Vec::len).sum::<usize>(),
            "zone setup loaded"
        );
        self.zones = zone_map;
        self.room_zone = room_zone;
        self.zone_rooms = zone_rooms;
        self.rules = rule_map;
        self.preferences = pref_map;
        Ok(())
    }

    // ── Agent records ─────────────────────────────────────────────────────

    /// Remember `agent`'s type for [`get_preferred_rooms`][Self::get_preferred_rooms].
    pub fn set_agent_type(&mut self, agent: AgentId, agent_type: AgentType) {
        self.agent_types.insert(agent, agent_type);
    }

    /// # Errors
    ///
    /// `UnknownZone` if the preference names an undefined zone.
    pub fn set_preference(&mut self, pref: AgentZonePreference) -> ZoneResult<()> {
        if let Some(&z) = pref
            .preferred_zones
            .iter()
            .chain(&pref.forbidden_zones)
            .find(|&&z| !self.zones.contains_key(&z))
        {
            return Err(ZoneError::UnknownZone(z));
        }
        self.preferences.insert(pref.agent, pref);
        Ok(())
    }

    /// Drop the agent's type and preference record.
    pub fn remove_agent(&mut self, agent: AgentId) {
        self.agent_types.remove(&agent);
        self.preferences.remove(&agent);
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn zone_of(&self, room: RoomId) -> Option<ZoneId> {
        self.room_zone.get(&room).map(|m| m.zone)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&ZoneInfo> {
        self.zones.get(&id)
    }

    /// Rooms mapped to `zone`, ascending.
    pub fn rooms_in_zone(&self, zone: ZoneId) -> Vec<RoomId> {
        self.zone_rooms.get(&zone).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    // ── Checks ────────────────────────────────────────────────────────────

    /// Whether `agent` of `agent_type` may be inside `zone` at all.
    /// Undefined zones admit everyone.
    pub fn can_enter_zone(&self, agent: AgentId, agent_type: &AgentType, zone: ZoneId) -> bool {
        self.entry_block(agent, Some(agent_type), zone).is_none()
    }

    /// Decide whether `agent` may step from `from` into `to`.
    pub fn can_move(&self, agent: AgentId, agent_type: &AgentType, from: RoomId, to: RoomId) -> ZoneVerdict {
        match self.check(agent, agent_type, from, to) {
            Ok(()) => ZoneVerdict::allowed(),
            Err(reason) => {
                debug!(%agent, %from, %to, %reason, "zone blocked move");
                ZoneVerdict {
                    allowed:      false,
                    reason:       Some(reason),
                    alternatives: self.alternatives(agent, agent_type, from, to),
                }
            }
        }
    }

    /// Order `candidates` for `agent`: rooms in its preferred zones first,
    /// then neutral rooms, each group in input order.  Rooms in zones the
    /// agent may not enter are dropped.
    pub fn get_preferred_rooms(&self, agent: AgentId, candidates: &[RoomId]) -> Vec<RoomId> {
        let agent_type = self.agent_types.get(&agent);
        let preferred_zones = self.preferences.get(&agent).map(|p| p.preferred_zones.as_slice()).unwrap_or(&[]);

        let (preferred, neutral): (Vec<RoomId>, Vec<RoomId>) = candidates
            .iter()
            .copied()
            .filter(|&room| match self.zone_of(room) {
                Some(zone) => self.entry_block(agent, agent_type, zone).is_none(),
                None => true,
            })
            .partition(|&room| self.zone_of(room).is_some_and(|z| preferred_zones.contains(&z)));

        preferred.into_iter().chain(neutral).collect()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Why `agent` may not enter `zone`, if it may not.  An agent with no
    /// known type fails any non-empty allow-list.
    fn entry_block(&self, agent: AgentId, agent_type: Option<&AgentType>, zone: ZoneId) -> Option<String> {
        if let Some(info) = self.zones.get(&zone) {
            match agent_type {
                Some(t) if info.restricted_types.contains(t) => {
                    return Some(format!("type {t} is restricted from zone {}", info.name));
                }
                Some(t) if !info.admits(t) => {
                    return Some(format!("type {t} is not allowed in zone {}", info.name));
                }
                None if !info.allowed_types.is_empty() => {
                    return Some(format!("untyped agent is not allowed in zone {}", info.name));
                }
                _ => {}
            }
        }
        let forbidden = self.preferences.get(&agent).is_some_and(|p| p.forbidden_zones.contains(&zone));
        forbidden.then(|| format!("agent {agent} forbids zone {zone}"))
    }

    fn check(&self, agent: AgentId, agent_type: &AgentType, from: RoomId, to: RoomId) -> Result<(), String> {
        let Some(to_zone) = self.zone_of(to) else {
            return Ok(());
        };
        if let Some(reason) = self.entry_block(agent, Some(agent_type), to_zone) {
            return Err(reason);
        }

        let Some(origin) = self.room_zone.get(&from) else {
            return Ok(());
        };
        if origin.zone == to_zone {
            return Ok(());
        }
        let rules = match self.rules.get(&origin.zone) {
            Some(rules) if !rules.is_empty() => rules,
            _ => return Ok(()),
        };

        let permitted = rules.iter().any(|rule| {
            rule.to_zone == to_zone
                && rule.permits(agent_type)
                && (!rule.requires_boundary || origin.boundary_to.contains(&to_zone))
        });
        if permitted {
            Ok(())
        } else {
            Err(format!("no transition rule from zone {} to zone {to_zone} for type {agent_type}", origin.zone))
        }
    }

    /// Origin-zone siblings first, then rooms of other zones, each ascending.
    fn alternatives(&self, agent: AgentId, agent_type: &AgentType, from: RoomId, to: RoomId) -> Vec<RoomId> {
        let origin_zone = self.zone_of(from);
        let siblings = origin_zone.map(|z| self.rooms_in_zone(z)).unwrap_or_default();
        let others = self
            .zone_rooms
            .iter()
            .filter(|&(&z, _)| Some(z) != origin_zone)
            .flat_map(|(_, rooms)| rooms.iter().copied())
            .collect::<BTreeSet<_>>();

        siblings
            .into_iter()
            .chain(others)
            .filter(|&room| room != from && room != to)
            .filter(|&room| self.check(agent, agent_type, from, room).is_ok())
            .take(MAX_ALTERNATIVES)
            .collect()
    }
}
