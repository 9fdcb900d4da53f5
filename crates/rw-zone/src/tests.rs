//! Unit tests for rw-zone.

use rw_core::{AgentId, AgentType, RoomId, ZoneId};

use crate::{
    AgentZonePreference, RoomZoneMapping, ZoneConstraintProvider, ZoneError, ZoneInfo, ZoneSetup,
    ZoneTransitionRule,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const TOWN: ZoneId = ZoneId(1);
const FOREST: ZoneId = ZoneId(2);
const CASTLE: ZoneId = ZoneId(3);
const DOCKS: ZoneId = ZoneId(4);

const AGENT: AgentId = AgentId(5);

fn r(n: u32) -> RoomId {
    RoomId(n)
}

fn ty(s: &str) -> AgentType {
    AgentType::from(s)
}

/// ```text
/// town   0 1 2* 3      (* boundary to forest)
/// forest 10 11         merchants restricted
/// castle 20            guards only
/// docks  30
///
/// rules from town: town→forest for villagers via boundary, town→castle for guards
/// ```
fn setup() -> ZoneSetup {
    ZoneSetup {
        zones: vec![
            ZoneInfo::new(TOWN, "town"),
            ZoneInfo::new(FOREST, "forest").restrict("merchant"),
            ZoneInfo::new(CASTLE, "castle").allow("guard"),
            ZoneInfo::new(DOCKS, "docks"),
        ],
        mappings: vec![
            RoomZoneMapping::new(r(0), TOWN),
            RoomZoneMapping::new(r(1), TOWN),
            RoomZoneMapping::new(r(2), TOWN).boundary(FOREST),
            RoomZoneMapping::new(r(3), TOWN),
            RoomZoneMapping::new(r(10), FOREST),
            RoomZoneMapping::new(r(11), FOREST),
            RoomZoneMapping::new(r(20), CASTLE),
            RoomZoneMapping::new(r(30), DOCKS),
        ],
        rules: vec![
            ZoneTransitionRule::new(TOWN, FOREST).for_type("villager").via_boundary(),
            ZoneTransitionRule::new(TOWN, CASTLE).for_type("guard"),
        ],
        preferences: vec![],
    }
}

fn provider() -> ZoneConstraintProvider {
    ZoneConstraintProvider::from_setup(setup()).unwrap()
}

// ── can_move ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod can_move {
    use super::*;

    #[test]
    fn same_zone_allowed() {
        let v = provider().can_move(AGENT, &ty("villager"), r(0), r(1));
        assert!(v.allowed);
        assert!(v.reason.is_none());
        assert!(v.alternatives.is_empty());
    }

    #[test]
    fn unmapped_rooms_unconstrained() {
        let p = provider();
        assert!(p.can_move(AGENT, &ty("merchant"), r(0), r(99)).allowed);
        assert!(p.can_move(AGENT, &ty("villager"), r(99), r(1)).allowed);
    }

    #[test]
    fn empty_provider_allows_everything() {
        let p = ZoneConstraintProvider::new();
        assert!(p.can_move(AGENT, &ty("anyone"), r(0), r(1)).allowed);
    }

    #[test]
    fn restriction_blocks_with_alternatives() {
        let v = provider().can_move(AGENT, &ty("merchant"), r(2), r(10));
        assert!(!v.allowed);
        assert!(v.reason.unwrap().contains("restricted"));
        // Town siblings only: forest is restricted and the castle is guards-only.
        assert_eq!(v.alternatives, vec![r(0), r(1), r(3)]);
    }

    #[test]
    fn allow_list_blocks_other_types() {
        let p = provider();
        let v = p.can_move(AGENT, &ty("villager"), r(0), r(20));
        assert!(!v.allowed);
        assert!(v.reason.unwrap().contains("not allowed"));
        assert!(p.can_move(AGENT, &ty("guard"), r(0), r(20)).allowed);
    }

    #[test]
    fn boundary_rule_needs_boundary_room() {
        let p = provider();
        assert!(!p.can_move(AGENT, &ty("villager"), r(0), r(10)).allowed);
        assert!(p.can_move(AGENT, &ty("villager"), r(2), r(10)).allowed);
    }

    #[test]
    fn missing_rule_blocks_when_origin_has_rules() {
        let v = provider().can_move(AGENT, &ty("villager"), r(0), r(30));
        assert!(!v.allowed);
        assert!(v.reason.unwrap().contains("no transition rule"));
        assert_eq!(v.alternatives, vec![r(1), r(2), r(3)]);
    }

    #[test]
    fn rule_admits_only_listed_types() {
        let p = provider();
        assert!(p.can_move(AGENT, &ty("villager"), r(2), r(10)).allowed);
        let v = p.can_move(AGENT, &ty("farmer"), r(2), r(10));
        assert!(!v.allowed);
        assert!(v.reason.unwrap().contains("no transition rule"));
    }

    #[test]
    fn rule_without_types_blocks_everyone() {
        let mut s = setup();
        s.rules.push(ZoneTransitionRule::new(TOWN, DOCKS));
        let p = ZoneConstraintProvider::from_setup(s).unwrap();
        for kind in ["villager", "guard", "merchant"] {
            assert!(!p.can_move(AGENT, &ty(kind), r(0), r(30)).allowed, "{kind}");
        }
    }

    #[test]
    fn origin_without_rules_is_open() {
        assert!(provider().can_move(AGENT, &ty("villager"), r(10), r(30)).allowed);
    }

    #[test]
    fn preference_forbids_zone() {
        let mut p = provider();
        p.set_preference(AgentZonePreference {
            agent:           AGENT,
            preferred_zones: vec![],
            forbidden_zones: vec![FOREST],
        })
        .unwrap();
        assert!(!p.can_move(AGENT, &ty("villager"), r(2), r(10)).allowed);
        assert!(!p.can_enter_zone(AGENT, &ty("villager"), FOREST));
        // Other agents are unaffected.
        assert!(p.can_move(AgentId(6), &ty("villager"), r(2), r(10)).allowed);
    }

    #[test]
    fn alternatives_capped_at_three() {
        let v = provider().can_move(AGENT, &ty("guard"), r(0), r(30));
        assert!(v.alternatives.len() <= 3);
    }
}

// ── Preferred rooms ───────────────────────────────────────────────────────────

#[cfg(test)]
mod preferred_rooms {
    use super::*;

    #[test]
    fn preferred_first_then_neutral_dropping_forbidden() {
        let mut p = provider();
        p.set_agent_type(AGENT, ty("villager"));
        p.set_preference(AgentZonePreference {
            agent:           AGENT,
            preferred_zones: vec![FOREST],
            forbidden_zones: vec![],
        })
        .unwrap();
        let ranked = p.get_preferred_rooms(AGENT, &[r(0), r(10), r(20), r(99), r(11)]);
        assert_eq!(ranked, vec![r(10), r(11), r(0), r(99)]);
    }

    #[test]
    fn untyped_agent_fails_allow_lists() {
        let p = provider();
        assert_eq!(p.get_preferred_rooms(AGENT, &[r(20), r(1)]), vec![r(1)]);
    }

    #[test]
    fn remove_agent_forgets_records() {
        let mut p = provider();
        p.set_agent_type(AGENT, ty("guard"));
        assert_eq!(p.get_preferred_rooms(AGENT, &[r(20)]), vec![r(20)]);
        p.remove_agent(AGENT);
        assert!(p.get_preferred_rooms(AGENT, &[r(20)]).is_empty());
    }
}

// ── Setup validation ──────────────────────────────────────────────────────────

#[cfg(test)]
mod setup_validation {
    use super::*;

    #[test]
    fn lookups() {
        let p = provider();
        assert_eq!(p.zone_of(r(2)), Some(TOWN));
        assert_eq!(p.zone_of(r(99)), None);
        assert_eq!(p.rooms_in_zone(FOREST), vec![r(10), r(11)]);
        assert_eq!(p.zone(CASTLE).unwrap().name, "castle");
        assert_eq!(p.zone_count(), 4);
    }

    #[test]
    fn unknown_zone_in_mapping() {
        let mut s = setup();
        s.mappings.push(RoomZoneMapping::new(r(40), ZoneId(9)));
        assert_eq!(ZoneConstraintProvider::from_setup(s).unwrap_err(), ZoneError::UnknownZone(ZoneId(9)));
    }

    #[test]
    fn unknown_zone_in_rule_and_preference() {
        let mut s = setup();
        s.rules.push(ZoneTransitionRule::new(TOWN, ZoneId(8)));
        assert!(matches!(ZoneConstraintProvider::from_setup(s), Err(ZoneError::UnknownZone(_))));

        let mut p = provider();
        let bad = AgentZonePreference { agent: AGENT, preferred_zones: vec![ZoneId(7)], forbidden_zones: vec![] };
        assert_eq!(p.set_preference(bad), Err(ZoneError::UnknownZone(ZoneId(7))));
    }

    #[test]
    fn duplicates_rejected() {
        let mut s = setup();
        s.zones.push(ZoneInfo::new(TOWN, "again"));
        assert_eq!(ZoneConstraintProvider::from_setup(s).unwrap_err(), ZoneError::DuplicateZone(TOWN));

        let mut s = setup();
        s.mappings.push(RoomZoneMapping::new(r(0), FOREST));
        assert_eq!(ZoneConstraintProvider::from_setup(s).unwrap_err(), ZoneError::DuplicateMapping(r(0)));
    }

    #[test]
    fn failed_configure_keeps_previous_setup() {
        let mut p = provider();
        let mut s = setup();
        s.mappings.push(RoomZoneMapping::new(r(40), ZoneId(9)));
        assert!(p.configure(s).is_err());
        assert_eq!(p.zone_of(r(2)), Some(TOWN));
    }
}
