//! The demo map: ten rooms across a village, a forest, and a castle.
//!
//! ```text
//!   village_tavern          forest_den
//!        │                      │
//!   village_square ─── forest_edge ─── forest_clearing
//!     │        │
//! village_well─village_market ─── castle_gate ─── castle_courtyard ─── castle_keep
//! ```

use std::io::Cursor;

use anyhow::{Context, Result};

use rw_core::{AgentId, RoomId, ZoneId};
use rw_spatial::{load_adjacency_reader, RoomGraph};
use rw_zone::{AgentZonePreference, RoomZoneMapping, ZoneInfo, ZoneSetup, ZoneTransitionRule};

pub const VILLAGE: ZoneId = ZoneId(1);
pub const FOREST:  ZoneId = ZoneId(2);
pub const CASTLE:  ZoneId = ZoneId(3);

const ROOMS_CSV: &str = "\
room,adjacent\n\
village_square,village_tavern;village_well;village_market;forest_edge\n\
village_tavern,village_square\n\
village_well,village_square;village_market\n\
village_market,village_square;village_well;castle_gate\n\
forest_edge,village_square;forest_clearing\n\
forest_clearing,forest_edge;forest_den\n\
forest_den,forest_clearing\n\
castle_gate,village_market;castle_courtyard\n\
castle_courtyard,castle_gate;castle_keep\n\
castle_keep,castle_courtyard\n\
";

pub fn build_graph() -> Result<RoomGraph> {
    let mut graph = RoomGraph::new();
    load_adjacency_reader(Cursor::new(ROOMS_CSV), &mut graph).context("parsing embedded room CSV")?;
    Ok(graph)
}

pub fn room(graph: &RoomGraph, name: &str) -> Result<RoomId> {
    graph.room_id(name).with_context(|| format!("room {name} is not in the map"))
}

/// Guards only in the castle, entered through the market.  The thief keeps
/// to the forest when it can.
pub fn zone_setup(graph: &RoomGraph, thief: AgentId) -> Result<ZoneSetup> {
    let mut mappings = Vec::with_capacity(graph.room_count());
    for room_id in graph.rooms() {
        let zone = match graph.zone_prefix(room_id) {
            Some("village") => VILLAGE,
            Some("forest") => FOREST,
            Some("castle") => CASTLE,
            _ => continue,
        };
        mappings.push(RoomZoneMapping::new(room_id, zone));
    }
    let market = room(graph, "village_market")?;
    if let Some(m) = mappings.iter_mut().find(|m| m.room == market) {
        *m = RoomZoneMapping::new(market, VILLAGE).boundary(CASTLE);
    }

    Ok(ZoneSetup {
        zones: vec![
            ZoneInfo::new(VILLAGE, "village"),
            ZoneInfo::new(FOREST, "forest"),
            ZoneInfo::new(CASTLE, "castle").allow("guard"),
        ],
        mappings,
        rules: vec![
            ZoneTransitionRule::new(VILLAGE, FOREST).for_type("villager").for_type("farmer").for_type("thief"),
            ZoneTransitionRule::new(VILLAGE, CASTLE).for_type("guard").via_boundary(),
        ],
        preferences: vec![AgentZonePreference {
            agent:           thief,
            preferred_zones: vec![FOREST],
            forbidden_zones: Vec::new(),
        }],
    })
}
