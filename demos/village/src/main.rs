//! village: a small room_wander world.
//!
//! Five NPCs, one of each policy mode, wander a ten-room map while a
//! scripted player walks a loop.  Halfway through, a cutscene pauses
//! everyone for a few seconds of simulated time.
//!
//! ```text
//! cargo run -p village                 # built-in config
//! cargo run -p village -- config.json  # OrchestratorConfig as JSON
//! RUST_LOG=debug cargo run -p village  # every move and decision
//! ```

mod world;

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rw_core::{AgentId, Tick};
use rw_perf::MovementRecord;
use rw_policy::MovePolicyConfig;
use rw_schedule::{SchedulerConfig, TickReport, WorldSnapshot};
use rw_sim::{
    AgentConfig, MovementOrchestrator, OrchestratorBuilder, OrchestratorConfig, SimObserver, StaticHost,
};

use world::{build_graph, room, zone_setup};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 42;
const TOTAL_TICKS:     u64 = 120;
const PLAYER_STRIDE:   u64 = 6;   // player changes room every 6 ticks
const CUTSCENE_START:  u64 = 50;
const CUTSCENE_END:    u64 = 65;

const MARA:   AgentId = AgentId(1);
const BRANT:  AgentId = AgentId(2);
const OSWIN:  AgentId = AgentId(3);
const NELL:   AgentId = AgentId(4);
const HALDEN: AgentId = AgentId(5);

const PLAYER_LOOP: [&str; 6] =
    ["village_square", "village_tavern", "village_square", "forest_edge", "forest_clearing", "forest_edge"];

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MoveLog {
    moves:     BTreeMap<AgentId, usize>,
    teleports: usize,
    failed:    usize,
    paused:    usize,
}

impl SimObserver for MoveLog {
    fn on_tick_start(&mut self, tick: Tick) {
        debug!(%tick, "tick");
    }

    fn on_move(&mut self, record: &MovementRecord) {
        *self.moves.entry(record.agent).or_default() += 1;
        if record.teleport {
            self.teleports += 1;
        }
        debug!(agent = %record.agent, from = %record.from, to = ?record.to, reason = %record.reason, "move");
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.failed += report.failed;
        self.paused += report.skipped_paused;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 1. Configuration: JSON file from argv, else built-in defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<OrchestratorConfig>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => OrchestratorConfig {
            scheduler:  SchedulerConfig { base_tick_ms: 100, max_jitter_ms: 80, seed: SEED },
            transit_ms: 150,
            ..OrchestratorConfig::default()
        },
    };
    info!(config = %serde_json::to_string(&config)?, "configuration");

    // 2. Map and zones.
    let graph = build_graph()?;
    let zones = zone_setup(&graph, NELL)?;
    println!("Map: {} rooms in {} zones", graph.room_count(), zones.zones.len());

    // 3. Cast.  One agent per policy mode.
    let square = room(&graph, "village_square")?;
    let market = room(&graph, "village_market")?;
    let well = room(&graph, "village_well")?;
    let tavern = room(&graph, "village_tavern")?;
    let edge = room(&graph, "forest_edge")?;
    let gate = room(&graph, "castle_gate")?;
    let route = vec![gate, room(&graph, "castle_courtyard")?, room(&graph, "castle_keep")?];

    let cast = vec![
        AgentConfig::new(MARA, "villager", square),
        AgentConfig::new(BRANT, "guard", gate)
            .with_policy(MovePolicyConfig::patrol(route).with_teleport_fallback(true)),
        AgentConfig::new(OSWIN, "merchant", market).with_policy(MovePolicyConfig::player_seek(0.6)),
        AgentConfig::new(NELL, "thief", edge)
            .with_policy(MovePolicyConfig::player_avoid(2))
            .avoid([tavern]),
        AgentConfig::new(HALDEN, "farmer", well)
            .with_policy(MovePolicyConfig::home_bias(0.4))
            .with_roam_radius(2)
            .prefer([market]),
    ];
    let names: BTreeMap<AgentId, &str> =
        [(MARA, "Mara"), (BRANT, "Brant"), (OSWIN, "Oswin"), (NELL, "Nell"), (HALDEN, "Halden")].into();

    // 4. Build and start.
    let mut sim = OrchestratorBuilder::new(StaticHost::default())
        .config(config)
        .graph(graph)
        .zones(zones)
        .room_capacity(tavern, 3)
        .agents(cast)
        .build()?;
    sim.start()?;

    // 5. Run.
    let mut log = MoveLog::default();
    let t0 = Instant::now();
    for tick in 0..TOTAL_TICKS {
        script(&mut sim, tick)?;
        sim.run_ticks(1, &mut log);
    }
    let elapsed = t0.elapsed();
    sim.stop();

    // 6. Summary.
    println!(
        "Ran {} ticks ({} ms simulated) in {:.3} s",
        sim.current_tick().0,
        sim.now_ms(),
        elapsed.as_secs_f64()
    );
    println!("  teleports: {}  failed attempts: {}  paused slots: {}", log.teleports, log.failed, log.paused);
    println!();

    println!("{:<8} {:<10} {:<18} {:>6}", "Agent", "Type", "Room", "Moves");
    println!("{}", "-".repeat(45));
    for agent in sim.agents() {
        let here = sim.agent_room(agent.agent).map_or_else(|| "-".to_owned(), |r| sim.graph().label(r));
        println!(
            "{:<8} {:<10} {:<18} {:>6}",
            names.get(&agent.agent).copied().unwrap_or("?"),
            agent.agent_type.as_str(),
            here,
            log.moves.get(&agent.agent).copied().unwrap_or(0)
        );
    }
    println!();

    println!("movement:    {}", serde_json::to_string(&sim.movement_stats())?);
    println!("performance: {}", serde_json::to_string(&sim.performance_metrics())?);
    println!("degradation level: {}", sim.degradation_level());
    for hint in sim.optimization_suggestions() {
        println!("  hint: {hint}");
    }
    Ok(())
}

/// Player walk and cutscene, applied before tick `tick + 1`.
fn script(sim: &mut MovementOrchestrator, tick: u64) -> Result<()> {
    let mut snapshot = sim.gate().snapshot().clone();
    if tick % PLAYER_STRIDE == 0 {
        let name = PLAYER_LOOP[(tick / PLAYER_STRIDE) as usize % PLAYER_LOOP.len()];
        let player = room(sim.graph(), name)?;
        sim.host_mut().player_room = Some(player);
        snapshot.current_room = Some(player);
    }
    match tick {
        CUTSCENE_START => {
            info!("cutscene begins");
            snapshot.in_cutscene = true;
        }
        CUTSCENE_END => {
            info!("cutscene ends");
            snapshot.in_cutscene = false;
        }
        _ => {}
    }
    // Unchanged snapshots are ignored by the gate.
    sim.update_world_state(snapshot);
    Ok(())
}
