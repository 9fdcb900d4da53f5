//! Fluent builder for constructing a [`MovementOrchestrator`].

use rw_core::RoomId;
use rw_policy::MovePolicy;
use rw_spatial::RoomGraph;
use rw_zone::ZoneSetup;

use crate::{AgentConfig, MovementOrchestrator, OrchestratorConfig, SimResult, WorldHost};

/// Fluent builder for [`MovementOrchestrator<H>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                          |
/// |-------------------------|----------------------------------|
/// | `.config(c)`            | `OrchestratorConfig::default()`  |
/// | `.graph(g)`             | empty `RoomGraph`                |
/// | `.zones(s)`             | no zones (every move allowed)    |
/// | `.default_policy(p)`    | random-adjacent                  |
/// | `.room_capacity(r, n)`  | unlimited                        |
/// | `.agent(a)`             | no agents                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut graph = RoomGraph::new();
/// load_adjacency_csv(Path::new("village.csv"), &mut graph)?;
/// let square = graph.room_id("square").unwrap();
///
/// let mut sim = OrchestratorBuilder::new(StaticHost::default())
///     .graph(graph)
///     .agent(AgentConfig::new(AgentId(1), "villager", square))
///     .build()?;
/// sim.start()?;
/// sim.run_ticks(60, &mut NoopObserver);
/// ```
pub struct OrchestratorBuilder<H: WorldHost> {
    config:         OrchestratorConfig,
    host:           H,
    graph:          Option<RoomGraph>,
    zones:          Option<ZoneSetup>,
    default_policy: Option<Box<dyn MovePolicy>>,
    capacities:     Vec<(RoomId, u32)>,
    agents:         Vec<AgentConfig>,
}

impl<H: WorldHost> OrchestratorBuilder<H> {
    pub fn new(host: H) -> Self {
        Self {
            config:         OrchestratorConfig::default(),
            host,
            graph:          None,
            zones:          None,
            default_policy: None,
            capacities:     Vec::new(),
            agents:         Vec::new(),
        }
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a prebuilt room graph (from the CSV loader, say) as the registry.
    pub fn graph(mut self, graph: RoomGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn zones(mut self, setup: ZoneSetup) -> Self {
        self.zones = Some(setup);
        self
    }

    pub fn default_policy<P: MovePolicy + 'static>(mut self, policy: P) -> Self {
        self.default_policy = Some(Box::new(policy));
        self
    }

    pub fn room_capacity(mut self, room: RoomId, capacity: u32) -> Self {
        self.capacities.push((room, capacity));
        self
    }

    pub fn agent(mut self, agent: AgentConfig) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = AgentConfig>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Validate everything and return a stopped orchestrator.
    ///
    /// Inputs are applied in dependency order: graph, zones, capacities,
    /// policy, then agents, so agent homes are checked against the final
    /// registry.
    pub fn build(self) -> SimResult<MovementOrchestrator<H>> {
        let mut sim = MovementOrchestrator::new(self.config, self.host)?;

        if let Some(graph) = self.graph {
            sim.world.graph = graph;
        }
        if let Some(setup) = self.zones {
            sim.configure_zones(setup)?;
        }
        for (room, capacity) in self.capacities {
            sim.set_room_capacity(room, capacity)?;
        }
        if let Some(policy) = self.default_policy {
            sim.world.default_policy = policy;
        }
        for agent in self.agents {
            sim.register_agent(agent)?;
        }
        Ok(sim)
    }
}
