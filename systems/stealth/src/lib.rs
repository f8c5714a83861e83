#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Light-gated agent movement.
//!
//! Each tick every dark agent that is not frozen and is near enough to the
//! player plans a route toward the player's cell over the walls plus every
//! other agent. It takes the first hop of that route only if the hop is dark
//! in both the current and the previous light, unless the hop lands on the
//! player itself. Agents are visited newest first. Every search in a pass runs
//! over the same occupancy snapshot taken before the first agent acts; a hop
//! into a cell another agent entered earlier in the pass is refused.

use std::mem;

use lantern_core::{
    AgentId, AgentSnapshot, AgentView, CellCoord, Command, DiagonalLevel, Event, LitSet,
    SearchStrategy, WallGrid,
};
use lantern_system_pathfinding::Pathfinder;
use lantern_system_visibility::LightHistory;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Player distance, in cells, below which agents start hunting.
pub const DEFAULT_ACTIVATION_RADIUS: f32 = 8.0;

/// Mutable agent state consumed by [`StealthMovement::step_agents`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StealthAgent {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Cell the agent occupies; updated in place when it moves.
    pub cell: CellCoord,
    /// Whether the presentation layer holds the agent in place.
    pub frozen: bool,
}

impl StealthAgent {
    /// Creates an agent that is not frozen.
    #[must_use]
    pub const fn new(id: AgentId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            frozen: false,
        }
    }
}

impl From<&AgentSnapshot> for StealthAgent {
    fn from(snapshot: &AgentSnapshot) -> Self {
        Self {
            id: snapshot.id,
            cell: snapshot.cell,
            frozen: snapshot.frozen,
        }
    }
}

/// Behavioural phase an agent ended the pass in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    /// Lit or frozen; the agent does not plan at all.
    IdleVisible,
    /// Dark but too far from the player to care.
    IdleHiddenTooFar,
    /// Planning toward the player.
    Seeking,
    /// The next hop is the player's own cell.
    Attacking,
}

/// Reason an agent stayed in its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    /// The agent stands in the current light.
    Lit,
    /// The presentation layer froze the agent.
    Frozen,
    /// The player lies outside the activation radius.
    OutOfRange,
    /// No route to the player exists.
    NoPath,
    /// The first hop is lit now or was lit on the previous tick.
    NextHopLit,
    /// The first hop is a wall, or another agent entered it earlier in the pass.
    NextHopBlocked,
}

/// What happened to a single agent during a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The agent hopped between two cells.
    Moved {
        /// Cell the agent left.
        from: CellCoord,
        /// Cell the agent entered.
        to: CellCoord,
    },
    /// The agent stayed put.
    Held(HoldReason),
}

/// Decision recorded for a single agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentDecision {
    /// Agent the decision belongs to.
    pub agent: AgentId,
    /// Phase the agent ended the pass in.
    pub phase: AgentPhase,
    /// Movement outcome.
    pub outcome: AgentOutcome,
}

/// Ticks on which agents are allowed to act.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPace {
    /// Agents act on every tick.
    #[default]
    EveryTick,
    /// Agents act only on ticks where the player changed cells.
    PlayerStep,
}

/// Stealth movement system that gates agent hops on light and distance.
#[derive(Debug)]
pub struct StealthMovement {
    activation_radius: f32,
    pace: MovementPace,
    pathfinder: Pathfinder,
    order: Vec<usize>,
    occupancy: WallGrid,
    agents: Vec<StealthAgent>,
}

impl StealthMovement {
    /// Creates a system with the provided activation radius and pace.
    #[must_use]
    pub fn new(activation_radius: f32, pace: MovementPace) -> Self {
        Self {
            activation_radius,
            pace,
            pathfinder: Pathfinder::new(),
            order: Vec::new(),
            occupancy: WallGrid::default(),
            agents: Vec::new(),
        }
    }

    /// Player distance below which agents start hunting.
    #[must_use]
    pub fn activation_radius(&self) -> f32 {
        self.activation_radius
    }

    /// Ticks on which agents act.
    #[must_use]
    pub fn pace(&self) -> MovementPace {
        self.pace
    }

    /// Reacts to the world closing the player's half of a tick.
    ///
    /// Emits one [`Command::StepAgent`] per agent that decided to move, in the
    /// order the agents were processed.
    pub fn handle(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        player: CellCoord,
        walls: &WallGrid,
        lights: &LightHistory,
        out: &mut Vec<Command>,
    ) {
        let Some(player_moved) = events.iter().find_map(|event| match event {
            Event::TurnResolved { player_moved, .. } => Some(*player_moved),
            _ => None,
        }) else {
            return;
        };

        if self.pace == MovementPace::PlayerStep && !player_moved {
            return;
        }

        let mut scratch = mem::take(&mut self.agents);
        scratch.clear();
        scratch.extend(agents.iter().map(StealthAgent::from));

        let decisions = self.step_agents(
            &mut scratch,
            player,
            walls,
            lights.last(),
            lights.current(),
        );
        for decision in decisions {
            if let AgentOutcome::Moved { to, .. } = decision.outcome {
                out.push(Command::StepAgent {
                    agent: decision.agent,
                    to,
                });
            }
        }

        self.agents = scratch;
    }

    /// Runs one movement pass, mutating agent cells in place.
    ///
    /// Agents are processed in reverse slice order and the decisions are
    /// returned in that processing order.
    pub fn step_agents(
        &mut self,
        agents: &mut [StealthAgent],
        player: CellCoord,
        walls: &WallGrid,
        last_light: &LitSet,
        current_light: &LitSet,
    ) -> Vec<AgentDecision> {
        self.order.clear();
        self.order.extend((0..agents.len()).rev());

        self.occupancy.clone_from(walls);
        for agent in agents.iter() {
            self.occupancy.set_wall(agent.cell, true);
        }

        let mut decisions = Vec::with_capacity(agents.len());
        for position in 0..self.order.len() {
            let index = self.order[position];
            let Some(agent) = agents.get(index).copied() else {
                continue;
            };

            let (phase, outcome) =
                self.decide(agent, agents, player, walls, last_light, current_light);
            if let AgentOutcome::Moved { to, .. } = outcome {
                agents[index].cell = to;
            }
            debug!(agent = agent.id.get(), ?phase, ?outcome, "agent decision");
            decisions.push(AgentDecision {
                agent: agent.id,
                phase,
                outcome,
            });
        }

        decisions
    }

    fn decide(
        &mut self,
        agent: StealthAgent,
        agents: &[StealthAgent],
        player: CellCoord,
        walls: &WallGrid,
        last_light: &LitSet,
        current_light: &LitSet,
    ) -> (AgentPhase, AgentOutcome) {
        if current_light.contains(agent.cell) {
            return (AgentPhase::IdleVisible, AgentOutcome::Held(HoldReason::Lit));
        }
        if agent.frozen {
            return (
                AgentPhase::IdleVisible,
                AgentOutcome::Held(HoldReason::Frozen),
            );
        }
        if agent.cell.euclidean_distance(player) >= f64::from(self.activation_radius) {
            return (
                AgentPhase::IdleHiddenTooFar,
                AgentOutcome::Held(HoldReason::OutOfRange),
            );
        }

        // The search never re-enters its start, so the agent's own mark is harmless.
        let next_hop = self
            .pathfinder
            .find_path(
                &self.occupancy,
                agent.cell,
                player,
                SearchStrategy::Euclidean,
                DiagonalLevel::FillAlways,
            )
            .and_then(|path| path.first());

        let Some(next_hop) = next_hop else {
            return (AgentPhase::Seeking, AgentOutcome::Held(HoldReason::NoPath));
        };

        let attacking = next_hop == player;
        let phase = if attacking {
            AgentPhase::Attacking
        } else {
            AgentPhase::Seeking
        };

        if !attacking && (current_light.contains(next_hop) || last_light.contains(next_hop)) {
            return (phase, AgentOutcome::Held(HoldReason::NextHopLit));
        }
        if !walls.is_open(next_hop) {
            return (phase, AgentOutcome::Held(HoldReason::NextHopBlocked));
        }
        if agents
            .iter()
            .any(|other| other.id != agent.id && other.cell == next_hop)
        {
            return (phase, AgentOutcome::Held(HoldReason::NextHopBlocked));
        }

        (
            phase,
            AgentOutcome::Moved {
                from: agent.cell,
                to: next_hop,
            },
        )
    }
}

impl Default for StealthMovement {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_RADIUS, MovementPace::default())
    }
}
