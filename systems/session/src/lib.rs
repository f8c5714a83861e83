#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver that runs the world and the stealth system in lockstep.
//!
//! A [`Session`] owns the authoritative world and every system that reacts to
//! it. Each call to [`Session::tick`] is one complete turn: the player's input
//! is applied, agents react to the resulting light, and the outcome of the
//! turn is resolved before control returns to the caller.

pub mod config;

use lantern_core::{
    AgentId, CellCoord, Command, Direction, Event, PlayerInput, SessionStatus, SpawnError, WallGrid,
};
use lantern_system_stealth::StealthMovement;
use lantern_system_visibility::VisibilityBeam;
use lantern_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info};

pub use config::{ConfigError, SimulationConfig};

/// Owns the world and the systems driven by it.
#[derive(Debug)]
pub struct Session {
    config: SimulationConfig,
    world: World,
    stealth: StealthMovement,
}

impl Session {
    /// Creates a session with an empty level.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::with_beam(VisibilityBeam::new(config.beam_length)),
            stealth: StealthMovement::new(config.activation_radius, config.pace),
            config,
        })
    }

    /// Settings the session was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Progress of the current level.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        query::status(&self.world)
    }

    /// Loads a level, discarding every agent and all light.
    pub fn configure(
        &mut self,
        walls: WallGrid,
        player: CellCoord,
        facing: Direction,
        exit: Option<CellCoord>,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::ConfigureLevel {
                walls,
                player,
                facing,
                exit,
            },
            &mut events,
        );
        events
    }

    /// Registers an agent at `cell`.
    pub fn spawn(&mut self, cell: CellCoord) -> Result<AgentId, SpawnError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SpawnAgent { cell }, &mut events);
        events
            .into_iter()
            .find_map(|event| match event {
                Event::AgentSpawned { agent, .. } => Some(Ok(agent)),
                Event::AgentSpawnRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(SpawnError::Blocked))
    }

    /// Freezes or releases an agent. Returns `false` for unknown agents.
    pub fn set_frozen(&mut self, agent: AgentId, frozen: bool) -> bool {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetAgentFrozen { agent, frozen },
            &mut events,
        );
        !events.is_empty()
    }

    /// Plays one full turn with the provided player input.
    ///
    /// Once the level has ended the world ignores further input and the
    /// returned report carries no events.
    pub fn tick(&mut self, input: PlayerInput) -> TickReport {
        let before = query::status(&self.world);
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { input }, &mut events);

        let mut commands = Vec::new();
        self.stealth.handle(
            &events,
            &query::agent_view(&self.world),
            query::player_cell(&self.world),
            query::walls(&self.world),
            query::lights(&self.world),
            &mut commands,
        );
        debug!(steps = commands.len(), "stealth pass finished");

        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        world::apply(&mut self.world, Command::ResolveTick, &mut events);

        let status = query::status(&self.world);
        let tick = query::tick_index(&self.world);
        if status != before {
            info!(tick, ?status, "level outcome changed");
        }

        TickReport {
            tick,
            events,
            status,
        }
    }

    /// Serializable snapshot of the current level.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            ticks: query::tick_index(&self.world),
            status: query::status(&self.world),
            player: query::player_cell(&self.world),
            facing: query::player_facing(&self.world),
            agents: query::agent_view(&self.world)
                .iter()
                .map(|snapshot| AgentPosition {
                    id: snapshot.id,
                    cell: snapshot.cell,
                    facing: snapshot.facing,
                })
                .collect(),
        }
    }
}

/// Everything that happened during a single [`Session::tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the tick after it was applied.
    pub tick: u64,
    /// Events broadcast by the world, in order.
    pub events: Vec<Event>,
    /// Progress of the level after the tick.
    pub status: SessionStatus,
}

/// Serializable snapshot of a level in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Number of ticks played.
    pub ticks: u64,
    /// Progress of the level.
    pub status: SessionStatus,
    /// Cell the player occupies.
    pub player: CellCoord,
    /// Facing of the player's beam.
    pub facing: Direction,
    /// Agents in registration order.
    pub agents: Vec<AgentPosition>,
}

/// Position of a single agent within a [`SessionSummary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AgentPosition {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Cell the agent occupies.
    pub cell: CellCoord,
    /// Direction the agent last hopped toward.
    pub facing: Direction,
}
