#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lantern.

use lantern_core::{
    AgentId, AgentSnapshot, CellCoord, Command, Direction, Event, PlayerInput,
    PlayerStepRejection, SessionStatus, SpawnError, StepRejection, WallGrid,
};
use lantern_system_visibility::{LightHistory, VisibilityBeam};
use tracing::debug;

/// Represents the authoritative Lantern world state.
#[derive(Debug)]
pub struct World {
    walls: WallGrid,
    player: Player,
    agents: Vec<Agent>,
    next_agent_id: u32,
    lights: LightHistory,
    beam: VisibilityBeam,
    exit: Option<CellCoord>,
    status: SessionStatus,
    tick_index: u64,
}

impl World {
    /// Creates an empty world whose player carries the default beam.
    #[must_use]
    pub fn new() -> Self {
        Self::with_beam(VisibilityBeam::default())
    }

    /// Creates an empty world whose player carries the provided beam.
    #[must_use]
    pub fn with_beam(beam: VisibilityBeam) -> Self {
        Self {
            walls: WallGrid::default(),
            player: Player {
                cell: CellCoord::new(0, 0),
                facing: Direction::North,
            },
            agents: Vec::new(),
            next_agent_id: 0,
            lights: LightHistory::new(),
            beam,
            exit: None,
            status: SessionStatus::Sneaking,
            tick_index: 0,
        }
    }

    fn agent_index(&self, agent: AgentId) -> Option<usize> {
        self.agents.iter().position(|candidate| candidate.id == agent)
    }

    fn agent_at(&self, cell: CellCoord) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.cell == cell)
    }

    fn relight(&mut self, out_events: &mut Vec<Event>) {
        let lit = self
            .lights
            .relight(&self.beam, &self.walls, self.player.cell, self.player.facing);
        out_events.push(Event::LightRecomputed { lit });
    }

    fn spawn(&mut self, cell: CellCoord) -> Result<AgentId, SpawnError> {
        if !self.walls.is_open(cell) {
            return Err(SpawnError::Blocked);
        }
        if cell == self.player.cell {
            return Err(SpawnError::PlayerCell);
        }
        if self.agent_at(cell).is_some() {
            return Err(SpawnError::Occupied);
        }

        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.saturating_add(1);
        self.agents.push(Agent {
            id,
            cell,
            facing: Direction::North,
            frozen: false,
        });
        Ok(id)
    }

    fn tick(&mut self, input: PlayerInput, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TickStarted {
            tick: self.tick_index,
        });

        self.lights.begin_tick();

        let turned = match input.turn {
            Some(facing) if facing != self.player.facing => {
                self.player.facing = facing;
                out_events.push(Event::PlayerTurned { facing });
                true
            }
            _ => false,
        };
        self.relight(out_events);

        let mut player_moved = false;
        if let Some(direction) = input.step {
            match self.player_step(direction, turned) {
                Ok(to) => {
                    let from = self.player.cell;
                    self.player.cell = to;
                    player_moved = true;
                    out_events.push(Event::PlayerMoved { from, to });
                    self.relight(out_events);
                }
                Err(reason) => {
                    out_events.push(Event::PlayerStepRejected { direction, reason });
                }
            }
        }

        out_events.push(Event::TurnResolved {
            tick: self.tick_index,
            player_moved,
        });
    }

    fn player_step(
        &self,
        direction: Direction,
        turned: bool,
    ) -> Result<CellCoord, PlayerStepRejection> {
        if turned {
            return Err(PlayerStepRejection::TurnedThisTick);
        }
        self.player
            .cell
            .step(direction)
            .filter(|cell| self.walls.is_open(*cell))
            .ok_or(PlayerStepRejection::Blocked)
    }

    fn step_agent(&mut self, agent: AgentId, to: CellCoord) -> Result<CellCoord, StepRejection> {
        if self.status != SessionStatus::Sneaking {
            return Err(StepRejection::LevelOver);
        }
        let index = self
            .agent_index(agent)
            .ok_or(StepRejection::UnknownAgent)?;
        let from = self.agents[index].cell;
        if !from.is_adjacent_to(to) {
            return Err(StepRejection::NotAdjacent);
        }
        if !self.walls.is_open(to) {
            return Err(StepRejection::Blocked);
        }
        if self.agent_at(to).is_some() {
            return Err(StepRejection::Occupied);
        }

        let moving = &mut self.agents[index];
        moving.cell = to;
        if let Some(facing) = Direction::toward(from, to) {
            moving.facing = facing;
        }
        Ok(from)
    }

    fn resolve(&mut self, out_events: &mut Vec<Event>) {
        if self.status != SessionStatus::Sneaking {
            return;
        }

        if let Some(agent) = self.agent_at(self.player.cell).map(|agent| agent.id) {
            self.status = SessionStatus::Caught { agent };
            out_events.push(Event::PlayerCaught { agent });
        } else if self.exit == Some(self.player.cell) {
            self.status = SessionStatus::Escaped;
            out_events.push(Event::ExitReached);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel {
            walls,
            player,
            facing,
            exit,
        } => {
            let (columns, rows) = walls.dimensions();
            world.walls = walls;
            world.player = Player {
                cell: player,
                facing,
            };
            world.agents.clear();
            world.next_agent_id = 0;
            world.lights.reset();
            world.exit = exit;
            world.status = SessionStatus::Sneaking;
            world.tick_index = 0;
            debug!(columns, rows, ?player, ?exit, "level configured");
            out_events.push(Event::LevelConfigured { columns, rows });
            world.relight(out_events);
        }
        Command::SpawnAgent { cell } => match world.spawn(cell) {
            Ok(agent) => out_events.push(Event::AgentSpawned { agent, cell }),
            Err(reason) => {
                debug!(?cell, %reason, "agent spawn rejected");
                out_events.push(Event::AgentSpawnRejected { cell, reason });
            }
        },
        Command::SetAgentFrozen { agent, frozen } => {
            if let Some(index) = world.agent_index(agent) {
                world.agents[index].frozen = frozen;
                out_events.push(Event::AgentFrozenChanged { agent, frozen });
            }
        }
        Command::Tick { input } => {
            if world.status != SessionStatus::Sneaking {
                debug!(status = ?world.status, "tick ignored after the level ended");
                return;
            }
            world.tick(input, out_events);
        }
        Command::StepAgent { agent, to } => match world.step_agent(agent, to) {
            Ok(from) => out_events.push(Event::AgentAdvanced { agent, from, to }),
            Err(reason) => {
                debug!(agent = agent.get(), ?to, %reason, "agent step rejected");
                out_events.push(Event::AgentStepRejected { agent, to, reason });
            }
        },
        Command::ResolveTick => world.resolve(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lantern_core::{
        AgentId, AgentSnapshot, AgentView, CellCoord, Direction, SessionStatus, WallGrid,
    };
    use lantern_system_visibility::{LightHistory, VisibilityBeam};

    use super::World;

    /// Provides read-only access to the static wall grid.
    #[must_use]
    pub fn walls(world: &World) -> &WallGrid {
        &world.walls
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player.cell
    }

    /// Facing of the player's beam.
    #[must_use]
    pub fn player_facing(world: &World) -> Direction {
        world.player.facing
    }

    /// Beam carried by the player.
    #[must_use]
    pub fn beam(world: &World) -> VisibilityBeam {
        world.beam
    }

    /// Current and previous light.
    #[must_use]
    pub fn lights(world: &World) -> &LightHistory {
        &world.lights
    }

    /// Captures a read-only view of the agents in registration order.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(super::Agent::snapshot).collect())
    }

    /// Snapshot of a single agent, if it exists.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world
            .agents
            .iter()
            .find(|candidate| candidate.id == agent)
            .map(super::Agent::snapshot)
    }

    /// Cell that completes the level, if the level has one.
    #[must_use]
    pub fn exit(world: &World) -> Option<CellCoord> {
        world.exit
    }

    /// Progress of the current level.
    #[must_use]
    pub fn status(world: &World) -> SessionStatus {
        world.status
    }

    /// Number of ticks applied since the level was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    facing: Direction,
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    id: AgentId,
    cell: CellCoord,
    facing: Direction,
    frozen: bool,
}

impl Agent {
    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            cell: self.cell,
            facing: self.facing,
            frozen: self.frozen,
        }
    }
}
