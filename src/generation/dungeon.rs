//! # Dungeon Topology
//!
//! Grows a connected room graph on a bounded grid, starting from a spawn room
//! on the border and expanding through a frontier of free adjacent cells.
//!
//! Growth is a small state machine:
//!
//! ```text
//! Growing ──frontier empty──▶ Repopulating ──refilled──▶ Growing
//!    │                             │
//!    │                       retries spent
//!    │                             ▼
//!    └──target reached──▶ verify ◀── FallbackFill
//!                          │
//!                   Verified | Failed
//! ```

use crate::{
    DelveError, DelveResult, Direction, GenerationConfig, Generator, Map, Position, Room,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use std::collections::BTreeSet;

/// Phases of topology growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    /// Placing rooms drawn from the frontier
    Growing,
    /// Rebuilding the frontier from every placed room
    Repopulating,
    /// Placing rooms directly next to placed ones
    FallbackFill,
    /// Target reached and every room reachable from spawn
    Verified,
    Failed,
}

impl GrowthPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GrowthPhase::Verified | GrowthPhase::Failed)
    }
}

/// Mutable state threaded through the growth phases.
#[derive(Debug)]
struct Growth {
    map: Map,
    frontier: BTreeSet<Position>,
    target: usize,
    next_id: u32,
    repopulations: u32,
    failure: Option<String>,
}

impl Growth {
    fn new(width: u32, height: u32, spawn: Position, target: usize) -> Self {
        let mut growth = Self {
            map: Map::new(width, height, spawn),
            frontier: BTreeSet::new(),
            target,
            next_id: 1,
            repopulations: 0,
            failure: None,
        };
        growth.extend_frontier(spawn);
        growth
    }

    fn is_complete(&self) -> bool {
        self.map.room_count() >= self.target
    }

    /// In-bounds cells around `position` that hold no room yet.
    fn free_neighbors(&self, position: Position) -> Vec<(Direction, Position)> {
        Direction::ALL
            .iter()
            .map(|&d| (d, position.step(d)))
            .filter(|&(_, p)| p.in_bounds(self.map.width, self.map.height) && !self.map.contains(p))
            .collect()
    }

    /// Directions from `position` that lead to a placed room.
    fn placed_neighbors(&self, position: Position) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|&d| self.map.contains(position.step(d)))
            .collect()
    }

    fn extend_frontier(&mut self, position: Position) {
        for (_, free) in self.free_neighbors(position) {
            self.frontier.insert(free);
        }
    }

    /// Places a room at `position`, linked through `direction` to an already
    /// placed neighbor.
    fn place(&mut self, position: Position, direction: Direction) -> DelveResult<()> {
        self.map.insert_room(Room::new(self.next_id, position))?;
        self.next_id += 1;
        self.map.connect(position, direction)?;
        self.frontier.remove(&position);
        Ok(())
    }
}

/// Grows a connected grid of rooms from a border spawn point.
///
/// Frontier candidates are drawn uniformly. Each new room is linked to one
/// random placed neighbor, and with `extra_connection_chance` also to every
/// other placed neighbor, which adds cycles without affecting reachability.
///
/// # Examples
///
/// ```
/// use delve::{GenerationConfig, Generator, GridTopologyBuilder};
/// use delve::generation::utils::create_rng;
///
/// let config = GenerationConfig::new(42);
/// let mut rng = create_rng(&config);
/// let map = GridTopologyBuilder::new().generate(&config, &mut rng).unwrap();
/// assert_eq!(map.room_count(), 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridTopologyBuilder;

impl GridTopologyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Rejects room counts that are non-positive or exceed the grid, and grids
    /// whose sides do not fit a coordinate.
    fn check_size(&self, config: &GenerationConfig) -> DelveResult<usize> {
        let capacity = i64::from(config.width).saturating_mul(i64::from(config.height));
        let max_side = i32::MAX as u32;
        if config.width > max_side
            || config.height > max_side
            || config.room_count <= 0
            || config.room_count > capacity
        {
            return Err(DelveError::InvalidSize {
                requested: config.room_count,
                capacity,
            });
        }
        Ok(config.room_count as usize)
    }

    /// Every border cell of the grid, each listed once.
    fn border_cells(&self, width: u32, height: u32) -> Vec<Position> {
        let (w, h) = (width as i32, height as i32);
        let mut cells = BTreeSet::new();
        for x in 0..w {
            cells.insert(Position::new(x, 0));
            cells.insert(Position::new(x, h - 1));
        }
        for y in 0..h {
            cells.insert(Position::new(0, y));
            cells.insert(Position::new(w - 1, y));
        }
        cells.into_iter().collect()
    }

    fn grow_step(
        &self,
        growth: &mut Growth,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<GrowthPhase> {
        if growth.is_complete() {
            return Ok(self.verify(growth));
        }
        if growth.frontier.is_empty() {
            return Ok(GrowthPhase::Repopulating);
        }

        let pick = rng.gen_range(0..growth.frontier.len());
        let Some(candidate) = growth.frontier.iter().nth(pick).copied() else {
            return Ok(GrowthPhase::Repopulating);
        };

        let placed = growth.placed_neighbors(candidate);
        let Some(&link) = placed.choose(rng) else {
            growth.frontier.remove(&candidate);
            return Ok(GrowthPhase::Growing);
        };

        growth.place(candidate, link)?;
        growth.extend_frontier(candidate);

        if rng.gen_bool(config.extra_connection_chance.clamp(0.0, 1.0)) {
            for direction in placed.into_iter().filter(|&d| d != link) {
                growth.map.connect(candidate, direction)?;
            }
        }
        Ok(GrowthPhase::Growing)
    }

    fn repopulate(&self, growth: &mut Growth, config: &GenerationConfig) -> GrowthPhase {
        if growth.repopulations >= config.max_repopulate_attempts {
            warn!(
                "Frontier still empty after {} rebuilds, falling back to direct placement",
                growth.repopulations
            );
            return GrowthPhase::FallbackFill;
        }
        growth.repopulations += 1;
        for position in growth.map.positions() {
            growth.extend_frontier(position);
        }
        warn!(
            "Frontier rebuilt (attempt {}), {} candidates",
            growth.repopulations,
            growth.frontier.len()
        );
        if growth.frontier.is_empty() {
            GrowthPhase::Repopulating
        } else {
            GrowthPhase::Growing
        }
    }

    fn fallback_fill(&self, growth: &mut Growth) -> DelveResult<GrowthPhase> {
        while !growth.is_complete() {
            let before = growth.map.room_count();
            'pass: for existing in growth.map.positions() {
                for (direction, free) in growth.free_neighbors(existing) {
                    if growth.is_complete() {
                        break 'pass;
                    }
                    growth.place(free, direction.opposite())?;
                }
            }
            if growth.map.room_count() == before {
                break;
            }
        }

        if growth.is_complete() {
            Ok(self.verify(growth))
        } else {
            growth.failure = Some(format!(
                "placed {} of {} rooms before running out of free cells",
                growth.map.room_count(),
                growth.target
            ));
            Ok(GrowthPhase::Failed)
        }
    }

    fn verify(&self, growth: &mut Growth) -> GrowthPhase {
        if growth.map.room_count() != growth.target {
            growth.failure = Some(format!(
                "expected {} rooms, built {}",
                growth.target,
                growth.map.room_count()
            ));
            GrowthPhase::Failed
        } else if !growth.map.is_fully_reachable() {
            growth.failure = Some("some rooms are unreachable from spawn".to_string());
            GrowthPhase::Failed
        } else {
            GrowthPhase::Verified
        }
    }
}

impl Generator<Map> for GridTopologyBuilder {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Map> {
        let target = self.check_size(config)?;

        let border = self.border_cells(config.width, config.height);
        let spawn = border[rng.gen_range(0..border.len())];
        debug!("Spawn placed at {} on a {}x{} grid", spawn, config.width, config.height);

        let mut growth = Growth::new(config.width, config.height, spawn, target);
        let mut phase = GrowthPhase::Growing;
        while !phase.is_terminal() {
            let next = match phase {
                GrowthPhase::Growing => self.grow_step(&mut growth, config, rng)?,
                GrowthPhase::Repopulating => self.repopulate(&mut growth, config),
                GrowthPhase::FallbackFill => self.fallback_fill(&mut growth)?,
                terminal => terminal,
            };
            if next != phase {
                debug!("Growth phase {:?} -> {:?}", phase, next);
            }
            phase = next;
        }

        if phase == GrowthPhase::Failed {
            let reason = growth
                .failure
                .unwrap_or_else(|| "unknown growth failure".to_string());
            return Err(DelveError::Generation(reason));
        }

        self.validate(&growth.map, config)?;
        info!(
            "{} generated {} rooms from spawn {} (seed {})",
            self.generator_type(),
            growth.map.room_count(),
            spawn,
            config.seed
        );
        Ok(growth.map)
    }

    fn validate(&self, map: &Map, config: &GenerationConfig) -> DelveResult<()> {
        if map.room_count() as i64 != config.room_count {
            return Err(DelveError::Generation(format!(
                "map has {} rooms, expected {}",
                map.room_count(),
                config.room_count
            )));
        }
        if !map.connections_are_symmetric() {
            return Err(DelveError::Generation(
                "a connection has no matching reverse link".to_string(),
            ));
        }
        if !map.is_fully_reachable() {
            return Err(DelveError::Generation(
                "map is not fully reachable from spawn".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "GridTopologyBuilder"
    }
}
