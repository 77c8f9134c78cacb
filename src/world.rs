//! The grid world: hazard placement, percepts, movement, terminal flags.
//!
//! The world is the agent's external collaborator. It owns ground truth and
//! is the only component allowed to mutate the agent's position; the
//! reasoning core only ever sees percepts and issues [`Direction`] commands.
//!
//! Generation resamples hazard placements until a winnability check passes:
//! there must be a path from the start to the gold that avoids every pit and
//! the Wumpus, so a perfectly-informed agent could always win.

use std::collections::VecDeque;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::grid::{Cell, Direction, Grid};

/// Sensory record for one cell, produced by the world and consumed once per
/// visit by the inference engine.
///
/// `breeze`/`stench` report a pit/Wumpus in some orthogonal neighbor;
/// `glitter` reports gold in the cell itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percept {
    pub breeze: bool,
    pub stench: bool,
    pub glitter: bool,
}

/// Ground-truth contents of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub pit: bool,
    pub wumpus: bool,
    pub gold: bool,
}

impl CellState {
    fn lethal(&self) -> bool {
        self.pit || self.wumpus
    }
}

/// Generation attempts before giving up. Random placement almost always
/// yields a winnable world within a handful of tries at sane pit counts.
const MAX_GENERATION_ATTEMPTS: usize = 10_000;

/// A Wumpus World instance: an N x N grid with pits, one Wumpus, one gold.
///
/// The agent always starts in the bottom-left corner, which is guaranteed
/// hazard-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    size: usize,
    cells: Vec<CellState>,
    start: Cell,
    agent_pos: Cell,
    alive: bool,
    gold_found: bool,
}

impl World {
    /// Generate a random winnable world.
    pub fn generate(size: usize, num_pits: usize, rng: &mut impl Rng) -> Result<Self, WorldError> {
        if size == 0 {
            return Err(WorldError::InvalidConfig {
                message: "grid size must be at least 1".into(),
            });
        }
        // Pits + Wumpus + gold all need distinct non-start cells.
        if num_pits + 2 > size * size - 1 {
            return Err(WorldError::InvalidConfig {
                message: format!(
                    "{num_pits} pits + Wumpus + gold do not fit a {size}x{size} grid \
                     with a hazard-free start"
                ),
            });
        }

        let grid = Grid::new(size);
        let start = Cell::new(size - 1, 0);
        let candidates: Vec<Cell> = grid.cells().filter(|&c| c != start).collect();

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let mut placement = candidates.clone();
            placement.shuffle(rng);
            let pits = &placement[..num_pits];
            let wumpus = placement[num_pits];
            let gold = placement[num_pits + 1];

            let world = Self::with_layout(size, pits, wumpus, gold)?;
            if world.is_winnable() {
                tracing::debug!(size, num_pits, attempt, "generated winnable world");
                return Ok(world);
            }
        }
        Err(WorldError::GenerationFailed {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Build a world from an explicit hazard layout.
    ///
    /// Used by generation and by test fixtures; no winnability check is
    /// applied here.
    pub fn with_layout(
        size: usize,
        pits: &[Cell],
        wumpus: Cell,
        gold: Cell,
    ) -> Result<Self, WorldError> {
        let grid = Grid::new(size);
        let start = Cell::new(size.saturating_sub(1), 0);

        let mut cells = vec![CellState::default(); size * size];
        let index = |cell: Cell| cell.row * size + cell.col;
        let place = |cell: Cell, what: &str| -> Result<(), WorldError> {
            if !grid.contains(cell) {
                return Err(WorldError::InvalidConfig {
                    message: format!("{what} at {cell} is outside the {size}x{size} grid"),
                });
            }
            if cell == start {
                return Err(WorldError::InvalidConfig {
                    message: format!("{what} may not occupy the start cell {start}"),
                });
            }
            Ok(())
        };

        for &pit in pits {
            place(pit, "pit")?;
            cells[index(pit)].pit = true;
        }
        place(wumpus, "Wumpus")?;
        cells[index(wumpus)].wumpus = true;
        place(gold, "gold")?;
        cells[index(gold)].gold = true;

        Ok(Self {
            size,
            cells,
            start,
            agent_pos: start,
            alive: true,
            gold_found: false,
        })
    }

    /// Whether a hazard-free path connects the start to the gold.
    fn is_winnable(&self) -> bool {
        let grid = self.grid();
        let gold = match grid.cells().find(|&c| self.state(c).gold) {
            Some(c) => c,
            None => return false,
        };

        let mut seen = vec![false; self.size * self.size];
        let mut queue = VecDeque::from([self.start]);
        seen[self.start.row * self.size + self.start.col] = true;
        while let Some(current) = queue.pop_front() {
            if current == gold {
                return true;
            }
            for n in grid.neighbors(current) {
                let idx = n.row * self.size + n.col;
                if !seen[idx] && !self.state(n).lethal() {
                    seen[idx] = true;
                    queue.push_back(n);
                }
            }
        }
        false
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn agent_position(&self) -> Cell {
        self.agent_pos
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn gold_found(&self) -> bool {
        self.gold_found
    }

    /// Ground-truth contents of a cell. Test fixtures use this to check the
    /// agent's certainties against reality.
    pub fn state(&self, cell: Cell) -> CellState {
        self.cells[cell.row * self.size + cell.col]
    }

    /// Percepts for a cell: breeze/stench from orthogonal neighbors, glitter
    /// from the cell itself.
    pub fn percepts(&self, cell: Cell) -> Percept {
        let mut percept = Percept {
            glitter: self.state(cell).gold,
            ..Percept::default()
        };
        for n in self.grid().neighbors(cell) {
            let state = self.state(n);
            percept.breeze |= state.pit;
            percept.stench |= state.wumpus;
        }
        percept
    }

    /// Apply a movement command.
    ///
    /// Out-of-bounds moves are rejected and leave the world untouched;
    /// returns whether the move was applied. Stepping onto a pit or the
    /// Wumpus kills the agent; stepping onto the gold sets the win flag.
    pub fn apply(&mut self, dir: Direction) -> bool {
        let Some(next) = self.grid().step(self.agent_pos, dir) else {
            tracing::debug!(%dir, at = %self.agent_pos, "rejected out-of-bounds move");
            return false;
        };
        self.agent_pos = next;
        let state = self.state(next);
        if state.lethal() {
            self.alive = false;
        }
        if state.gold {
            self.gold_found = true;
        }
        true
    }

    /// Serialize the world to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), WorldError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| WorldError::Serialization {
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|source| WorldError::Io { source })
    }

    /// Load a world from a JSON file written by [`World::save`].
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let json = std::fs::read_to_string(path).map_err(|source| WorldError::Io { source })?;
        let world: World = serde_json::from_str(&json).map_err(|e| WorldError::Serialization {
            message: e.to_string(),
        })?;
        if world.cells.len() != world.size * world.size {
            return Err(WorldError::Serialization {
                message: format!(
                    "cell count {} does not match grid size {}",
                    world.cells.len(),
                    world.size
                ),
            });
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixture() -> World {
        // 4x4, pit at (1,1), Wumpus at (0,3), gold at (0,0). Safe path up the
        // left column exists.
        World::with_layout(
            4,
            &[Cell::new(1, 1)],
            Cell::new(0, 3),
            Cell::new(0, 0),
        )
        .unwrap()
    }

    #[test]
    fn generated_worlds_are_winnable_with_safe_start() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let world = World::generate(8, 3, &mut rng).unwrap();
            assert!(world.is_winnable());
            assert!(!world.state(world.start()).lethal());
            assert!(!world.state(world.start()).gold);
        }
    }

    #[test]
    fn generation_rejects_overfull_grid() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        assert!(matches!(
            World::generate(2, 2, &mut rng),
            Err(WorldError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn layout_rejects_hazard_on_start() {
        let result = World::with_layout(4, &[Cell::new(3, 0)], Cell::new(0, 3), Cell::new(0, 0));
        assert!(matches!(result, Err(WorldError::InvalidConfig { .. })));
    }

    #[test]
    fn percepts_report_adjacent_hazards_only() {
        let world = fixture();
        // (1,0) is adjacent to the pit at (1,1).
        let p = world.percepts(Cell::new(1, 0));
        assert!(p.breeze);
        assert!(!p.stench);
        // (0,2) is adjacent to the Wumpus at (0,3).
        let p = world.percepts(Cell::new(0, 2));
        assert!(p.stench);
        // Start cell is quiet.
        let p = world.percepts(Cell::new(3, 0));
        assert_eq!(p, Percept::default());
        // Glitter only on the gold cell itself.
        assert!(world.percepts(Cell::new(0, 0)).glitter);
    }

    #[test]
    fn moves_update_position_and_flags() {
        let mut world = fixture();
        assert_eq!(world.agent_position(), Cell::new(3, 0));

        // Out-of-bounds moves are rejected in place.
        assert!(!world.apply(Direction::Left));
        assert_eq!(world.agent_position(), Cell::new(3, 0));

        assert!(world.apply(Direction::Up));
        assert!(world.apply(Direction::Up));
        assert_eq!(world.agent_position(), Cell::new(1, 0));
        assert!(world.is_alive());

        // Step into the pit.
        assert!(world.apply(Direction::Right));
        assert!(!world.is_alive());
    }

    #[test]
    fn reaching_gold_sets_win_flag() {
        let mut world = fixture();
        for _ in 0..3 {
            world.apply(Direction::Up);
        }
        assert!(world.is_alive());
        assert!(world.gold_found());
    }
}
