//! Grid geometry: cells, directions, and neighborhoods.
//!
//! Everything here is pure coordinate arithmetic shared by the world and the
//! reasoning core. Cells use `(row, col)` with row 0 at the top, and adjacency
//! is orthogonal only; cells on the boundary have 2 or 3 neighbors.

use serde::{Deserialize, Serialize};

/// A grid coordinate. Immutable identity, used as a map key everywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four orthogonal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Derive the direction of a single step from `from` to `to`.
    ///
    /// Returns `None` when the cells coincide or are not axis-aligned single
    /// steps apart; the caller decides the fallback (the decision policy uses
    /// a uniform random direction).
    pub fn between(from: Cell, to: Cell) -> Option<Direction> {
        if to.row < from.row {
            Some(Direction::Up)
        } else if to.row > from.row {
            Some(Direction::Down)
        } else if to.col < from.col {
            Some(Direction::Left)
        } else if to.col > from.col {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// Square grid geometry of side `size`.
///
/// A cheap value type: cloning is free and no cell state lives here. The
/// world owns hazard placement; the core only ever needs bounds, neighbors,
/// and distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    /// Orthogonal neighbors in up, down, left, right order.
    ///
    /// Boundary cells get the actual (smaller) neighbor set; no caller may
    /// assume arity 4.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(4);
        if cell.row > 0 {
            out.push(Cell::new(cell.row - 1, cell.col));
        }
        if cell.row + 1 < self.size {
            out.push(Cell::new(cell.row + 1, cell.col));
        }
        if cell.col > 0 {
            out.push(Cell::new(cell.row, cell.col - 1));
        }
        if cell.col + 1 < self.size {
            out.push(Cell::new(cell.row, cell.col + 1));
        }
        out
    }

    /// The cell one step in `dir` from `cell`, or `None` at the boundary.
    pub fn step(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let stepped = match dir {
            Direction::Up => Cell::new(cell.row.checked_sub(1)?, cell.col),
            Direction::Down => Cell::new(cell.row + 1, cell.col),
            Direction::Left => Cell::new(cell.row, cell.col.checked_sub(1)?),
            Direction::Right => Cell::new(cell.row, cell.col + 1),
        };
        self.contains(stepped).then_some(stepped)
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Cell::new(row, col)))
    }
}

/// Manhattan distance between two cells.
pub fn manhattan(a: Cell, b: Cell) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}
