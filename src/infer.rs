//! Hazard inference engine: percepts in, safety judgments out.
//!
//! Percepts translate into CNF clauses over the knowledge base; cell safety
//! is then decided by assumption-based satisfiability queries. Three
//! deduction passes sharpen the base with explicit unit clauses before any
//! query-driven classification runs, composed in a fixed order:
//!
//! 1. **Direct deduction** — a breeze (stench) at a visited cell with exactly
//!    one unvisited neighbor forces a pit (Wumpus) there outright.
//! 2. **Satisfiability sweep** — otherwise, if a hazard-here assumption is
//!    satisfiable for exactly one neighbor, that neighbor is the forced
//!    location.
//! 3. **Pit by exclusion** — a global pass over unvisited provably-safe
//!    cells ringed by breeze reports, mining the visited map rather than
//!    reacting to a single percept.
//!
//! Classification results are memoized per knowledge-base revision; any
//! clause insertion invalidates the memo, because new knowledge can upgrade
//! `Unknown` to `Certain` or `Absent` (never the reverse).

use std::collections::{BTreeSet, HashMap};

use crate::error::KbError;
use crate::grid::{Cell, Grid};
use crate::kb::{HazardKind, KnowledgeBase, Lit, Outcome};
use crate::world::Percept;

/// What the knowledge base proves about one hazard kind at one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardStatus {
    /// Hazard-absent is unsatisfiable: the hazard is provably present.
    Certain,
    /// Hazard-present is unsatisfiable: the hazard is provably absent.
    Absent,
    /// Neither side is provable (including oracle budget exhaustion).
    Unknown,
}

/// Per-cell classification for both hazard kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub pit: HazardStatus,
    pub wumpus: HazardStatus,
}

impl Classification {
    /// Provably free of both hazards.
    pub fn is_safe(&self) -> bool {
        self.pit == HazardStatus::Absent && self.wumpus == HazardStatus::Absent
    }

    /// At least one hazard provably present.
    pub fn is_certain_hazard(&self) -> bool {
        self.pit == HazardStatus::Certain || self.wumpus == HazardStatus::Certain
    }
}

/// The inference engine: owns the knowledge base, the visited set, and the
/// record of consumed percepts for one episode.
///
/// All state is per-episode and exclusively owned; batch simulations build
/// one engine per agent, never sharing clause sets.
pub struct HazardInference {
    grid: Grid,
    kb: KnowledgeBase,
    visited: BTreeSet<Cell>,
    percepts: HashMap<Cell, Percept>,
    goal_found: bool,
    memo: HashMap<Cell, Classification>,
    memo_revision: u64,
}

impl HazardInference {
    /// Create an engine for the given grid and seed the exactly-one-Wumpus
    /// constraint: one at-least-one clause over all cells plus pairwise
    /// at-most-one exclusions.
    pub fn new(grid: Grid) -> Result<Self, KbError> {
        let mut kb = KnowledgeBase::new(grid.size());

        let wumpus_lits: Vec<Lit> = grid
            .cells()
            .map(|cell| kb.wumpus(cell))
            .collect::<Result<_, _>>()?;
        kb.add_clause(wumpus_lits.clone())?;
        for (i, &a) in wumpus_lits.iter().enumerate() {
            for &b in &wumpus_lits[i + 1..] {
                kb.add_clause(vec![-a, -b])?;
            }
        }

        Ok(Self {
            grid,
            kb,
            visited: BTreeSet::new(),
            percepts: HashMap::new(),
            goal_found: false,
            memo: HashMap::new(),
            memo_revision: 0,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    /// Cells whose percepts have been consumed, in coordinate order.
    pub fn visited(&self) -> impl Iterator<Item = Cell> + '_ {
        self.visited.iter().copied()
    }

    /// The percept recorded for a visited cell.
    pub fn percept_at(&self, cell: Cell) -> Option<Percept> {
        self.percepts.get(&cell).copied()
    }

    /// Set once glitter has been perceived; the caller switches strategy.
    pub fn goal_found(&self) -> bool {
        self.goal_found
    }

    /// Raw assumption query against the knowledge base.
    pub fn query(&mut self, assumptions: &[Lit]) -> Outcome {
        self.kb.query(assumptions)
    }

    pub fn pit_lit(&self, cell: Cell) -> Result<Lit, KbError> {
        self.kb.pit(cell)
    }

    pub fn wumpus_lit(&self, cell: Cell) -> Result<Lit, KbError> {
        self.kb.wumpus(cell)
    }

    /// Ingest the percept for the agent's current cell.
    ///
    /// No breeze asserts "no pit" for every neighbor; a breeze asserts "at
    /// least one neighbor has a pit" (a disjunction over the actual neighbor
    /// set, smaller at the boundary). Stench works the same for the Wumpus.
    /// Re-ingesting a visited cell's percept is a no-op: every derived
    /// clause is already present and suppressed as a duplicate.
    pub fn observe(&mut self, cell: Cell, percept: Percept) -> Result<(), KbError> {
        // Triggers the out-of-bounds check before any state changes.
        let _ = self.kb.pit(cell)?;

        self.visited.insert(cell);
        self.percepts.insert(cell, percept);

        let neighbors = self.grid.neighbors(cell);
        if percept.breeze {
            let lits: Vec<Lit> = neighbors
                .iter()
                .map(|&n| self.kb.pit(n))
                .collect::<Result<_, _>>()?;
            self.kb.add_clause(lits)?;
        } else {
            for &n in &neighbors {
                let lit = self.kb.pit(n)?;
                self.kb.add_clause(vec![-lit])?;
            }
        }
        if percept.stench {
            let lits: Vec<Lit> = neighbors
                .iter()
                .map(|&n| self.kb.wumpus(n))
                .collect::<Result<_, _>>()?;
            self.kb.add_clause(lits)?;
        } else {
            for &n in &neighbors {
                let lit = self.kb.wumpus(n)?;
                self.kb.add_clause(vec![-lit])?;
            }
        }

        if percept.glitter && !self.goal_found {
            self.goal_found = true;
            tracing::info!(%cell, "glitter perceived, goal located");
        }

        tracing::debug!(
            %cell,
            breeze = percept.breeze,
            stench = percept.stench,
            clauses = self.kb.clause_count(),
            "ingested percept"
        );
        self.kb.ensure_consistent()
    }

    /// Classify both hazard kinds at a cell.
    ///
    /// Up to four satisfiability queries; results are memoized until the
    /// next clause insertion. An `Unknown` oracle outcome proves nothing, so
    /// it degrades the answer toward `HazardStatus::Unknown`.
    pub fn classify(&mut self, cell: Cell) -> Result<Classification, KbError> {
        if self.kb.revision() != self.memo_revision {
            self.memo.clear();
            self.memo_revision = self.kb.revision();
        }
        if let Some(&cached) = self.memo.get(&cell) {
            return Ok(cached);
        }

        let pit_lit = self.kb.pit(cell)?;
        let wumpus_lit = self.kb.wumpus(cell)?;
        let classification = Classification {
            pit: self.status_of(pit_lit),
            wumpus: self.status_of(wumpus_lit),
        };
        self.memo.insert(cell, classification);
        Ok(classification)
    }

    fn status_of(&mut self, present: Lit) -> HazardStatus {
        if self.kb.query(&[-present]) == Outcome::Unsat {
            return HazardStatus::Certain;
        }
        if self.kb.query(&[present]) == Outcome::Unsat {
            return HazardStatus::Absent;
        }
        HazardStatus::Unknown
    }

    /// Provably free of both hazards.
    pub fn is_safe(&mut self, cell: Cell) -> Result<bool, KbError> {
        Ok(self.classify(cell)?.is_safe())
    }

    /// Direct deduction plus satisfiability sweep for pits, keyed on breeze
    /// percepts at visited cells.
    pub fn deduce_pits_from_breeze(&mut self) -> Result<(), KbError> {
        self.deduce_forced_hazards(HazardKind::Pit)
    }

    /// Direct deduction plus satisfiability sweep for the Wumpus, keyed on
    /// stench percepts at visited cells.
    pub fn deduce_wumpus_from_stench(&mut self) -> Result<(), KbError> {
        self.deduce_forced_hazards(HazardKind::Wumpus)
    }

    fn deduce_forced_hazards(&mut self, kind: HazardKind) -> Result<(), KbError> {
        let flagged: Vec<Cell> = self
            .visited
            .iter()
            .copied()
            .filter(|cell| {
                self.percepts.get(cell).is_some_and(|p| match kind {
                    HazardKind::Pit => p.breeze,
                    HazardKind::Wumpus => p.stench,
                })
            })
            .collect();

        for cell in flagged {
            let neighbors = self.grid.neighbors(cell);
            let unvisited: Vec<Cell> = neighbors
                .iter()
                .copied()
                .filter(|n| !self.visited.contains(n))
                .collect();

            if unvisited.len() == 1 {
                // Every other neighbor is visited, hence survived: the
                // percept's hazard can only sit in the one unvisited cell.
                let forced = unvisited[0];
                let lit = self.kb.vars().hazard(kind, forced)?;
                if self.kb.add_clause(vec![lit])? {
                    tracing::debug!(%forced, %kind, source = %cell, "direct deduction forced hazard");
                }
            } else {
                // Generalization to partially-explored neighborhoods: if the
                // hazard-here assumption survives for exactly one neighbor,
                // that neighbor is the forced location.
                let mut survivors = Vec::new();
                for &n in &neighbors {
                    let lit = self.kb.vars().hazard(kind, n)?;
                    if self.kb.query(&[lit]) != Outcome::Unsat {
                        survivors.push(n);
                    }
                }
                if let [forced] = survivors[..] {
                    let lit = self.kb.vars().hazard(kind, forced)?;
                    if self.kb.add_clause(vec![lit])? {
                        tracing::debug!(%forced, %kind, source = %cell, "satisfiability sweep forced hazard");
                    }
                }
            }
        }
        Ok(())
    }

    /// Global exclusion pass: an unvisited, provably-safe cell with at least
    /// three breeze-reporting visited neighbors and exactly one unvisited
    /// neighbor pins a pit on that neighbor.
    ///
    /// Unlike the percept-keyed passes this mines the whole visited map each
    /// turn, independent of which cell triggered the update.
    pub fn deduce_pit_by_exclusion(&mut self) -> Result<(), KbError> {
        let cells: Vec<Cell> = self.grid.cells().collect();
        for cell in cells {
            if self.visited.contains(&cell) || !self.is_safe(cell)? {
                continue;
            }
            let neighbors = self.grid.neighbors(cell);
            let breezy = neighbors
                .iter()
                .filter(|n| {
                    self.visited.contains(n)
                        && self.percepts.get(n).is_some_and(|p| p.breeze)
                })
                .count();
            let unvisited: Vec<Cell> = neighbors
                .iter()
                .copied()
                .filter(|n| !self.visited.contains(n))
                .collect();
            if breezy >= 3 {
                if let [forced] = unvisited[..] {
                    let lit = self.kb.pit(forced)?;
                    if self.kb.add_clause(vec![lit])? {
                        tracing::debug!(%forced, ringed = %cell, "exclusion pass forced pit");
                    }
                }
            }
        }
        Ok(())
    }

    /// Unvisited cells adjacent to visited territory that are provably safe.
    ///
    /// Recomputed from scratch on every call: it is a cache over the current
    /// knowledge base, never ground truth.
    pub fn safe_frontier(&mut self) -> Result<BTreeSet<Cell>, KbError> {
        let mut frontier = BTreeSet::new();
        let visited: Vec<Cell> = self.visited.iter().copied().collect();
        for cell in visited {
            for n in self.grid.neighbors(cell) {
                if self.visited.contains(&n) || frontier.contains(&n) {
                    continue;
                }
                if self.classify(n)?.is_safe() {
                    frontier.insert(n);
                }
            }
        }
        Ok(frontier)
    }
}

impl std::fmt::Debug for HazardInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardInference")
            .field("grid", &self.grid)
            .field("visited", &self.visited.len())
            .field("goal_found", &self.goal_found)
            .field("kb", &self.kb)
            .finish()
    }
}
