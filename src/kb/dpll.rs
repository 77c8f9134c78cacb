//! Bundled DPLL satisfiability oracle.
//!
//! A small complete solver: unit propagation to fixpoint plus chronological
//! backtracking over an explicit trail. No clause learning, no watched
//! literals — the hazard-grid clause sets are tiny (at most `2N²` variables
//! and a low-order-polynomial clause count), so plain propagation dominates
//! and every query terminates in microseconds at realistic grid sizes.
//!
//! For adversarial sizes an optional decision budget bounds the search;
//! exceeding it yields [`Outcome::Unknown`], which inference treats as
//! "nothing proven" rather than an error.

use super::{Lit, Outcome, SatOracle};

/// Iterative DPLL solver implementing [`SatOracle`].
pub struct DpllSolver {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    has_empty_clause: bool,
    decision_budget: Option<u64>,
}

impl DpllSolver {
    /// Create a solver sized for `num_vars` variables.
    ///
    /// Clauses mentioning higher variables grow the table automatically.
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            clauses: Vec::new(),
            has_empty_clause: false,
            decision_budget: None,
        }
    }

    /// Like [`DpllSolver::new`], but give up after `budget` branch decisions
    /// per query and report [`Outcome::Unknown`].
    pub fn with_decision_budget(num_vars: usize, budget: u64) -> Self {
        Self {
            decision_budget: Some(budget),
            ..Self::new(num_vars)
        }
    }

    /// Unit propagation to fixpoint. Returns `true` on conflict (some clause
    /// has every literal assigned false).
    fn propagate(&self, assign: &mut [Option<bool>], trail: &mut Vec<u32>) -> bool {
        loop {
            let mut changed = false;
            for clause in &self.clauses {
                let mut satisfied = false;
                let mut unassigned = None;
                let mut unassigned_count = 0usize;
                for &lit in clause {
                    match assign[lit.var() as usize] {
                        Some(value) if value == lit.is_positive() => {
                            satisfied = true;
                            break;
                        }
                        Some(_) => {}
                        None => {
                            unassigned_count += 1;
                            unassigned = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match unassigned_count {
                    0 => return true,
                    1 => {
                        let lit = unassigned.expect("counted one unassigned literal");
                        assign[lit.var() as usize] = Some(lit.is_positive());
                        trail.push(lit.var());
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return false;
            }
        }
    }
}

impl SatOracle for DpllSolver {
    fn add_clause(&mut self, clause: &[Lit]) {
        if clause.is_empty() {
            self.has_empty_clause = true;
            return;
        }
        for &lit in clause {
            self.num_vars = self.num_vars.max(lit.var() as usize);
        }
        self.clauses.push(clause.to_vec());
    }

    fn solve(&mut self, assumptions: &[Lit]) -> Outcome {
        if self.has_empty_clause {
            return Outcome::Unsat;
        }

        let max_var = assumptions
            .iter()
            .map(|lit| lit.var() as usize)
            .fold(self.num_vars, usize::max);
        let mut assign: Vec<Option<bool>> = vec![None; max_var + 1];
        let mut trail: Vec<u32> = Vec::new();

        for &lit in assumptions {
            let var = lit.var() as usize;
            match assign[var] {
                Some(value) if value != lit.is_positive() => return Outcome::Unsat,
                Some(_) => {}
                None => {
                    assign[var] = Some(lit.is_positive());
                    trail.push(lit.var());
                }
            }
        }

        // (trail mark, decision variable, second phase tried)
        let mut decisions: Vec<(usize, u32, bool)> = Vec::new();
        let mut used: u64 = 0;

        loop {
            if self.propagate(&mut assign, &mut trail) {
                // Conflict: flip the most recent unflipped decision, undoing
                // everything assigned since it.
                loop {
                    let Some((mark, var, flipped)) = decisions.pop() else {
                        return Outcome::Unsat;
                    };
                    while trail.len() > mark {
                        let v = trail.pop().expect("trail shrinks to mark");
                        assign[v as usize] = None;
                    }
                    if !flipped {
                        assign[var as usize] = Some(true);
                        trail.push(var);
                        decisions.push((mark, var, true));
                        break;
                    }
                }
            } else {
                let next = (1..=self.num_vars).find(|&v| assign[v].is_none());
                match next {
                    None => return Outcome::Sat,
                    Some(var) => {
                        used += 1;
                        if let Some(budget) = self.decision_budget {
                            if used > budget {
                                return Outcome::Unknown;
                            }
                        }
                        decisions.push((trail.len(), var as u32, false));
                        assign[var] = Some(false);
                        trail.push(var as u32);
                    }
                }
            }
        }
    }
}
