//! Risk estimator: a scalar desirability score for candidate cells.
//!
//! The score is a heuristic ranking key, not a probability. Only the
//! relative ordering of the terms matters: provably-safe unvisited cells
//! rank far ahead of unresolved cells, which rank ahead of revisits, which
//! rank far ahead of certain hazards. Distance contributes a term scaled to
//! be negligible against every classification term — a tie-breaker, never a
//! driver.

use crate::error::KbError;
use crate::grid::{manhattan, Cell};
use crate::infer::{HazardInference, HazardStatus};

/// Added per hazard kind the knowledge base proves present.
const CERTAIN_HAZARD_PENALTY: f64 = 1000.0;
/// Subtracted per hazard kind the knowledge base proves absent.
const ABSENT_HAZARD_BONUS: f64 = 50.0;
/// Discourages revisiting cells whose percepts are already consumed.
const REVISIT_PENALTY: f64 = 2.0;
/// Dominant pull toward provably-safe unexplored cells.
const SAFE_UNVISITED_BONUS: f64 = 5000.0;
/// Keeps unresolved cells preferable to certain hazards.
const UNRESOLVED_BONUS: f64 = 25.0;

/// Score a cell; lower is more desirable.
pub fn score(
    inference: &mut HazardInference,
    agent_pos: Cell,
    cell: Cell,
) -> Result<f64, KbError> {
    let classification = inference.classify(cell)?;
    let mut risk = 0.0;

    match classification.pit {
        HazardStatus::Certain => risk += CERTAIN_HAZARD_PENALTY,
        HazardStatus::Absent => risk -= ABSENT_HAZARD_BONUS,
        HazardStatus::Unknown => {}
    }
    match classification.wumpus {
        HazardStatus::Certain => risk += CERTAIN_HAZARD_PENALTY,
        HazardStatus::Absent => risk -= ABSENT_HAZARD_BONUS,
        HazardStatus::Unknown => {}
    }

    let size = inference.grid().size();
    risk += manhattan(cell, agent_pos) as f64 / (size as f64 * 2.0) / 100.0;

    if inference.is_visited(cell) {
        risk += REVISIT_PENALTY;
    } else if classification.is_safe() {
        risk -= SAFE_UNVISITED_BONUS;
    } else {
        risk -= UNRESOLVED_BONUS;
    }

    Ok(risk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::world::Percept;

    fn quiet() -> Percept {
        Percept::default()
    }

    #[test]
    fn safe_unvisited_outranks_everything() {
        let mut inference = HazardInference::new(Grid::new(4)).unwrap();
        let start = Cell::new(3, 0);
        inference.observe(start, quiet()).unwrap();

        let safe = score(&mut inference, start, Cell::new(2, 0)).unwrap();
        let unresolved = score(&mut inference, start, Cell::new(0, 3)).unwrap();
        let revisit = score(&mut inference, start, start).unwrap();

        assert!(safe < unresolved);
        assert!(unresolved < revisit);
    }

    #[test]
    fn certain_hazard_ranks_last() {
        let mut inference = HazardInference::new(Grid::new(4)).unwrap();
        let start = Cell::new(3, 0);
        inference.observe(start, quiet()).unwrap();
        inference.observe(Cell::new(2, 1), quiet()).unwrap();
        inference
            .observe(
                Cell::new(2, 0),
                Percept {
                    breeze: true,
                    ..Percept::default()
                },
            )
            .unwrap();
        inference.deduce_pits_from_breeze().unwrap();

        // (1,0) is now a certain pit.
        let hazard = score(&mut inference, start, Cell::new(1, 0)).unwrap();
        let unresolved = score(&mut inference, start, Cell::new(0, 3)).unwrap();
        let revisit = score(&mut inference, start, start).unwrap();

        assert!(revisit < hazard);
        assert!(unresolved < hazard);
    }

    #[test]
    fn distance_only_breaks_ties() {
        let mut inference = HazardInference::new(Grid::new(4)).unwrap();
        let start = Cell::new(3, 0);
        inference.observe(start, quiet()).unwrap();

        // Two equally-unknown cells at different distances.
        let near = score(&mut inference, start, Cell::new(1, 1)).unwrap();
        let far = score(&mut inference, start, Cell::new(0, 3)).unwrap();
        assert!(near < far);
        // The gap stays far below any classification term.
        assert!((far - near).abs() < 1.0);
    }
}
