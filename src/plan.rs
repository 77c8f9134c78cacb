//! Safety-constrained path planning over the grid graph.
//!
//! Breadth-first search where a cell may only be enqueued if the agent can
//! justify standing on it: it is already visited, or inference currently
//! proves both hazards absent. Neighbors are expanded in ascending
//! Manhattan-distance-to-target order to bias toward direct routes; BFS
//! still guarantees shortest hop count because every cell is enqueued once.
//!
//! "No path" is a normal planning result (`None`), not an error; the
//! decision policy just moves on to the next candidate.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::error::KbError;
use crate::grid::{manhattan, Cell};
use crate::infer::HazardInference;

/// Find a path from `start` to `target` where every cell, the target
/// included, is visited or provably safe.
pub fn find_safe_path(
    inference: &mut HazardInference,
    start: Cell,
    target: Cell,
) -> Result<Option<Vec<Cell>>, KbError> {
    bfs(inference, start, target, false)
}

/// Like [`find_safe_path`], but the target itself is exempt from the safety
/// requirement — it is a deliberately risky destination. Every intermediate
/// cell must still qualify.
pub fn find_safe_path_to_risky(
    inference: &mut HazardInference,
    start: Cell,
    target: Cell,
) -> Result<Option<Vec<Cell>>, KbError> {
    bfs(inference, start, target, true)
}

fn bfs(
    inference: &mut HazardInference,
    start: Cell,
    target: Cell,
    exempt_target: bool,
) -> Result<Option<Vec<Cell>>, KbError> {
    let grid = inference.grid();
    let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::from([(start, None)]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut path = Vec::new();
            let mut walk = Some(current);
            while let Some(cell) = walk {
                path.push(cell);
                walk = came_from[&cell];
            }
            path.reverse();
            return Ok(Some(path));
        }

        let mut neighbors = grid.neighbors(current);
        neighbors.sort_by_key(|&n| manhattan(n, target));
        for n in neighbors {
            if came_from.contains_key(&n) {
                continue;
            }
            let traversable = inference.is_visited(n)
                || inference.is_safe(n)?
                || (exempt_target && n == target);
            if traversable {
                came_from.insert(n, Some(current));
                queue.push_back(n);
            }
        }
    }
    Ok(None)
}

/// Try every frontier cell nearest-first and return the first that admits a
/// real move (a safe path longer than one cell), together with its path.
///
/// This prefers certainty over cleverness: every known-safe destination is
/// attempted before the caller considers any risk.
pub fn find_closest_safe_path(
    inference: &mut HazardInference,
    frontier: &BTreeSet<Cell>,
    start: Cell,
) -> Result<Option<(Cell, Vec<Cell>)>, KbError> {
    let mut candidates: Vec<Cell> = frontier.iter().copied().collect();
    candidates.sort_by_key(|&c| (manhattan(c, start), c));

    for candidate in candidates {
        if let Some(path) = find_safe_path(inference, start, candidate)? {
            if path.len() > 1 {
                return Ok(Some((candidate, path)));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::world::Percept;

    fn quiet() -> Percept {
        Percept::default()
    }

    /// Observations that prove a safe region around the bottom-left corner:
    /// visited (3,0) and (2,0), provably safe (1,0), (2,1), (3,1).
    fn corner_inference() -> HazardInference {
        let mut inference = HazardInference::new(Grid::new(4)).unwrap();
        inference.observe(Cell::new(3, 0), quiet()).unwrap();
        inference.observe(Cell::new(2, 0), quiet()).unwrap();
        inference
    }

    fn assert_adjacent_chain(path: &[Cell]) {
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "non-adjacent step in {path:?}");
        }
    }

    #[test]
    fn safe_path_connects_through_justified_cells() {
        let mut inference = corner_inference();
        let path = find_safe_path(&mut inference, Cell::new(3, 0), Cell::new(1, 0))
            .unwrap()
            .expect("safe corridor exists");

        assert_eq!(path.first(), Some(&Cell::new(3, 0)));
        assert_eq!(path.last(), Some(&Cell::new(1, 0)));
        assert_adjacent_chain(&path);
        for &cell in &path[1..] {
            assert!(
                inference.is_visited(cell) || inference.is_safe(cell).unwrap(),
                "unjustified cell {cell} on path"
            );
        }
    }

    #[test]
    fn unproven_target_is_unreachable_by_safe_path() {
        let mut inference = corner_inference();
        assert_eq!(
            find_safe_path(&mut inference, Cell::new(3, 0), Cell::new(0, 3)).unwrap(),
            None
        );
    }

    #[test]
    fn risky_search_exempts_only_the_target() {
        let mut inference = corner_inference();

        // (1,1) borders the safe region; reachable with the exemption.
        let path = find_safe_path_to_risky(&mut inference, Cell::new(3, 0), Cell::new(1, 1))
            .unwrap()
            .expect("risky target adjacent to safe region");
        assert_eq!(path.last(), Some(&Cell::new(1, 1)));
        assert_adjacent_chain(&path);
        for &cell in &path[1..path.len() - 1] {
            assert!(inference.is_visited(cell) || inference.is_safe(cell).unwrap());
        }

        // (0,3) is ringed by unproven cells; the exemption does not help.
        assert_eq!(
            find_safe_path_to_risky(&mut inference, Cell::new(3, 0), Cell::new(0, 3)).unwrap(),
            None
        );
    }

    #[test]
    fn closest_frontier_candidate_wins() {
        let mut inference = corner_inference();
        let frontier = inference.safe_frontier().unwrap();
        assert!(frontier.contains(&Cell::new(3, 1)));

        let (target, path) =
            find_closest_safe_path(&mut inference, &frontier, Cell::new(3, 0))
                .unwrap()
                .expect("frontier is reachable");
        // (3,1) is the only frontier cell at distance 1.
        assert_eq!(target, Cell::new(3, 1));
        assert_eq!(path, vec![Cell::new(3, 0), Cell::new(3, 1)]);
    }

    #[test]
    fn empty_frontier_yields_no_plan() {
        let mut inference = HazardInference::new(Grid::new(4)).unwrap();
        inference
            .observe(
                Cell::new(3, 0),
                Percept {
                    breeze: true,
                    ..Percept::default()
                },
            )
            .unwrap();
        let frontier = inference.safe_frontier().unwrap();
        assert!(frontier.is_empty());
        assert_eq!(
            find_closest_safe_path(&mut inference, &frontier, Cell::new(3, 0)).unwrap(),
            None
        );
    }
}
