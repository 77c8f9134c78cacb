//! # spelunk
//!
//! A knowledge-based agent that explores a partially observable hazard grid
//! (a Wumpus World) using only local percepts, proving cells safe or
//! hazardous with an incrementally grown CNF knowledge base and an
//! assumption-based satisfiability oracle.
//!
//! ## Architecture
//!
//! - **Knowledge base** (`kb`): per-cell hazard variables, monotonic clause
//!   set, DPLL oracle behind a swappable capability trait
//! - **Inference** (`infer`): percept-to-clause translation, per-cell
//!   classification, direct-deduction and satisfiability-sweep passes
//! - **Risk & planning** (`risk`, `plan`): desirability scoring plus
//!   safety-constrained breadth-first pathfinding
//! - **Decision policy** (`agent`): fixed-priority move selection
//! - **World & simulation** (`world`, `sim`): grid generation with a
//!   winnability guarantee, episode loop, parallel batch trials
//!
//! ## Library usage
//!
//! ```no_run
//! use spelunk::sim::{run_seeded_episode, AgentKind};
//!
//! let report = run_seeded_episode(42, 8, 3, AgentKind::Explorer, 200).unwrap();
//! println!("{} after {} steps", report.outcome, report.steps);
//! ```

pub mod agent;
pub mod error;
pub mod grid;
pub mod infer;
pub mod kb;
pub mod plan;
pub mod risk;
pub mod sim;
pub mod world;
