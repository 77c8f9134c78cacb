//! World snapshot persistence: JSON round-trips and reproducibility.

use rand::rngs::StdRng;
use rand::SeedableRng;

use spelunk::sim::{self, AgentKind};
use spelunk::world::World;

#[test]
fn world_round_trips_through_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("world.json");

    let mut rng = StdRng::seed_from_u64(21);
    let world = World::generate(8, 3, &mut rng).unwrap();
    world.save(&path).unwrap();

    let loaded = World::load(&path).unwrap();
    assert_eq!(loaded, world);
    // Percepts derive from the same ground truth.
    for cell in world.grid().cells() {
        assert_eq!(loaded.percepts(cell), world.percepts(cell));
    }
}

#[test]
fn loaded_world_reproduces_the_episode() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("world.json");

    let mut rng = StdRng::seed_from_u64(4);
    let original = World::generate(6, 2, &mut rng).unwrap();
    original.save(&path).unwrap();

    let mut first = original.clone();
    let report_a = sim::run_in_world(&mut first, AgentKind::Explorer, 9, 100).unwrap();

    let mut second = World::load(&path).unwrap();
    let report_b = sim::run_in_world(&mut second, AgentKind::Explorer, 9, 100).unwrap();

    assert_eq!(report_a, report_b);
}

#[test]
fn corrupt_snapshot_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"not\": \"a world\"}").unwrap();
    assert!(World::load(&path).is_err());
}

#[test]
fn truncated_cell_grid_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("short.json");

    // Structurally valid, but the cell vector does not cover the grid.
    let json = r#"{
        "size": 4,
        "cells": [{"pit": false, "wumpus": false, "gold": false}],
        "start": {"row": 3, "col": 0},
        "agent_pos": {"row": 3, "col": 0},
        "alive": true,
        "gold_found": false
    }"#;
    std::fs::write(&path, json).unwrap();
    assert!(World::load(&path).is_err());
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(World::load(&dir.path().join("absent.json")).is_err());
}
