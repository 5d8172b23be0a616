//! Sample data fixtures for testing.
//!
//! This module provides a ready-made world snapshot for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // colony-world = { path = "../colony-world", features = ["test-fixtures"] }
//!
//! use colony_world::fixtures;
//!
//! let world = fixtures::sample_world();
//! ```

use crate::{WorldSnapshot, ZoneId};

/// Returns the sample world snapshot from the fixtures file.
///
/// Contains:
/// - `zone_01`: 20x20 grid split by a wall with a gap at the bottom,
///   2 nodes (one on each side), 1 facility holding 300 energy,
///   9 owned harvesters (one of them carrying a full load) and 1 hostile agent
/// - `zone_02`: 10x10 grid where `node_0003` is walled in and unreachable,
///   `node_0004` is open, 1 facility holding 100 energy, 2 owned harvesters
pub fn sample_world() -> WorldSnapshot {
    let json = include_str!("../tests/fixtures/sample_world.json");
    WorldSnapshot::from_json(json).expect("Failed to parse sample_world.json")
}

/// The zone with more harvesters than node capacity.
pub fn crowded_zone() -> ZoneId {
    ZoneId::new("zone_01")
}

/// The zone with an unreachable node and a facility too poor to build.
pub fn sparse_zone() -> ZoneId {
    ZoneId::new("zone_02")
}
