//! Shared world types for the colony controller.
//!
//! This crate contains pure data structures with no planning logic.
//! It is a dependency for all other crates in the workspace.

pub mod body;
pub mod geometry;
pub mod ids;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use body::{AgentSpec, BodyPart};
pub use geometry::Position;
pub use ids::{
    generate_agent_id, generate_facility_id, generate_node_id, generate_zone_id, AgentId,
    FacilityId, NodeId, ZoneId,
};
pub use snapshot::{AgentSnapshot, FacilitySnapshot, NodeSnapshot, WorldSnapshot, ZoneSnapshot};
