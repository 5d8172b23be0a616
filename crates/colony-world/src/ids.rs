//! Identifier Types
//!
//! String-backed identifiers for every entity the controller can claim.
//! All identifiers order lexicographically so that sets and maps keyed by
//! them iterate deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// A bounded region of the world with its own resource pool.
    ZoneId
);
string_id!(
    /// A worker agent.
    AgentId
);
string_id!(
    /// A harvestable resource node.
    NodeId
);
string_id!(
    /// A production facility that stores energy and manufactures agents.
    FacilityId
);

/// Generates an agent ID with the given sequence number.
pub fn generate_agent_id(sequence: u64) -> AgentId {
    AgentId(format!("agent_{:04}", sequence))
}

/// Generates a node ID with the given sequence number.
pub fn generate_node_id(sequence: u64) -> NodeId {
    NodeId(format!("node_{:04}", sequence))
}

/// Generates a facility ID with the given sequence number.
pub fn generate_facility_id(sequence: u64) -> FacilityId {
    FacilityId(format!("facility_{:04}", sequence))
}

/// Generates a zone ID with the given sequence number.
pub fn generate_zone_id(sequence: u64) -> ZoneId {
    ZoneId(format!("zone_{:02}", sequence))
}
