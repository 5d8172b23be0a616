//! Planner Errors
//!
//! Only programming errors and static data mismatches are errors here.
//! Shortfalls the world imposes (a deficit nobody can fill this tick, a
//! node nobody can reach) are carried as data on plans and assignments.

use colony_world::BodyPart;
use std::fmt;
use thiserror::Error;

/// The kind of exclusive resource a bundle tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Agent,
    Node,
    Facility,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Agent => write!(f, "agent"),
            ResourceKind::Node => write!(f, "node"),
            ResourceKind::Facility => write!(f, "facility"),
        }
    }
}

/// Errors that abort the current zone's tick.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("objective {objective} produced a plan with invalid importance {importance}")]
    InvalidImportance { objective: String, importance: f64 },
}

/// An internal contract breach.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("{kind} {id} is not available")]
    MissingResource { kind: ResourceKind, id: String },

    #[error("{kind} {id} is claimed more than once")]
    DuplicateClaim { kind: ResourceKind, id: String },

    #[error("requested {requested} energy but only {available} is available")]
    EnergyOvershoot { requested: u64, available: u64 },

    #[error("{kind} {id} does not exist in the world snapshot")]
    UnknownEntity { kind: ResourceKind, id: String },

    #[error("zone {zone} has more than one objective named {name}")]
    DuplicateObjective { zone: String, name: String },
}

/// Static data that does not match what the code needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no cost configured for body part {part:?}")]
    MissingPartCost { part: BodyPart },

    #[error("unrecognized body part {name:?} in part cost table")]
    UnknownBodyPart { name: String },

    #[error("part costs of body {body:?} overflow")]
    CostOverflow { body: Vec<BodyPart> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err: PlannerError = InvariantViolation::MissingResource {
            kind: ResourceKind::Node,
            id: "node_0001".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invariant violation: node node_0001 is not available"
        );

        let err: PlannerError = ConfigurationError::MissingPartCost {
            part: BodyPart::Heal,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: no cost configured for body part Heal"
        );
    }
}
