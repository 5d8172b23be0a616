//! Body Parts and Agent Specifications
//!
//! An agent's capabilities are fully described by its body: an ordered list
//! of parts. The controller recognizes a closed set of bodies as
//! [`AgentSpec`] variants; an agent whose body matches none of them is
//! simply not eligible for any spec-filtered objective.

use serde::{Deserialize, Serialize};

/// A single body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Move,
    Work,
    Carry,
    Attack,
    RangedAttack,
    Heal,
    Tough,
}

impl BodyPart {
    /// Every body part, in declaration order.
    pub const ALL: [BodyPart; 7] = [
        BodyPart::Move,
        BodyPart::Work,
        BodyPart::Carry,
        BodyPart::Attack,
        BodyPart::RangedAttack,
        BodyPart::Heal,
        BodyPart::Tough,
    ];

    /// The snake_case name used in serialized data and cost tables.
    pub fn name(&self) -> &'static str {
        match self {
            BodyPart::Move => "move",
            BodyPart::Work => "work",
            BodyPart::Carry => "carry",
            BodyPart::Attack => "attack",
            BodyPart::RangedAttack => "ranged_attack",
            BodyPart::Heal => "heal",
            BodyPart::Tough => "tough",
        }
    }

    pub fn from_name(name: &str) -> Option<BodyPart> {
        Self::ALL.into_iter().find(|part| part.name() == name)
    }
}

/// A recognized agent specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentSpec {
    /// Harvests energy from a node and carries it back to a facility
    Harvester,
    /// Moves energy between facilities
    Hauler,
}

const HARVESTER_BODY: &[BodyPart] = &[
    BodyPart::Move,
    BodyPart::Work,
    BodyPart::Move,
    BodyPart::Work,
    BodyPart::Carry,
];

const HAULER_BODY: &[BodyPart] = &[
    BodyPart::Carry,
    BodyPart::Carry,
    BodyPart::Move,
    BodyPart::Move,
];

impl AgentSpec {
    pub const ALL: [AgentSpec; 2] = [AgentSpec::Harvester, AgentSpec::Hauler];

    /// The exact body manufactured for this spec.
    pub fn body(&self) -> &'static [BodyPart] {
        match self {
            AgentSpec::Harvester => HARVESTER_BODY,
            AgentSpec::Hauler => HAULER_BODY,
        }
    }

    /// Recognizes a body by structural equality with a known spec.
    pub fn from_body(body: &[BodyPart]) -> Option<AgentSpec> {
        Self::ALL.into_iter().find(|spec| spec.body() == body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvester_body_roundtrips() {
        let body = AgentSpec::Harvester.body().to_vec();
        assert_eq!(AgentSpec::from_body(&body), Some(AgentSpec::Harvester));
    }

    #[test]
    fn test_part_order_matters() {
        let body = vec![
            BodyPart::Work,
            BodyPart::Move,
            BodyPart::Move,
            BodyPart::Work,
            BodyPart::Carry,
        ];
        assert_eq!(AgentSpec::from_body(&body), None);
    }

    #[test]
    fn test_unknown_body_is_unrecognized() {
        assert_eq!(AgentSpec::from_body(&[BodyPart::Tough, BodyPart::Attack]), None);
        assert_eq!(AgentSpec::from_body(&[]), None);
    }

    #[test]
    fn test_part_names_match_serde() {
        for part in BodyPart::ALL {
            let json = serde_json::to_string(&part).unwrap();
            assert_eq!(json, format!("\"{}\"", part.name()));
            assert_eq!(BodyPart::from_name(part.name()), Some(part));
        }
        assert_eq!(BodyPart::from_name("claw"), None);
    }

    #[test]
    fn test_body_part_serialization() {
        assert_eq!(
            serde_json::to_string(&BodyPart::RangedAttack).unwrap(),
            r#""ranged_attack""#
        );
        assert_eq!(serde_json::to_string(&AgentSpec::Harvester).unwrap(), r#""harvester""#);
    }
}
