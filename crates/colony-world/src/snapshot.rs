//! Snapshot Types
//!
//! Serialization structs for the world state captured at tick start.
//!
//! A snapshot is immutable for the duration of a tick: every planning call
//! reads from the same snapshot, so nothing observes a half-updated world.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{AgentId, AgentSpec, BodyPart, FacilityId, NodeId, Position, ZoneId};

/// Zone terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone_id: ZoneId,
    pub width: i32,
    pub height: i32,
    /// Impassable tiles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walls: Vec<Position>,
}

impl ZoneSnapshot {
    /// Whether a position lies inside the zone's grid.
    pub fn contains(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Whether a position is inside the grid and not a wall.
    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.contains(pos) && !self.walls.contains(pos)
    }
}

/// Worker agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub zone: ZoneId,
    pub position: Position,
    pub body: Vec<BodyPart>,
    /// Whether this controller owns the agent
    #[serde(default = "default_true")]
    pub owned: bool,
    /// Energy currently carried
    #[serde(default)]
    pub energy: u32,
    #[serde(default)]
    pub energy_capacity: u32,
}

impl AgentSnapshot {
    /// The recognized spec of this agent's body, if any.
    pub fn spec(&self) -> Option<AgentSpec> {
        AgentSpec::from_body(&self.body)
    }

    pub fn is_full(&self) -> bool {
        self.energy >= self.energy_capacity
    }
}

/// Harvestable resource node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_id: NodeId,
    pub zone: ZoneId,
    pub position: Position,
    /// Energy remaining in the node
    #[serde(default)]
    pub energy: u32,
}

/// Production facility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    pub facility_id: FacilityId,
    pub zone: ZoneId,
    pub position: Position,
    #[serde(default = "default_true")]
    pub owned: bool,
    /// Energy stored in the facility
    #[serde(default)]
    pub energy: u32,
    #[serde(default)]
    pub energy_capacity: u32,
}

fn default_true() -> bool {
    true
}

/// The full world state at tick start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    #[serde(default)]
    pub zones: Vec<ZoneSnapshot>,
    #[serde(default)]
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default)]
    pub facilities: Vec<FacilitySnapshot>,
}

impl WorldSnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn zone(&self, zone_id: &ZoneId) -> Option<&ZoneSnapshot> {
        self.zones.iter().find(|z| &z.zone_id == zone_id)
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| &a.agent_id == agent_id)
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| &n.node_id == node_id)
    }

    pub fn facility(&self, facility_id: &FacilityId) -> Option<&FacilitySnapshot> {
        self.facilities.iter().find(|f| &f.facility_id == facility_id)
    }

    /// Owned agents in a zone, in snapshot order.
    pub fn owned_agents_in<'a>(&'a self, zone: &ZoneId) -> impl Iterator<Item = &'a AgentSnapshot> + 'a {
        let zone = zone.clone();
        self.agents.iter().filter(move |a| a.owned && a.zone == zone)
    }

    /// Nodes in a zone, in snapshot order.
    pub fn nodes_in<'a>(&'a self, zone: &ZoneId) -> impl Iterator<Item = &'a NodeSnapshot> + 'a {
        let zone = zone.clone();
        self.nodes.iter().filter(move |n| n.zone == zone)
    }

    /// Owned facilities in a zone, in snapshot order.
    pub fn owned_facilities_in<'a>(
        &'a self,
        zone: &ZoneId,
    ) -> impl Iterator<Item = &'a FacilitySnapshot> + 'a {
        let zone = zone.clone();
        self.facilities
            .iter()
            .filter(move |f| f.owned && f.zone == zone)
    }

    /// Zones holding at least one owned agent or owned facility, sorted.
    pub fn controlled_zones(&self) -> Vec<ZoneId> {
        let zones: BTreeSet<ZoneId> = self
            .agents
            .iter()
            .filter(|a| a.owned)
            .map(|a| a.zone.clone())
            .chain(
                self.facilities
                    .iter()
                    .filter(|f| f.owned)
                    .map(|f| f.zone.clone()),
            )
            .collect();
        zones.into_iter().collect()
    }
}
