//! World Access
//!
//! The planner reads the world only through [`WorldView`]: entity queries by
//! zone and kind, plus a [`DistanceOracle`] for path lengths. Both are
//! answered from the tick-start snapshot, so every call within a tick sees
//! the same world.

use std::collections::{HashSet, VecDeque};

use colony_world::{
    AgentId, AgentSnapshot, FacilityId, FacilitySnapshot, NodeId, NodeSnapshot, Position,
    WorldSnapshot, ZoneId, ZoneSnapshot,
};

/// What a world query is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Agents this controller owns
    OwnedAgent,
    /// Harvestable nodes
    Node,
    /// Facilities this controller owns
    OwnedFacility,
}

/// A borrowed entity returned by [`WorldView::find`].
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Agent(&'a AgentSnapshot),
    Node(&'a NodeSnapshot),
    Facility(&'a FacilitySnapshot),
}

/// Shortest-path lengths between positions in a zone.
pub trait DistanceOracle {
    /// Number of steps from `from` to `to`, or `None` when no path exists.
    fn distance(&self, zone: &ZoneId, from: Position, to: Position) -> Option<u32>;
}

/// Read access to the tick's world state.
pub trait WorldView: DistanceOracle {
    /// Entities of one kind in a zone, in stable world order.
    fn find(&self, zone: &ZoneId, kind: EntityKind) -> Vec<EntityRef<'_>>;

    fn agent(&self, agent_id: &AgentId) -> Option<&AgentSnapshot>;

    fn node(&self, node_id: &NodeId) -> Option<&NodeSnapshot>;

    fn facility(&self, facility_id: &FacilityId) -> Option<&FacilitySnapshot>;

    fn owned_agents(&self, zone: &ZoneId) -> Vec<&AgentSnapshot> {
        self.find(zone, EntityKind::OwnedAgent)
            .into_iter()
            .filter_map(|entity| match entity {
                EntityRef::Agent(agent) => Some(agent),
                _ => None,
            })
            .collect()
    }

    fn nodes(&self, zone: &ZoneId) -> Vec<&NodeSnapshot> {
        self.find(zone, EntityKind::Node)
            .into_iter()
            .filter_map(|entity| match entity {
                EntityRef::Node(node) => Some(node),
                _ => None,
            })
            .collect()
    }

    fn owned_facilities(&self, zone: &ZoneId) -> Vec<&FacilitySnapshot> {
        self.find(zone, EntityKind::OwnedFacility)
            .into_iter()
            .filter_map(|entity| match entity {
                EntityRef::Facility(facility) => Some(facility),
                _ => None,
            })
            .collect()
    }
}

/// A [`WorldView`] over a [`WorldSnapshot`], with BFS pathfinding over each
/// zone's grid.
///
/// Moves are to any of the eight neighboring tiles. Walls block movement
/// but the destination tile itself is always enterable, since targets such
/// as nodes and facilities occupy their own tile. A zone without terrain in
/// the snapshot is treated as an open grid.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotWorld<'a> {
    snapshot: &'a WorldSnapshot,
}

impl<'a> SnapshotWorld<'a> {
    pub fn new(snapshot: &'a WorldSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a WorldSnapshot {
        self.snapshot
    }
}

impl DistanceOracle for SnapshotWorld<'_> {
    fn distance(&self, zone: &ZoneId, from: Position, to: Position) -> Option<u32> {
        match self.snapshot.zone(zone) {
            Some(grid) => bfs_distance(grid, from, to),
            None => Some(from.chebyshev(&to)),
        }
    }
}

impl WorldView for SnapshotWorld<'_> {
    fn find(&self, zone: &ZoneId, kind: EntityKind) -> Vec<EntityRef<'_>> {
        match kind {
            EntityKind::OwnedAgent => self
                .snapshot
                .owned_agents_in(zone)
                .map(EntityRef::Agent)
                .collect(),
            EntityKind::Node => self.snapshot.nodes_in(zone).map(EntityRef::Node).collect(),
            EntityKind::OwnedFacility => self
                .snapshot
                .owned_facilities_in(zone)
                .map(EntityRef::Facility)
                .collect(),
        }
    }

    fn agent(&self, agent_id: &AgentId) -> Option<&AgentSnapshot> {
        self.snapshot.agent(agent_id)
    }

    fn node(&self, node_id: &NodeId) -> Option<&NodeSnapshot> {
        self.snapshot.node(node_id)
    }

    fn facility(&self, facility_id: &FacilityId) -> Option<&FacilitySnapshot> {
        self.snapshot.facility(facility_id)
    }
}

fn bfs_distance(grid: &ZoneSnapshot, from: Position, to: Position) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    if !grid.contains(&to) {
        return None;
    }

    let walls: HashSet<Position> = grid.walls.iter().copied().collect();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    queue.push_back((from, 0u32));

    while let Some((pos, steps)) = queue.pop_front() {
        for next in pos.neighbors() {
            if next == to {
                return Some(steps + 1);
            }
            if !grid.contains(&next) || walls.contains(&next) || !visited.insert(next) {
                continue;
            }
            queue.push_back((next, steps + 1));
        }
    }

    None
}
