//! Resource Bundles
//!
//! A bundle is a set of exclusive resources (agents, nodes, facilities)
//! plus a fungible energy amount. Bundles serve both as the pool a zone can
//! hand out and as the request a plan makes against that pool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use colony_world::{AgentId, FacilityId, NodeId};

use crate::error::{InvariantViolation, ResourceKind};

/// Exclusive resources plus fungible energy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub agents: BTreeSet<AgentId>,
    pub nodes: BTreeSet<NodeId>,
    pub facilities: BTreeSet<FacilityId>,
    pub energy: u64,
}

impl ResourceBundle {
    pub fn new(
        agents: impl IntoIterator<Item = AgentId>,
        nodes: impl IntoIterator<Item = NodeId>,
        facilities: impl IntoIterator<Item = FacilityId>,
        energy: u64,
    ) -> Self {
        Self {
            agents: agents.into_iter().collect(),
            nodes: nodes.into_iter().collect(),
            facilities: facilities.into_iter().collect(),
            energy,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, agent: impl Into<AgentId>) -> Self {
        self.agents.insert(agent.into());
        self
    }

    pub fn with_node(mut self, node: impl Into<NodeId>) -> Self {
        self.nodes.insert(node.into());
        self
    }

    pub fn with_facility(mut self, facility: impl Into<FacilityId>) -> Self {
        self.facilities.insert(facility.into());
        self
    }

    pub fn with_energy(mut self, energy: u64) -> Self {
        self.energy = energy;
        self
    }

    /// Whether the bundle holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
            && self.nodes.is_empty()
            && self.facilities.is_empty()
            && self.energy == 0
    }

    /// Number of exclusive resources held.
    pub fn exclusive_count(&self) -> usize {
        self.agents.len() + self.nodes.len() + self.facilities.len()
    }

    /// Whether no exclusive resource appears in both bundles.
    pub fn is_disjoint(&self, other: &ResourceBundle) -> bool {
        self.agents.is_disjoint(&other.agents)
            && self.nodes.is_disjoint(&other.nodes)
            && self.facilities.is_disjoint(&other.facilities)
    }

    /// Whether this pool holds every exclusive resource in `request` and at
    /// least as much energy.
    pub fn can_satisfy(&self, request: &ResourceBundle) -> bool {
        request.agents.is_subset(&self.agents)
            && request.nodes.is_subset(&self.nodes)
            && request.facilities.is_subset(&self.facilities)
            && request.energy <= self.energy
    }

    /// Adds another request into this one.
    ///
    /// Exclusive resources are sets, not multisets: a resource already
    /// present is a duplicate claim. On error `self` is left unchanged.
    pub fn absorb(&mut self, other: &ResourceBundle) -> Result<(), InvariantViolation> {
        if let Some(id) = self.agents.intersection(&other.agents).next() {
            return Err(duplicate(ResourceKind::Agent, id));
        }
        if let Some(id) = self.nodes.intersection(&other.nodes).next() {
            return Err(duplicate(ResourceKind::Node, id));
        }
        if let Some(id) = self.facilities.intersection(&other.facilities).next() {
            return Err(duplicate(ResourceKind::Facility, id));
        }

        self.agents.extend(other.agents.iter().cloned());
        self.nodes.extend(other.nodes.iter().cloned());
        self.facilities.extend(other.facilities.iter().cloned());
        self.energy = self.energy.saturating_add(other.energy);
        Ok(())
    }

    /// Returns this pool with `request` removed.
    ///
    /// Fails if the request names a resource not in the pool or asks for more
    /// energy than the pool holds.
    pub fn difference(&self, request: &ResourceBundle) -> Result<ResourceBundle, InvariantViolation> {
        if let Some(id) = request.agents.difference(&self.agents).next() {
            return Err(missing(ResourceKind::Agent, id));
        }
        if let Some(id) = request.nodes.difference(&self.nodes).next() {
            return Err(missing(ResourceKind::Node, id));
        }
        if let Some(id) = request.facilities.difference(&self.facilities).next() {
            return Err(missing(ResourceKind::Facility, id));
        }
        if request.energy > self.energy {
            return Err(InvariantViolation::EnergyOvershoot {
                requested: request.energy,
                available: self.energy,
            });
        }

        Ok(ResourceBundle {
            agents: self.agents.difference(&request.agents).cloned().collect(),
            nodes: self.nodes.difference(&request.nodes).cloned().collect(),
            facilities: self
                .facilities
                .difference(&request.facilities)
                .cloned()
                .collect(),
            energy: self.energy - request.energy,
        })
    }
}

/// Combines requests into one, failing on any resource claimed twice.
pub fn aggregate<'a>(
    requests: impl IntoIterator<Item = &'a ResourceBundle>,
) -> Result<ResourceBundle, InvariantViolation> {
    let mut total = ResourceBundle::empty();
    for request in requests {
        total.absorb(request)?;
    }
    Ok(total)
}

fn duplicate(kind: ResourceKind, id: &impl ToString) -> InvariantViolation {
    InvariantViolation::DuplicateClaim {
        kind,
        id: id.to_string(),
    }
}

fn missing(kind: ResourceKind, id: &impl ToString) -> InvariantViolation {
    InvariantViolation::MissingResource {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ResourceBundle {
        ResourceBundle::empty()
            .with_agent("a1")
            .with_agent("a2")
            .with_node("n1")
            .with_facility("f1")
            .with_energy(300)
    }

    #[test]
    fn test_difference_removes_requested() {
        let request = ResourceBundle::empty()
            .with_agent("a1")
            .with_node("n1")
            .with_energy(100);

        let remaining = pool().difference(&request).unwrap();

        assert_eq!(remaining.agents.len(), 1);
        assert!(remaining.agents.contains(&AgentId::new("a2")));
        assert!(remaining.nodes.is_empty());
        assert_eq!(remaining.facilities.len(), 1);
        assert_eq!(remaining.energy, 200);
    }

    #[test]
    fn test_difference_missing_resource() {
        let request = ResourceBundle::empty().with_node("n2");

        assert_eq!(
            pool().difference(&request),
            Err(InvariantViolation::MissingResource {
                kind: ResourceKind::Node,
                id: "n2".to_string()
            })
        );
    }

    #[test]
    fn test_difference_energy_overshoot() {
        let request = ResourceBundle::empty().with_energy(301);

        assert_eq!(
            pool().difference(&request),
            Err(InvariantViolation::EnergyOvershoot {
                requested: 301,
                available: 300
            })
        );
    }

    #[test]
    fn test_can_satisfy() {
        let pool = pool();
        assert!(pool.can_satisfy(&ResourceBundle::empty()));
        assert!(pool.can_satisfy(&ResourceBundle::empty().with_agent("a2").with_energy(300)));
        assert!(!pool.can_satisfy(&ResourceBundle::empty().with_agent("a3")));
        assert!(!pool.can_satisfy(&ResourceBundle::empty().with_energy(301)));
    }

    #[test]
    fn test_absorb_rejects_duplicate_and_leaves_self_unchanged() {
        let mut total = ResourceBundle::empty().with_agent("a1").with_energy(10);
        let other = ResourceBundle::empty()
            .with_node("n1")
            .with_agent("a1")
            .with_energy(5);

        let err = total.absorb(&other).unwrap_err();

        assert_eq!(
            err,
            InvariantViolation::DuplicateClaim {
                kind: ResourceKind::Agent,
                id: "a1".to_string()
            }
        );
        assert!(total.nodes.is_empty());
        assert_eq!(total.energy, 10);
    }

    #[test]
    fn test_aggregate_sums_energy() {
        let a = ResourceBundle::empty().with_agent("a1").with_energy(60);
        let b = ResourceBundle::empty().with_agent("a2").with_energy(60);

        let total = aggregate([&a, &b]).unwrap();

        assert_eq!(total.agents.len(), 2);
        assert_eq!(total.energy, 120);
    }

    #[test]
    fn test_disjoint() {
        let a = ResourceBundle::empty().with_node("n1");
        let b = ResourceBundle::empty().with_node("n2").with_energy(50);
        let c = ResourceBundle::empty().with_node("n1");

        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&c));
        // Energy never makes bundles overlap
        assert!(b.is_disjoint(&ResourceBundle::empty().with_energy(50)));
    }

    #[test]
    fn test_empty() {
        assert!(ResourceBundle::empty().is_empty());
        assert!(!ResourceBundle::empty().with_energy(1).is_empty());
        assert_eq!(pool().exclusive_count(), 4);
    }
}
