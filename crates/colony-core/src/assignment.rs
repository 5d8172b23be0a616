//! Worker Assignment
//!
//! Places workers on contended targets, nearest first, with a fixed
//! per-target capacity.
//!
//! Workers are taken in the order given. Each one is placed on the closest
//! target (by path length, ties broken by target ID) that still has room.
//! Targets a worker cannot reach are not candidates for that worker at all.
//!
//! This is a greedy heuristic, not a min-cost matching: an early worker can
//! take a slot that a later worker was much closer to. It is deterministic
//! and cheap enough to run for every zone on every tick.

use serde::Serialize;
use std::collections::BTreeMap;

use colony_world::{AgentId, AgentSnapshot, NodeId, NodeSnapshot, ZoneId};

use crate::world::DistanceOracle;

/// Result of placing workers on targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Every target, with the workers placed on it in placement order
    target_to_agents: BTreeMap<NodeId, Vec<AgentId>>,
    agent_to_target: BTreeMap<AgentId, NodeId>,
    /// Workers left without a target, in input order
    unassigned: Vec<AgentId>,
}

impl Assignment {
    /// Workers placed on a target.
    pub fn roster(&self, target: &NodeId) -> &[AgentId] {
        self.target_to_agents
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn target_of(&self, agent: &AgentId) -> Option<&NodeId> {
        self.agent_to_target.get(agent)
    }

    pub fn target_to_agents(&self) -> &BTreeMap<NodeId, Vec<AgentId>> {
        &self.target_to_agents
    }

    pub fn agent_to_target(&self) -> &BTreeMap<AgentId, NodeId> {
        &self.agent_to_target
    }

    pub fn unassigned(&self) -> &[AgentId] {
        &self.unassigned
    }

    pub fn assigned_count(&self) -> usize {
        self.agent_to_target.len()
    }

    /// Targets with at least one worker.
    pub fn targets_used(&self) -> impl Iterator<Item = &NodeId> {
        self.target_to_agents
            .iter()
            .filter(|(_, roster)| !roster.is_empty())
            .map(|(target, _)| target)
    }
}

/// Assigns `agents` to `targets` in `zone`, at most `capacity` per target.
pub fn assign<D: DistanceOracle + ?Sized>(
    oracle: &D,
    zone: &ZoneId,
    agents: &[&AgentSnapshot],
    targets: &[&NodeSnapshot],
    capacity: usize,
) -> Assignment {
    let mut assignment = Assignment {
        target_to_agents: targets
            .iter()
            .map(|t| (t.node_id.clone(), Vec::new()))
            .collect(),
        ..Default::default()
    };

    for agent in agents {
        let mut candidates: Vec<(u32, &NodeId)> = targets
            .iter()
            .filter_map(|target| {
                oracle
                    .distance(zone, agent.position, target.position)
                    .map(|d| (d, &target.node_id))
            })
            .collect();
        candidates.sort();

        let chosen = candidates.into_iter().find_map(|(_, target)| {
            let roster = assignment.target_to_agents.get_mut(target)?;
            (roster.len() < capacity).then(|| {
                roster.push(agent.agent_id.clone());
                target.clone()
            })
        });

        match chosen {
            Some(target) => {
                assignment
                    .agent_to_target
                    .insert(agent.agent_id.clone(), target);
            }
            None => assignment.unassigned.push(agent.agent_id.clone()),
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_world::{AgentSpec, Position};

    /// Distance along the x axis only; targets at x < 0 are unreachable.
    struct LineOracle;

    impl DistanceOracle for LineOracle {
        fn distance(&self, _zone: &ZoneId, from: Position, to: Position) -> Option<u32> {
            (to.x >= 0).then(|| (from.x - to.x).unsigned_abs())
        }
    }

    fn agent(id: &str, x: i32) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: AgentId::new(id),
            zone: ZoneId::new("z"),
            position: Position::new(x, 0),
            body: AgentSpec::Harvester.body().to_vec(),
            owned: true,
            energy: 0,
            energy_capacity: 50,
        }
    }

    fn node(id: &str, x: i32) -> NodeSnapshot {
        NodeSnapshot {
            node_id: NodeId::new(id),
            zone: ZoneId::new("z"),
            position: Position::new(x, 0),
            energy: 1000,
        }
    }

    fn run(agents: &[AgentSnapshot], nodes: &[NodeSnapshot], capacity: usize) -> Assignment {
        let agents: Vec<&AgentSnapshot> = agents.iter().collect();
        let nodes: Vec<&NodeSnapshot> = nodes.iter().collect();
        assign(&LineOracle, &ZoneId::new("z"), &agents, &nodes, capacity)
    }

    #[test]
    fn test_nearest_first_with_overflow() {
        let agents: Vec<_> = (0..9).map(|i| agent(&format!("a{}", i), 1)).collect();
        let nodes = vec![node("near", 0), node("far", 10)];

        let result = run(&agents, &nodes, 4);

        assert_eq!(result.roster(&NodeId::new("near")).len(), 4);
        assert_eq!(result.roster(&NodeId::new("far")).len(), 4);
        assert_eq!(result.assigned_count(), 8);
        assert_eq!(result.unassigned(), &[AgentId::new("a8")]);
        // First four in input order got the near node
        assert_eq!(
            result.roster(&NodeId::new("near")),
            &["a0", "a1", "a2", "a3"].map(AgentId::new)
        );
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let agents: Vec<_> = (0..20).map(|i| agent(&format!("a{:02}", i), i)).collect();
        let nodes = vec![node("n1", 0), node("n2", 5), node("n3", 15)];

        for capacity in 0..6 {
            let result = run(&agents, &nodes, capacity);
            for roster in result.target_to_agents().values() {
                assert!(roster.len() <= capacity);
            }
            assert_eq!(result.assigned_count() + result.unassigned().len(), agents.len());
        }
    }

    #[test]
    fn test_inverse_map_consistent() {
        let agents: Vec<_> = (0..7).map(|i| agent(&format!("a{}", i), i * 2)).collect();
        let nodes = vec![node("n1", 1), node("n2", 9)];

        let result = run(&agents, &nodes, 3);

        for (agent_id, target) in result.agent_to_target() {
            let holders: Vec<&NodeId> = result
                .target_to_agents()
                .iter()
                .filter(|(_, roster)| roster.contains(agent_id))
                .map(|(t, _)| t)
                .collect();
            assert_eq!(holders, vec![target]);
        }
    }

    #[test]
    fn test_distance_tie_broken_by_target_id() {
        let agents = vec![agent("a", 5)];
        let nodes = vec![node("n_b", 3), node("n_a", 7)];

        let result = run(&agents, &nodes, 4);

        assert_eq!(result.target_of(&AgentId::new("a")), Some(&NodeId::new("n_a")));
    }

    #[test]
    fn test_unreachable_target_excluded() {
        let agents = vec![agent("a1", 0), agent("a2", 0)];
        let nodes = vec![node("walled", -1), node("open", 50)];

        let result = run(&agents, &nodes, 1);

        assert_eq!(result.target_of(&AgentId::new("a1")), Some(&NodeId::new("open")));
        // The unreachable node is never used even though it has room
        assert!(result.roster(&NodeId::new("walled")).is_empty());
        assert_eq!(result.unassigned(), &[AgentId::new("a2")]);
        assert_eq!(result.targets_used().collect::<Vec<_>>(), vec![&NodeId::new("open")]);
    }

    #[test]
    fn test_no_targets() {
        let agents = vec![agent("a1", 0)];
        let result = run(&agents, &[], 4);

        assert_eq!(result.assigned_count(), 0);
        assert_eq!(result.unassigned().len(), 1);
        assert!(result.target_to_agents().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let agents: Vec<_> = (0..12).map(|i| agent(&format!("a{:02}", i), (i * 7) % 11)).collect();
        let nodes = vec![node("n1", 2), node("n2", 6), node("n3", 9)];

        let first = run(&agents, &nodes, 3);
        for _ in 0..5 {
            assert_eq!(run(&agents, &nodes, 3), first);
        }
    }
}
