//! The Growth Objective
//!
//! Keeps every node in a zone worked by harvesters and asks a facility for
//! one more harvester whenever node capacity is going unused.

use colony_world::{AgentSpec, ZoneId};
use tracing::{debug, warn};

use crate::assignment::assign;
use crate::error::PlannerError;
use crate::objective::{AgentSelector, Objective, Plan, PlanningContext};
use crate::policy::{Directive, Policy};
use crate::resources::ResourceBundle;

/// Harvest every node in a zone and grow the harvester count toward full
/// node capacity.
///
/// Stateless: asked twice about the same world it proposes the same plan.
#[derive(Debug, Clone)]
pub struct GrowthObjective {
    name: String,
    zone: ZoneId,
    selector: AgentSelector,
    importance: f64,
}

impl GrowthObjective {
    pub fn new(zone: ZoneId, importance: f64) -> Self {
        Self {
            name: format!("growth:{}", zone),
            selector: AgentSelector::new(vec![zone.clone()], vec![AgentSpec::Harvester]),
            zone,
            importance,
        }
    }

    pub fn selector(&self) -> &AgentSelector {
        &self.selector
    }
}

/// Unused harvester slots: `targets * capacity - assigned`, floored at zero.
///
/// This does not tell "no harvesters exist" apart from "nodes are only
/// partly staffed"; both simply show up as a positive deficit.
pub fn harvester_deficit(num_targets: usize, capacity: usize, num_assigned: usize) -> u32 {
    let deficit = (num_targets * capacity).saturating_sub(num_assigned);
    u32::try_from(deficit).unwrap_or(u32::MAX)
}

impl Objective for GrowthObjective {
    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &ZoneId {
        &self.zone
    }

    fn importance_hint(&self, _round: usize) -> f64 {
        self.importance
    }

    fn generate_plan(
        &self,
        ctx: &PlanningContext<'_>,
        importance: f64,
    ) -> Result<Plan, PlannerError> {
        let world = ctx.world;
        let capacity = ctx.config.assignment.per_target_capacity;

        let harvesters = self.selector.select(world);
        let nodes = world.nodes(&self.zone);
        let assignment = assign(world, &self.zone, &harvesters, &nodes, capacity);

        let deficit = harvester_deficit(nodes.len(), capacity, assignment.assigned_count());

        // One facility per tick at most, however large the deficit.
        let facilities: Vec<_> = if deficit > 0 {
            world
                .owned_facilities(&self.zone)
                .first()
                .map(|f| f.facility_id.clone())
                .into_iter()
                .collect()
        } else {
            Vec::new()
        };
        let unresolved = deficit.saturating_sub(facilities.len() as u32);
        if unresolved > 0 && facilities.is_empty() {
            warn!(zone = %self.zone, deficit, "no facility available to cover harvester deficit");
        }

        let mut policy = Policy::default();
        for agent in &harvesters {
            if let Some(node) = assignment.target_of(&agent.agent_id) {
                policy.push(Directive::Harvest {
                    agent: agent.agent_id.clone(),
                    node: node.clone(),
                });
            }
        }
        for facility in &facilities {
            policy.push(Directive::Create {
                facility: facility.clone(),
                spec: AgentSpec::Harvester,
            });
        }

        let request = ResourceBundle::new(
            assignment.agent_to_target().keys().cloned(),
            assignment.targets_used().cloned(),
            facilities,
            0,
        );

        debug!(
            objective = %self.name,
            harvesters = harvesters.len(),
            nodes = nodes.len(),
            assigned = assignment.assigned_count(),
            unassigned = assignment.unassigned().len(),
            deficit,
            "generated growth plan"
        );

        Ok(
            Plan::new(self.name.clone(), self.zone.clone(), importance, request, policy)
                .with_unresolved_deficit(unresolved),
        )
    }
}
