//! Objectives and Plans
//!
//! An objective is a standing goal for one zone. Each planning round it
//! looks at the world and proposes a [`Plan`]: the resources it wants, how
//! much it matters, and what it would do with them. The arbiter decides
//! which plans actually run.

pub mod growth;

pub use growth::GrowthObjective;

use serde::Serialize;

use colony_world::{AgentSnapshot, AgentSpec, ZoneId};

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::policy::Policy;
use crate::resources::ResourceBundle;
use crate::world::WorldView;

/// An immutable proposal produced by one objective invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    objective: String,
    zone: ZoneId,
    importance: f64,
    request: ResourceBundle,
    policy: Policy,
    /// Shortfall the plan knows it cannot cover this tick
    unresolved_deficit: u32,
}

impl Plan {
    pub fn new(
        objective: impl Into<String>,
        zone: ZoneId,
        importance: f64,
        request: ResourceBundle,
        policy: Policy,
    ) -> Self {
        Self {
            objective: objective.into(),
            zone,
            importance,
            request,
            policy,
            unresolved_deficit: 0,
        }
    }

    pub fn with_unresolved_deficit(mut self, deficit: u32) -> Self {
        self.unresolved_deficit = deficit;
        self
    }

    /// Name of the objective that produced this plan.
    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn request(&self) -> &ResourceBundle {
        &self.request
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn unresolved_deficit(&self) -> u32 {
        self.unresolved_deficit
    }

    /// Importance must be finite and non-negative.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.importance.is_finite() && self.importance >= 0.0 {
            Ok(())
        } else {
            Err(PlannerError::InvalidImportance {
                objective: self.objective.clone(),
                importance: self.importance,
            })
        }
    }
}

/// Everything an objective may look at while planning.
pub struct PlanningContext<'a> {
    pub world: &'a dyn WorldView,
    /// What the zone can still hand out this tick
    pub available: &'a ResourceBundle,
    pub config: &'a PlannerConfig,
    /// Zero-based planning round within the tick
    pub round: usize,
}

/// A goal that proposes how to spend a zone's resources.
pub trait Objective {
    /// Stable, human-readable name. A zone rejects two objectives with the
    /// same name.
    fn name(&self) -> &str;

    fn zone(&self) -> &ZoneId;

    /// Importance to plan with in the given round.
    fn importance_hint(&self, round: usize) -> f64;

    fn generate_plan(
        &self,
        ctx: &PlanningContext<'_>,
        importance: f64,
    ) -> Result<Plan, PlannerError>;
}

/// Which existing agents an objective may claim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentSelector {
    /// Zones to draw agents from
    pub zones: Vec<ZoneId>,
    /// Accepted specs; empty accepts any recognized or unrecognized body
    pub specs: Vec<AgentSpec>,
}

impl AgentSelector {
    pub fn new(zones: Vec<ZoneId>, specs: Vec<AgentSpec>) -> Self {
        Self { zones, specs }
    }

    pub fn matches(&self, agent: &AgentSnapshot) -> bool {
        if !self.zones.contains(&agent.zone) {
            return false;
        }
        if self.specs.is_empty() {
            return true;
        }
        agent
            .spec()
            .is_some_and(|spec| self.specs.contains(&spec))
    }

    /// Owned agents matching the selector, zone by zone in selector order.
    pub fn select<'w, W: WorldView + ?Sized>(&self, world: &'w W) -> Vec<&'w AgentSnapshot> {
        self.zones
            .iter()
            .flat_map(|zone| world.owned_agents(zone))
            .filter(|agent| self.matches(agent))
            .collect()
    }
}
