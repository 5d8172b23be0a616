//! Per-zone resource bookkeeping across planning rounds.

use colony_world::ZoneId;
use tracing::debug;

use crate::arbiter::{self, Arbitration};
use crate::config::ArbiterConfig;
use crate::error::PlannerError;
use crate::objective::Plan;
use crate::resources::{snapshot, ResourceBundle};
use crate::world::WorldView;

/// Tracks what a zone started the tick with and what is still unclaimed.
///
/// `available` only ever shrinks, and always stays a subset of `managed`.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    zone: ZoneId,
    managed: ResourceBundle,
    available: ResourceBundle,
}

impl ResourceManager {
    pub fn new(zone: ZoneId, managed: ResourceBundle) -> Self {
        Self {
            zone,
            available: managed.clone(),
            managed,
        }
    }

    /// Starts from everything the zone currently holds.
    pub fn from_world<W: WorldView + ?Sized>(world: &W, zone: &ZoneId) -> Self {
        Self::new(zone.clone(), snapshot(world, zone))
    }

    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    pub fn managed(&self) -> &ResourceBundle {
        &self.managed
    }

    pub fn available(&self) -> &ResourceBundle {
        &self.available
    }

    /// Whether nothing is left to hand out.
    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }

    /// Whether all of `plans` fit in what is left at once.
    pub fn can_satisfy(&self, plans: &[Plan]) -> bool {
        arbiter::can_satisfy_all(&self.available, plans)
    }

    /// Arbitrates `plans` against what is left. Does not commit.
    pub fn arbitrate(
        &self,
        plans: Vec<Plan>,
        config: &ArbiterConfig,
    ) -> Result<Arbitration, PlannerError> {
        arbiter::arbitrate(&self.available, plans, config)
    }

    /// Removes the accepted plans' resources from what is left.
    pub fn commit(&mut self, accepted: &[Plan]) -> Result<(), PlannerError> {
        arbiter::commit(&mut self.available, accepted)?;
        debug!(
            zone = %self.zone,
            plans = accepted.len(),
            agents_left = self.available.agents.len(),
            nodes_left = self.available.nodes.len(),
            facilities_left = self.available.facilities.len(),
            energy_left = self.available.energy,
            "committed plans"
        );
        Ok(())
    }
}
