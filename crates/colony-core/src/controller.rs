//! The Zone Controller
//!
//! Runs one tick of planning for each zone:
//!
//! ```text
//! Planning ──▶ Arbitrating ──▶ Committing ──┬──▶ Replanning ──▶ Planning
//!                                           └──▶ Done
//! ```
//!
//! Every active objective proposes a plan, the arbiter accepts the best
//! satisfiable subset, and the accepted plans' resources are committed.
//! Objectives whose plans were rejected stay active for the next round.
//! The loop ends when no objective is left, when a round neither accepts
//! nor drops a plan, or after `max_rounds` rounds. Accepted policies then run once each, in
//! acceptance order.
//!
//! Zones share nothing. A zone that fails reports its error and issues no
//! orders; the other zones are unaffected.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use colony_world::{WorldSnapshot, ZoneId};

use crate::arbiter::Arbitration;
use crate::config::{ControllerConfig, PlannerConfig};
use crate::cost::PartCostTable;
use crate::error::{InvariantViolation, PlannerError};
use crate::objective::{GrowthObjective, Objective, Plan, PlanningContext};
use crate::policy::{ActionSink, OrderLog};
use crate::resources::{ResourceBundle, ResourceManager};
use crate::world::WorldView;

/// Where a zone's planning loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Planning,
    Arbitrating,
    Committing,
    Replanning,
    Done,
}

/// What happened in one planning round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: usize,
    /// Objectives that proposed a plan this round
    pub submitted: usize,
    /// Plans dropped before arbitration to respect the per-round cap
    pub truncated: Vec<String>,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
}

/// Outcome of one zone's tick.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneTickReport {
    pub zone: ZoneId,
    pub rounds: Vec<RoundReport>,
    /// Accepted plans in acceptance order
    pub accepted: Vec<Plan>,
    /// Resources nobody claimed
    pub remaining: ResourceBundle,
    pub state: ControllerState,
    pub orders_issued: usize,
}

impl ZoneTickReport {
    pub fn accepted_importance(&self) -> f64 {
        self.accepted.iter().map(Plan::importance).sum()
    }

    /// Deficit the accepted plans could not cover this tick.
    pub fn unresolved_deficit(&self) -> u32 {
        self.accepted
            .iter()
            .map(Plan::unresolved_deficit)
            .fold(0, u32::saturating_add)
    }
}

/// The planning loop for a single zone, driven one state at a time.
pub struct ZoneController<'w> {
    world: &'w dyn WorldView,
    config: &'w PlannerConfig,
    manager: ResourceManager,
    active: Vec<&'w dyn Objective>,
    accepted: Vec<Plan>,
    pending: Vec<Plan>,
    arbitration: Option<Arbitration>,
    current: RoundReport,
    rounds: Vec<RoundReport>,
    round: usize,
    state: ControllerState,
}

impl<'w> ZoneController<'w> {
    /// Fails if two objectives share a name.
    pub fn new(
        world: &'w dyn WorldView,
        zone: &ZoneId,
        objectives: Vec<&'w dyn Objective>,
        config: &'w PlannerConfig,
    ) -> Result<Self, PlannerError> {
        let mut seen = BTreeSet::new();
        for objective in &objectives {
            if !seen.insert(objective.name()) {
                return Err(InvariantViolation::DuplicateObjective {
                    zone: zone.to_string(),
                    name: objective.name().to_string(),
                }
                .into());
            }
        }

        Ok(Self {
            world,
            config,
            manager: ResourceManager::from_world(world, zone),
            active: objectives,
            accepted: Vec::new(),
            pending: Vec::new(),
            arbitration: None,
            current: RoundReport::default(),
            rounds: Vec::new(),
            round: 0,
            state: ControllerState::Planning,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn zone(&self) -> &ZoneId {
        self.manager.zone()
    }

    pub fn available(&self) -> &ResourceBundle {
        self.manager.available()
    }

    /// Names of the objectives still waiting for resources.
    pub fn active_objectives(&self) -> Vec<&str> {
        self.active.iter().map(|o| o.name()).collect()
    }

    /// Advances by one state and returns the new state.
    pub fn step(&mut self) -> Result<ControllerState, PlannerError> {
        self.state = match self.state {
            ControllerState::Planning => self.plan()?,
            ControllerState::Arbitrating => self.arbitrate()?,
            ControllerState::Committing => self.commit()?,
            ControllerState::Replanning => {
                self.round += 1;
                ControllerState::Planning
            }
            ControllerState::Done => ControllerState::Done,
        };
        Ok(self.state)
    }

    /// Steps until done and reports what was accepted.
    pub fn run(mut self) -> Result<ZoneTickReport, PlannerError> {
        while self.step()? != ControllerState::Done {}

        Ok(ZoneTickReport {
            zone: self.manager.zone().clone(),
            rounds: self.rounds,
            accepted: self.accepted,
            remaining: self.manager.available().clone(),
            state: self.state,
            orders_issued: 0,
        })
    }

    fn plan(&mut self) -> Result<ControllerState, PlannerError> {
        if self.active.is_empty() || self.round >= self.config.controller.max_rounds {
            return Ok(ControllerState::Done);
        }

        let ctx = PlanningContext {
            world: self.world,
            available: self.manager.available(),
            config: self.config,
            round: self.round,
        };
        let mut plans = Vec::with_capacity(self.active.len());
        for objective in &self.active {
            let importance = objective.importance_hint(self.round);
            plans.push(objective.generate_plan(&ctx, importance)?);
        }

        let submitted = plans.len();
        let truncated = truncate_plans(
            &mut plans,
            self.manager.available(),
            self.config.arbiter.max_plans_per_round,
        );
        if !truncated.is_empty() {
            warn!(
                zone = %self.manager.zone(),
                round = self.round,
                submitted,
                dropped = truncated.len(),
                "too many plans for one round, dropping unsatisfiable then least important"
            );
        }

        self.current = RoundReport {
            round: self.round,
            submitted,
            truncated: truncated.iter().map(|p| p.objective().to_string()).collect(),
            ..Default::default()
        };
        self.pending = plans;
        Ok(ControllerState::Arbitrating)
    }

    fn arbitrate(&mut self) -> Result<ControllerState, PlannerError> {
        let plans = std::mem::take(&mut self.pending);
        let arbitration = self.manager.arbitrate(plans, &self.config.arbiter)?;
        for plan in &arbitration.rejected {
            debug!(
                zone = %self.manager.zone(),
                round = self.round,
                objective = plan.objective(),
                importance = plan.importance(),
                "plan rejected"
            );
        }
        self.arbitration = Some(arbitration);
        Ok(ControllerState::Committing)
    }

    fn commit(&mut self) -> Result<ControllerState, PlannerError> {
        let arbitration = self.arbitration.take().unwrap_or_default();
        self.manager.commit(&arbitration.accepted)?;

        let mut report = std::mem::take(&mut self.current);
        report.accepted = names(&arbitration.accepted);
        report.rejected = names(&arbitration.rejected);

        let retry: BTreeSet<&str> = report
            .rejected
            .iter()
            .chain(&report.truncated)
            .map(String::as_str)
            .collect();
        self.active.retain(|o| retry.contains(o.name()));

        // Dropped plans were never arbitrated, so a round that dropped any
        // still counts as progress
        let progress = !arbitration.accepted.is_empty() || !report.truncated.is_empty();
        self.accepted.extend(arbitration.accepted);
        self.rounds.push(report);

        let next = if self.active.is_empty()
            || !progress
            || self.round + 1 >= self.config.controller.max_rounds
        {
            ControllerState::Done
        } else {
            ControllerState::Replanning
        };
        Ok(next)
    }
}

fn names(plans: &[Plan]) -> Vec<String> {
    plans.iter().map(|p| p.objective().to_string()).collect()
}

/// Keeps at most `max` plans in submission order and returns the dropped
/// ones. Plans `available` cannot satisfy go first, then the least
/// important (ties drop the later plan).
fn truncate_plans(plans: &mut Vec<Plan>, available: &ResourceBundle, max: usize) -> Vec<Plan> {
    if plans.len() <= max {
        return Vec::new();
    }

    let feasible: Vec<bool> = plans
        .iter()
        .map(|p| available.can_satisfy(p.request()))
        .collect();
    let mut ranked: Vec<usize> = (0..plans.len()).collect();
    ranked.sort_by(|&a, &b| {
        feasible[b]
            .cmp(&feasible[a])
            .then(plans[b].importance().total_cmp(&plans[a].importance()))
            .then(a.cmp(&b))
    });
    let keep: BTreeSet<usize> = ranked.into_iter().take(max).collect();

    let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(plans)
        .into_iter()
        .enumerate()
        .partition(|(i, _)| keep.contains(i));
    *plans = kept.into_iter().map(|(_, p)| p).collect();
    dropped.into_iter().map(|(_, p)| p).collect()
}

/// Runs zone ticks with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Controller {
    config: PlannerConfig,
    costs: PartCostTable,
}

impl Controller {
    /// Fails if the part cost table names an unknown body part.
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        let costs = PartCostTable::from_config(&config.part_costs)?;
        Ok(Self { config, costs })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn costs(&self) -> &PartCostTable {
        &self.costs
    }

    /// Runs the planning loop for a zone without executing any policy.
    pub fn plan_zone<'w>(
        &'w self,
        world: &'w dyn WorldView,
        zone: &ZoneId,
        objectives: &[&'w dyn Objective],
    ) -> Result<ZoneTickReport, PlannerError> {
        ZoneController::new(world, zone, objectives.to_vec(), &self.config)?.run()
    }

    /// Plans a zone, then executes the accepted policies in acceptance order.
    ///
    /// Orders reach `sink` only if every policy applies cleanly.
    pub fn run_zone<'w, S: ActionSink + ?Sized>(
        &'w self,
        world: &'w dyn WorldView,
        zone: &ZoneId,
        objectives: &[&'w dyn Objective],
        sink: &mut S,
    ) -> Result<ZoneTickReport, PlannerError> {
        let mut report = self.plan_zone(world, zone, objectives)?;

        let mut orders = OrderLog::new();
        for plan in &report.accepted {
            plan.policy().apply(world, &self.costs, &mut orders)?;
        }
        orders.replay(sink);
        report.orders_issued = orders.len();

        info!(
            zone = %zone,
            rounds = report.rounds.len(),
            accepted = report.accepted.len(),
            importance = report.accepted_importance(),
            unresolved_deficit = report.unresolved_deficit(),
            orders = report.orders_issued,
            "zone tick complete"
        );
        Ok(report)
    }

    /// Runs every zone named by an objective, in zone order.
    pub fn run_tick<S: ActionSink + ?Sized>(
        &self,
        world: &dyn WorldView,
        objectives: &[Box<dyn Objective>],
        sink: &mut S,
    ) -> BTreeMap<ZoneId, Result<ZoneTickReport, PlannerError>> {
        let mut by_zone: BTreeMap<ZoneId, Vec<&dyn Objective>> = BTreeMap::new();
        for objective in objectives {
            by_zone
                .entry(objective.zone().clone())
                .or_default()
                .push(&**objective);
        }

        by_zone
            .into_iter()
            .map(|(zone, zone_objectives)| {
                let outcome = self.run_zone(world, &zone, &zone_objectives, sink);
                if let Err(err) = &outcome {
                    error!(zone = %zone, error = %err, "zone tick aborted");
                }
                (zone, outcome)
            })
            .collect()
    }
}

/// One growth objective per controlled zone.
pub fn default_objectives(
    world: &WorldSnapshot,
    config: &ControllerConfig,
) -> Vec<Box<dyn Objective>> {
    world
        .controlled_zones()
        .into_iter()
        .map(|zone| Box::new(GrowthObjective::new(zone, config.growth_importance)) as Box<dyn Objective>)
        .collect()
}
