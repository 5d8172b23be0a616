//! Plan Policies
//!
//! A policy is the deferred half of a plan: a list of directives naming
//! which granted resource should do what. Policies are plain data so the
//! controller can inspect and test plans without touching the world; they
//! only turn into world orders when [`Policy::apply`] runs after
//! arbitration.

use serde::{Deserialize, Serialize};

use colony_world::{AgentId, AgentSnapshot, AgentSpec, FacilityId, FacilitySnapshot, NodeId, Position};
use tracing::debug;

use crate::cost::PartCostTable;
use crate::error::{InvariantViolation, PlannerError, ResourceKind};
use crate::world::WorldView;

/// One unit of intended work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// Work a node; return energy to the nearest facility when full
    Harvest { agent: AgentId, node: NodeId },
    /// Manufacture an agent if the facility can afford it
    Create {
        facility: FacilityId,
        spec: AgentSpec,
    },
}

/// The deferred actions of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    directives: Vec<Directive>,
}

impl Policy {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Issues world orders for every directive. Returns the number of orders
    /// issued.
    pub fn apply<W, S>(
        &self,
        world: &W,
        costs: &PartCostTable,
        sink: &mut S,
    ) -> Result<usize, PlannerError>
    where
        W: WorldView + ?Sized,
        S: ActionSink + ?Sized,
    {
        let mut issued = 0;
        for directive in &self.directives {
            issued += match directive {
                Directive::Harvest { agent, node } => apply_harvest(world, agent, node, sink)?,
                Directive::Create { facility, spec } => {
                    apply_create(world, costs, facility, *spec, sink)?
                }
            };
        }
        Ok(issued)
    }
}

fn apply_harvest<W, S>(
    world: &W,
    agent_id: &AgentId,
    node_id: &NodeId,
    sink: &mut S,
) -> Result<usize, PlannerError>
where
    W: WorldView + ?Sized,
    S: ActionSink + ?Sized,
{
    let agent = world
        .agent(agent_id)
        .ok_or_else(|| unknown(ResourceKind::Agent, agent_id))?;
    let node = world
        .node(node_id)
        .ok_or_else(|| unknown(ResourceKind::Node, node_id))?;

    if !agent.is_full() {
        sink.move_toward(agent_id, node.position);
        sink.harvest(agent_id, node_id);
        return Ok(2);
    }

    match nearest_facility(world, agent) {
        Some(facility) => {
            sink.move_toward(agent_id, facility.position);
            sink.transfer_energy(agent_id, &facility.facility_id);
            Ok(2)
        }
        None => {
            debug!(agent = %agent_id, "full agent has no reachable facility");
            Ok(0)
        }
    }
}

fn apply_create<W, S>(
    world: &W,
    costs: &PartCostTable,
    facility_id: &FacilityId,
    spec: AgentSpec,
    sink: &mut S,
) -> Result<usize, PlannerError>
where
    W: WorldView + ?Sized,
    S: ActionSink + ?Sized,
{
    let facility = world
        .facility(facility_id)
        .ok_or_else(|| unknown(ResourceKind::Facility, facility_id))?;
    let cost = costs.spec_cost(spec)?;

    if u64::from(facility.energy) >= u64::from(cost) {
        sink.order_creation(facility_id, spec);
        Ok(1)
    } else {
        debug!(
            facility = %facility_id,
            energy = facility.energy,
            cost,
            "facility cannot afford creation yet"
        );
        Ok(0)
    }
}

/// Closest reachable owned facility in the agent's zone, ties by ID.
fn nearest_facility<'w, W: WorldView + ?Sized>(
    world: &'w W,
    agent: &AgentSnapshot,
) -> Option<&'w FacilitySnapshot> {
    world
        .owned_facilities(&agent.zone)
        .into_iter()
        .filter_map(|f| {
            world
                .distance(&agent.zone, agent.position, f.position)
                .map(|d| (d, f))
        })
        .min_by(|(da, fa), (db, fb)| da.cmp(db).then_with(|| fa.facility_id.cmp(&fb.facility_id)))
        .map(|(_, f)| f)
}

fn unknown(kind: ResourceKind, id: &impl ToString) -> PlannerError {
    InvariantViolation::UnknownEntity {
        kind,
        id: id.to_string(),
    }
    .into()
}

/// The world mutation API a policy drives.
pub trait ActionSink {
    fn move_toward(&mut self, agent: &AgentId, position: Position);
    fn harvest(&mut self, agent: &AgentId, node: &NodeId);
    fn transfer_energy(&mut self, agent: &AgentId, facility: &FacilityId);
    fn order_creation(&mut self, facility: &FacilityId, spec: AgentSpec);
}

/// A world order, as recorded by [`OrderLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum Order {
    MoveToward { agent: AgentId, position: Position },
    Harvest { agent: AgentId, node: NodeId },
    TransferEnergy { agent: AgentId, facility: FacilityId },
    CreateAgent { facility: FacilityId, spec: AgentSpec },
}

/// An [`ActionSink`] that records orders in issue order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderLog {
    orders: Vec<Order>,
}

impl OrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.orders)
    }

    /// Re-issues every recorded order, in order, to another sink.
    pub fn replay<S: ActionSink + ?Sized>(&self, sink: &mut S) {
        for order in &self.orders {
            match order {
                Order::MoveToward { agent, position } => sink.move_toward(agent, *position),
                Order::Harvest { agent, node } => sink.harvest(agent, node),
                Order::TransferEnergy { agent, facility } => sink.transfer_energy(agent, facility),
                Order::CreateAgent { facility, spec } => sink.order_creation(facility, *spec),
            }
        }
    }
}

impl ActionSink for OrderLog {
    fn move_toward(&mut self, agent: &AgentId, position: Position) {
        self.orders.push(Order::MoveToward {
            agent: agent.clone(),
            position,
        });
    }

    fn harvest(&mut self, agent: &AgentId, node: &NodeId) {
        self.orders.push(Order::Harvest {
            agent: agent.clone(),
            node: node.clone(),
        });
    }

    fn transfer_energy(&mut self, agent: &AgentId, facility: &FacilityId) {
        self.orders.push(Order::TransferEnergy {
            agent: agent.clone(),
            facility: facility.clone(),
        });
    }

    fn order_creation(&mut self, facility: &FacilityId, spec: AgentSpec) {
        self.orders.push(Order::CreateAgent {
            facility: facility.clone(),
            spec,
        });
    }
}
