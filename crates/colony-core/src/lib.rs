//! Colony planner: per-zone resource arbitration for a tick-based agent
//! controller.
//!
//! Once per tick, for each zone it controls, the planner asks every
//! objective for a plan, picks the most important set of plans the zone's
//! agents, nodes, facilities and energy can satisfy together, commits their
//! resources, lets rejected objectives try again, and finally turns the
//! accepted plans into world orders.
//!
//! ```text
//! WorldSnapshot ─▶ catalog ─▶ ResourceBundle ─▶ objectives ─▶ plans
//!                                   ▲                           │
//!                                   └── commit ◀── arbiter ◀────┘
//!                                                     │
//!                                       policies ─▶ ActionSink
//! ```
//!
//! # Modules
//!
//! - [`resources`]: Resource bundles, the zone catalog, and the per-zone manager
//! - [`assignment`]: Nearest-first worker placement with per-target capacity
//! - [`objective`]: The objective/plan protocol and the growth objective
//! - [`arbiter`]: Best satisfiable plan subset, and commit
//! - [`controller`]: The per-zone planning state machine and tick driver
//! - [`policy`]: Plan directives and the orders they issue
//! - [`world`]: Read-only world queries and the grid distance oracle
//! - [`cost`]: Agent manufacture costs
//! - [`config`]: TOML configuration
//! - [`setup`]: Seeded world generation

pub mod arbiter;
pub mod assignment;
pub mod config;
pub mod controller;
pub mod cost;
pub mod error;
pub mod objective;
pub mod policy;
pub mod resources;
pub mod setup;
pub mod world;

// Re-export planning types
pub use arbiter::{arbitrate, commit, Arbitration};
pub use assignment::{assign, Assignment};
pub use controller::{
    default_objectives, Controller, ControllerState, RoundReport, ZoneController, ZoneTickReport,
};
pub use objective::{AgentSelector, GrowthObjective, Objective, Plan, PlanningContext};
pub use policy::{ActionSink, Directive, Order, OrderLog, Policy};
pub use resources::{ResourceBundle, ResourceManager};

// Re-export world access
pub use world::{DistanceOracle, EntityKind, EntityRef, SnapshotWorld, WorldView};

// Re-export config and error types
pub use config::{
    default_config_toml, ArbiterConfig, ArbiterStrategy, AssignmentConfig, ConfigError,
    ControllerConfig, PlannerConfig, TomlSerializeError,
};
pub use cost::PartCostTable;
pub use error::{ConfigurationError, InvariantViolation, PlannerError, ResourceKind};

pub use setup::{generate_world, WorldGenParams};
