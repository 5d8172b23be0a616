//! Configuration loading for the planner.
//!
//! All planner settings are loaded from a TOML configuration file. Every
//! section is optional; missing sections and keys fall back to defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Complete planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Worker-to-target assignment settings
    #[serde(default)]
    pub assignment: AssignmentConfig,
    /// Plan arbitration settings
    #[serde(default)]
    pub arbiter: ArbiterConfig,
    /// Per-zone planning loop settings
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Energy cost of each body part, keyed by part name
    #[serde(default = "default_part_costs")]
    pub part_costs: BTreeMap<String, u32>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            assignment: AssignmentConfig::default(),
            arbiter: ArbiterConfig::default(),
            controller: ControllerConfig::default(),
            part_costs: default_part_costs(),
        }
    }
}

impl PlannerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }
}

/// Assignment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Maximum workers assigned to one target
    pub per_target_capacity: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            per_target_capacity: 4,
        }
    }
}

/// How the arbiter searches for the best satisfiable plan subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArbiterStrategy {
    /// Enumerate the full power set as bitmasks; falls back to branch and
    /// bound above `exhaustive_limit` plans
    #[default]
    Exhaustive,
    /// Depth-first search pruned by an importance upper bound; exact
    BranchAndBound,
    /// Highest importance first, keep each plan that still fits; approximate
    Greedy,
}

/// Arbiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    pub strategy: ArbiterStrategy,
    /// Largest plan count enumerated as bitmasks
    pub exhaustive_limit: usize,
    /// Plans beyond this count are rejected before arbitration, lowest
    /// importance first
    pub max_plans_per_round: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            strategy: ArbiterStrategy::Exhaustive,
            exhaustive_limit: 20,
            max_plans_per_round: 24,
        }
    }
}

/// Controller loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Hard cap on plan/arbitrate/commit rounds per zone per tick
    pub max_rounds: usize,
    /// Importance hint given to each zone's growth objective
    pub growth_importance: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            growth_importance: 1.0,
        }
    }
}

/// The stock part cost table.
pub fn default_part_costs() -> BTreeMap<String, u32> {
    [
        ("move", 50),
        ("work", 20),
        ("carry", 50),
        ("attack", 100),
        ("ranged_attack", 150),
        ("heal", 200),
        ("tough", 5),
    ]
    .into_iter()
    .map(|(name, cost)| (name.to_string(), cost))
    .collect()
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Error that can occur during TOML serialization.
#[derive(Debug, Error)]
#[error("TOML serialize error: {0}")]
pub struct TomlSerializeError(#[from] pub toml::ser::Error);

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Colony Planner Configuration

[assignment]
per_target_capacity = 4

[arbiter]
strategy = "exhaustive"
exhaustive_limit = 20
max_plans_per_round = 24

[controller]
max_rounds = 8
growth_importance = 1.0

[part_costs]
move = 50
work = 20
carry = 50
attack = 100
ranged_attack = 150
heal = 200
tough = 5
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.assignment.per_target_capacity, 4);
        assert_eq!(config.arbiter.strategy, ArbiterStrategy::Exhaustive);
        assert_eq!(config.arbiter.exhaustive_limit, 20);
        assert_eq!(config.controller.max_rounds, 8);
    }

    #[test]
    fn test_empty_toml_matches_default() {
        let parsed = PlannerConfig::from_str("").unwrap();
        let default = PlannerConfig::default();

        assert_eq!(parsed.part_costs, default.part_costs);
        assert_eq!(
            parsed.assignment.per_target_capacity,
            default.assignment.per_target_capacity
        );
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [assignment]
            per_target_capacity = 3

            [arbiter]
            strategy = "branch_and_bound"
            max_plans_per_round = 10
        "#;

        let config = PlannerConfig::from_str(toml).unwrap();

        assert_eq!(config.assignment.per_target_capacity, 3);
        assert_eq!(config.arbiter.strategy, ArbiterStrategy::BranchAndBound);
        assert_eq!(config.arbiter.max_plans_per_round, 10);
        // Unspecified keys keep their defaults
        assert_eq!(config.arbiter.exhaustive_limit, 20);
        assert_eq!(config.controller.max_rounds, 8);
    }

    #[test]
    fn test_partial_part_costs_replace_table() {
        let toml = r#"
            [part_costs]
            move = 40
        "#;

        let config = PlannerConfig::from_str(toml).unwrap();

        assert_eq!(config.part_costs.get("move"), Some(&40));
        assert_eq!(config.part_costs.get("work"), None);
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = PlannerConfig::from_str(&toml).unwrap();

        assert_eq!(config.assignment.per_target_capacity, 4);
        assert_eq!(config.controller.growth_importance, 1.0);
        assert_eq!(config.part_costs, default_part_costs());
    }

    #[test]
    fn test_config_to_toml() {
        let config = PlannerConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[assignment]"));
        assert!(toml.contains("[arbiter]"));
        assert!(toml.contains("[part_costs]"));
    }

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&ArbiterStrategy::BranchAndBound).unwrap(),
            r#""branch_and_bound""#
        );
        assert_eq!(
            serde_json::to_string(&ArbiterStrategy::Greedy).unwrap(),
            r#""greedy""#
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[controller]\nmax_rounds = 2").unwrap();

        let config = PlannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.controller.max_rounds, 2);
    }

    #[test]
    fn test_from_missing_file() {
        let result = PlannerConfig::from_file(Path::new("/nonexistent/colony.toml"));

        let err = result.unwrap_err();
        assert!(matches!(&err, ConfigError::Io { path, .. } if path == Path::new("/nonexistent/colony.toml")));
        assert!(err.to_string().contains("/nonexistent/colony.toml"));
    }

    #[test]
    fn test_invalid_toml() {
        let result = PlannerConfig::from_str("[arbiter]\nstrategy = \"random\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
