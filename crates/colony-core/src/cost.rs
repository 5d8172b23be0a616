//! Agent manufacture costs.

use std::collections::BTreeMap;

use colony_world::{AgentSpec, BodyPart};

use crate::config::default_part_costs;
use crate::error::ConfigurationError;

/// Energy cost of each body part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartCostTable {
    costs: BTreeMap<BodyPart, u32>,
}

impl Default for PartCostTable {
    fn default() -> Self {
        let costs = default_part_costs()
            .iter()
            .filter_map(|(name, cost)| BodyPart::from_name(name).map(|part| (part, *cost)))
            .collect();
        Self { costs }
    }
}

impl PartCostTable {
    /// Builds the table from a name-keyed config map.
    ///
    /// Fails on a name that is not a known body part. Parts missing from the
    /// map are accepted here and fail when a cost is first asked for.
    pub fn from_config(costs: &BTreeMap<String, u32>) -> Result<Self, ConfigurationError> {
        let costs = costs
            .iter()
            .map(|(name, cost)| {
                BodyPart::from_name(name)
                    .map(|part| (part, *cost))
                    .ok_or_else(|| ConfigurationError::UnknownBodyPart { name: name.clone() })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { costs })
    }

    pub fn part_cost(&self, part: BodyPart) -> Result<u32, ConfigurationError> {
        self.costs
            .get(&part)
            .copied()
            .ok_or(ConfigurationError::MissingPartCost { part })
    }

    /// Sum of part costs over a body. Fails if the sum does not fit a `u32`.
    pub fn body_cost(&self, body: &[BodyPart]) -> Result<u32, ConfigurationError> {
        body.iter().try_fold(0u32, |sum, part| {
            sum.checked_add(self.part_cost(*part)?)
                .ok_or_else(|| ConfigurationError::CostOverflow {
                    body: body.to_vec(),
                })
        })
    }

    pub fn spec_cost(&self, spec: AgentSpec) -> Result<u32, ConfigurationError> {
        self.body_cost(spec.body())
    }
}
