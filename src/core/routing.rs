use super::errors::ConfigError;
use super::types::GroupId;

/// Allowed deviation of the probability sum from 1
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Weighted dispatch of arriving entities to resource groups.
///
/// Holds the cumulative distribution in configuration order. A draw `u`
/// selects the first group whose cumulative probability is at least `u`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingPolicy {
    groups: Vec<GroupId>,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
}

impl RoutingPolicy {
    /// Validate the table once. Draws never re-check it.
    pub fn new(table: Vec<(GroupId, f64)>) -> Result<Self, ConfigError> {
        if table.is_empty() {
            return Err(ConfigError::EmptyRoutingTable);
        }

        let mut groups = Vec::with_capacity(table.len());
        let mut weights = Vec::with_capacity(table.len());
        let mut cumulative = Vec::with_capacity(table.len());
        let mut running = 0.0;
        for (group, weight) in table {
            if !(weight > 0.0) {
                return Err(ConfigError::NonPositiveProbability {
                    group: group.to_string(),
                    value: weight,
                });
            }
            running += weight;
            groups.push(group);
            weights.push(weight);
            cumulative.push(running);
        }

        if (running - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ConfigError::ProbabilitySum(running));
        }

        Ok(Self {
            groups,
            weights,
            cumulative,
        })
    }

    /// Pick a group for the uniform draw `u`.
    ///
    /// If rounding leaves `u` above the last cumulative value, the last group
    /// is selected.
    pub fn select(&self, u: f64) -> GroupId {
        let index = self
            .cumulative
            .iter()
            .position(|&c| c >= u)
            .unwrap_or(self.groups.len() - 1);
        self.groups[index]
    }

    /// Pick among the groups accepted by `eligible`, with their weights
    /// renormalised. Returns `None` when no group is eligible.
    pub fn select_where<F>(&self, u: f64, eligible: F) -> Option<GroupId>
    where
        F: Fn(GroupId) -> bool,
    {
        let candidates: Vec<(GroupId, f64)> = self
            .groups
            .iter()
            .zip(&self.weights)
            .filter(|(group, _)| eligible(**group))
            .map(|(group, weight)| (*group, *weight))
            .collect();

        let (last, _) = *candidates.last()?;
        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        let target = u * total;
        let mut running = 0.0;
        for (group, weight) in &candidates {
            running += weight;
            if running >= target {
                return Some(*group);
            }
        }
        Some(last)
    }

    /// Groups in table order
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    /// Probability of each group, in table order
    pub fn probabilities(&self) -> &[f64] {
        &self.weights
    }
}
