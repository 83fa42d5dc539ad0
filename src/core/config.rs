use super::errors::ConfigError;
use super::routing::RoutingPolicy;
use super::types::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Horizon of the reference canteen scenario, in seconds
pub const CANTEEN_HORIZON: f64 = 240.0;

/// What happens to an entity whose chosen group has no free server and a
/// full waiting line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdmissionPolicy {
    /// Turn the entity away
    #[default]
    Reject,
    /// Re-choose among groups that still have room; reject only if none do
    Reroute,
    /// Ignore the waiting-line capacity
    Unbounded,
}

/// One service group: `servers` identical windows sharing a FIFO waiting line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub servers: usize,
    /// Mean of the exponential service time
    pub mean_service_time: f64,
    /// Maximum number of entities waiting (not counting those in service)
    pub queue_capacity: usize,
    /// Probability an arriving entity picks this group
    pub probability: f64,
}

impl GroupConfig {
    pub fn new(
        name: impl Into<String>,
        servers: usize,
        mean_service_time: f64,
        queue_capacity: usize,
        probability: f64,
    ) -> Self {
        Self {
            name: name.into(),
            servers,
            mean_service_time,
            queue_capacity,
            probability,
        }
    }
}

/// Complete description of a facility. Validated once, when an engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Mean of the exponential inter-arrival time
    pub mean_interarrival: f64,
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub admission: AdmissionPolicy,
    /// No arrivals are generated after this absolute time
    #[serde(default)]
    pub arrival_cutoff: Option<f64>,
}

impl SimulationConfig {
    /// Create a configuration with no groups yet
    pub fn new(mean_interarrival: f64) -> Self {
        Self {
            mean_interarrival,
            groups: Vec::new(),
            admission: AdmissionPolicy::default(),
            arrival_cutoff: None,
        }
    }

    /// Add a service group
    pub fn with_group(mut self, group: GroupConfig) -> Self {
        self.groups.push(group);
        self
    }

    /// Set the policy applied when a group is full
    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.admission = admission;
        self
    }

    /// Stop generating arrivals after `cutoff`
    pub fn with_arrival_cutoff(mut self, cutoff: f64) -> Self {
        self.arrival_cutoff = Some(cutoff);
        self
    }

    /// The reference canteen: three window types, queue capacity 8, and an
    /// arrival stream that stops halfway through [`CANTEEN_HORIZON`].
    pub fn canteen() -> Self {
        let queue_capacity = 8;
        Self::new(5.0)
            .with_group(GroupConfig::new("snack", 3, 120.0, queue_capacity, 0.45))
            .with_group(GroupConfig::new("dumplings", 2, 40.0, queue_capacity, 0.37))
            .with_group(GroupConfig::new("noodles", 1, 40.0, queue_capacity, 0.18))
            .with_arrival_cutoff(CANTEEN_HORIZON - 120.0)
    }

    /// Look up a group id by name
    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.groups.iter().position(|g| g.name == name).map(GroupId)
    }

    /// Check every structural constraint and build the routing table.
    pub fn validate(&self) -> Result<RoutingPolicy, ConfigError> {
        if !(self.mean_interarrival > 0.0) || !self.mean_interarrival.is_finite() {
            return Err(ConfigError::NonPositiveArrivalMean(self.mean_interarrival));
        }

        if let Some(cutoff) = self.arrival_cutoff {
            if !(cutoff >= 0.0) || !cutoff.is_finite() {
                return Err(ConfigError::InvalidArrivalCutoff(cutoff));
            }
        }

        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(ConfigError::EmptyGroupName);
            }
            if !names.insert(group.name.as_str()) {
                return Err(ConfigError::DuplicateGroupName(group.name.clone()));
            }
            if group.servers < 1 {
                return Err(ConfigError::NoServers {
                    group: group.name.clone(),
                });
            }
            if !(group.mean_service_time > 0.0) || !group.mean_service_time.is_finite() {
                return Err(ConfigError::NonPositiveServiceTime {
                    group: group.name.clone(),
                    value: group.mean_service_time,
                });
            }
            if !(group.probability > 0.0) {
                return Err(ConfigError::NonPositiveProbability {
                    group: group.name.clone(),
                    value: group.probability,
                });
            }
        }

        RoutingPolicy::new(
            self.groups
                .iter()
                .enumerate()
                .map(|(i, g)| (GroupId(i), g.probability))
                .collect(),
        )
    }
}
