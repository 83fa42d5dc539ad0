use crate::core::config::{AdmissionPolicy, GroupConfig, SimulationConfig};
use crate::core::errors::ConfigError;
use crate::core::simulation_engine::SimulationEngine;
use crate::core::trace::SimulationObserver;

/// Imperative API for assembling a simulation engine
///
/// Collects the facility description, seed, tracing and observers, and
/// validates everything once in [`SimulationBuilder::build`].
pub struct SimulationBuilder {
    config: SimulationConfig,
    seed: u64,
    trace: bool,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationBuilder {
    /// Start from an empty facility with the given mean inter-arrival time
    pub fn new(mean_interarrival: f64) -> Self {
        Self::from_config(SimulationConfig::new(mean_interarrival))
    }

    /// Start from an existing configuration
    pub fn from_config(config: SimulationConfig) -> Self {
        Self {
            config,
            seed: 0,
            trace: false,
            observers: Vec::new(),
        }
    }

    /// Add a service group
    pub fn group(
        mut self,
        name: &str,
        servers: usize,
        mean_service_time: f64,
        queue_capacity: usize,
        probability: f64,
    ) -> Self {
        self.config.groups.push(GroupConfig::new(
            name,
            servers,
            mean_service_time,
            queue_capacity,
            probability,
        ));
        self
    }

    /// Set the policy applied when a group is full
    pub fn admission(mut self, admission: AdmissionPolicy) -> Self {
        self.config.admission = admission;
        self
    }

    /// Stop generating arrivals after `cutoff`
    pub fn arrival_cutoff(mut self, cutoff: f64) -> Self {
        self.config.arrival_cutoff = Some(cutoff);
        self
    }

    /// Seed for the engine's random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Record the transition trace
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Register an observer on the built engine
    pub fn observer(mut self, observer: Box<dyn SimulationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The configuration collected so far
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Validate and build the engine
    pub fn build(self) -> Result<SimulationEngine, ConfigError> {
        let mut engine = SimulationEngine::new(self.config, self.seed)?;
        if self.trace {
            engine = engine.with_trace();
        }
        for observer in self.observers {
            engine.add_observer(observer);
        }
        Ok(engine)
    }
}
