pub mod core;

// Re-export commonly used types
pub use crate::core::builder::SimulationBuilder;
pub use crate::core::config::{AdmissionPolicy, GroupConfig, SimulationConfig, CANTEEN_HORIZON};
pub use crate::core::errors::{ConfigError, SimError, SimResult};
pub use crate::core::execution::{ConcurrencyMode, SweepConfig, SweepJob, SweepResult, SweepRunner};
pub use crate::core::resource_group::GroupSnapshot;
pub use crate::core::simulation_engine::{run_simulation, RunOptions, RunOutcome, SimulationEngine};
pub use crate::core::statistics::{GroupStatistics, RunStatistics};
pub use crate::core::trace::{NoopObserver, SimulationObserver, TraceRecord, Transition};
pub use crate::core::types::{EntityId, GroupId, SimTime};
