pub mod config;
pub mod sweep;

// Re-export commonly used types
pub use config::{ConcurrencyMode, SweepConfig};
pub use sweep::{SweepJob, SweepResult, SweepRunner};
