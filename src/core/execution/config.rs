//! Configuration for parameter sweeps
//!
//! Controls whether independent simulation runs execute one after another or
//! on a rayon thread pool.

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Runs execute in order on the calling thread
    #[default]
    Sequential,
    /// Runs are spread over a rayon thread pool
    Rayon,
}

/// Configuration for sweep execution
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution.
    /// Only relevant when concurrency_mode is Rayon; `None` uses rayon's default.
    pub thread_pool_size: Option<usize>,
}

impl SweepConfig {
    /// Sequential execution, no thread pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode for the sweep
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.thread_pool_size, None);
    }

    #[test]
    fn test_config_builder() {
        let config = SweepConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);

        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
    }
}
