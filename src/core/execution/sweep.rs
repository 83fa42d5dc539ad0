use super::config::{ConcurrencyMode, SweepConfig};
use crate::core::config::SimulationConfig;
use crate::core::errors::SimResult;
use crate::core::simulation_engine::{run_simulation, RunOptions};
use crate::core::statistics::RunStatistics;
use crate::core::types::SimTime;
use log::info;
use rayon::prelude::*;

/// One independent run in a sweep
#[derive(Debug, Clone)]
pub struct SweepJob {
    pub label: String,
    pub config: SimulationConfig,
    pub horizon: SimTime,
    pub seed: u64,
}

impl SweepJob {
    pub fn new(label: impl Into<String>, config: SimulationConfig, horizon: SimTime, seed: u64) -> Self {
        Self {
            label: label.into(),
            config,
            horizon,
            seed,
        }
    }

    /// `count` replications of one configuration with seeds
    /// `base_seed, base_seed + 1, ...`
    pub fn replications(
        label: &str,
        config: &SimulationConfig,
        horizon: SimTime,
        base_seed: u64,
        count: usize,
    ) -> Vec<SweepJob> {
        (0..count as u64)
            .map(|i| {
                let seed = base_seed.wrapping_add(i);
                SweepJob::new(format!("{}#{}", label, i), config.clone(), horizon, seed)
            })
            .collect()
    }

    fn run(&self) -> SimResult<SweepResult> {
        let outcome = run_simulation(&self.config, RunOptions::new(self.horizon, self.seed))?;
        Ok(SweepResult {
            label: self.label.clone(),
            statistics: outcome.statistics,
        })
    }
}

/// Statistics of one sweep job
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub label: String,
    pub statistics: RunStatistics,
}

/// Executes sweep jobs; each job gets its own engine, so no state is shared.
pub struct SweepRunner {
    config: SweepConfig,
}

impl SweepRunner {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Run every job. Results come back in job order in every mode. The first
    /// configuration error aborts the sweep.
    pub fn run(&self, jobs: &[SweepJob]) -> SimResult<Vec<SweepResult>> {
        info!(
            "sweep of {} jobs ({:?})",
            jobs.len(),
            self.config.concurrency_mode
        );

        let results: SimResult<Vec<SweepResult>> = match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => jobs.iter().map(SweepJob::run).collect(),
            ConcurrencyMode::Rayon => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(size) = self.config.thread_pool_size {
                    builder = builder.num_threads(size);
                }
                let pool = builder.build()?;
                pool.install(|| jobs.par_iter().map(SweepJob::run).collect())
            }
        };

        if let Ok(results) = &results {
            info!("sweep finished: {} results", results.len());
        }
        results
    }
}

/// Mean of the system-wide mean waiting times over runs that had completions.
/// `None` if no run completed anything.
pub fn mean_waiting_time(results: &[SweepResult]) -> Option<f64> {
    let waits: Vec<f64> = results
        .iter()
        .filter_map(|r| r.statistics.mean_waiting_time())
        .collect();
    if waits.is_empty() {
        None
    } else {
        Some(waits.iter().sum::<f64>() / waits.len() as f64)
    }
}
