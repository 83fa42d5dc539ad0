use super::entity::Entity;
use super::resource_group::ResourceGroup;
use super::types::{GroupId, SimTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters shared by the per-group and system-wide accumulators
#[derive(Debug, Clone, Default, PartialEq)]
struct Counters {
    arrivals: u64,
    completions: u64,
    rejections: u64,
    total_waiting_time: f64,
    total_service_time: f64,
}

impl Counters {
    fn record_departure(&mut self, waited: f64, served: f64) {
        self.completions += 1;
        self.total_waiting_time += waited;
        self.total_service_time += served;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct GroupAccumulator {
    counters: Counters,
    rerouted: u64,
    /// Integral of waiting-line length over time
    queue_length_integral: f64,
    /// Integral of busy-server count over time
    busy_integral: f64,
    max_queue_length: usize,
}

/// Pure observer of the simulation.
///
/// Reads group occupancy when the clock moves to build time-weighted
/// integrals, and counts lifecycle outcomes reported by the engine. Never
/// mutates simulation state.
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    groups: Vec<GroupAccumulator>,
    totals: Counters,
    last_time: SimTime,
}

impl StatisticsCollector {
    pub fn new(group_count: usize) -> Self {
        Self {
            groups: vec![GroupAccumulator::default(); group_count],
            totals: Counters::default(),
            last_time: 0.0,
        }
    }

    /// Integrate each group's current occupancy from the last observed time
    /// up to `now`. Must run before any state change at `now`.
    pub fn advance_clock(&mut self, now: SimTime, groups: &[ResourceGroup]) {
        let elapsed = now - self.last_time;
        if elapsed <= 0.0 {
            return;
        }
        for (acc, group) in self.groups.iter_mut().zip(groups) {
            acc.queue_length_integral += group.queue_length() as f64 * elapsed;
            acc.busy_integral += group.busy() as f64 * elapsed;
        }
        self.last_time = now;
    }

    /// Entity routed (and counted) at `group`
    pub fn record_arrival(&mut self, group: GroupId) {
        self.groups[group.index()].counters.arrivals += 1;
        self.totals.arrivals += 1;
    }

    /// Entity joined the waiting line, which is now `queue_length` long
    pub fn record_queue_enter(&mut self, group: GroupId, queue_length: usize) {
        let acc = &mut self.groups[group.index()];
        acc.max_queue_length = acc.max_queue_length.max(queue_length);
    }

    /// Entity turned away. No waiting time is recorded.
    pub fn record_rejection(&mut self, group: GroupId) {
        self.groups[group.index()].counters.rejections += 1;
        self.totals.rejections += 1;
    }

    /// Entity found `group` full and went elsewhere
    pub fn record_reroute(&mut self, group: GroupId) {
        self.groups[group.index()].rerouted += 1;
    }

    /// Served entity left `group`
    pub fn record_departure(&mut self, group: GroupId, entity: &Entity) {
        let waited = entity.waiting_time();
        let served = entity.service_time().unwrap_or(0.0);
        self.groups[group.index()].counters.record_departure(waited, served);
        self.totals.record_departure(waited, served);
    }

    /// Last time up to which occupancy has been integrated
    pub fn observed_time(&self) -> SimTime {
        self.last_time
    }

    /// Snapshot of everything accumulated so far, combined with the groups'
    /// current occupancy
    pub fn report(&self, seed: u64, groups: &[ResourceGroup]) -> RunStatistics {
        let observed_time = self.last_time;
        let group_stats = self
            .groups
            .iter()
            .zip(groups)
            .map(|(acc, group)| GroupStatistics {
                name: group.name().to_string(),
                servers: group.servers(),
                queue_capacity: group.queue_capacity(),
                arrivals: acc.counters.arrivals,
                completions: acc.counters.completions,
                rejections: acc.counters.rejections,
                rerouted: acc.rerouted,
                total_waiting_time: acc.counters.total_waiting_time,
                total_service_time: acc.counters.total_service_time,
                queue_length_integral: acc.queue_length_integral,
                busy_integral: acc.busy_integral,
                observed_time,
                queue_length: group.queue_length(),
                busy: group.busy(),
                max_queue_length: acc.max_queue_length,
            })
            .collect();

        RunStatistics {
            seed,
            horizon: observed_time,
            arrivals: self.totals.arrivals,
            completions: self.totals.completions,
            rejections: self.totals.rejections,
            total_waiting_time: self.totals.total_waiting_time,
            total_service_time: self.totals.total_service_time,
            groups: group_stats,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Statistics of one resource group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub name: String,
    pub servers: usize,
    pub queue_capacity: usize,
    pub arrivals: u64,
    pub completions: u64,
    pub rejections: u64,
    pub rerouted: u64,
    pub total_waiting_time: f64,
    pub total_service_time: f64,
    pub queue_length_integral: f64,
    pub busy_integral: f64,
    pub observed_time: f64,
    /// Waiting-line length at the end of the observed window
    pub queue_length: usize,
    /// Busy servers at the end of the observed window
    pub busy: usize,
    pub max_queue_length: usize,
}

impl GroupStatistics {
    /// Time-average fraction of servers busy. Zero over an empty window.
    pub fn utilization(&self) -> f64 {
        ratio(self.busy_integral, self.servers as f64 * self.observed_time).unwrap_or(0.0)
    }

    /// Mean time spent waiting by completed entities; `None` if nobody completed
    pub fn mean_waiting_time(&self) -> Option<f64> {
        ratio(self.total_waiting_time, self.completions as f64)
    }

    /// Mean service duration of completed entities; `None` if nobody completed
    pub fn mean_service_time(&self) -> Option<f64> {
        ratio(self.total_service_time, self.completions as f64)
    }

    /// Time-average waiting-line length. Zero over an empty window.
    pub fn mean_queue_length(&self) -> f64 {
        ratio(self.queue_length_integral, self.observed_time).unwrap_or(0.0)
    }

    /// Entities still waiting or in service
    pub fn in_system(&self) -> u64 {
        (self.queue_length + self.busy) as u64
    }
}

/// Outcome of a run, read-only once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub seed: u64,
    /// End of the observed window
    pub horizon: f64,
    pub arrivals: u64,
    pub completions: u64,
    pub rejections: u64,
    pub total_waiting_time: f64,
    pub total_service_time: f64,
    pub groups: Vec<GroupStatistics>,
}

impl RunStatistics {
    /// Mean waiting time across all completions; `None` if nobody completed
    pub fn mean_waiting_time(&self) -> Option<f64> {
        ratio(self.total_waiting_time, self.completions as f64)
    }

    /// Completions per unit of simulated time
    pub fn throughput(&self) -> f64 {
        ratio(self.completions as f64, self.horizon).unwrap_or(0.0)
    }

    /// Entities still waiting or in service at the end of the window
    pub fn in_system(&self) -> u64 {
        self.groups.iter().map(GroupStatistics::in_system).sum()
    }

    /// Statistics of the group called `name`
    pub fn group(&self, name: &str) -> Option<&GroupStatistics> {
        self.groups.iter().find(|g| g.name == name)
    }
}

fn fmt_optional_secs(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}s", v),
        None => "n/a (no completions)".to_string(),
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, "Run (seed {}, horizon {:.1}s)", self.seed, self.horizon)?;
        for group in &self.groups {
            writeln!(f, "  - {}:", group.name)?;
            writeln!(f, "    servers:            {}", group.servers)?;
            writeln!(f, "    queue length (end): {}", group.queue_length)?;
            writeln!(f, "    busy (end):         {}", group.busy)?;
            writeln!(f, "    utilization:        {:.2}%", group.utilization() * 100.0)?;
            writeln!(f, "    mean queue length:  {:.2}", group.mean_queue_length())?;
            writeln!(f, "    mean waiting time:  {}", fmt_optional_secs(group.mean_waiting_time()))?;
            writeln!(
                f,
                "    arrivals/served/rejected/rerouted: {}/{}/{}/{}",
                group.arrivals, group.completions, group.rejections, group.rerouted
            )?;
        }
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, "In system:            {}", self.in_system())?;
        writeln!(f, "Arrivals:             {}", self.arrivals)?;
        writeln!(f, "Completions:          {}", self.completions)?;
        writeln!(f, "Rejections:           {}", self.rejections)?;
        writeln!(f, "Throughput:           {:.4}/s", self.throughput())?;
        write!(f, "Overall mean wait:    {}", fmt_optional_secs(self.mean_waiting_time()))
    }
}
