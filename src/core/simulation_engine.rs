use super::arrival::ArrivalProcess;
use super::config::{AdmissionPolicy, SimulationConfig};
use super::entity::Entity;
use super::errors::ConfigError;
use super::event::EventKind;
use super::event_scheduler::{EventHandler, EventScheduler};
use super::random::RandomSource;
use super::resource_group::{Admission, GroupSnapshot, ResourceGroup, ServiceStart};
use super::routing::RoutingPolicy;
use super::statistics::{RunStatistics, StatisticsCollector};
use super::trace::{SimulationObserver, TraceRecord, Transition};
use super::types::{EntityId, GroupId, SimTime};
use log::{debug, info};

/// All mutable state of one run, driven by the scheduler's dispatch loop
struct SimulationState {
    groups: Vec<ResourceGroup>,
    routing: RoutingPolicy,
    arrivals: ArrivalProcess,
    admission: AdmissionPolicy,
    rng: RandomSource,
    stats: StatisticsCollector,
    clock: SimTime,
    trace: Option<Vec<TraceRecord>>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationState {
    fn record(&mut self, time: SimTime, entity: EntityId, group: GroupId, transition: Transition) {
        let record = TraceRecord {
            time,
            entity,
            group,
            transition,
        };
        if let Some(trace) = self.trace.as_mut() {
            trace.push(record);
        }
        for observer in &mut self.observers {
            observer.on_transition(&record);
        }
    }

    /// Move the clock and close the occupancy integrals up to `now`
    fn advance_clock(&mut self, now: SimTime) {
        if now > self.clock {
            let old = self.clock;
            for observer in &mut self.observers {
                observer.on_clock_advance(old, now);
            }
            self.clock = now;
        }
        self.stats.advance_clock(now, &self.groups);
    }

    fn completion_event(&self, group: GroupId, start: &ServiceStart) -> (EventKind, SimTime) {
        (
            EventKind::ServiceCompletion {
                group,
                entity: start.entity,
            },
            start.service_time,
        )
    }

    fn handle_arrival(&mut self, now: SimTime) -> Vec<(EventKind, SimTime)> {
        let mut follow_ups = Vec::with_capacity(2);

        let entity = self.arrivals.create_entity(now);
        let chosen = self.routing.select(self.rng.uniform());
        if let Some(completion) = self.route(entity, chosen, now) {
            follow_ups.push(completion);
        }

        if let Some(delay) = self.arrivals.next_delay(now, &mut self.rng) {
            follow_ups.push((EventKind::Arrival, delay));
        } else {
            debug!("arrival cutoff reached at {:.3}", now);
        }
        follow_ups
    }

    /// Apply the admission policy to an entity routed to `chosen`. Returns the
    /// completion event to schedule if service started.
    fn route(
        &mut self,
        entity: Entity,
        chosen: GroupId,
        now: SimTime,
    ) -> Option<(EventKind, SimTime)> {
        let id = entity.id;
        let mut target = chosen;

        if self.admission == AdmissionPolicy::Reroute && !self.groups[chosen.index()].can_accept() {
            let u = self.rng.uniform();
            let groups = &self.groups;
            let alternative = self
                .routing
                .select_where(u, |g| groups[g.index()].can_accept());
            if let Some(to) = alternative {
                debug!("{} rerouted from {} to {}", id, chosen, to);
                self.stats.record_reroute(chosen);
                self.record(now, id, chosen, Transition::Reroute { to });
                target = to;
            }
        }

        self.stats.record_arrival(target);
        self.record(now, id, target, Transition::Arrival);

        match self.groups[target.index()].admit(entity, now, &mut self.rng) {
            Admission::Started(start) => {
                self.record(now, id, target, Transition::ServiceStart { waited: start.waited });
                Some(self.completion_event(target, &start))
            }
            Admission::Queued => {
                let queue_length = self.groups[target.index()].queue_length();
                self.stats.record_queue_enter(target, queue_length);
                self.record(now, id, target, Transition::QueueEnter);
                None
            }
            Admission::Rejected(_) => {
                self.stats.record_rejection(target);
                self.record(now, id, target, Transition::Rejection);
                None
            }
        }
    }

    fn handle_completion(
        &mut self,
        now: SimTime,
        group: GroupId,
        entity: EntityId,
    ) -> Vec<(EventKind, SimTime)> {
        let Some(completion) = self.groups[group.index()].complete(entity, now, &mut self.rng) else {
            return Vec::new();
        };

        self.stats.record_departure(group, &completion.departed);
        let service_start = completion.departed.service_start.unwrap_or(now);
        self.record(now, entity, group, Transition::Departure { service_start });

        match completion.next {
            Some(next) => {
                self.record(now, next.entity, group, Transition::ServiceStart { waited: next.waited });
                vec![self.completion_event(group, &next)]
            }
            None => Vec::new(),
        }
    }
}

impl EventHandler for SimulationState {
    fn react(&mut self, now: SimTime, event: EventKind) -> Vec<(EventKind, SimTime)> {
        self.advance_clock(now);
        debug!("t={:.3} {}", now, event);

        match event {
            EventKind::Arrival => self.handle_arrival(now),
            EventKind::ServiceCompletion { group, entity } => {
                self.handle_completion(now, group, entity)
            }
        }
    }
}

/// Parameters of one complete run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub horizon: SimTime,
    pub seed: u64,
    pub record_trace: bool,
}

impl RunOptions {
    pub fn new(horizon: SimTime, seed: u64) -> Self {
        Self {
            horizon,
            seed,
            record_trace: false,
        }
    }

    /// Also return the transition trace
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }
}

/// Statistics of a finished run plus the trace, if requested
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub statistics: RunStatistics,
    pub trace: Option<Vec<TraceRecord>>,
}

/// Discrete-event simulation of a multi-window service facility.
///
/// Owns the clock, the pending events, every group and the statistics, so
/// independent engines never interfere.
pub struct SimulationEngine {
    config: SimulationConfig,
    seed: u64,
    scheduler: EventScheduler,
    state: SimulationState,
    started: bool,
    stopped: bool,
}

impl SimulationEngine {
    /// Validate `config` and build an idle engine at time zero
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        let routing = config.validate()?;
        let arrivals = ArrivalProcess::new(config.mean_interarrival, config.arrival_cutoff)?;
        let groups: Vec<ResourceGroup> = config
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| ResourceGroup::new(GroupId(i), g, config.admission))
            .collect();

        let state = SimulationState {
            stats: StatisticsCollector::new(groups.len()),
            groups,
            routing,
            arrivals,
            admission: config.admission,
            rng: RandomSource::new(seed),
            clock: 0.0,
            trace: None,
            observers: Vec::new(),
        };

        Ok(Self {
            config,
            seed,
            scheduler: EventScheduler::new(),
            state,
            started: false,
            stopped: false,
        })
    }

    /// Record every transition in an in-memory trace
    pub fn with_trace(mut self) -> Self {
        if self.state.trace.is_none() {
            self.state.trace = Some(Vec::new());
        }
        self
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.state.observers.push(observer);
    }

    /// Schedule the first arrival. Called implicitly by `step`/`run_until`.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let now = self.scheduler.now();
        if let Some(delay) = self.state.arrivals.next_delay(now, &mut self.state.rng) {
            self.scheduler.schedule_after(EventKind::Arrival, delay);
        }
        info!(
            "simulation started: {} groups, seed {}, admission {:?}",
            self.state.groups.len(),
            self.seed,
            self.state.admission
        );
    }

    /// Halt the run; no further events are processed
    pub fn stop(&mut self) {
        if !self.stopped {
            info!("simulation stopped at {:.3}", self.scheduler.now());
        }
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn check_horizon(&self, horizon: SimTime) -> Result<(), ConfigError> {
        let now = self.scheduler.now();
        if !horizon.is_finite() || horizon < now {
            return Err(ConfigError::InvalidHorizon { horizon, now });
        }
        Ok(())
    }

    /// Process one event due no later than `horizon`. Returns false when
    /// stopped or nothing is due.
    pub fn step(&mut self, horizon: SimTime) -> Result<bool, ConfigError> {
        self.check_horizon(horizon)?;
        if self.stopped {
            return Ok(false);
        }
        self.start();
        Ok(self.scheduler.step(horizon, &mut self.state))
    }

    /// Process every event up to and including `horizon`, then close the
    /// observation window at `horizon`. May be called again with a later
    /// horizon to continue the run.
    pub fn run_until(&mut self, horizon: SimTime) -> Result<RunStatistics, ConfigError> {
        self.check_horizon(horizon)?;
        if self.stopped {
            return Ok(self.report());
        }
        self.start();

        let processed = self.scheduler.run_until(horizon, &mut self.state);
        self.scheduler.advance_to(horizon);
        self.state.advance_clock(horizon);

        let report = self.report();
        info!(
            "ran to {:.3}: {} events, {} arrivals, {} completions, {} rejections, {} pending",
            horizon,
            processed,
            report.arrivals,
            report.completions,
            report.rejections,
            self.scheduler.len()
        );
        Ok(report)
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Events waiting to fire
    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Occupancy of every group at the current clock
    pub fn snapshot(&self) -> Vec<GroupSnapshot> {
        self.state.groups.iter().map(ResourceGroup::snapshot).collect()
    }

    /// Statistics accumulated up to the last processed event or closed horizon
    pub fn report(&self) -> RunStatistics {
        self.state.stats.report(self.seed, &self.state.groups)
    }

    /// Recorded transitions, if tracing is enabled
    pub fn trace(&self) -> Option<&[TraceRecord]> {
        self.state.trace.as_deref()
    }

    /// Take the recorded transitions, leaving an empty trace behind
    pub fn take_trace(&mut self) -> Option<Vec<TraceRecord>> {
        self.state.trace.as_mut().map(std::mem::take)
    }

    pub fn groups(&self) -> &[ResourceGroup] {
        &self.state.groups
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Build an engine for `config`, run it to `options.horizon` and return the
/// statistics (and trace, if requested)
pub fn run_simulation(config: &SimulationConfig, options: RunOptions) -> Result<RunOutcome, ConfigError> {
    let mut engine = SimulationEngine::new(config.clone(), options.seed)?;
    if options.record_trace {
        engine = engine.with_trace();
    }
    let statistics = engine.run_until(options.horizon)?;
    Ok(RunOutcome {
        statistics,
        trace: engine.take_trace(),
    })
}
