// Tests for SimulationEngine functionality
use crate::core::config::{AdmissionPolicy, GroupConfig, SimulationConfig};
use crate::core::errors::ConfigError;
use crate::core::simulation_engine::{run_simulation, RunOptions, SimulationEngine};
use crate::core::trace::{SimulationObserver, TraceRecord, Transition};
use crate::core::types::{GroupId, SimTime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

fn busy_facility() -> SimulationConfig {
    SimulationConfig::new(0.8)
        .with_group(GroupConfig::new("snack", 2, 2.0, 3, 0.6))
        .with_group(GroupConfig::new("noodles", 1, 1.5, 2, 0.4))
}

#[test]
fn test_capacity_invariants_hold_at_every_event() {
    let mut engine = SimulationEngine::new(busy_facility(), 11).unwrap();
    let mut steps = 0;
    while engine.step(500.0).unwrap() {
        steps += 1;
        for snapshot in engine.snapshot() {
            assert!(snapshot.busy <= snapshot.servers, "busy servers exceed count: {:?}", snapshot);
            assert!(
                snapshot.queue_length <= snapshot.queue_capacity,
                "waiting line exceeds capacity: {:?}",
                snapshot
            );
        }
    }
    assert!(steps > 100);
    assert!(engine.now() <= 500.0);
}

#[test]
fn test_snapshot_before_start_is_idle() {
    let engine = SimulationEngine::new(busy_facility(), 1).unwrap();
    assert_eq!(engine.now(), 0.0);
    assert_eq!(engine.pending_events(), 0);
    for snapshot in engine.snapshot() {
        assert_eq!(snapshot.busy, 0);
        assert_eq!(snapshot.queue_length, 0);
    }
}

#[test]
fn test_same_seed_reproduces_statistics_and_trace() {
    let options = RunOptions::new(300.0, 42).with_trace();
    let first = run_simulation(&busy_facility(), options).unwrap();
    let second = run_simulation(&busy_facility(), options).unwrap();

    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.trace, second.trace);
    assert!(first.trace.as_ref().map_or(false, |t| !t.is_empty()));
}

#[test]
fn test_different_seeds_give_different_traces() {
    let a = run_simulation(&busy_facility(), RunOptions::new(300.0, 1).with_trace()).unwrap();
    let b = run_simulation(&busy_facility(), RunOptions::new(300.0, 2).with_trace()).unwrap();
    assert_ne!(a.trace, b.trace);
}

#[test]
fn test_trace_timings_are_consistent() {
    let outcome = run_simulation(&busy_facility(), RunOptions::new(400.0, 5).with_trace()).unwrap();
    let trace = outcome.trace.unwrap();

    let mut last_time = 0.0;
    let mut departures = 0;
    for record in &trace {
        assert!(record.time >= last_time, "trace went back in time at {:?}", record);
        last_time = record.time;
        match record.transition {
            Transition::ServiceStart { waited } => assert!(waited >= 0.0),
            Transition::Departure { service_start } => {
                assert!(service_start <= record.time);
                departures += 1;
            }
            _ => {}
        }
    }
    assert_eq!(departures as u64, outcome.statistics.completions);
}

#[test]
fn test_queued_entities_start_in_fifo_order() {
    let outcome = run_simulation(&busy_facility(), RunOptions::new(400.0, 8).with_trace()).unwrap();
    let trace = outcome.trace.unwrap();

    let mut queued: HashMap<GroupId, Vec<u64>> = HashMap::new();
    let mut started_from_queue: HashMap<GroupId, Vec<u64>> = HashMap::new();
    for record in &trace {
        match record.transition {
            Transition::QueueEnter => queued.entry(record.group).or_default().push(record.entity.0),
            Transition::ServiceStart { .. } => {
                let was_queued = queued
                    .get(&record.group)
                    .map_or(false, |ids| ids.contains(&record.entity.0));
                if was_queued {
                    started_from_queue.entry(record.group).or_default().push(record.entity.0);
                }
            }
            _ => {}
        }
    }

    for (group, started) in started_from_queue {
        let entered = &queued[&group];
        assert_eq!(&entered[..started.len()], &started[..], "group {} not FIFO", group);
    }
}

#[test]
fn test_conservation_per_group_and_overall() {
    let stats = run_simulation(&busy_facility(), RunOptions::new(250.0, 3))
        .unwrap()
        .statistics;

    assert_eq!(stats.arrivals, stats.completions + stats.rejections + stats.in_system());
    for group in &stats.groups {
        assert_eq!(
            group.arrivals,
            group.completions + group.rejections + group.in_system(),
            "group {} leaks entities",
            group.name
        );
    }
    assert!(stats.rejections > 0, "the busy facility should overflow");
}

#[test]
fn test_incremental_runs_match_single_run_counters() {
    let mut whole = SimulationEngine::new(busy_facility(), 9).unwrap();
    let whole_stats = whole.run_until(200.0).unwrap();

    let mut pieces = SimulationEngine::new(busy_facility(), 9).unwrap();
    pieces.run_until(50.0).unwrap();
    pieces.run_until(120.0).unwrap();
    let piece_stats = pieces.run_until(200.0).unwrap();

    assert_eq!(whole_stats.arrivals, piece_stats.arrivals);
    assert_eq!(whole_stats.completions, piece_stats.completions);
    assert_eq!(whole_stats.rejections, piece_stats.rejections);
    assert_eq!(piece_stats.horizon, 200.0);
    for (a, b) in whole_stats.groups.iter().zip(&piece_stats.groups) {
        assert!((a.utilization() - b.utilization()).abs() < 1e-9);
    }
}

#[test]
fn test_invalid_horizon_is_a_configuration_error() {
    let mut engine = SimulationEngine::new(busy_facility(), 1).unwrap();
    assert!(matches!(
        engine.run_until(f64::NAN),
        Err(ConfigError::InvalidHorizon { .. })
    ));
    assert!(matches!(
        engine.run_until(-1.0),
        Err(ConfigError::InvalidHorizon { .. })
    ));

    engine.run_until(10.0).unwrap();
    assert_eq!(
        engine.run_until(5.0).unwrap_err(),
        ConfigError::InvalidHorizon { horizon: 5.0, now: 10.0 }
    );
}

#[test]
fn test_stop_halts_processing() {
    let mut engine = SimulationEngine::new(busy_facility(), 4).unwrap();
    engine.run_until(20.0).unwrap();
    let before = engine.report();

    engine.stop();
    assert!(engine.is_stopped());
    assert!(!engine.step(1_000.0).unwrap());
    let after = engine.run_until(1_000.0).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_arrival_cutoff_stops_new_arrivals() {
    let config = busy_facility().with_arrival_cutoff(50.0);
    let outcome = run_simulation(&config, RunOptions::new(200.0, 6).with_trace()).unwrap();
    let trace = outcome.trace.unwrap();

    let last_arrival = trace
        .iter()
        .filter(|r| r.transition == Transition::Arrival)
        .map(|r| r.time)
        .fold(0.0, f64::max);
    assert!(last_arrival > 0.0);
    assert!(last_arrival <= 50.0);
}

#[test]
fn test_reroute_sends_overflow_to_groups_with_room() {
    let config = SimulationConfig::new(0.5)
        .with_group(GroupConfig::new("tiny", 1, 5.0, 0, 0.7))
        .with_group(GroupConfig::new("roomy", 4, 1.0, 1_000, 0.3))
        .with_admission(AdmissionPolicy::Reroute);
    let stats = run_simulation(&config, RunOptions::new(300.0, 12)).unwrap().statistics;

    let tiny = stats.group("tiny").unwrap();
    let roomy = stats.group("roomy").unwrap();
    assert!(tiny.rerouted > 0);
    assert_eq!(stats.rejections, 0);
    assert!(roomy.arrivals > tiny.arrivals);
}

#[test]
fn test_reroute_rejects_when_every_group_is_full() {
    let config = SimulationConfig::new(0.1)
        .with_group(GroupConfig::new("a", 1, 5.0, 0, 0.5))
        .with_group(GroupConfig::new("b", 1, 5.0, 0, 0.5))
        .with_admission(AdmissionPolicy::Reroute);
    let stats = run_simulation(&config, RunOptions::new(100.0, 12)).unwrap().statistics;
    assert!(stats.rejections > 0);
    assert_eq!(stats.arrivals, stats.completions + stats.rejections + stats.in_system());
}

#[test]
fn test_unbounded_policy_never_rejects() {
    let config = busy_facility().with_admission(AdmissionPolicy::Unbounded);
    let stats = run_simulation(&config, RunOptions::new(300.0, 2)).unwrap().statistics;
    assert_eq!(stats.rejections, 0);
    assert!(stats.groups.iter().any(|g| g.max_queue_length > g.queue_capacity));
}

struct ClockLog(Rc<RefCell<Vec<(SimTime, SimTime)>>>);

impl SimulationObserver for ClockLog {
    fn on_clock_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        self.0.borrow_mut().push((old_time, new_time));
    }
}

struct TransitionLog(Rc<RefCell<Vec<TraceRecord>>>);

impl SimulationObserver for TransitionLog {
    fn on_transition(&mut self, record: &TraceRecord) {
        self.0.borrow_mut().push(*record);
    }
}

#[test]
fn test_observers_see_monotonic_clock_and_every_transition() {
    let clock = Rc::new(RefCell::new(Vec::new()));
    let transitions = Rc::new(RefCell::new(Vec::new()));

    let mut engine = SimulationEngine::new(busy_facility(), 21).unwrap().with_trace();
    engine.add_observer(Box::new(ClockLog(Rc::clone(&clock))));
    engine.add_observer(Box::new(TransitionLog(Rc::clone(&transitions))));
    engine.run_until(100.0).unwrap();

    let clock = clock.borrow();
    assert!(!clock.is_empty());
    for window in clock.windows(2) {
        assert_eq!(window[0].1, window[1].0);
    }
    assert!(clock.iter().all(|(old, new)| new > old));
    assert_eq!(clock.last().map(|(_, new)| *new), Some(100.0));

    assert_eq!(engine.trace().unwrap(), &transitions.borrow()[..]);
}
