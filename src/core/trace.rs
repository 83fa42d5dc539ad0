use super::types::{EntityId, GroupId, SimTime};
use serde::{Deserialize, Serialize};

/// A state transition of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// Entity arrived and was routed to the record's group
    Arrival,
    QueueEnter,
    ServiceStart { waited: f64 },
    Departure { service_start: SimTime },
    Rejection,
    /// Chosen group was full; entity redirected to `to`
    Reroute { to: GroupId },
}

/// One line of the event trace consumed by display layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub time: SimTime,
    pub entity: EntityId,
    pub group: GroupId,
    pub transition: Transition,
}

/// Observer trait for simulation progress
///
/// Hooks run synchronously on the dispatch path and default to no-ops.
pub trait SimulationObserver {
    /// Called when the simulation clock advances
    fn on_clock_advance(&mut self, _old_time: SimTime, _new_time: SimTime) {}

    /// Called for every entity state transition
    fn on_transition(&mut self, _record: &TraceRecord) {}
}

/// A [`SimulationObserver`] that does nothing
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}
