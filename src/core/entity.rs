use super::types::{EntityId, GroupId, SimTime};
use serde::{Deserialize, Serialize};

/// Where an entity is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    /// Created by the arrival process, not yet admitted anywhere
    Arrived,
    Queued,
    InService,
    /// Terminal: served and departed
    Completed,
    /// Terminal: turned away at admission
    Rejected,
}

/// One unit requesting service (a student at the canteen).
///
/// Owned by exactly one holder at a time: the arrival dispatch path, then the
/// waiting line or service slots of a single resource group.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub arrival_time: SimTime,
    pub group: Option<GroupId>,
    pub queue_entry: Option<SimTime>,
    pub service_start: Option<SimTime>,
    pub service_end: Option<SimTime>,
    pub state: EntityState,
}

impl Entity {
    pub fn new(id: EntityId, arrival_time: SimTime) -> Self {
        Self {
            id,
            arrival_time,
            group: None,
            queue_entry: None,
            service_start: None,
            service_end: None,
            state: EntityState::Arrived,
        }
    }

    /// Time spent in the waiting line. Zero when served on admission or not
    /// yet in service.
    pub fn waiting_time(&self) -> f64 {
        match (self.queue_entry, self.service_start) {
            (Some(entered), Some(started)) => started - entered,
            _ => 0.0,
        }
    }

    /// Time spent in service, once departed
    pub fn service_time(&self) -> Option<f64> {
        Some(self.service_end? - self.service_start?)
    }
}
