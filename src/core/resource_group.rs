use super::config::{AdmissionPolicy, GroupConfig};
use super::entity::{Entity, EntityState};
use super::random::RandomSource;
use super::types::{EntityId, GroupId, SimTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// An entity moving from the waiting line (or the door) onto a server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceStart {
    pub entity: EntityId,
    /// Time spent in the waiting line
    pub waited: f64,
    /// Sampled service duration; completion fires this far in the future
    pub service_time: f64,
}

/// Outcome of offering an entity to a group
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// A server was free and service began immediately
    Started(ServiceStart),
    /// All servers busy; the entity joined the waiting line
    Queued,
    /// All servers busy and the waiting line full. The entity is handed back.
    Rejected(Entity),
}

/// Result of a service completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub departed: Entity,
    /// Head of the waiting line, if one took over the freed server
    pub next: Option<ServiceStart>,
}

/// Live occupancy of a group, for display layers polling mid-run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub group: GroupId,
    pub name: String,
    pub queue_length: usize,
    pub busy: usize,
    pub servers: usize,
    pub queue_capacity: usize,
}

/// A named pool of identical servers with a bounded FIFO waiting line.
///
/// Owns every entity routed to it until departure: waiting ones in `waiting`,
/// served ones in `in_service`. `busy` always equals `in_service.len()` and
/// never exceeds `servers`.
#[derive(Debug)]
pub struct ResourceGroup {
    id: GroupId,
    name: String,
    servers: usize,
    mean_service_time: f64,
    queue_capacity: usize,
    admission: AdmissionPolicy,
    waiting: VecDeque<Entity>,
    in_service: BTreeMap<EntityId, Entity>,
}

impl ResourceGroup {
    /// Create an idle group from its (already validated) configuration
    pub fn new(id: GroupId, config: &GroupConfig, admission: AdmissionPolicy) -> Self {
        Self {
            id,
            name: config.name.clone(),
            servers: config.servers,
            mean_service_time: config.mean_service_time,
            queue_capacity: config.queue_capacity,
            admission,
            waiting: VecDeque::new(),
            in_service: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn servers(&self) -> usize {
        self.servers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn mean_service_time(&self) -> f64 {
        self.mean_service_time
    }

    /// Number of servers currently busy
    pub fn busy(&self) -> usize {
        self.in_service.len()
    }

    /// Number of entities in the waiting line
    pub fn queue_length(&self) -> usize {
        self.waiting.len()
    }

    /// Entities currently held, waiting or in service
    pub fn in_system(&self) -> usize {
        self.waiting.len() + self.in_service.len()
    }

    /// Ids of the waiting entities, head first
    pub fn waiting_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.waiting.iter().map(|e| e.id)
    }

    fn has_free_server(&self) -> bool {
        self.in_service.len() < self.servers
    }

    fn has_queue_space(&self) -> bool {
        match self.admission {
            AdmissionPolicy::Unbounded => true,
            AdmissionPolicy::Reject | AdmissionPolicy::Reroute => {
                self.waiting.len() < self.queue_capacity
            }
        }
    }

    /// Whether an entity offered now would be served or queued
    pub fn can_accept(&self) -> bool {
        self.has_free_server() || self.has_queue_space()
    }

    /// Offer an arriving entity to this group.
    ///
    /// Free server: service starts now. Otherwise the entity waits if the line
    /// has room, else it is rejected and handed back to the caller.
    pub fn admit(&mut self, mut entity: Entity, now: SimTime, rng: &mut RandomSource) -> Admission {
        entity.group = Some(self.id);

        if self.has_free_server() {
            let start = self.start_service(entity, now, rng);
            debug!("{}: {} served on arrival at {:.3}", self.name, start.entity, now);
            return Admission::Started(start);
        }

        if self.has_queue_space() {
            entity.state = EntityState::Queued;
            entity.queue_entry = Some(now);
            debug!(
                "{}: {} queued at {:.3} (line {})",
                self.name,
                entity.id,
                now,
                self.waiting.len() + 1
            );
            self.waiting.push_back(entity);
            return Admission::Queued;
        }

        entity.state = EntityState::Rejected;
        debug!("{}: {} rejected at {:.3}, group full", self.name, entity.id, now);
        Admission::Rejected(entity)
    }

    /// Finish service of `entity`, then hand the freed server to the head of
    /// the waiting line.
    ///
    /// Returns `None` if the entity is not in service here.
    pub fn complete(
        &mut self,
        entity: EntityId,
        now: SimTime,
        rng: &mut RandomSource,
    ) -> Option<Completion> {
        let Some(mut departed) = self.in_service.remove(&entity) else {
            warn!("{}: completion for {} which is not in service", self.name, entity);
            return None;
        };
        departed.service_end = Some(now);
        departed.state = EntityState::Completed;

        let next = self
            .waiting
            .pop_front()
            .map(|head| self.start_service(head, now, rng));

        Some(Completion { departed, next })
    }

    fn start_service(&mut self, mut entity: Entity, now: SimTime, rng: &mut RandomSource) -> ServiceStart {
        debug_assert!(self.has_free_server());
        entity.state = EntityState::InService;
        entity.service_start = Some(now);
        let start = ServiceStart {
            entity: entity.id,
            waited: entity.waiting_time(),
            service_time: rng.exponential(self.mean_service_time),
        };
        self.in_service.insert(entity.id, entity);
        start
    }

    /// Current occupancy for display layers
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            group: self.id,
            name: self.name.clone(),
            queue_length: self.queue_length(),
            busy: self.busy(),
            servers: self.servers,
            queue_capacity: self.queue_capacity,
        }
    }
}
