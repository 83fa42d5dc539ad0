use super::event::EventKind;
use super::types::SimTime;
use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub sequence_num: u64,
    pub event: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Receives events popped by [`EventScheduler`].
///
/// Returns follow-up events as `(event, delay)` pairs; they are scheduled at
/// `now + delay` in the order returned.
pub trait EventHandler {
    fn react(&mut self, now: SimTime, event: EventKind) -> Vec<(EventKind, SimTime)>;
}

/// Time-ordered pending-event set plus the simulation clock.
///
/// Events fire in non-decreasing time order. Equal times fire in the order
/// they were scheduled, whatever their kind.
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
    now: SimTime,
}

impl EventScheduler {
    /// Create a new EventScheduler with the clock at zero
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
            now: 0.0,
        }
    }

    /// Schedule an event at an absolute time. Times in the past are clamped
    /// to the current clock so the clock never runs backwards.
    pub fn schedule(&mut self, event: EventKind, time: SimTime) {
        debug_assert!(time >= self.now, "event {} scheduled in the past", event);
        let time = time.max(self.now);
        trace!("schedule {} at {:.4} (seq {})", event, time, self.sequence_counter);

        self.event_queue.push(ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            event,
        });
        self.sequence_counter += 1;
    }

    /// Schedule an event `delay` time units from now
    pub fn schedule_after(&mut self, event: EventKind, delay: SimTime) {
        self.schedule(event, self.now + delay);
    }

    /// Pop the earliest event if it fires no later than `horizon`, advancing
    /// the clock to its timestamp
    pub fn pop_until(&mut self, horizon: SimTime) -> Option<(SimTime, EventKind)> {
        if self.peek_next_time()? > horizon {
            return None;
        }
        let scheduled = self.event_queue.pop()?;
        self.now = scheduled.time;
        trace!("pop {} at {:.4} (seq {})", scheduled.event, scheduled.time, scheduled.sequence_num);
        Some((scheduled.time, scheduled.event))
    }

    /// Dispatch one event to `handler`. Returns false when nothing is due
    /// before `horizon`.
    pub fn step<H: EventHandler>(&mut self, horizon: SimTime, handler: &mut H) -> bool {
        let Some((now, event)) = self.pop_until(horizon) else {
            return false;
        };
        for (follow_up, delay) in handler.react(now, event) {
            self.schedule_after(follow_up, delay);
        }
        true
    }

    /// Dispatch events until the earliest remaining one lies beyond
    /// `horizon` or none remain. Returns the number processed.
    pub fn run_until<H: EventHandler>(&mut self, horizon: SimTime, handler: &mut H) -> usize {
        let mut processed = 0;
        while self.step(horizon, handler) {
            processed += 1;
        }
        processed
    }

    /// Move the clock forward without firing anything (end of an observation window)
    pub fn advance_to(&mut self, time: SimTime) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Get the next event time without removing events
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.time)
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
