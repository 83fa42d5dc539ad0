use super::entity::Entity;
use super::errors::ConfigError;
use super::random::RandomSource;
use super::types::{EntityId, SimTime};

/// Poisson arrival stream.
///
/// Modelled as a recurring `Arrival` event: each firing creates one entity and
/// yields the delay to the next firing, or `None` once the cutoff is passed.
#[derive(Debug, Clone)]
pub struct ArrivalProcess {
    mean_interarrival: f64,
    cutoff: Option<SimTime>,
    next_id: u64,
}

impl ArrivalProcess {
    pub fn new(mean_interarrival: f64, cutoff: Option<SimTime>) -> Result<Self, ConfigError> {
        if !(mean_interarrival > 0.0) || !mean_interarrival.is_finite() {
            return Err(ConfigError::NonPositiveArrivalMean(mean_interarrival));
        }
        Ok(Self {
            mean_interarrival,
            cutoff,
            next_id: 0,
        })
    }

    /// Delay from `now` to the next arrival, if it still falls before the cutoff
    pub fn next_delay(&self, now: SimTime, rng: &mut RandomSource) -> Option<SimTime> {
        let delay = rng.exponential(self.mean_interarrival);
        match self.cutoff {
            Some(cutoff) if now + delay > cutoff => None,
            _ => Some(delay),
        }
    }

    /// Create the entity for an arrival firing at `now`
    pub fn create_entity(&mut self, now: SimTime) -> Entity {
        let entity = Entity::new(EntityId(self.next_id), now);
        self.next_id += 1;
        entity
    }

    /// Number of entities created so far
    pub fn generated(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_mean() {
        assert_eq!(
            ArrivalProcess::new(0.0, None).unwrap_err(),
            ConfigError::NonPositiveArrivalMean(0.0)
        );
        assert!(ArrivalProcess::new(-3.0, None).is_err());
    }

    #[test]
    fn test_entities_get_sequential_ids_and_arrival_stamp() {
        let mut process = ArrivalProcess::new(1.0, None).unwrap();
        let first = process.create_entity(0.5);
        let second = process.create_entity(1.7);
        assert_eq!(first.id, EntityId(0));
        assert_eq!(second.id, EntityId(1));
        assert_eq!(second.arrival_time, 1.7);
        assert_eq!(process.generated(), 2);
    }

    #[test]
    fn test_cutoff_stops_generation() {
        let process = ArrivalProcess::new(1.0, Some(10.0)).unwrap();
        let mut rng = RandomSource::new(11);
        // Far past the cutoff every draw lands beyond it
        for _ in 0..100 {
            assert_eq!(process.next_delay(20.0, &mut rng), None);
        }
    }

    #[test]
    fn test_no_cutoff_always_yields_delay() {
        let process = ArrivalProcess::new(2.0, None).unwrap();
        let mut rng = RandomSource::new(11);
        for _ in 0..100 {
            let delay = process.next_delay(1e9, &mut rng).unwrap();
            assert!(delay >= 0.0);
        }
    }
}
