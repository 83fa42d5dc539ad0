use super::types::{EntityId, GroupId};

/// What happens when a scheduled event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Next entity arrives; the arrival process reschedules itself from here
    Arrival,
    /// `entity` finishes service at `group` and frees a server
    ServiceCompletion { group: GroupId, entity: EntityId },
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Arrival => write!(f, "arrival"),
            EventKind::ServiceCompletion { group, entity } => {
                write!(f, "completion({} @ {})", entity, group)
            }
        }
    }
}
