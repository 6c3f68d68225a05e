use chrono::{DateTime, Local};
use strum::Display;

/// The kind of zone membership change an object underwent.
///
/// The display names are the exact strings written to the event log.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum EventKind {
    Entered,
    Exited,
    Moved,
}

/// A single zone membership change, emitted at most once per object per
/// frame and immutable afterwards.
#[derive(Clone, PartialEq, Debug)]
pub struct TransitionEvent {
    pub timestamp: DateTime<Local>,
    pub object_id: u64,
    pub class: String,
    pub previous_zone: Option<usize>,
    pub current_zone: Option<usize>,
    pub kind: EventKind,
    pub confidence: f32,
}

impl TransitionEvent {
    /// The zone index this event reports: the new zone for [`EventKind::Entered`]
    /// and [`EventKind::Moved`], the zone left behind for [`EventKind::Exited`].
    pub fn reported_zone(&self) -> Option<usize> {
        match self.kind {
            EventKind::Entered | EventKind::Moved => self.current_zone,
            EventKind::Exited => self.previous_zone,
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Local;

    use super::{EventKind, TransitionEvent};

    fn event(kind: EventKind, previous: Option<usize>, current: Option<usize>) -> TransitionEvent {
        TransitionEvent {
            timestamp: Local::now(),
            object_id: 1,
            class: "person".to_string(),
            previous_zone: previous,
            current_zone: current,
            kind,
            confidence: 0.9,
        }
    }

    #[test]
    fn kind_names_match_log_format() {
        assert_eq!(EventKind::Entered.to_string(), "Entered");
        assert_eq!(EventKind::Exited.to_string(), "Exited");
        assert_eq!(EventKind::Moved.to_string(), "Moved");
    }

    #[test]
    fn reported_zone_per_kind() {
        assert_eq!(event(EventKind::Entered, None, Some(2)).reported_zone(), Some(2));
        assert_eq!(event(EventKind::Exited, Some(1), None).reported_zone(), Some(1));
        assert_eq!(event(EventKind::Moved, Some(0), Some(3)).reported_zone(), Some(3));
    }
}
