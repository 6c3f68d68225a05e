use std::collections::HashMap;

use crate::event::EventKind;

/// Zone membership of one tracked object.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum ZoneState {
    #[default]
    NoZone,
    InZone(usize),
}

impl From<Option<usize>> for ZoneState {
    fn from(zone: Option<usize>) -> Self {
        match zone {
            Some(index) => Self::InZone(index),
            None => Self::NoZone,
        }
    }
}

/// A membership change observed for one object in one frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ZoneChange {
    pub kind: EventKind,
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Per-object zone membership state, stepped once per frame per active
/// object.
///
/// Membership records persist for the whole session. An object that stops
/// appearing keeps its last recorded state, so vanishing while inside a zone
/// never reports an exit on its own.
#[derive(Debug, Default)]
pub struct TransitionEngine {
    states: HashMap<u64, ZoneState>,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the membership of `object_id` for this frame and returns the
    /// change relative to its previous state, if any.
    ///
    /// Objects observed for the first time step from [`ZoneState::NoZone`],
    /// so a first appearance inside a zone reports an entry.
    pub fn observe(&mut self, object_id: u64, current: Option<usize>) -> Option<ZoneChange> {
        let previous = self.states.get(&object_id).copied().unwrap_or_default();
        let next = ZoneState::from(current);
        let change = match (previous, next) {
            (ZoneState::NoZone, ZoneState::NoZone) => None,
            (ZoneState::NoZone, ZoneState::InZone(to)) => Some(ZoneChange {
                kind: EventKind::Entered,
                previous: None,
                current: Some(to),
            }),
            (ZoneState::InZone(from), ZoneState::NoZone) => Some(ZoneChange {
                kind: EventKind::Exited,
                previous: Some(from),
                current: None,
            }),
            (ZoneState::InZone(from), ZoneState::InZone(to)) if from == to => None,
            (ZoneState::InZone(from), ZoneState::InZone(to)) => Some(ZoneChange {
                kind: EventKind::Moved,
                previous: Some(from),
                current: Some(to),
            }),
        };
        self.states.insert(object_id, next);
        change
    }

    /// Last recorded membership for `object_id`.
    pub fn state(&self, object_id: u64) -> ZoneState {
        self.states.get(&object_id).copied().unwrap_or_default()
    }
}
