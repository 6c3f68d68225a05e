use anyhow::Result;
use chrono::Local;

use crate::{
    event::TransitionEvent,
    tracker::{CentroidTracker, Detection},
    transition::TransitionEngine,
    zone::ZoneRegistry,
};

/// Counters reported once a detection feed is exhausted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub objects_tracked: u64,
    pub events_emitted: u64,
}

/// Per-feed monitoring state: identity assignment, zone membership and the
/// transitions derived from it.
///
/// One session covers one detection feed from start to finish. Feeding it
/// frames out of order produces transitions for an order nobody observed, so
/// callers hand frames over as the feed yields them.
#[derive(Debug)]
pub struct TrackingSession {
    registry: ZoneRegistry,
    tracker: CentroidTracker,
    transitions: TransitionEngine,
    frames_processed: u64,
    events_emitted: u64,
}

impl TrackingSession {
    pub fn new(registry: ZoneRegistry, distance_threshold: f64) -> Result<Self> {
        Ok(Self {
            registry,
            tracker: CentroidTracker::new(distance_threshold)?,
            transitions: TransitionEngine::default(),
            frames_processed: 0,
            events_emitted: 0,
        })
    }

    /// Advances the session by one frame and returns the membership changes
    /// it produced, in ascending object identity order.
    ///
    /// Objects absent from `detections` drop out of tracking silently; their
    /// last known membership stays recorded and produces no event.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Vec<TransitionEvent> {
        self.frames_processed += 1;

        let mut events = Vec::new();
        for (id, object) in self.tracker.update(detections) {
            let current = self.registry.locate(object.centroid);
            let Some(change) = self.transitions.observe(*id, current) else {
                continue;
            };
            events.push(TransitionEvent {
                timestamp: Local::now(),
                object_id: *id,
                class: object.class.clone(),
                previous_zone: change.previous,
                current_zone: change.current,
                kind: change.kind,
                confidence: object.confidence,
            });
        }
        self.events_emitted += events.len() as u64;
        events
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames_processed: self.frames_processed,
            objects_tracked: self.tracker.last_id(),
            events_emitted: self.events_emitted,
        }
    }
}
