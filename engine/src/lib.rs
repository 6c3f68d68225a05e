mod alert;
mod config;
mod detect;
mod event;
mod event_log;
mod run;
mod session;
mod tracker;
mod transition;
mod zone;

pub use {
    alert::{Alert, AlertDispatcher, AlertKind, AlertSink, ConsoleAlertSink},
    config::AppConfig,
    detect::{ClassFilter, DetectionSource, FrameRecord, JsonlDetectionSource, RawDetection},
    event::{EventKind, TransitionEvent},
    event_log::EventLog,
    run::run,
    session::{SessionSummary, TrackingSession},
    tracker::{CentroidTracker, Detection, TrackedObject},
    transition::{TransitionEngine, ZoneChange, ZoneState},
    zone::{Point, Zone, ZoneRegistry},
};
