use anyhow::Result;
use log::{info, warn};

use crate::{
    alert::{Alert, AlertDispatcher, AlertKind, AlertSink},
    config::AppConfig,
    detect::{ClassFilter, DetectionSource},
    event_log::EventLog,
    session::{SessionSummary, TrackingSession},
    zone::ZoneRegistry,
};

/// Drives a detection feed through tracking, zone resolution and the sinks
/// until the feed is exhausted.
///
/// An unreadable zones file or event log aborts the run before the first
/// frame. Once frames are flowing, per-event sink failures are logged and
/// skipped so one bad write cannot stall monitoring.
pub async fn run(
    config: AppConfig,
    mut source: impl DetectionSource,
    sink: impl AlertSink + 'static,
) -> Result<SessionSummary> {
    let registry = ZoneRegistry::load(&config.zones_file)?;
    info!(target: "monitor", "watching {} zones from {}", registry.len(), config.zones_file);

    let mut session = TrackingSession::new(registry, config.tracking_distance_threshold)?;
    let mut event_log = EventLog::create(&config.log_file)?;
    let filter = ClassFilter::new(&config.detection_classes, config.confidence_threshold);
    let dispatcher = config.alert_enabled.then(|| AlertDispatcher::spawn(sink));

    while let Some(frame) = source.next_frame()? {
        let detections = filter.apply(frame);
        for event in session.process_frame(&detections) {
            let zone_label = event
                .reported_zone()
                .and_then(|index| session.registry().label(index))
                .unwrap_or_default()
                .to_string();
            info!(
                target: "monitor",
                "Object {} ({}) {} {}", event.object_id, event.class, event.kind, zone_label
            );
            if let Err(err) = event_log.append(&event, &zone_label) {
                warn!(target: "monitor", "failed to record event: {err:#}");
            }
            if let (Some(dispatcher), Some(kind)) =
                (&dispatcher, AlertKind::from_event(event.kind))
            {
                dispatcher.push(Alert {
                    object_id: event.object_id,
                    zone_label,
                    kind,
                });
            }
        }
    }

    if let Some(dispatcher) = &dispatcher {
        dispatcher.shutdown().await;
    }

    let summary = session.summary();
    info!(target: "monitor", "Processed {} frames", summary.frames_processed);
    info!(target: "monitor", "Tracked {} objects", summary.objects_tracked);
    info!(target: "monitor", "Events saved to {}", config.log_file);
    Ok(summary)
}
