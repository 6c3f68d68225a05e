use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use csv::Writer;

use crate::event::TransitionEvent;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appends transition events to a CSV file, one record per event.
///
/// The file is created fresh at session start with a header row, and every
/// append is flushed so records survive an abrupt end of the process.
pub struct EventLog {
    writer: Writer<File>,
}

impl EventLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut writer = Writer::from_path(path)
            .with_context(|| format!("failed to create event log {}", path.display()))?;
        writer
            .write_record(["Timestamp", "ObjectID", "Zone", "Event", "Class", "Confidence"])
            .context("failed to write event log header")?;
        writer.flush().context("failed to flush event log")?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, event: &TransitionEvent, zone_label: &str) -> Result<()> {
        self.writer
            .write_record([
                event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                event.object_id.to_string(),
                zone_label.to_string(),
                event.kind.to_string(),
                event.class.clone(),
                event.confidence.to_string(),
            ])
            .context("failed to append event record")?;
        self.writer.flush().context("failed to flush event log")
    }
}
