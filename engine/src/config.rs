use std::{collections::BTreeMap, fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Runtime configuration for one monitoring session.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct AppConfig {
    /// Path of the JSON Lines detection feed to consume.
    #[serde(default = "detections_file_default")]
    pub detections_file: String,
    /// Minimum confidence for a detection to be considered, applied by the
    /// class filter before tracking.
    #[serde(default = "confidence_threshold_default")]
    pub confidence_threshold: f32,
    /// Maximum centroid distance in pixels for a detection to match a
    /// previous frame's object. Must be positive.
    #[serde(default = "tracking_distance_threshold_default")]
    pub tracking_distance_threshold: f64,
    /// Path of the CSV event log, truncated at session start.
    #[serde(default = "log_file_default")]
    pub log_file: String,
    /// Path of the zone registry file.
    #[serde(default = "zones_file_default")]
    pub zones_file: String,
    /// Monitored classes: name to the detector's numeric class id.
    #[serde(default = "detection_classes_default")]
    pub detection_classes: BTreeMap<String, u32>,
    /// Whether entry/exit alerts are delivered at all.
    #[serde(default = "alert_enabled_default")]
    pub alert_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detections_file: detections_file_default(),
            confidence_threshold: confidence_threshold_default(),
            tracking_distance_threshold: tracking_distance_threshold_default(),
            log_file: log_file_default(),
            zones_file: zones_file_default(),
            detection_classes: detection_classes_default(),
            alert_enabled: alert_enabled_default(),
        }
    }
}

fn detections_file_default() -> String {
    "detections.jsonl".to_string()
}

fn confidence_threshold_default() -> f32 {
    0.5
}

fn tracking_distance_threshold_default() -> f64 {
    50.0
}

fn log_file_default() -> String {
    "logs.csv".to_string()
}

fn zones_file_default() -> String {
    "zones.json".to_string()
}

fn detection_classes_default() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("person".to_string(), 0),
        ("car".to_string(), 2),
        ("motorcycle".to_string(), 3),
        ("bus".to_string(), 5),
        ("truck".to_string(), 7),
    ])
}

fn alert_enabled_default() -> bool {
    true
}

impl AppConfig {
    /// Loads the configuration file, falling back to defaults when the file
    /// does not exist. A file that exists but cannot be read or parsed is an
    /// error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(target: "config", "{} not found, using default settings", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config {}", path.display()));
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}
