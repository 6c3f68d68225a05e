use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use log::warn;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::tracker::Detection;

/// One raw detector output, before class and confidence filtering.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RawDetection {
    pub bbox: [i32; 4],
    pub class_id: u32,
    pub confidence: f32,
}

/// One frame's worth of detector output on the wire.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
pub struct FrameRecord {
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// A per-frame feed of detections from an upstream detector.
#[cfg_attr(test, automock)]
pub trait DetectionSource {
    /// Detections for the next frame, or `None` once the feed ends.
    fn next_frame(&mut self) -> Result<Option<Vec<RawDetection>>>;
}

/// Reads frames from a JSON Lines file, one [`FrameRecord`] per line.
///
/// A line that fails to parse counts as a frame with no detections; blank
/// lines are skipped.
#[derive(Debug)]
pub struct JsonlDetectionSource {
    reader: BufReader<File>,
    line: u64,
}

impl JsonlDetectionSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open detection feed {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            line: 0,
        })
    }
}

impl DetectionSource for JsonlDetectionSource {
    fn next_frame(&mut self) -> Result<Option<Vec<RawDetection>>> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let read = self
                .reader
                .read_line(&mut buffer)
                .context("failed to read detection feed")?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = buffer.trim();
            if text.is_empty() {
                continue;
            }
            return match serde_json::from_str::<FrameRecord>(text) {
                Ok(record) => Ok(Some(record.detections)),
                Err(err) => {
                    warn!(target: "feed", "malformed frame record at line {}: {err}", self.line);
                    Ok(Some(Vec::new()))
                }
            };
        }
    }
}

/// Keeps detections whose class is configured and whose confidence reaches
/// the threshold, resolving numeric class ids to their configured names.
///
/// The id-to-name lookup is built once per session from the configuration
/// map of class name to detector id.
#[derive(Clone, Debug)]
pub struct ClassFilter {
    names: HashMap<u32, String>,
    confidence_threshold: f32,
}

impl ClassFilter {
    pub fn new(classes: &BTreeMap<String, u32>, confidence_threshold: f32) -> Self {
        let mut names = HashMap::new();
        for (name, id) in classes {
            names.entry(*id).or_insert_with(|| name.clone());
        }
        Self {
            names,
            confidence_threshold,
        }
    }

    pub fn apply(&self, detections: Vec<RawDetection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter_map(|raw| {
                let name = self.names.get(&raw.class_id)?;
                (raw.confidence >= self.confidence_threshold)
                    .then(|| Detection::new(raw.bbox, name.clone(), raw.confidence))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::{collections::BTreeMap, io::Write};

    use super::{ClassFilter, DetectionSource, FrameRecord, JsonlDetectionSource, RawDetection};

    fn raw(class_id: u32, confidence: f32) -> RawDetection {
        RawDetection {
            bbox: [0, 0, 10, 10],
            class_id,
            confidence,
        }
    }

    fn person_filter(confidence_threshold: f32) -> ClassFilter {
        let classes = BTreeMap::from([("person".to_string(), 0), ("car".to_string(), 2)]);
        ClassFilter::new(&classes, confidence_threshold)
    }

    #[test]
    fn filter_drops_unknown_classes() {
        let detections = person_filter(0.5).apply(vec![raw(0, 0.9), raw(7, 0.9)]);

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class(), "person");
    }

    #[test]
    fn filter_keeps_confidence_at_threshold() {
        let detections = person_filter(0.5).apply(vec![raw(2, 0.5), raw(0, 0.49)]);

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class(), "car");
        assert_eq!(detections[0].confidence(), 0.5);
    }

    #[test]
    fn filter_resolves_duplicate_ids_deterministically() {
        let classes = BTreeMap::from([
            ("truck".to_string(), 7),
            ("lorry".to_string(), 7),
        ]);
        let detections = ClassFilter::new(&classes, 0.0).apply(vec![raw(7, 0.9)]);

        assert_eq!(detections[0].class(), "lorry");
    }

    #[test]
    fn jsonl_source_reads_frames_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"detections": [{{"bbox": [0, 0, 10, 10], "class_id": 0, "confidence": 0.9}}]}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"detections": []}}"#).unwrap();
        file.flush().unwrap();

        let mut source = JsonlDetectionSource::open(file.path()).unwrap();
        assert_eq!(
            source.next_frame().unwrap(),
            Some(vec![RawDetection {
                bbox: [0, 0, 10, 10],
                class_id: 0,
                confidence: 0.9,
            }])
        );
        assert_eq!(source.next_frame().unwrap(), Some(vec![]));
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn jsonl_source_degrades_malformed_lines_to_empty_frames() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a frame").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{}}"#).unwrap();
        file.flush().unwrap();

        let mut source = JsonlDetectionSource::open(file.path()).unwrap();
        assert_eq!(source.next_frame().unwrap(), Some(vec![]));
        assert_eq!(source.next_frame().unwrap(), Some(vec![]));
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn jsonl_source_missing_file_fails() {
        assert!(JsonlDetectionSource::open("no-such-feed.jsonl").is_err());
    }

    #[test]
    fn frame_record_round_trips() {
        let record = FrameRecord {
            detections: vec![raw(0, 0.75)],
        };

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<FrameRecord>(&text).unwrap(), record);
    }
}
