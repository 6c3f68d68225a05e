use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Minimum number of vertices for a zone polygon to be usable.
const MIN_ZONE_POINTS: usize = 3;

/// A point in frame pixel coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A labeled polygonal region in frame coordinates.
///
/// Vertices are stored in definition order as `[x, y]` pairs and are never
/// mutated after loading.
#[derive(Clone, PartialEq, Debug)]
pub struct Zone {
    points: Vec<[i32; 2]>,
    label: String,
}

impl Zone {
    pub fn new(points: Vec<[i32; 2]>, label: impl Into<String>) -> Self {
        Self {
            points,
            label: label.into(),
        }
    }

    pub fn points(&self) -> &[[i32; 2]] {
        &self.points
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether `point` lies inside the polygon, treating points exactly on
    /// an edge or vertex as inside.
    pub fn contains(&self, point: Point) -> bool {
        if self.points.len() < MIN_ZONE_POINTS {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let [xi, yi] = self.points[i];
            let [xj, yj] = self.points[j];
            if on_segment([xj, yj], [xi, yi], point) {
                return true;
            }
            if (yi > point.y) != (yj > point.y) {
                // Horizontal ray from `point`, exact integer arithmetic.
                let cross = (xj - xi) as i64 * (point.y - yi) as i64
                    - (point.x - xi) as i64 * (yj - yi) as i64;
                if cross != 0 && (cross > 0) == (yj > yi) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn on_segment(a: [i32; 2], b: [i32; 2], p: Point) -> bool {
    let cross =
        (b[0] - a[0]) as i64 * (p.y - a[1]) as i64 - (b[1] - a[1]) as i64 * (p.x - a[0]) as i64;
    cross == 0
        && p.x >= a[0].min(b[0])
        && p.x <= a[0].max(b[0])
        && p.y >= a[1].min(b[1])
        && p.y <= a[1].max(b[1])
}

/// The persisted form of the zone file.
#[derive(Serialize, Deserialize)]
struct ZonesFile {
    #[serde(default)]
    zones: Vec<Vec<[i32; 2]>>,
    #[serde(default)]
    labels: Vec<String>,
}

/// Accepts both the labeled object form and the legacy flat-array form.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZonesDocument {
    Labeled(ZonesFile),
    Flat(Vec<Vec<[i32; 2]>>),
}

/// The immutable, ordered set of monitored zones for one session.
///
/// A zone's position in the registry is its identity: membership checks scan
/// zones in ascending index order and the first containing zone wins.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Parses a zone document, synthesizing missing labels as "Zone N" and
    /// skipping polygons with fewer than 3 points.
    pub fn from_json(text: &str) -> Result<Self> {
        let (zones, labels) = match serde_json::from_str::<ZonesDocument>(text)
            .context("failed to parse zone file")?
        {
            ZonesDocument::Labeled(file) => (file.zones, file.labels),
            ZonesDocument::Flat(zones) => (zones, Vec::new()),
        };

        let zones = zones
            .into_iter()
            .enumerate()
            .filter_map(|(index, points)| {
                if points.len() < MIN_ZONE_POINTS {
                    warn!(
                        target: "zones",
                        "skipping zone {} with {} point(s), at least {MIN_ZONE_POINTS} required",
                        index + 1,
                        points.len()
                    );
                    return None;
                }
                let label = labels
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Zone {}", index + 1));
                Some(Zone::new(points, label))
            })
            .collect();
        Ok(Self { zones })
    }

    pub fn to_json(&self) -> Result<String> {
        let file = ZonesFile {
            zones: self.zones.iter().map(|zone| zone.points.clone()).collect(),
            labels: self.zones.iter().map(|zone| zone.label.clone()).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read zone file {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write zone file {}", path.display()))
    }

    /// Index of the first zone containing `point`, scanning in registry
    /// order.
    ///
    /// Linear in zones and vertices per call, which is fine for the expected
    /// tens of zones but does not scale to thousands.
    pub fn locate(&self, point: Point) -> Option<usize> {
        self.zones.iter().position(|zone| zone.contains(point))
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.zones.get(index).map(Zone::label)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
