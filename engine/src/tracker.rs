use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::zone::Point;

/// A detector output that passed class and confidence filtering.
#[derive(Clone, PartialEq, Debug)]
pub struct Detection {
    bbox: [i32; 4],
    class: String,
    confidence: f32,
}

impl Detection {
    pub fn new(bbox: [i32; 4], class: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            class: class.into(),
            confidence,
        }
    }

    pub fn bbox(&self) -> [i32; 4] {
        self.bbox
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Center of the bounding box in integer pixel coordinates.
    pub fn centroid(&self) -> Point {
        let [x1, y1, x2, y2] = self.bbox;
        Point::new((x1 + x2) / 2, (y1 + y2) / 2)
    }
}

/// An object holding a persistent identity, as of the latest frame that
/// matched it.
#[derive(Clone, PartialEq, Debug)]
pub struct TrackedObject {
    pub centroid: Point,
    pub class: String,
    pub confidence: f32,
}

/// Carries object identities across frames by nearest-centroid association.
///
/// Matching is greedy: each detection, in production order, takes the first
/// surviving object (scanned in ascending identity order) closer than the
/// distance threshold. This makes ties deterministic on identity order
/// rather than distance, which downstream behavior relies on.
#[derive(Debug)]
pub struct CentroidTracker {
    distance_threshold: f64,
    last_id: u64,
    objects: BTreeMap<u64, TrackedObject>,
}

impl CentroidTracker {
    /// Fails unless `distance_threshold` is a positive finite number.
    pub fn new(distance_threshold: f64) -> Result<Self> {
        if !distance_threshold.is_finite() || distance_threshold <= 0.0 {
            bail!("tracking distance threshold must be a positive number, got {distance_threshold}");
        }
        Ok(Self {
            distance_threshold,
            last_id: 0,
            objects: BTreeMap::new(),
        })
    }

    /// The most recently assigned identity, which is also the number of
    /// identities handed out so far. Identities start at 1 and are never
    /// reused within a session.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Objects matched or spawned by the latest frame, keyed by identity.
    pub fn objects(&self) -> &BTreeMap<u64, TrackedObject> {
        &self.objects
    }

    /// Associates `detections` with the previous frame's objects and replaces
    /// the active set with the result.
    ///
    /// A previous object can absorb at most one detection per frame: once
    /// matched it leaves the candidate pool. Unmatched detections spawn
    /// fresh identities. Previous objects left unmatched are dropped from
    /// the active set.
    pub fn update(&mut self, detections: &[Detection]) -> &BTreeMap<u64, TrackedObject> {
        let mut available: BTreeMap<u64, Point> = self
            .objects
            .iter()
            .map(|(id, object)| (*id, object.centroid))
            .collect();
        let mut updated = BTreeMap::new();

        for detection in detections {
            let centroid = detection.centroid();
            let matched = available
                .iter()
                .find(|(_, previous)| distance(centroid, **previous) < self.distance_threshold)
                .map(|(id, _)| *id);
            let id = match matched {
                Some(id) => {
                    available.remove(&id);
                    id
                }
                None => {
                    self.last_id += 1;
                    self.last_id
                }
            };
            updated.insert(
                id,
                TrackedObject {
                    centroid,
                    class: detection.class().to_string(),
                    confidence: detection.confidence(),
                },
            );
        }

        self.objects = updated;
        &self.objects
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x as f64 - b.x as f64).hypot(a.y as f64 - b.y as f64)
}

#[cfg(test)]
mod test {
    use super::{CentroidTracker, Detection};
    use crate::zone::Point;

    fn detection_at(cx: i32, cy: i32) -> Detection {
        Detection::new([cx, cy, cx, cy], "person", 0.9)
    }

    #[test]
    fn centroid_is_box_center() {
        assert_eq!(
            Detection::new([0, 0, 10, 10], "person", 0.9).centroid(),
            Point::new(5, 5)
        );
        assert_eq!(
            Detection::new([0, 0, 5, 5], "person", 0.9).centroid(),
            Point::new(2, 2)
        );
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert!(CentroidTracker::new(0.0).is_err());
        assert!(CentroidTracker::new(-4.0).is_err());
        assert!(CentroidTracker::new(f64::NAN).is_err());
        assert!(CentroidTracker::new(50.0).is_ok());
    }

    #[test]
    fn no_detections_spawn_nothing() {
        let mut tracker = CentroidTracker::new(50.0).unwrap();

        assert!(tracker.update(&[]).is_empty());
        assert_eq!(tracker.last_id(), 0);
    }

    #[test]
    fn identities_start_at_one_and_follow_production_order() {
        let mut tracker = CentroidTracker::new(5.0).unwrap();

        let objects = tracker.update(&[detection_at(0, 0), detection_at(100, 100)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(objects[&1].centroid, Point::new(0, 0));
        assert_eq!(objects[&2].centroid, Point::new(100, 100));
    }

    #[test]
    fn detection_matches_the_only_object_in_range() {
        let mut tracker = CentroidTracker::new(5.0).unwrap();
        tracker.update(&[detection_at(0, 0), detection_at(10, 10)]);

        let objects = tracker.update(&[detection_at(1, 1)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(objects[&1].centroid, Point::new(1, 1));
    }

    #[test]
    fn lowest_identity_wins_when_both_are_in_range() {
        let mut tracker = CentroidTracker::new(50.0).unwrap();
        tracker.update(&[detection_at(0, 0), detection_at(10, 10)]);

        // (8, 8) is nearer to object 2, but both are within the threshold
        // and the ascending scan hands it to object 1.
        let objects = tracker.update(&[detection_at(8, 8)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(objects[&1].centroid, Point::new(8, 8));
    }

    #[test]
    fn matched_object_leaves_the_candidate_pool() {
        let mut tracker = CentroidTracker::new(50.0).unwrap();
        tracker.update(&[detection_at(0, 0)]);

        let objects = tracker.update(&[detection_at(1, 1), detection_at(2, 2)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(objects[&1].centroid, Point::new(1, 1));
        assert_eq!(objects[&2].centroid, Point::new(2, 2));
    }

    #[test]
    fn distance_at_threshold_does_not_match() {
        let mut tracker = CentroidTracker::new(5.0).unwrap();
        tracker.update(&[detection_at(0, 0)]);

        // (3, 4) is exactly 5.0 away, and matching requires strictly less.
        let objects = tracker.update(&[detection_at(3, 4)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn identities_are_never_reused() {
        let mut tracker = CentroidTracker::new(5.0).unwrap();
        tracker.update(&[detection_at(0, 0)]);
        tracker.update(&[]);

        // Same spot, but the old identity was dropped with its frame.
        let objects = tracker.update(&[detection_at(0, 0)]);
        assert_eq!(objects.keys().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(tracker.last_id(), 2);
    }

    #[test]
    fn match_refreshes_class_and_confidence() {
        let mut tracker = CentroidTracker::new(10.0).unwrap();
        tracker.update(&[Detection::new([0, 0, 0, 0], "person", 0.5)]);

        let objects = tracker.update(&[Detection::new([1, 1, 1, 1], "car", 0.8)]);
        assert_eq!(objects[&1].class, "car");
        assert_eq!(objects[&1].confidence, 0.8);
    }
}
