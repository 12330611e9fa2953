use tracing::{debug, info, warn};

use crate::config::METERS_PER_MILE;
use crate::position::ReferencePoint;
use crate::sample::Sample;
use crate::store::{MemoryStore, ReferenceStore};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("no current GPS fix to mark as reference")]
    NoFixAvailable,
}

/// Holds the latest fix and the marked reference point.
pub struct PositionTracker {
    reference: Option<ReferencePoint>,
    current_sample: Option<Sample>,
    store: Box<dyn ReferenceStore>,
}

impl PositionTracker {
    /// A tracker whose reference only lives as long as the process.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Restores the reference saved in `store`, if any.
    pub fn with_store(store: Box<dyn ReferenceStore>) -> Self {
        let reference = match store.load() {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Could not restore saved reference, starting without one: {}", e);
                None
            }
        };

        if let Some(reference) = reference {
            info!(%reference, "restored saved reference");
        }

        Self {
            reference,
            current_sample: None,
            store,
        }
    }

    pub fn ingest(&mut self, sample: Sample) {
        self.current_sample = Some(sample);
    }

    pub fn current_sample(&self) -> Option<Sample> {
        self.current_sample
    }

    pub fn reference_coordinates(&self) -> Option<ReferencePoint> {
        self.reference
    }

    /// Mark `current` as the new reference point and persist it.
    ///
    /// A failed write is logged; the in-memory reference is still updated.
    pub fn mark_reference(
        &mut self,
        current: Option<&Sample>,
    ) -> Result<ReferencePoint, TrackerError> {
        let sample = current.ok_or(TrackerError::NoFixAvailable)?;
        let reference = sample.position();

        self.reference = Some(reference);
        info!(%reference, "reference marked");

        if let Err(e) = self.store.save(&reference) {
            warn!("Failed to persist reference: {}", e);
        }

        Ok(reference)
    }

    /// Mark the most recently ingested fix.
    pub fn mark_current(&mut self) -> Result<ReferencePoint, TrackerError> {
        let current = self.current_sample;
        self.mark_reference(current.as_ref())
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
        info!("reference cleared");

        if let Err(e) = self.store.clear() {
            warn!("Failed to clear persisted reference: {}", e);
        }
    }

    pub fn current_distance_miles(&self) -> Option<f64> {
        let (reference, sample) = (self.reference?, self.current_sample?);
        let meters = reference.distance_to(&sample.position());
        debug!(meters, "distance from reference");

        Some(meters / METERS_PER_MILE)
    }

    /// Direction from the reference point out to the live position (0-360, 0 is North).
    pub fn bearing_from_reference(&self) -> Option<f64> {
        match (self.reference, self.current_sample) {
            (Some(reference), Some(sample)) => Some(reference.bearing_to(&sample.position())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use std::time::Instant;
    use tempfile::TempDir;

    fn sample(lat: f64, lon: f64) -> Sample {
        Sample::new(lat, lon, 0.0, Instant::now())
    }

    #[test]
    fn test_tracker_initialization() {
        let tracker = PositionTracker::new();
        assert!(tracker.current_sample().is_none());
        assert!(tracker.reference_coordinates().is_none());
        assert!(tracker.current_distance_miles().is_none());
        assert!(tracker.bearing_from_reference().is_none());
    }

    #[test]
    fn test_distance_needs_both_points() {
        let mut tracker = PositionTracker::new();
        tracker.ingest(sample(1.0, 1.0));
        assert!(tracker.current_distance_miles().is_none());

        let mut tracker = PositionTracker::new();
        tracker.mark_reference(Some(&sample(1.0, 1.0))).unwrap();
        tracker.clear_reference();
        tracker.ingest(sample(1.0, 1.0));
        assert!(tracker.current_distance_miles().is_none());
    }

    #[test]
    fn test_distance_one_kilometer() {
        let mut tracker = PositionTracker::new();
        tracker.mark_reference(Some(&sample(0.0, 0.0))).unwrap();
        tracker.ingest(sample(0.009, 0.0));

        let miles = tracker.current_distance_miles().unwrap();
        assert!((miles - 0.621).abs() < 0.01, "got {miles}");

        // no new fix, same answer
        assert_eq!(tracker.current_distance_miles(), Some(miles));
        assert!((tracker.bearing_from_reference().unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_ingest_overwrites() {
        let mut tracker = PositionTracker::new();
        tracker.ingest(sample(1.0, 2.0));
        tracker.ingest(sample(3.0, 4.0));

        let current = tracker.current_sample().unwrap();
        assert_eq!((current.latitude, current.longitude), (3.0, 4.0));
    }

    #[test]
    fn test_ingest_accepts_out_of_range_coordinates() {
        let mut tracker = PositionTracker::new();
        tracker.ingest(sample(123.0, -999.0));
        assert_eq!(tracker.current_sample().unwrap().latitude, 123.0);
    }

    #[test]
    fn test_mark_without_fix() {
        let mut tracker = PositionTracker::new();
        assert_eq!(tracker.mark_reference(None), Err(TrackerError::NoFixAvailable));
        assert!(tracker.reference_coordinates().is_none());

        tracker.mark_reference(Some(&sample(5.0, 6.0))).unwrap();
        assert_eq!(tracker.mark_reference(None), Err(TrackerError::NoFixAvailable));
        assert_eq!(
            tracker.reference_coordinates(),
            Some(ReferencePoint::new(5.0, 6.0))
        );
    }

    #[test]
    fn test_mark_current() {
        let mut tracker = PositionTracker::new();
        assert_eq!(tracker.mark_current(), Err(TrackerError::NoFixAvailable));

        tracker.ingest(sample(7.0, 8.0));
        assert_eq!(tracker.mark_current(), Ok(ReferencePoint::new(7.0, 8.0)));

        // marking again just overwrites
        tracker.ingest(sample(9.0, 10.0));
        tracker.mark_current().unwrap();
        assert_eq!(
            tracker.reference_coordinates(),
            Some(ReferencePoint::new(9.0, 10.0))
        );
    }

    #[test]
    fn test_reference_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reference.json");

        let mut tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(&path)));
        tracker.mark_reference(Some(&sample(33.0, -117.0))).unwrap();
        drop(tracker);

        let tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(&path)));
        assert_eq!(
            tracker.reference_coordinates(),
            Some(ReferencePoint::new(33.0, -117.0))
        );
    }

    #[test]
    fn test_corrupt_store_starts_without_reference() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reference.json");
        std::fs::write(&path, "{{{").unwrap();

        let tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(&path)));
        assert!(tracker.reference_coordinates().is_none());
    }

    #[test]
    fn test_mark_survives_failed_persist() {
        let dir = TempDir::new().unwrap();
        // parent directory does not exist, so every write fails
        let path = dir.path().join("missing").join("reference.json");

        let mut tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(path)));
        tracker.mark_reference(Some(&sample(1.0, 2.0))).unwrap();
        assert_eq!(
            tracker.reference_coordinates(),
            Some(ReferencePoint::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_clear_reference_clears_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reference.json");

        let mut tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(&path)));
        tracker.mark_reference(Some(&sample(1.0, 2.0))).unwrap();
        tracker.clear_reference();
        assert!(tracker.reference_coordinates().is_none());

        let tracker = PositionTracker::with_store(Box::new(JsonFileStore::new(&path)));
        assert!(tracker.reference_coordinates().is_none());
    }
}
