use std::time::Instant;

use tracing::debug;

use crate::heading::HeadingSmoother;
use crate::position::{Position, ReferencePoint};
use crate::sample::Sample;
use crate::store::ReferenceStore;
use crate::tracker::{PositionTracker, TrackerError};
use crate::watchdog::{StalenessReport, check_staleness};

/// Everything the screens show, captured at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readout {
    pub reference: Option<ReferencePoint>,
    pub position: Option<Position>,
    pub distance_miles: Option<f64>,
    pub heading: Option<f64>,
    pub bearing_from_reference: Option<f64>,
    pub staleness: StalenessReport,
}

/// One session: a tracker and a smoother fed from the same sample stream.
///
/// Share it as `Arc<Mutex<Spotter>>` between the provider thread and the
/// refresh loop; the mutex is the only thing ordering their access.
pub struct Spotter {
    tracker: PositionTracker,
    smoother: HeadingSmoother,
}

impl Spotter {
    pub fn new(store: Box<dyn ReferenceStore>) -> Self {
        Self::from_parts(PositionTracker::with_store(store), HeadingSmoother::new())
    }

    pub fn from_parts(tracker: PositionTracker, smoother: HeadingSmoother) -> Self {
        Self { tracker, smoother }
    }

    pub fn ingest(&mut self, sample: Sample) {
        debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            course = sample.course,
            "sample"
        );
        self.smoother.ingest(sample.course, sample.timestamp);
        self.tracker.ingest(sample);
    }

    pub fn mark_reference(&mut self) -> Result<ReferencePoint, TrackerError> {
        self.tracker.mark_current()
    }

    pub fn clear_reference(&mut self) {
        self.tracker.clear_reference();
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn smoother(&self) -> &HeadingSmoother {
        &self.smoother
    }

    pub fn staleness(&self, now: Instant) -> StalenessReport {
        check_staleness(&self.smoother, now)
    }

    pub fn readout(&self, now: Instant) -> Readout {
        Readout {
            reference: self.tracker.reference_coordinates(),
            position: self.tracker.current_sample().map(|s| s.position()),
            distance_miles: self.tracker.current_distance_miles(),
            heading: self.smoother.heading(),
            bearing_from_reference: self.tracker.bearing_from_reference(),
            staleness: self.staleness(now),
        }
    }
}
