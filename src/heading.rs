use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use crate::config::{COURSE_HISTORY_LEN, HEADING_JUMP_LIMIT_DEGREES, HEADING_QUANTUM_DEGREES};

/// Turns the noisy GPS course into a steady heading for display.
///
/// Keeps the last few valid courses, averages them, and quantizes the
/// average to 5°. An average that lands 45° or more away from the shown
/// heading is taken as a glitch and the shown heading is held.
///
/// The 45° gate compares plain numbers, so it does not know that 359° and
/// 1° are neighbours. A real turn through north can be held back until
/// the whole window has crossed over.
pub struct HeadingSmoother {
    history: VecDeque<f64>,
    smoothed: Option<f64>,
    last_valid_course: Instant,
}

impl HeadingSmoother {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Staleness is measured from `started` until the first valid course arrives.
    pub fn starting_at(started: Instant) -> Self {
        Self {
            history: VecDeque::with_capacity(COURSE_HISTORY_LEN + 1),
            smoothed: None,
            last_valid_course: started,
        }
    }

    pub fn ingest(&mut self, course: f64, now: Instant) {
        if course < 0.0 {
            return;
        }

        self.last_valid_course = now;
        self.history.push_back(course);
        if self.history.len() > COURSE_HISTORY_LEN {
            self.history.pop_front();
        }

        let avg = self.history.iter().sum::<f64>() / self.history.len() as f64;
        let quantized = (avg / HEADING_QUANTUM_DEGREES).round() * HEADING_QUANTUM_DEGREES;

        // accept only on a positive comparison, so a NaN average is held
        let accept = match self.smoothed {
            Some(current) => (avg - current).abs() < HEADING_JUMP_LIMIT_DEGREES,
            None => avg.is_finite(),
        };

        if accept {
            self.smoothed = Some(quantized);
        } else {
            debug!(
                course,
                average = avg,
                held = ?self.smoothed,
                "heading jump rejected"
            );
        }
    }

    /// The smoothed heading in degrees, 0.0 until the first valid course.
    pub fn current_heading(&self) -> f64 {
        self.smoothed.unwrap_or(0.0)
    }

    /// The smoothed heading, or None if no valid course has been seen yet.
    pub fn heading(&self) -> Option<f64> {
        self.smoothed
    }

    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn seconds_since_last_valid_course(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.last_valid_course)
            .as_secs_f64()
    }
}
