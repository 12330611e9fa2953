use std::time::Instant;

use crate::position::Position;

/// One raw fix as delivered by the location provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub latitude: f64,
    pub longitude: f64,
    /// Direction of travel in degrees. Negative when unavailable.
    pub course: f64,
    pub timestamp: Instant,
}

impl Sample {
    pub fn new(latitude: f64, longitude: f64, course: f64, timestamp: Instant) -> Self {
        Self {
            latitude,
            longitude,
            course,
            timestamp,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let sample = Sample::new(48.0, -123.0, 90.0, Instant::now());
        assert_eq!(sample.position(), Position::new(48.0, -123.0));
    }
}
