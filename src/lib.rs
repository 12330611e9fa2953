pub mod button;
pub mod compass;
pub mod config;
pub mod display;
pub mod heading;
pub mod position;
pub mod provider;
pub mod sample;
pub mod spotter;
pub mod store;
pub mod tracker;
pub mod watchdog;

// Re-export commonly used types
pub use heading::HeadingSmoother;
pub use position::{Position, ReferencePoint};
pub use provider::{LocationProvider, NmeaProvider};
pub use sample::Sample;
pub use spotter::{Readout, Spotter};
pub use store::{JsonFileStore, MemoryStore, ReferenceStore};
pub use tracker::{PositionTracker, TrackerError};
pub use watchdog::{StalenessReport, check_staleness};

#[cfg(test)]
pub(crate) mod mocks;
