//! Location provider: turns an NMEA sentence stream into `Sample`s.
//!
//! A subscription owns one reader thread. Samples are pushed to the sink
//! in the order the receiver sends them. Stopping flips the
//! subscription's flag while holding the sink lock, so once `stop()`
//! returns the old reader can never deliver again, even if it is still
//! blocked on a read.
//!
//! A stopped reader parked on a silent source still owns that source. A
//! restart therefore waits for it to let go before reopening, and the
//! line that woke it is handed to the new subscription instead of being
//! dropped, so two readers never split one byte stream.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use nmea::{Nmea, SentenceType};
use tracing::{debug, info, warn};

use crate::config::INVALID_COURSE;
use crate::sample::Sample;

pub type SampleSink = Box<dyn FnMut(Sample) + Send>;

pub type LineSource = Box<dyn BufRead + Send>;
type Opener = Arc<dyn Fn() -> io::Result<LineSource> + Send + Sync>;

/// Yields the line a stopped reader consumed after its stop, if any.
type ReaderHandle = JoinHandle<Option<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Permission denied opening location source: {0}")]
    PermissionDenied(#[source] io::Error),
    #[error("Failed to open location source: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ProviderError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            ProviderError::PermissionDenied(e)
        } else {
            ProviderError::Io(e)
        }
    }
}

/// Something that pushes location samples to a subscriber.
pub trait LocationProvider {
    /// Checks the source may be read before any subscription starts.
    fn request_permission(&mut self) -> Result<(), ProviderError>;
    /// Begins delivering samples to `sink`, replacing any running subscription.
    fn start(&mut self, sink: SampleSink) -> Result<(), ProviderError>;
    /// Ends the running subscription. Safe to call any number of times.
    fn stop(&mut self);
    /// Tears down the subscription and opens a fresh one with the same sink.
    fn restart(&mut self) -> Result<(), ProviderError>;
}

pub struct NmeaProvider {
    open: Opener,
    sink: Option<Arc<Mutex<SampleSink>>>,
    active: Option<Arc<AtomicBool>>,
    reader: Option<ReaderHandle>,
}

impl NmeaProvider {
    /// Reads sentences from a serial device such as `/dev/serial0`.
    pub fn serial(device: impl Into<PathBuf>) -> Self {
        let device = device.into();
        Self::from_opener(move || {
            let file = File::open(&device)?;
            Ok(Box::new(BufReader::new(file)) as LineSource)
        })
    }

    /// Reads sentences from whatever `open` returns, once per subscription.
    pub fn from_opener<F>(open: F) -> Self
    where
        F: Fn() -> io::Result<LineSource> + Send + Sync + 'static,
    {
        Self {
            open: Arc::new(open),
            sink: None,
            active: None,
            reader: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a reader for `sink`.
    ///
    /// If the previous reader is still blocked on its source, the source is
    /// reopened on the new thread once that reader exits; an open failure
    /// there is logged rather than returned.
    fn spawn(&mut self, sink: Arc<Mutex<SampleSink>>) -> Result<(), ProviderError> {
        let active = Arc::new(AtomicBool::new(true));
        let thread_active = Arc::clone(&active);

        let handle = match self.reader.take() {
            Some(retired) if !retired.is_finished() => {
                debug!("previous reader still attached, reopening once it exits");
                let open = Arc::clone(&self.open);
                thread::spawn(move || {
                    let carried = retired.join().ok().flatten();
                    if !thread_active.load(Ordering::SeqCst) {
                        return carried;
                    }
                    match open() {
                        Ok(reader) => read_samples(reader, carried, thread_active, sink),
                        Err(e) => {
                            warn!("Failed to reopen location source: {}", e);
                            None
                        }
                    }
                })
            }
            retired => {
                let carried = retired.and_then(|h| h.join().ok().flatten());
                let reader = (self.open)()?;
                thread::spawn(move || read_samples(reader, carried, thread_active, sink))
            }
        };

        self.active = Some(active);
        self.reader = Some(handle);
        info!("location subscription started");
        Ok(())
    }
}

impl LocationProvider for NmeaProvider {
    fn request_permission(&mut self) -> Result<(), ProviderError> {
        (self.open)()?;
        Ok(())
    }

    fn start(&mut self, sink: SampleSink) -> Result<(), ProviderError> {
        self.stop();

        let sink = Arc::new(Mutex::new(sink));
        self.sink = Some(Arc::clone(&sink));
        self.spawn(sink)
    }

    fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        match &self.sink {
            Some(sink) => {
                let _delivering = sink.lock().unwrap_or_else(|e| e.into_inner());
                active.store(false, Ordering::SeqCst);
            }
            None => active.store(false, Ordering::SeqCst),
        }
        info!("location subscription stopped");
    }

    fn restart(&mut self) -> Result<(), ProviderError> {
        let Some(sink) = self.sink.clone() else {
            debug!("restart requested before start, ignoring");
            return Ok(());
        };

        self.stop();
        self.spawn(sink)
    }
}

impl Drop for NmeaProvider {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Delivers samples until the source ends or the subscription stops.
///
/// Returns the line that was read after the stop, undelivered, so the next
/// subscription can start from it.
fn read_samples(
    mut reader: LineSource,
    carried: Option<String>,
    active: Arc<AtomicBool>,
    sink: Arc<Mutex<SampleSink>>,
) -> Option<String> {
    let mut nmea = Nmea::default();
    let mut pending = carried;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => line,
                    Err(e) => {
                        warn!("Error reading NMEA line: {}", e);
                        break;
                    }
                }
            }
        };

        if !active.load(Ordering::SeqCst) {
            debug!("NMEA reader stopped");
            return Some(line);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(sample) = parse_sample(&mut nmea, trimmed, Instant::now()) else {
            continue;
        };

        let mut deliver = sink.lock().unwrap_or_else(|e| e.into_inner());
        if !active.load(Ordering::SeqCst) {
            debug!("NMEA reader stopped");
            return Some(line);
        }
        (*deliver)(sample);
    }

    debug!("NMEA reader finished");
    None
}

/// Feeds one sentence into `nmea` and yields a sample for each RMC fix.
///
/// RMC carries position and course together. A fix without a course
/// (receiver stationary or still converging) gets the invalid sentinel.
pub fn parse_sample(nmea: &mut Nmea, sentence: &str, now: Instant) -> Option<Sample> {
    match nmea.parse(sentence) {
        Ok(SentenceType::RMC) => {
            let (lat, lon) = (nmea.latitude?, nmea.longitude?);
            let course = nmea.true_course.map(f64::from).unwrap_or(INVALID_COURSE);
            Some(Sample::new(lat, lon, course, now))
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Parse error on line '{}': {}", sentence, e);
            None
        }
    }
}
