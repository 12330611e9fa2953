// ** HEADING CONFIGURATION ** //

/// Number of most recent valid courses averaged into the heading.
pub const COURSE_HISTORY_LEN: usize = 3;
/// A new average this far (or further) from the shown heading is treated as a glitch.
pub const HEADING_JUMP_LIMIT_DEGREES: f64 = 45.0;
/// The smoothed heading is quantized to multiples of this.
pub const HEADING_QUANTUM_DEGREES: f64 = 5.0;
/// Course value reported by the provider when no direction of travel is known.
pub const INVALID_COURSE: f64 = -1.0;

// ** WATCHDOG CONFIGURATION ** //

/// No valid course for longer than this and the heading is considered stale.
pub const STALE_AFTER_SECS: f64 = 5.0;
/// The location subscription is torn down and recreated this often regardless of staleness.
pub const RESTART_INTERVAL_SECS: u64 = 10;

// ** DISTANCE CONFIGURATION ** //

pub const METERS_PER_MILE: f64 = 1609.34;

// ** HARDWARE CONFIGURATION ** //

/// Serial device the GPS receiver writes NMEA sentences to.
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/serial0";
/// GPIO pin for the "mark reference" push button (active low).
pub const GPIO_MARK_BUTTON: u8 = 17;

// ** MAIN CONFIGURATION ** //

pub const DEFAULT_STORE_PATH: &str = "skydive-spotter.json";
pub const SCREEN_REFRESH_INTERVAL_SECS: u64 = 1;
/// Button polling period inside a refresh interval.
pub const BUTTON_POLL_INTERVAL_MS: u64 = 20;
