use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skydive_spotter::button::MarkButton;
use skydive_spotter::config::{
    BUTTON_POLL_INTERVAL_MS, DEFAULT_SERIAL_DEVICE, DEFAULT_STORE_PATH, GPIO_MARK_BUTTON,
    SCREEN_REFRESH_INTERVAL_SECS,
};
use skydive_spotter::display::{render_distance, render_set_location};
use skydive_spotter::watchdog::RestartSchedule;
use skydive_spotter::{
    JsonFileStore, LocationProvider, MemoryStore, NmeaProvider, ReferenceStore, Spotter,
};

/// Mark a landing target, then watch distance and heading from it.
#[derive(Parser, Debug)]
#[command(name = "skydive-spotter", version)]
struct Args {
    /// Serial device the GPS receiver writes NMEA sentences to
    #[arg(long, default_value = DEFAULT_SERIAL_DEVICE)]
    device: PathBuf,

    /// File the marked reference is saved to
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Keep the reference in memory only
    #[arg(long)]
    no_store: bool,

    /// GPIO pin of the mark button (active low)
    #[arg(long, default_value_t = GPIO_MARK_BUTTON)]
    mark_pin: u8,

    /// Run without the GPIO button; use stdin commands only
    #[arg(long)]
    no_button: bool,

    /// Seconds between screen refreshes
    #[arg(long, default_value_t = SCREEN_REFRESH_INTERVAL_SECS)]
    refresh_secs: u64,
}

enum Command {
    Mark,
    Clear,
    Quit,
}

fn lock(spotter: &Mutex<Spotter>) -> MutexGuard<'_, Spotter> {
    spotter.lock().unwrap_or_else(|e| e.into_inner())
}

fn mark_reference(spotter: &Mutex<Spotter>) {
    match lock(spotter).mark_reference() {
        Ok(reference) => println!("✓ Reference set: {}", reference),
        Err(e) => println!("⚠ Cannot set reference: {}", e),
    }
}

/// Reads `mark`, `clear` and `quit` from stdin on its own thread.
fn spawn_command_reader() -> Receiver<Command> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            let command = match line.trim() {
                "m" | "mark" => Command::Mark,
                "c" | "clear" => Command::Clear,
                "q" | "quit" => Command::Quit,
                "" => continue,
                other => {
                    println!("Unknown command '{}' (mark, clear, quit)", other);
                    continue;
                }
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });

    rx
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    info!(?args, "starting skydive-spotter");

    let store: Box<dyn ReferenceStore> = if args.no_store {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::new(&args.store))
    };
    let spotter = Arc::new(Mutex::new(Spotter::new(store)));

    let mut provider = NmeaProvider::serial(&args.device);
    provider.request_permission()?;

    let sink_spotter = Arc::clone(&spotter);
    provider.start(Box::new(move |sample| lock(&sink_spotter).ingest(sample)))?;

    let mut button = if args.no_button {
        None
    } else {
        match MarkButton::with_pin(args.mark_pin) {
            Ok(button) => {
                info!(pin = args.mark_pin, "mark button ready");
                Some(button)
            }
            Err(e) => {
                warn!("Mark button unavailable, use 'mark' on stdin instead: {}", e);
                None
            }
        }
    };

    let commands = spawn_command_reader();
    println!("Type 'mark' to set the reference, 'clear' to forget it, 'quit' to exit.\n");

    let refresh = Duration::from_secs(args.refresh_secs.max(1));
    let mut schedule = RestartSchedule::new(Instant::now());
    let mut next_refresh = Instant::now();
    let mut was_stale = false;

    'main: loop {
        if let Some(button) = button.as_mut()
            && button.poll_press()
        {
            mark_reference(&spotter);
        }

        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Mark => mark_reference(&spotter),
                Command::Clear => {
                    lock(&spotter).clear_reference();
                    println!("Reference cleared");
                }
                Command::Quit => break 'main,
            }
        }

        let now = Instant::now();
        if now >= next_refresh {
            let readout = lock(&spotter).readout(now);

            if readout.staleness.is_stale() != was_stale {
                was_stale = readout.staleness.is_stale();
                if was_stale {
                    warn!(staleness = ?readout.staleness, "no valid course from GPS");
                } else {
                    info!("course readings resumed");
                }
            }

            if let Some(reason) = schedule.poll(readout.staleness, now) {
                info!(?reason, "restarting location subscription");
                if let Err(e) = provider.restart() {
                    warn!("Location subscription restart failed: {}", e);
                }
            }

            println!("{}", render_set_location(readout.reference));
            println!("{}", render_distance(&readout));

            next_refresh += refresh;
            if next_refresh < now {
                next_refresh = now + refresh;
            }
        }

        thread::sleep(Duration::from_millis(BUTTON_POLL_INTERVAL_MS));
    }

    provider.stop();
    info!("stopped");
    Ok(())
}
