//! Log capture for unit tests.
//!
//! Records at warning level and above are kept for the whole test binary, so
//! assertions filter by a message fragment unique to the test.

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Installs the capturing logger once per test binary.
pub fn capture_logs() {
    INIT.call_once(|| {
        if log::set_logger(&CaptureLogger).is_ok() {
            log::set_max_level(LevelFilter::Warn);
        }
    });
}

/// Number of captured records at `level` whose message contains `fragment`.
pub fn logged(level: Level, fragment: &str) -> usize {
    RECORDS.lock().map_or(0, |records| {
        records
            .iter()
            .filter(|(l, message)| *l == level && message.contains(fragment))
            .count()
    })
}
