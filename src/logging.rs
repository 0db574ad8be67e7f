//! File-backed `log` backend
//!
//! The terminal is owned by the display, so log output goes to a private
//! file instead of stderr. Without `--debug` no logger is installed and
//! every `log` macro is a no-op.

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;

/// Debug log file path (in /tmp for easy access)
pub const DEBUG_LOG_PATH: &str = "/tmp/termeq.log";
/// Debug log file permissions (owner read/write only)
const DEBUG_LOG_MODE: u32 = 0o600;

/// Writes one line per record to a log file.
pub struct DebugLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl DebugLogger {
    /// Open `path` for logging, truncating an existing file in place.
    pub fn open(path: &Path, level: LevelFilter) -> io::Result<Self> {
        // Exclusive create first, fall back to truncating the user's own file
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(DEBUG_LOG_MODE)
            .open(path)
            .or_else(|_| OpenOptions::new().write(true).truncate(true).open(path))?;

        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut f) = self.file.lock() {
            let _ = f.flush();
        }
    }
}

/// Install the file logger when `debug` is set, otherwise turn logging off.
pub fn init(debug: bool) -> io::Result<()> {
    if !debug {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    }

    let logger = DebugLogger::open(Path::new(DEBUG_LOG_PATH), LevelFilter::Debug)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;
    log::set_max_level(LevelFilter::Debug);
    Ok(())
}
