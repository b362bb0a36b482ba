//! Log sinks
//!
//! One line per significant event, appended to a file or handed to
//! syslog(3), selected by configuration. With no destination configured
//! the standard env_logger setup applies, which keeps offline runs
//! debuggable through RUST_LOG.
//!
//! Lines are written raw and unredacted: they carry caller-supplied paths
//! and OS error text, so the destination should not be world-readable.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Append to this file, creating it on first use.
    File(String),
    /// The system log, as LOG_USER/LOG_INFO.
    Syslog,
}

impl LogDestination {
    /// Interprets a configured value: the literal "syslog" selects the
    /// system log, anything else is a file path.
    pub fn parse(value: &str) -> LogDestination {
        if value == "syslog" {
            LogDestination::Syslog
        } else {
            LogDestination::File(value.to_string())
        }
    }
}

struct SinkLogger {
    dest: LogDestination,
}

impl Log for SinkLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = record.args().to_string();
        match &self.dest {
            LogDestination::File(path) => {
                // Opened per record; the process writes a handful of lines
                // and exits, and append mode keeps concurrent requests from
                // interleaving mid-line.
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{}", line);
                }
            }
            LogDestination::Syslog => syslog_line(&line),
        }
    }

    fn flush(&self) {}
}

/// Installs the configured sink; with none configured, env_logger.
pub fn init(dest: Option<LogDestination>) {
    match dest {
        Some(dest) => {
            if log::set_boxed_logger(Box::new(SinkLogger { dest })).is_ok() {
                log::set_max_level(LevelFilter::Info);
            }
        }
        None => env_logger::init(),
    }
}

fn syslog_line(line: &str) {
    // Interior NUL cannot cross the C boundary; drop the line instead.
    let Ok(message) = CString::new(line) else {
        return;
    };
    // SAFETY: both pointers stay alive across the call, and the %s format
    // keeps caller-supplied text from being interpreted as a format.
    unsafe {
        libc::syslog(libc::LOG_USER | libc::LOG_INFO, c"%s".as_ptr(), message.as_ptr());
    }
}
