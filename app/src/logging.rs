//! FILENAME: app/src/logging.rs
// PURPOSE: Line-oriented log sink shared by the CLI and the HTTP server.
// FORMAT: seq|level|category|message

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;

// ============================================================================
// LEVELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Single-letter code written in the level field.
    pub fn code(self) -> &'static str {
        match self {
            LogLevel::Debug => "D",
            LogLevel::Info => "I",
            LogLevel::Warn => "W",
            LogLevel::Error => "E",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

// ============================================================================
// SINK
// ============================================================================

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Optional file copy of every emitted line.
struct FileSink {
    path: PathBuf,
    file: File,
}

static FILE_SINK: Lazy<Mutex<Option<FileSink>>> = Lazy::new(|| Mutex::new(None));

pub fn next_seq() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst) + 1
}

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Path of the file sink, once one is open.
pub fn log_file_path() -> Option<PathBuf> {
    FILE_SINK
        .lock()
        .ok()
        .and_then(|sink| sink.as_ref().map(|s| s.path.clone()))
}

/// Opens (truncating) `path` as the file sink, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("cannot create log directory {}: {}", dir.display(), e))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| format!("cannot open log file {}: {}", path.display(), e))?;

    let mut sink = FILE_SINK.lock().map_err(|_| "log sink poisoned".to_string())?;
    *sink = Some(FileSink {
        path: path.to_path_buf(),
        file,
    });
    Ok(())
}

/// Formats and writes one line. Debug lines are dropped unless verbose.
pub fn emit(level: LogLevel, category: &str, message: &str) {
    if level == LogLevel::Debug && !is_verbose() {
        return;
    }

    let line = format!("{}|{}|{}|{}", next_seq(), level.code(), category, message);

    if let Ok(mut sink) = FILE_SINK.lock() {
        if let Some(sink) = sink.as_mut() {
            if writeln!(sink.file, "{}", line).and_then(|_| sink.file.flush()).is_err() {
                eprintln!("log file write failed: {}", sink.path.display());
            }
        }
    }

    // stdout carries command output (JSON, tables).
    eprintln!("{}", line);
}

/// "ENTER name" / "EXIT name" tracing lines with optional detail.
pub fn emit_trace(category: &str, marker: &str, func: &str, detail: &str) {
    let message = if detail.is_empty() {
        format!("{} {}", marker, func)
    } else {
        format!("{} {} {}", marker, func, detail)
    };
    emit(LogLevel::Debug, category, &message);
}

// ============================================================================
// `log` FACADE BRIDGE
// ============================================================================

/// Forwards `log::` records from the library crates. The first path segment
/// of the record target, uppercased, becomes the category.
struct FacadeBridge;

static FACADE_BRIDGE: FacadeBridge = FacadeBridge;

impl log::Log for FacadeBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info || is_verbose()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let category = record
            .target()
            .split("::")
            .next()
            .unwrap_or("lib")
            .to_uppercase();
        emit(record.level().into(), &category, &record.args().to_string());
    }

    fn flush(&self) {
        if let Ok(mut sink) = FILE_SINK.lock() {
            if let Some(sink) = sink.as_mut() {
                let _ = sink.file.flush();
            }
        }
    }
}

/// Sets verbosity, installs the bridge (first call only) and opens the
/// optional file sink.
pub fn init(verbose: bool, log_path: Option<&Path>) -> Result<(), String> {
    set_verbose(verbose);
    if log::set_logger(&FACADE_BRIDGE).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
    match log_path {
        Some(path) => open_log_file(path),
        None => Ok(()),
    }
}

// ============================================================================
// MACROS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($fmt:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Debug, $category, &format!($($fmt)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($fmt:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Info, $category, &format!($($fmt)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($category:expr, $($fmt:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Warn, $category, &format!($($fmt)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($fmt:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Error, $category, &format!($($fmt)*))
    };
}

#[macro_export]
macro_rules! log_enter {
    ($category:expr, $func:expr) => {
        $crate::logging::emit_trace($category, "ENTER", $func, "")
    };
    ($category:expr, $func:expr, $($fmt:tt)*) => {
        $crate::logging::emit_trace($category, "ENTER", $func, &format!($($fmt)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($category:expr, $func:expr) => {
        $crate::logging::emit_trace($category, "EXIT", $func, "")
    };
    ($category:expr, $func:expr, $($fmt:tt)*) => {
        $crate::logging::emit_trace($category, "EXIT", $func, &format!($($fmt)*))
    };
}
