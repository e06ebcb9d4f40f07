//! Runtime-mutable log level.
//!
//! [`LogLevelRegistry`] is the single source of truth for the verbosity
//! threshold. It is created once at startup, shared as an `Arc`, and handed
//! to every component that reads or changes the level.
//!
//! Reads are a single atomic load. Writes take a short mutex so that the
//! stored level and the threshold pushed into the log sink never disagree.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{reload, Registry};

/// Handle used to swap the level filter of the installed subscriber.
pub type LevelReloadHandle = reload::Handle<LevelFilter, Registry>;

/// Severity threshold, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    DPanic = 4,
    Panic = 5,
    Fatal = 6,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::DPanic,
        LogLevel::Panic,
        LogLevel::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::DPanic => "dpanic",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
        }
    }

    /// `tracing` has no levels above ERROR; the three panic-class levels
    /// collapse onto it.
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error | LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => {
                LevelFilter::ERROR
            }
        }
    }

    fn from_u8(raw: u8) -> LogLevel {
        LogLevel::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(LogLevel::Info)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token that does not name a level. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid level")]
pub struct InvalidLevel {
    pub token: String,
}

impl FromStr for LogLevel {
    type Err = InvalidLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| InvalidLevel {
                token: s.to_string(),
            })
    }
}

#[derive(Debug, Error)]
pub enum SetLevelError {
    #[error(transparent)]
    Invalid(#[from] InvalidLevel),

    #[error("reload log sink: {0}")]
    Reload(#[from] reload::Error),
}

/// Process-wide current log level.
pub struct LogLevelRegistry {
    current: AtomicU8,
    sink: Mutex<Option<LevelReloadHandle>>,
}

impl LogLevelRegistry {
    /// Registry not attached to any subscriber.
    pub fn new(initial: LogLevel) -> Self {
        Self {
            current: AtomicU8::new(initial as u8),
            sink: Mutex::new(None),
        }
    }

    /// Registry that pushes every change into the installed subscriber.
    pub fn with_sink(initial: LogLevel, handle: LevelReloadHandle) -> Self {
        Self {
            current: AtomicU8::new(initial as u8),
            sink: Mutex::new(Some(handle)),
        }
    }

    pub fn current(&self) -> LogLevel {
        LogLevel::from_u8(self.current.load(Ordering::Acquire))
    }

    /// Parse `candidate` and make it the current level.
    ///
    /// Raising and lowering verbosity are both allowed. On any error the
    /// current level is unchanged.
    pub fn set(&self, candidate: &str) -> Result<LogLevel, SetLevelError> {
        let level: LogLevel = candidate.parse()?;

        let sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sink.as_ref() {
            handle.reload(level.as_filter())?;
        }
        self.current.store(level as u8, Ordering::Release);

        Ok(level)
    }
}

impl fmt::Debug for LogLevelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLevelRegistry")
            .field("current", &self.current())
            .finish()
    }
}
