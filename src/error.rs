//! Global error handling for clipcat
//!
//! Pipeline failures on individual paths are never errors: they are
//! recorded as a [`SkipReason`], logged, and counted. [`ClipCatError`] only
//! covers the actions around the pipeline (configuration, writing,
//! clipboard).

use std::io;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for clipcat operations
#[derive(Error, Debug)]
pub enum ClipCatError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An action was requested but the last document is empty
    #[error("Nothing to act on: {0}")]
    NothingToAct(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for clipcat operations
pub type Result<T> = std::result::Result<T, ClipCatError>;

/// Why an item was left out of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SkipReason {
    /// A payload token did not name an existing entry
    PathUnresolved,
    /// An ignore file could not be read or decoded
    IgnoreFileUnreadable,
    /// File bytes are not valid UTF-8
    FileUndecodable,
    /// Open or read failed
    FileIo,
}

/// Creates a ClipCatError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ClipCatError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            ClipCatError::Unexpected(format!("{}: {}", context, e))
        })
    }
}
