//! Sheet error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the integrator
///
/// Configuration errors come back from config validation and controller
/// construction; usage errors come back from collaborator bindings.
/// Timing races (events after teardown, early measurements) never show up
/// here.
#[derive(Error, Debug)]
pub enum SheetError {
    /// No snap points and dynamic sizing disabled
    #[error("snap points are empty and dynamic sizing is disabled")]
    EmptySnapPoints,

    /// A snap point value is out of range
    #[error("snap point #{index} is invalid: {reason}")]
    InvalidSnapPoint { index: usize, reason: String },

    /// Snap points must describe ascending sheet heights
    #[error("snap point #{index} is not above snap point #{previous}; snap points must be ascending")]
    NonMonotonicSnapPoints { index: usize, previous: usize },

    /// A snap point string could not be parsed
    #[error("cannot parse snap point '{0}': expected a number or a percentage like \"50%\"")]
    SnapPointParse(String),

    /// Initial index outside the configured table
    #[error("initial index {index} is outside -1..{len}")]
    InvalidInitialIndex { index: i32, len: usize },

    /// Backdrop thresholds or opacity out of range
    #[error("invalid backdrop configuration: {0}")]
    InvalidBackdrop(String),

    /// Scroll-lock threshold out of range
    #[error("invalid scroll-lock threshold: {0}")]
    InvalidThreshold(String),

    /// Spring or timing parameters out of range
    #[error("invalid animation configuration: {0}")]
    InvalidAnimation(String),

    /// Gesture tuning out of range
    #[error("invalid gesture configuration: {0}")]
    InvalidGesture(String),

    /// Config file could not be parsed
    #[error("failed to parse sheet configuration: {0}")]
    ConfigParse(String),

    /// Config file could not be read
    #[error("failed to read sheet configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collaborator was constructed without a live sheet
    #[error("'{0}' cannot be used outside of an active bottom sheet")]
    OutsideSheet(&'static str),

    /// A sheet is already mounted under this key
    #[error("a sheet is already mounted under key '{0}'")]
    DuplicateSheet(String),
}

/// Result type for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;
