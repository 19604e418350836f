// ============================================================================
// ERROR TYPES — shared by the engine, session, and batch runner
// ============================================================================

use thiserror::Error;

/// All failures surfaced by the filter engine and its callers.
///
/// Engine errors are synchronous and local: a transform either fully
/// completes or returns one of these without touching the caller's buffer.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Malformed or inconsistent raster dimensions. Not recoverable —
    /// the caller must re-decode the source image.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// A transform parameter outside its documented domain. The engine
    /// never silently clamps; re-validate at the call site and retry.
    #[error("parameter '{name}' out of range: {value} (allowed {min}..={max})")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// An operation was requested while the session or runner is in an
    /// incompatible state (e.g. `run()` while already running).
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, FilterError>;
