//! FilterFE — image filter pipeline, single-image session, and batch runner.
//!
//! The engine (`ops`) is a library of pure, deterministic RGBA8 transforms.
//! `session` owns parameter state for one image and recomputes from the
//! pristine source on every change; `batch` sequences the same pipeline
//! across a queue of images with cooperative cancellation and per-item
//! failure recording. `cli` exposes the whole thing as a headless binary.

pub mod batch;
pub mod cli;
pub mod error;
pub mod io;
pub mod landmarks;
pub mod logger;
pub mod ops;
pub mod params;
pub mod session;

pub use batch::{BatchProgress, BatchRunner, CancelHandle};
pub use error::FilterError;
pub use params::{FilterParameters, FilterPreset, Param};
pub use session::{DisplaySurface, FilterSession, MemorySurface, SessionState};
