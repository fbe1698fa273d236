//! Batch workflows over the book store
//!
//! Sequential, one book at a time, with a per-book timeout guard and
//! per-book error isolation.

pub mod book_profiler;

pub use book_profiler::{BatchMode, BatchSummary, BookProfiler, ProfileError};
