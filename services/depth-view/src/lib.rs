//! Depth View Engine
//!
//! Converts a continuously mutating order book into a small, bounded,
//! render-ready snapshot, recomputed synchronously on every book change:
//! - Price bucketing with side-aware rounding (floor bids, ceil asks)
//! - Windowed per-side aggregation with a hard row bound
//! - Joint magnitude normalization for relative bar widths
//! - Decade-stepped grouping control with silent clamping
//! - Versioned, checksummed snapshots pushed to a single sink
//!
//! # Architecture
//!
//! ```text
//! book mutation
//!      │
//! ┌────▼───────┐  notification (no payload)
//! │ SharedBook │────────────────┐
//! └────────────┘                │
//!                         ┌─────▼─────┐
//!                         │ DepthView │ ← owns subscription + step
//!                         └─────┬─────┘
//!        aggregate bids/asks    │    normalize magnitudes
//!                         ┌─────▼─────────┐
//!                         │ DepthSnapshot │ → ViewSink (push)
//!                         └───────────────┘
//! ```
//!
//! The engine is single-threaded and event-driven: recomputation happens
//! inside the book's notification callback, so notification order equals
//! publish order and snapshots are never stale relative to one another.

pub mod aggregate;
pub mod bucket;
pub mod metrics;
pub mod order_book;
pub mod scale;
pub mod snapshot;
pub mod step;
pub mod view;

// Re-exports for convenience
pub use crate::order_book::{BookSubscription, LadderBook, RawLevel, SharedBook};
pub use crate::snapshot::{AggregatedRow, DepthSnapshot};
pub use crate::step::StepController;
pub use crate::view::{DepthView, ViewCommand, ViewConfig, ViewSink};

/// Library version
pub const ENGINE_VERSION: &str = "0.1.0";
