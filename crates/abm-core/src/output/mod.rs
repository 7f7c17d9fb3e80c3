//! Output
//!
//! Per-tick metrics, optional grid frames, and end-of-run summaries.

pub mod frames;
pub mod metrics;
pub mod summary;

pub use frames::{capture_frame, CellEncoder, FrameRecorder};
pub use metrics::{gini_coefficient, MetricsCollector, Reporter};
pub use summary::{EpidemicSummary, RunSummary, WealthSummary};
