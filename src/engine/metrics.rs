//! Extraction run metrics.
//!
//! - `Extraction::run` for normal operation.
//! - `Extraction::run_with_metrics` for profiling and for inspecting why
//!   templates were skipped.
//!
//! Per-template timings allocate one entry per template, so the hot path
//! avoids them.

use std::time::Duration;

use super::evaluate::SkipReason;

/// Outcome of a single template in one run.
#[derive(Debug, Clone)]
pub struct TemplateMetrics {
    /// Elapsed time for evaluating the template.
    pub duration: Duration,
    /// `None` when the feature was present.
    pub skipped: Option<SkipReason>,
    /// Number of values emitted (0 when skipped).
    pub values: usize,
}

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for `Extraction::run_with_metrics`.
    pub total: Duration,
    /// Whether a derived-property cache was built for the state.
    pub memoized: bool,
    /// One entry per template, in template order.
    pub templates: Vec<TemplateMetrics>,
}

impl RunMetrics {
    pub fn present(&self) -> usize {
        self.templates.iter().filter(|t| t.skipped.is_none()).count()
    }

    pub fn skipped(&self) -> usize {
        self.templates.len() - self.present()
    }
}
