//! Whole-template-set extraction for one state.
//!
//! An `Extraction` pairs a compiled template set with a single state snapshot
//! and evaluates every template in order. All templates share the snapshot,
//! so a head or yield resolved for one template is reused by the next.
//!
//! ```text
//! CompiledTemplates ──┐
//!                     ├─ Extraction::new ── run() ──▶ Vec<(TemplateId, values)>
//! State ── Snapshot ──┘                 └─ run_with_metrics() ──▶ + RunMetrics
//! ```

use std::time::Instant;

use tracing::trace;

use super::compiler::{CompiledTemplates, Requirements, TemplateId};
use super::evaluate::{EvalError, Evaluation, calc_feature};
use super::metrics::{RunMetrics, TemplateMetrics};
use super::snapshot::Snapshot;
use crate::graph::State;

/// Templates reading any of these benefit from the per-state cache.
const CACHED_REQUIREMENTS: Requirements =
    Requirements::HEAD.union(Requirements::GAPS).union(Requirements::SEPARATOR);

#[derive(Debug)]
pub struct Extraction<'a, 's, 'g> {
    compiled: &'a CompiledTemplates,
    snapshot: Snapshot<'s, 'g>,
}

impl<'a, 's, 'g> Extraction<'a, 's, 'g> {
    /// Prepare an extraction. The cache is only built when `memoize` is set
    /// and some template reads heads, gaps or separators.
    pub fn new(compiled: &'a CompiledTemplates, state: &'s State<'g>, memoize: bool) -> Self {
        let memoize = memoize && compiled.combined_requirements().intersects(CACHED_REQUIREMENTS);
        Extraction { compiled, snapshot: Snapshot::new(state, memoize) }
    }

    /// Evaluate every template; present features only, in template order.
    pub fn run(&self) -> Result<Vec<(TemplateId, Vec<String>)>, EvalError> {
        let mut features = Vec::new();
        for (id, template) in self.compiled.templates.iter().enumerate() {
            match calc_feature(template, &self.snapshot)? {
                Evaluation::Present(values) => features.push((id, values)),
                Evaluation::Skipped(reason) => {
                    trace!(template = template.name(), ?reason, "feature skipped");
                }
            }
        }
        Ok(features)
    }

    /// Like [`run`](Self::run), also timing each template and recording skip
    /// reasons.
    pub fn run_with_metrics(&self) -> Result<(Vec<(TemplateId, Vec<String>)>, RunMetrics), EvalError> {
        let total_start = Instant::now();
        let mut features = Vec::new();
        let mut metrics = RunMetrics { memoized: self.snapshot.is_memoized(), ..RunMetrics::default() };

        for (id, template) in self.compiled.templates.iter().enumerate() {
            let start = Instant::now();
            let evaluation = calc_feature(template, &self.snapshot)?;
            let duration = start.elapsed();
            match evaluation {
                Evaluation::Present(values) => {
                    metrics.templates.push(TemplateMetrics { duration, skipped: None, values: values.len() });
                    features.push((id, values));
                }
                Evaluation::Skipped(reason) => {
                    trace!(template = template.name(), ?reason, "feature skipped");
                    metrics.templates.push(TemplateMetrics { duration, skipped: Some(reason), values: 0 });
                }
            }
        }

        metrics.total = total_start.elapsed();
        Ok((features, metrics))
    }
}
