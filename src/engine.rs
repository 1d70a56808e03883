//! Feature-template engine.
//!
//! This module is the entry point for compiling descriptor strings and
//! evaluating the resulting templates against parser states. It is split into
//! focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! descriptors ──┐
//!               │  CompiledTemplates::new          (compiler.rs)
//!               └───────────────┬──────────────
//!                               │
//! State ── Snapshot::new ───────┼─ optional per-state cache (snapshot.rs)
//!                               │
//!                               v
//!                     Extraction::run (extract.rs)
//!                       - calc_feature per template (evaluate.rs)
//!                           - select source, navigate
//!                           - indicator or properties
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            v                  v                  v
//!       head.rs            gaps.rs           separator.rs
//!   lexical heads      gap type / sum     punctuation between
//!   (edge priority)                         stack tops
//!                               │
//!                               v
//!                 Vec<(TemplateId, Vec<String>)>
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiler.rs`: validates descriptors against the template grammar and
//!   builds immutable `FeatureTemplate`s with their requirement masks.
//! - `evaluate.rs`: evaluates one template; distinguishes skips from template
//!   defects.
//! - `head.rs`: the edge-priority table and head-terminal descent.
//! - `gaps.rs`: discontinuity statistics over terminal yields.
//! - `separator.rs`: punctuation between the two topmost stack entries.
//! - `snapshot.rs`: per-state memoization of heads and yields.
//! - `extract.rs`: runs a whole template set over one state.
//! - `metrics.rs`: optional timing and skip-reason data for runs.
//!
//! ## Debugging
//!
//! Compilation logs at `debug`, skipped features at `trace`, through
//! `tracing`. Install a subscriber in the host application to see them.

#[path = "engine/compiler.rs"]
mod compiler;
#[path = "engine/evaluate.rs"]
mod evaluate;
#[path = "engine/extract.rs"]
mod extract;
#[path = "engine/gaps.rs"]
mod gaps;
#[path = "engine/head.rs"]
mod head;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/separator.rs"]
mod separator;
#[path = "engine/snapshot.rs"]
mod snapshot;

pub use compiler::{
    CompileError, CompiledTemplates, FeatureTemplate, FeatureTemplateElement, Navigation, Property, Requirements,
    Source,
};
pub use evaluate::{EvalError, SkipReason};
pub use extract::Extraction;
pub use head::edge_priority;

pub(crate) use evaluate::calc_feature;
pub(crate) use snapshot::Snapshot;
