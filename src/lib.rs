//! Feature templates for transition-based semantic parsing.
//!
//! A template descriptor such as `"s0wt"` ("head word and POS tag of the stack
//! top") is compiled once into a [`FeatureTemplate`] and then evaluated against
//! each parser [`State`] the classifier sees. Evaluation either yields the
//! feature's values or reports the feature as absent for that state.
//!
//! ```text
//! ["s0wt", "b0w", "s0s1"] ── FeatureExtractor::new ──▶ compiled templates
//!                                                            │
//! State { stack, buffer, actions } ── extract_features ──────┘──▶ Vec<Feature>
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod graph;


pub use api::{
    ExtractionDetails, ExtractionResultVerbose, ExtractorOptions, Feature, FeatureExtractor, TemplateOutcome, compile,
    evaluate,
};
pub use engine::{
    CompileError, EvalError, FeatureTemplate, FeatureTemplateElement, Navigation, Property, Requirements, SkipReason,
    Source, edge_priority,
};
pub use graph::{Action, Edge, EdgeId, Graph, Node, NodeId, NodeTag, State, edge_tags};
