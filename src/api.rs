use crate::engine::{
    self, CompileError, CompiledTemplates, EvalError, Extraction, FeatureTemplate, Requirements, SkipReason, Snapshot,
};
use crate::graph::State;
use serde::Deserialize;
use std::time::Duration;

/// Extractor configuration.
///
/// Deserializable so that template sets can live next to the rest of a
/// parser's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorOptions {
    /// Template descriptors, e.g. `"s0wt"` or `"s0s1"`.
    pub templates: Vec<String>,
    /// Cache heads and terminal yields per state.
    #[serde(default = "default_memoize")]
    pub memoize: bool,
}

fn default_memoize() -> bool {
    true
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self { templates: Vec::new(), memoize: default_memoize() }
    }
}

/// A present feature: the template name and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub values: Vec<String>,
}

impl Feature {
    /// Classifier key: `name=v1|v2|..`.
    pub fn key(&self) -> String {
        format!("{}={}", self.name, self.values.join("|"))
    }
}

/// Per-template outcome in a verbose extraction.
#[derive(Debug, Clone)]
pub struct TemplateOutcome {
    pub name: String,
    pub duration: Duration,
    /// `None` when the feature was present.
    pub skipped: Option<SkipReason>,
    pub values: usize,
}

/// Additional details returned by [`FeatureExtractor::extract_features_verbose`].
#[derive(Debug, Clone)]
pub struct ExtractionDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Whether a per-state cache was used.
    pub memoized: bool,
    pub present: usize,
    pub skipped: usize,
    /// One entry per template, in template order.
    pub outcomes: Vec<TemplateOutcome>,
}

/// Result from [`FeatureExtractor::extract_features_verbose`].
#[derive(Debug, Clone)]
pub struct ExtractionResultVerbose {
    pub features: Vec<Feature>,
    pub details: ExtractionDetails,
}

/// Compiled template set ready to extract features from parser states.
///
/// Construction fails if any descriptor is malformed; a constructed extractor
/// is immutable and can be shared across threads.
///
/// # Example
/// ```
/// use tupa_features::{FeatureExtractor, Graph, State};
///
/// let mut graph = Graph::new();
/// graph.add_terminal("Hello", "UH");
/// let state = State::initial(&graph);
///
/// let extractor = FeatureExtractor::new(["b0wt", "s0w"]).unwrap();
/// let features = extractor.extract_features(&state).unwrap();
/// assert_eq!(features.len(), 1);
/// assert_eq!(features[0].key(), "b0wt=Hello|UH");
/// ```
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    compiled: CompiledTemplates,
    memoize: bool,
}

impl FeatureExtractor {
    /// Compile `descriptors` with default options.
    pub fn new<I, S>(descriptors: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(FeatureExtractor { compiled: CompiledTemplates::new(descriptors)?, memoize: default_memoize() })
    }

    pub fn from_options(options: &ExtractorOptions) -> Result<Self, CompileError> {
        Ok(FeatureExtractor { compiled: CompiledTemplates::new(&options.templates)?, memoize: options.memoize })
    }

    pub fn templates(&self) -> &[FeatureTemplate] {
        &self.compiled.templates
    }

    /// Union of what the templates read from a state.
    pub fn requirements(&self) -> Requirements {
        self.compiled.combined_requirements()
    }

    /// Evaluate every template against `state`, returning present features
    /// in template order.
    pub fn extract_features(&self, state: &State<'_>) -> Result<Vec<Feature>, EvalError> {
        let run = Extraction::new(&self.compiled, state, self.memoize).run()?;
        Ok(run.into_iter().map(|(id, values)| self.feature(id, values)).collect())
    }

    /// Like [`extract_features`](Self::extract_features), with per-template
    /// timings and skip reasons.
    pub fn extract_features_verbose(&self, state: &State<'_>) -> Result<ExtractionResultVerbose, EvalError> {
        let (run, metrics) = Extraction::new(&self.compiled, state, self.memoize).run_with_metrics()?;

        let outcomes = self
            .compiled
            .templates
            .iter()
            .zip(&metrics.templates)
            .map(|(template, m)| TemplateOutcome {
                name: template.name().to_string(),
                duration: m.duration,
                skipped: m.skipped,
                values: m.values,
            })
            .collect();

        let details = ExtractionDetails {
            total: metrics.total,
            memoized: metrics.memoized,
            present: metrics.present(),
            skipped: metrics.skipped(),
            outcomes,
        };
        let features = run.into_iter().map(|(id, values)| self.feature(id, values)).collect();

        Ok(ExtractionResultVerbose { features, details })
    }

    fn feature(&self, id: usize, values: Vec<String>) -> Feature {
        Feature { name: self.compiled.templates[id].name().to_string(), values }
    }
}

/// Compile descriptors into templates, failing on (and listing) every
/// descriptor that does not match the grammar.
pub fn compile<I, S>(descriptors: I) -> Result<Vec<FeatureTemplate>, CompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(CompiledTemplates::new(descriptors)?.templates)
}

/// Evaluate one template against `state`.
///
/// `Ok(None)` means the feature is absent for this state; `Err` means the
/// template asks for something its source cannot provide.
pub fn evaluate(template: &FeatureTemplate, state: &State<'_>) -> Result<Option<Vec<String>>, EvalError> {
    let snapshot = Snapshot::new(state, false);
    Ok(engine::calc_feature(template, &snapshot)?.into_values())
}
