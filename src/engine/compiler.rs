//! Template compilation and indexing.
//!
//! This module holds the *static* side of the engine: descriptor strings are
//! validated against the template grammar once, at configuration time, and
//! turned into immutable [`FeatureTemplate`]s. Evaluation (see `evaluate.rs`)
//! never looks at the descriptor text again.
//!
//! ## Grammar
//!
//! ```text
//! template   := element+
//! element    := source index navigation* property*
//! source     := 's' | 'b' | 'a'                     stack / buffer / actions
//! index      := digit+
//! navigation := 'l' | 'r' | 'u' | 'p'               left / right / only child, parent
//! property   := 'w' | 't' | 'e' | 'p' | 'q' | 'x' | 'y' | 'P' | 'C' | 'I' | 'R'
//! ```
//!
//! `p` belongs to both alphabets. Matching is greedy, so a `p` directly after
//! the index or another navigation letter is navigation (`s0p` is "parent of
//! stack top"); it is only read as the separator property once a property
//! letter has started the run (`s0wp`).
//!
//! ## Invariants
//!
//! - Compilation is all-or-nothing: one bad descriptor fails the whole set and
//!   the error lists every bad descriptor.
//! - `TemplateId` is a position in `CompiledTemplates::templates` and
//!   `CompiledTemplates::requirements`. Those vectors must stay aligned.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

macro_rules! element_pattern {
    () => {
        r"([sba])(\d+)([lrup]*)([wtepqxyPCIR]*)"
    };
}

/// Template identifier (index into the compiled template vector).
pub(crate) type TemplateId = usize;

/// Fatal configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Features do not match pattern: {}", .descriptors.join(", "))]
    InvalidDescriptors { descriptors: Vec<String> },
}

/// Where an element takes its focus from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Stack,
    Buffer,
    Actions,
}

impl Source {
    fn from_code(code: char) -> Option<Self> {
        match code {
            's' => Some(Source::Stack),
            'b' => Some(Source::Buffer),
            'a' => Some(Source::Actions),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Source::Stack => 's',
            Source::Buffer => 'b',
            Source::Actions => 'a',
        }
    }
}

/// One step from the selected node to a relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    LeftmostChild,
    RightmostChild,
    OnlyChild,
    Parent,
}

impl Navigation {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'l' => Some(Navigation::LeftmostChild),
            'r' => Some(Navigation::RightmostChild),
            'u' => Some(Navigation::OnlyChild),
            'p' => Some(Navigation::Parent),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Navigation::LeftmostChild => 'l',
            Navigation::RightmostChild => 'r',
            Navigation::OnlyChild => 'u',
            Navigation::Parent => 'p',
        }
    }
}

/// Value read from the focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `w`: head terminal text, or action type.
    Text,
    /// `t`: head terminal POS tag.
    PosTag,
    /// `e`: incoming edge tag, or action tag.
    EdgeTag,
    /// `p`: the single punctuation terminal between the two stack tops.
    Separator,
    /// `q`: number of punctuation terminals between the two stack tops.
    SeparatorCount,
    /// `x`: gap type.
    GapType,
    /// `y`: sum of gap lengths.
    GapLengthSum,
    /// `P`: number of incoming edges.
    ParentCount,
    /// `C`: number of outgoing edges.
    ChildCount,
    /// `I`: number of implicit children.
    ImplicitCount,
    /// `R`: number of remote outgoing edges.
    RemoteCount,
}

impl Property {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(Property::Text),
            't' => Some(Property::PosTag),
            'e' => Some(Property::EdgeTag),
            'p' => Some(Property::Separator),
            'q' => Some(Property::SeparatorCount),
            'x' => Some(Property::GapType),
            'y' => Some(Property::GapLengthSum),
            'P' => Some(Property::ParentCount),
            'C' => Some(Property::ChildCount),
            'I' => Some(Property::ImplicitCount),
            'R' => Some(Property::RemoteCount),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Property::Text => 'w',
            Property::PosTag => 't',
            Property::EdgeTag => 'e',
            Property::Separator => 'p',
            Property::SeparatorCount => 'q',
            Property::GapType => 'x',
            Property::GapLengthSum => 'y',
            Property::ParentCount => 'P',
            Property::ChildCount => 'C',
            Property::ImplicitCount => 'I',
            Property::RemoteCount => 'R',
        }
    }

    pub fn is_separator(self) -> bool {
        matches!(self, Property::Separator | Property::SeparatorCount)
    }
}

/// One element of a template: a focus selection plus what to read from it.
///
/// An element without properties contributes an edge indicator between the
/// previous element's focus and this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTemplateElement {
    source: Source,
    index: usize,
    navigation: Vec<Navigation>,
    properties: Vec<Property>,
}

impl FeatureTemplateElement {
    pub fn source(&self) -> Source {
        self.source
    }

    /// Offset into the source; stack and actions count from the end.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn navigation(&self) -> &[Navigation] {
        &self.navigation
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let source = caps.get(1)?.as_str().chars().next().and_then(Source::from_code)?;
        // Digit runs too long for usize are rejected with the rest of the bad descriptors.
        let index = caps.get(2)?.as_str().parse().ok()?;
        let navigation = caps.get(3)?.as_str().chars().map(Navigation::from_code).collect::<Option<Vec<_>>>()?;
        let properties = caps.get(4)?.as_str().chars().map(Property::from_code).collect::<Option<Vec<_>>>()?;
        Some(FeatureTemplateElement { source, index, navigation, properties })
    }
}

impl fmt::Display for FeatureTemplateElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source.code(), self.index)?;
        for nav in &self.navigation {
            write!(f, "{}", nav.code())?;
        }
        for prop in &self.properties {
            write!(f, "{}", prop.code())?;
        }
        Ok(())
    }
}

/// A compiled feature template: the descriptor it came from and its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTemplate {
    name: String,
    elements: Vec<FeatureTemplateElement>,
}

impl FeatureTemplate {
    /// Compile a single descriptor. Returns `None` if it does not fully match
    /// the grammar.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let template_re = regex!(concat!("^(?:", element_pattern!(), ")+$"));
        if !template_re.is_match(descriptor) {
            return None;
        }
        let element_re = regex!(element_pattern!());
        let elements = element_re
            .captures_iter(descriptor)
            .map(|caps| FeatureTemplateElement::from_captures(&caps))
            .collect::<Option<Vec<_>>>()?;
        Some(FeatureTemplate { name: descriptor.to_string(), elements })
    }

    /// The descriptor text; used as the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[FeatureTemplateElement] {
        &self.elements
    }

    /// Derived data this template touches during evaluation.
    pub fn requirements(&self) -> Requirements {
        let mut req = Requirements::empty();
        for element in &self.elements {
            req |= match element.source {
                Source::Stack => Requirements::STACK,
                Source::Buffer => Requirements::BUFFER,
                Source::Actions => Requirements::ACTIONS,
            };
            if element.properties.is_empty() {
                req |= Requirements::INDICATOR;
                continue;
            }
            if element.source == Source::Actions {
                continue;
            }
            for prop in &element.properties {
                req |= match prop {
                    Property::Text | Property::PosTag => Requirements::HEAD,
                    p if p.is_separator() => Requirements::SEPARATOR | Requirements::HEAD | Requirements::STACK,
                    Property::GapType | Property::GapLengthSum => Requirements::GAPS,
                    _ => Requirements::empty(),
                };
            }
        }
        req
    }
}

impl fmt::Display for FeatureTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

bitflags::bitflags! {
    /// What a template reads from a state.
    ///
    /// Used to decide whether a per-state derived-property cache is worth
    /// building and to report template coverage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Requirements: u8 {
        const STACK     = 1 << 0;
        const BUFFER    = 1 << 1;
        const ACTIONS   = 1 << 2;
        const HEAD      = 1 << 3;
        const GAPS      = 1 << 4;
        const SEPARATOR = 1 << 5;
        const INDICATOR = 1 << 6;
    }
}

/// Compiled, immutable template set with per-template requirements.
#[derive(Debug, Clone)]
pub struct CompiledTemplates {
    pub templates: Vec<FeatureTemplate>,
    pub requirements: Vec<Requirements>,
}

impl CompiledTemplates {
    /// Compile every descriptor, or fail listing all that do not match.
    pub fn new<I, S>(descriptors: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut templates = Vec::new();
        let mut invalid = Vec::new();
        for descriptor in descriptors {
            let descriptor = descriptor.as_ref();
            match FeatureTemplate::parse(descriptor) {
                Some(template) => templates.push(template),
                None => invalid.push(descriptor.to_string()),
            }
        }

        if !invalid.is_empty() {
            warn!(count = invalid.len(), descriptors = ?invalid, "rejected feature templates");
            return Err(CompileError::InvalidDescriptors { descriptors: invalid });
        }

        let requirements: Vec<Requirements> = templates.iter().map(FeatureTemplate::requirements).collect();

        debug!(
            templates = templates.len(),
            elements = templates.iter().map(|t| t.elements.len()).sum::<usize>(),
            "compiled feature templates"
        );

        Ok(CompiledTemplates { templates, requirements })
    }

    /// Union of all template requirements.
    pub fn combined_requirements(&self) -> Requirements {
        self.requirements.iter().fold(Requirements::empty(), |acc, r| acc | *r)
    }
}
