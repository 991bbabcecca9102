use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A pathway module as fetched from the catalog, already split into steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefinition {
    pub id: String,
    pub name: String,
    pub steps: Vec<Step>,
}

impl ModuleDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            steps,
        }
    }

    pub fn raw_steps(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.raw.as_str())
    }

    pub fn malformed_step_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.kind, StepKind::Malformed(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub raw: String,
    pub kind: StepKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Contains `--`: no identifier exists for this reaction.
    Skip,
    /// Names another module. Counted, never satisfied.
    SubmoduleReference,
    Logical(Expression),
    /// A logical step whose text could not be parsed.
    Malformed(StepFault),
}

/// Classification tag, without the parsed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepClass {
    Skip,
    SubmoduleReference,
    Logical,
}

impl Step {
    pub fn class(&self) -> StepClass {
        match self.kind {
            StepKind::Skip => StepClass::Skip,
            StepKind::SubmoduleReference => StepClass::SubmoduleReference,
            StepKind::Logical(_) | StepKind::Malformed(_) => StepClass::Logical,
        }
    }
}

/// Boolean expression over identifier leaves.
///
/// `Complex` evaluates exactly like `And`; it only records that the source
/// joined the parts with `+`. `Optional` never survives normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Leaf(String),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Complex(Vec<Expression>),
    Optional(Box<Expression>),
}

impl Expression {
    pub fn leaf(identifier: impl Into<String>) -> Self {
        Expression::Leaf(identifier.into())
    }

    pub fn optional(child: Expression) -> Self {
        Expression::Optional(Box::new(child))
    }
}

/// Why a logical step could not be turned into an [`Expression`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFault {
    #[error("{0}")]
    Malformed(String),
    #[error("unknown identifier token '{0}'")]
    UnknownIdentifier(String),
}

/// One organism's annotated identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet(HashSet<String>);

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One identifier per line; surrounding whitespace and blank lines are ignored.
    pub fn from_lines(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        self.0.insert(identifier.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organism {
    pub name: String,
    pub identifiers: IdentifierSet,
}

/// Modules with at least this many scoreable steps may miss one and still
/// count as complete.
pub const NEAR_COMPLETE_MIN_STEPS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessScore {
    pub total_steps: usize,
    pub fulfilled_steps: usize,
}

impl CompletenessScore {
    pub fn is_complete(&self) -> bool {
        if self.total_steps == 0 {
            return false;
        }
        self.fulfilled_steps == self.total_steps
            || (self.total_steps >= NEAR_COMPLETE_MIN_STEPS
                && self.fulfilled_steps + 1 == self.total_steps)
    }

    /// Fulfilled over total as a percentage, rounded to two decimals with
    /// ties to even (1/32 gives 3.12).
    pub fn percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        let raw = self.fulfilled_steps as f64 / self.total_steps as f64 * 100.0;
        (raw * 100.0).round_ties_even() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Excluded,
    SubmoduleUnresolved,
    Evaluated(bool),
    Malformed(StepFault),
}

impl StepOutcome {
    pub fn is_counted(&self) -> bool {
        !matches!(self, StepOutcome::Excluded)
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, StepOutcome::Evaluated(true))
    }
}

/// Score of one module for one organism, as handed to the result table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub organism: String,
    pub module_id: String,
    pub module_name: String,
    pub score: CompletenessScore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub organisms: usize,
    pub modules_evaluated: usize,
    pub modules_skipped: Vec<String>,
    pub malformed_steps: usize,
    pub output_files: Vec<String>,
    pub generated_at: String,
}
