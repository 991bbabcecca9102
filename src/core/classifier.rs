//! Deterministic classification of definition steps.

use crate::domain::model::StepClass;
use regex::Regex;
use std::sync::LazyLock;

static SUBMODULE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9A-Za-z])M[0-9]{5}(?:$|[^0-9])").unwrap());

pub const SKIP_MARKER: &str = "--";

/// Classify one raw step.
///
/// - `Skip` if the step contains `--`, even when it also names a module.
/// - `SubmoduleReference` if it names a module (`M` and five digits).
/// - `Logical` otherwise.
pub fn classify(raw_step: &str) -> StepClass {
    if raw_step.contains(SKIP_MARKER) {
        StepClass::Skip
    } else if SUBMODULE_REFERENCE.is_match(raw_step) {
        StepClass::SubmoduleReference
    } else {
        StepClass::Logical
    }
}
