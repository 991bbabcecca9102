use crate::core::{classifier, expression, splitter};
use crate::domain::model::{ModuleDefinition, Step, StepClass, StepKind};
use crate::utils::error::Result;

/// Classify a raw step and, for logical ones, parse its expression.
pub fn build_step(raw_step: &str) -> Step {
    let kind = match classifier::classify(raw_step) {
        StepClass::Skip => StepKind::Skip,
        StepClass::SubmoduleReference => StepKind::SubmoduleReference,
        StepClass::Logical => match expression::parse(raw_step) {
            Ok(expr) => StepKind::Logical(expr),
            Err(fault) => {
                tracing::warn!("Step '{}' could not be parsed: {}", raw_step, fault);
                StepKind::Malformed(fault)
            }
        },
    };

    Step {
        raw: raw_step.to_string(),
        kind,
    }
}

/// Build a module from its raw definition text.
///
/// Fails only when the definition does not split into balanced steps;
/// individual malformed steps are kept and scored as unsatisfied.
pub fn parse_module(id: &str, name: &str, raw_definition: &str) -> Result<ModuleDefinition> {
    let steps = splitter::split(raw_definition)?
        .iter()
        .map(|raw| build_step(raw))
        .collect();
    Ok(ModuleDefinition::new(id, name, steps))
}
