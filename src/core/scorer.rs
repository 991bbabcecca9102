//! Aggregates step outcomes into a module score.

use crate::core::expression;
use crate::domain::model::{
    CompletenessScore, IdentifierSet, ModuleDefinition, Organism, ScoreRecord, Step, StepKind,
    StepOutcome,
};

pub fn step_outcome(step: &Step, identifiers: &IdentifierSet) -> StepOutcome {
    match &step.kind {
        StepKind::Skip => StepOutcome::Excluded,
        StepKind::SubmoduleReference => StepOutcome::SubmoduleUnresolved,
        StepKind::Logical(expr) => {
            StepOutcome::Evaluated(expression::evaluate_expression(expr, identifiers))
        }
        StepKind::Malformed(fault) => StepOutcome::Malformed(fault.clone()),
    }
}

pub fn step_outcomes(module: &ModuleDefinition, identifiers: &IdentifierSet) -> Vec<StepOutcome> {
    module
        .steps
        .iter()
        .map(|step| step_outcome(step, identifiers))
        .collect()
}

pub fn tally(outcomes: &[StepOutcome]) -> CompletenessScore {
    outcomes
        .iter()
        .fold(CompletenessScore::default(), |mut score, outcome| {
            if outcome.is_counted() {
                score.total_steps += 1;
            }
            if outcome.is_fulfilled() {
                score.fulfilled_steps += 1;
            }
            score
        })
}

pub fn score(module: &ModuleDefinition, identifiers: &IdentifierSet) -> CompletenessScore {
    tally(&step_outcomes(module, identifiers))
}

pub fn score_record(module: &ModuleDefinition, organism: &Organism) -> ScoreRecord {
    ScoreRecord {
        organism: organism.name.clone(),
        module_id: module.id.clone(),
        module_name: module.name.clone(),
        score: score(module, &organism.identifiers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::parse_module;

    fn ids(items: &[&str]) -> IdentifierSet {
        items.iter().copied().collect()
    }

    fn score_of(total_steps: usize, fulfilled_steps: usize) -> CompletenessScore {
        CompletenessScore {
            total_steps,
            fulfilled_steps,
        }
    }

    #[test]
    fn test_score_mixed_step_kinds() {
        let module =
            parse_module("M00900", "Example", "K00001 K00002 K00003,K00004 -- M00099").unwrap();
        let score = score(&module, &ids(&["K00001", "K00002", "K00004"]));

        assert_eq!(score.total_steps, 4);
        assert_eq!(score.fulfilled_steps, 3);
    }

    #[test]
    fn test_malformed_step_counts_as_unsatisfied() {
        let module = parse_module("M00901", "Broken", "K00001 (K00002,,K00003) K00004").unwrap();
        let organism = Organism {
            name: "ecoli".to_string(),
            identifiers: ids(&["K00001", "K00002", "K00003", "K00004"]),
        };

        let outcomes = step_outcomes(&module, &organism.identifiers);
        assert!(matches!(outcomes[1], StepOutcome::Malformed(_)));

        let record = score_record(&module, &organism);
        assert_eq!(record.score.total_steps, 3);
        assert_eq!(record.score.fulfilled_steps, 2);
        assert_eq!(record.module_name, "Broken");
        assert_eq!(module.malformed_step_count(), 1);
    }

    #[test]
    fn test_deeply_nested_step_scores_as_malformed() {
        let deep = format!("{}K00002{}", "(".repeat(5_000), ")".repeat(5_000));
        let module = parse_module("M00902", "Nested", &format!("K00001 {}", deep)).unwrap();

        let score = score(&module, &ids(&["K00001", "K00002"]));
        assert_eq!(score.total_steps, 2);
        assert_eq!(score.fulfilled_steps, 1);
        assert_eq!(module.malformed_step_count(), 1);
    }

    #[test]
    fn test_tally_empty() {
        let score = tally(&[]);
        assert_eq!(score, CompletenessScore::default());
        assert_eq!(score.percentage(), 0.0);
        assert!(!score.is_complete());
    }

    #[test]
    fn test_near_complete_tolerance() {
        assert!(score_of(4, 3).is_complete());
        assert!(!score_of(2, 1).is_complete());
        assert!(!score_of(3, 1).is_complete());
        assert!(score_of(1, 1).is_complete());
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(score_of(3, 2).percentage(), 66.67);
        assert_eq!(score_of(3, 1).percentage(), 33.33);
        assert_eq!(score_of(8, 8).percentage(), 100.0);
    }

    #[test]
    fn test_percentage_rounds_ties_to_even() {
        assert_eq!(score_of(32, 1).percentage(), 3.12);
        assert_eq!(score_of(32, 5).percentage(), 15.62);
        assert_eq!(score_of(32, 15).percentage(), 46.88);
        assert_eq!(score_of(32, 17).percentage(), 53.12);
    }
}
