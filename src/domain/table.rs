use crate::domain::model::{CompletenessScore, ScoreRecord};
use std::collections::HashMap;

/// Wide result table: one row per organism, one column per module name.
///
/// Rows and columns keep first-seen order. Recording a cell twice keeps the
/// latest score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletenessTable {
    organisms: Vec<String>,
    modules: Vec<String>,
    cells: HashMap<(String, String), CompletenessScore>,
}

impl CompletenessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organism(&mut self, organism: &str) {
        if !self.organisms.iter().any(|o| o == organism) {
            self.organisms.push(organism.to_string());
        }
    }

    pub fn add_module(&mut self, module_name: &str) {
        if !self.modules.iter().any(|m| m == module_name) {
            self.modules.push(module_name.to_string());
        }
    }

    pub fn record(&mut self, record: &ScoreRecord) {
        self.add_organism(&record.organism);
        self.add_module(&record.module_name);
        self.cells.insert(
            (record.organism.clone(), record.module_name.clone()),
            record.score,
        );
    }

    pub fn get(&self, organism: &str, module_name: &str) -> Option<&CompletenessScore> {
        self.cells
            .get(&(organism.to_string(), module_name.to_string()))
    }

    pub fn organisms(&self) -> &[String] {
        &self.organisms
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn column<'a>(
        &'a self,
        module_name: &'a str,
    ) -> impl Iterator<Item = &'a CompletenessScore> + 'a {
        self.organisms
            .iter()
            .filter_map(move |organism| self.get(organism, module_name))
    }

    /// True when the module is complete in some organisms and not in others.
    pub fn is_differential(&self, module_name: &str) -> bool {
        let mut any_complete = false;
        let mut any_incomplete = false;
        for score in self.column(module_name) {
            if score.is_complete() {
                any_complete = true;
            } else {
                any_incomplete = true;
            }
        }
        any_complete && any_incomplete
    }

    /// Copy of the table restricted to differential module columns.
    pub fn differential(&self) -> CompletenessTable {
        let modules: Vec<String> = self
            .modules
            .iter()
            .filter(|module| self.is_differential(module))
            .cloned()
            .collect();
        let cells = self
            .cells
            .iter()
            .filter(|((_, module), _)| modules.contains(module))
            .map(|(key, score)| (key.clone(), *score))
            .collect();

        CompletenessTable {
            organisms: self.organisms.clone(),
            modules,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(organism: &str, module: &str, total: usize, fulfilled: usize) -> ScoreRecord {
        ScoreRecord {
            organism: organism.to_string(),
            module_id: format!("id-{}", module),
            module_name: module.to_string(),
            score: CompletenessScore {
                total_steps: total,
                fulfilled_steps: fulfilled,
            },
        }
    }

    #[test]
    fn test_record_keeps_first_seen_order() {
        let mut table = CompletenessTable::new();
        table.record(&record("ecoli", "Glycolysis", 4, 4));
        table.record(&record("bsub", "TCA cycle", 8, 2));
        table.record(&record("ecoli", "TCA cycle", 8, 8));

        assert_eq!(table.organisms(), ["ecoli", "bsub"]);
        assert_eq!(table.modules(), ["Glycolysis", "TCA cycle"]);
        assert!(table.get("bsub", "Glycolysis").is_none());
        assert_eq!(table.get("ecoli", "TCA cycle").unwrap().fulfilled_steps, 8);
    }

    #[test]
    fn test_record_overwrites_cell() {
        let mut table = CompletenessTable::new();
        table.record(&record("ecoli", "Glycolysis", 4, 1));
        table.record(&record("ecoli", "Glycolysis", 4, 4));
        assert_eq!(table.get("ecoli", "Glycolysis").unwrap().fulfilled_steps, 4);
        assert_eq!(table.modules().len(), 1);
    }

    #[test]
    fn test_differential_keeps_mixed_columns_only() {
        let mut table = CompletenessTable::new();
        table.record(&record("ecoli", "Glycolysis", 4, 4));
        table.record(&record("bsub", "Glycolysis", 4, 4));
        table.record(&record("ecoli", "TCA cycle", 8, 8));
        table.record(&record("bsub", "TCA cycle", 8, 2));
        table.record(&record("ecoli", "Urea cycle", 5, 0));
        table.record(&record("bsub", "Urea cycle", 5, 1));

        let filtered = table.differential();
        assert_eq!(filtered.modules(), ["TCA cycle"]);
        assert_eq!(filtered.organisms(), ["ecoli", "bsub"]);
        assert!(filtered.get("ecoli", "Glycolysis").is_none());
        assert!(filtered.get("bsub", "TCA cycle").is_some());
    }
}
