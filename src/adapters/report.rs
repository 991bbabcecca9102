//! CSV renderings of the result table and the fetched definitions.

use crate::domain::model::{CompletenessScore, ModuleDefinition};
use crate::domain::table::CompletenessTable;
use crate::utils::error::{CompletenessError, Result};

pub const BINARY_FILE: &str = "module_completeness_binary.csv";
pub const PERCENTAGE_FILE: &str = "module_completeness_percentage.csv";
pub const DEFINITIONS_FILE: &str = "module_definitions.csv";
pub const DIFFERENTIAL_BINARY_FILE: &str = "differentially_present_binary.csv";
pub const DIFFERENTIAL_PERCENTAGE_FILE: &str = "differentially_present_percentage.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| CompletenessError::ProcessingError {
            message: format!("failed to flush CSV buffer: {}", e),
        })
}

fn render_table(
    table: &CompletenessTable,
    cell: impl Fn(&CompletenessScore) -> String,
) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Organism".to_string()];
    header.extend(table.modules().iter().cloned());
    writer.write_record(&header)?;

    for organism in table.organisms() {
        let mut row = vec![organism.clone()];
        row.extend(
            table
                .modules()
                .iter()
                .map(|module| table.get(organism, module).map(&cell).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    finish(writer)
}

/// `1` when the module is complete (near-complete tolerance included), else `0`.
pub fn binary_csv(table: &CompletenessTable) -> Result<Vec<u8>> {
    render_table(table, |score| u8::from(score.is_complete()).to_string())
}

pub fn percentage_csv(table: &CompletenessTable) -> Result<Vec<u8>> {
    render_table(table, |score| format!("{:.2}", score.percentage()))
}

/// One column per module: the module name, then its raw steps padded with
/// empty cells to `max_steps` rows. Longer modules are truncated.
pub fn definitions_csv(modules: &[ModuleDefinition], max_steps: usize) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(modules.iter().map(|m| m.name.as_str()))?;

    for module in modules.iter().filter(|m| m.steps.len() > max_steps) {
        tracing::warn!(
            "Module '{}' has more than {} steps ({} steps). Consider increasing the limit.",
            module.name,
            max_steps,
            module.steps.len()
        );
    }

    for row in 0..max_steps {
        writer.write_record(
            modules
                .iter()
                .map(|m| m.steps.get(row).map(|s| s.raw.as_str()).unwrap_or("")),
        )?;
    }

    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::parse_module;
    use crate::domain::model::ScoreRecord;

    fn table() -> CompletenessTable {
        let mut table = CompletenessTable::new();
        for (organism, module, total, fulfilled) in [
            ("ecoli", "Glycolysis", 3, 2),
            ("ecoli", "TCA cycle", 2, 1),
            ("bsub", "Glycolysis", 3, 3),
        ] {
            table.record(&ScoreRecord {
                organism: organism.to_string(),
                module_id: String::new(),
                module_name: module.to_string(),
                score: CompletenessScore {
                    total_steps: total,
                    fulfilled_steps: fulfilled,
                },
            });
        }
        table
    }

    #[test]
    fn test_binary_csv() {
        let csv = String::from_utf8(binary_csv(&table()).unwrap()).unwrap();
        assert_eq!(csv, "Organism,Glycolysis,TCA cycle\necoli,1,0\nbsub,1,\n");
    }

    #[test]
    fn test_percentage_csv() {
        let csv = String::from_utf8(percentage_csv(&table()).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Organism,Glycolysis,TCA cycle\necoli,66.67,50.00\nbsub,100.00,\n"
        );
    }

    #[test]
    fn test_definitions_csv_pads_and_truncates() {
        let modules = vec![
            parse_module("M00001", "Short", "K00001 (K00002,K00003)").unwrap(),
            parse_module("M00002", "Long", "K00004 K00005 K00006 K00007").unwrap(),
        ];
        let csv = String::from_utf8(definitions_csv(&modules, 3).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Short,Long\nK00001,K00004\n\"(K00002,K00003)\",K00005\n,K00006\n"
        );
    }
}
