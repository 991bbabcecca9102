use crate::adapters::kegg::{module_batches, KeggRestCatalog};
use crate::config::LocalStorage;
use crate::core::pipeline::CompletenessPipeline;
use crate::domain::model::RunSummary;
use crate::domain::ports::{ConfigProvider, Pipeline, RunOutput};
use crate::utils::error::Result;
use std::sync::Arc;

/// Run against the KEGG REST catalog, writing into `config.output_path()`.
pub async fn run_with_config<K: ConfigProvider + 'static>(config: K) -> Result<RunSummary> {
    let catalog = KeggRestCatalog::new(config.catalog_url());
    let storage = LocalStorage::new(config.output_path());
    let batches = module_batches(
        config.first_module(),
        config.last_module(),
        config.batch_size(),
    );
    let pipeline = CompletenessPipeline::new(catalog, storage, config);
    CompletenessEngine::new(pipeline, batches).run().await
}

pub struct CompletenessEngine<P: Pipeline> {
    pipeline: P,
    batches: Vec<Vec<String>>,
}

impl<P: Pipeline> CompletenessEngine<P> {
    pub fn new(pipeline: P, batches: Vec<Vec<String>>) -> Self {
        Self { pipeline, batches }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Loading organism identifier files...");
        let organisms = Arc::new(self.pipeline.load_organisms().await?);
        tracing::info!("Loaded {} organisms", organisms.len());

        let mut output = RunOutput::default();
        for organism in organisms.iter() {
            output.table.add_organism(&organism.name);
        }

        for batch in &self.batches {
            let Some(first_id) = batch.first() else {
                continue;
            };

            let modules = self.pipeline.extract(batch).await?;
            tracing::info!(
                "Fetched {} modules in batch starting with ID {}",
                modules.len(),
                first_id
            );

            output.summary.modules_skipped.extend(
                batch
                    .iter()
                    .filter(|id| !modules.iter().any(|m| &m.id == *id))
                    .cloned(),
            );
            if modules.is_empty() {
                continue;
            }

            for module in &modules {
                let malformed = module.malformed_step_count();
                if malformed > 0 {
                    tracing::warn!(
                        "Module {} has {} malformed step(s), scored as unsatisfied",
                        module.id,
                        malformed
                    );
                }
                output.summary.malformed_steps += malformed;
            }

            let modules = Arc::new(modules);
            let records = self
                .pipeline
                .transform(Arc::clone(&modules), Arc::clone(&organisms))
                .await?;
            tracing::debug!("Scored {} (organism, module) pairs", records.len());

            for record in &records {
                output.table.record(record);
            }
            output.modules.extend(modules.iter().cloned());
        }

        output.summary.organisms = organisms.len();
        output.summary.modules_evaluated = output.modules.len();

        tracing::info!(
            "Writing results for {} modules across {} organisms...",
            output.summary.modules_evaluated,
            output.summary.organisms
        );
        self.pipeline.load(output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::parse_module;
    use crate::core::scorer;
    use crate::domain::model::{IdentifierSet, ModuleDefinition, Organism, ScoreRecord};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records what the engine hands to each stage.
    struct RecordingPipeline {
        extracted: Mutex<Vec<Vec<String>>>,
        loaded: Mutex<Option<RunOutput>>,
    }

    impl RecordingPipeline {
        fn new() -> Self {
            Self {
                extracted: Mutex::new(Vec::new()),
                loaded: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn load_organisms(&self) -> Result<Vec<Organism>> {
            Ok(vec![Organism {
                name: "ecoli".to_string(),
                identifiers: ["K00001", "K00002"].into_iter().collect::<IdentifierSet>(),
            }])
        }

        async fn extract(&self, module_ids: &[String]) -> Result<Vec<ModuleDefinition>> {
            self.extracted.lock().await.push(module_ids.to_vec());
            Ok(module_ids
                .iter()
                .filter(|id| id.as_str() != "M00002")
                .map(|id| {
                    parse_module(id, &format!("Module {}", id), "K00001 (K00002,,K00003)").unwrap()
                })
                .collect())
        }

        async fn transform(
            &self,
            modules: Arc<Vec<ModuleDefinition>>,
            organisms: Arc<Vec<Organism>>,
        ) -> Result<Vec<ScoreRecord>> {
            Ok(organisms
                .iter()
                .flat_map(|o| modules.iter().map(move |m| scorer::score_record(m, o)))
                .collect())
        }

        async fn load(&self, output: RunOutput) -> Result<RunSummary> {
            let summary = output.summary.clone();
            *self.loaded.lock().await = Some(output);
            Ok(summary)
        }
    }

    #[tokio::test]
    async fn test_run_walks_every_batch() {
        let engine = CompletenessEngine::new(RecordingPipeline::new(), module_batches(1, 3, 2));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.organisms, 1);
        assert_eq!(summary.modules_evaluated, 2);
        assert_eq!(summary.modules_skipped, vec!["M00002"]);
        assert_eq!(summary.malformed_steps, 2);

        let extracted = engine.pipeline.extracted.lock().await;
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[1], vec!["M00003"]);

        let loaded = engine.pipeline.loaded.lock().await;
        let output = loaded.as_ref().unwrap();
        assert_eq!(output.table.modules(), ["Module M00001", "Module M00003"]);
        let score = output.table.get("ecoli", "Module M00001").unwrap();
        assert_eq!(score.total_steps, 2);
        assert_eq!(score.fulfilled_steps, 1);
    }
}
