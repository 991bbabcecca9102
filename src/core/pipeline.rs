use crate::adapters::kegg::{fetch_batch, ModuleCache};
use crate::adapters::organisms;
use crate::adapters::report;
use crate::core::scorer;
use crate::domain::model::{ModuleDefinition, Organism, RunSummary, ScoreRecord};
use crate::domain::ports::{ConfigProvider, ModuleCatalog, Pipeline, RunOutput, Storage};
use crate::domain::table::CompletenessTable;
use crate::utils::error::{CompletenessError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Fetches modules from a catalog, scores them against every organism and
/// writes the CSV tables through `storage`.
pub struct CompletenessPipeline<C: ModuleCatalog, S: Storage, K: ConfigProvider> {
    catalog: Arc<C>,
    storage: S,
    config: K,
    cache: Mutex<ModuleCache>,
}

impl<C: ModuleCatalog, S: Storage, K: ConfigProvider> CompletenessPipeline<C, S, K> {
    pub fn new(catalog: C, storage: S, config: K) -> Self {
        Self::with_cache(catalog, storage, config, ModuleCache::new())
    }

    /// Reuse modules fetched by an earlier run.
    pub fn with_cache(catalog: C, storage: S, config: K, cache: ModuleCache) -> Self {
        Self {
            catalog: Arc::new(catalog),
            storage,
            config,
            cache: Mutex::new(cache),
        }
    }

    pub fn into_cache(self) -> ModuleCache {
        self.cache.into_inner()
    }

    async fn write_table_pair(
        &self,
        table: &CompletenessTable,
        binary_file: &str,
        percentage_file: &str,
        written: &mut Vec<String>,
    ) -> Result<()> {
        self.storage
            .write_file(binary_file, &report::binary_csv(table)?)
            .await?;
        written.push(binary_file.to_string());

        self.storage
            .write_file(percentage_file, &report::percentage_csv(table)?)
            .await?;
        written.push(percentage_file.to_string());
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C, S, K> Pipeline for CompletenessPipeline<C, S, K>
where
    C: ModuleCatalog + 'static,
    S: Storage,
    K: ConfigProvider,
{
    async fn load_organisms(&self) -> Result<Vec<Organism>> {
        organisms::load_organisms(self.config.identifier_files()).await
    }

    async fn extract(&self, module_ids: &[String]) -> Result<Vec<ModuleDefinition>> {
        let mut cache = self.cache.lock().await;
        fetch_batch(
            Arc::clone(&self.catalog),
            &mut cache,
            module_ids,
            self.config.concurrent_requests(),
        )
        .await
    }

    async fn transform(
        &self,
        modules: Arc<Vec<ModuleDefinition>>,
        organisms: Arc<Vec<Organism>>,
    ) -> Result<Vec<ScoreRecord>> {
        let mut tasks = JoinSet::new();

        for index in 0..organisms.len() {
            let modules = Arc::clone(&modules);
            let organisms = Arc::clone(&organisms);
            tasks.spawn_blocking(move || {
                let organism = &organisms[index];
                let records: Vec<ScoreRecord> = modules
                    .iter()
                    .map(|module| scorer::score_record(module, organism))
                    .collect();
                (index, records)
            });
        }

        let mut per_organism = Vec::with_capacity(organisms.len());
        while let Some(joined) = tasks.join_next().await {
            per_organism.push(joined.map_err(|e| CompletenessError::ProcessingError {
                message: format!("scoring task failed: {}", e),
            })?);
        }
        per_organism.sort_by_key(|(index, _)| *index);

        Ok(per_organism
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect())
    }

    async fn load(&self, output: RunOutput) -> Result<RunSummary> {
        let RunOutput {
            table,
            modules,
            mut summary,
        } = output;
        let mut written = Vec::new();

        self.write_table_pair(
            &table,
            report::BINARY_FILE,
            report::PERCENTAGE_FILE,
            &mut written,
        )
        .await?;

        if !modules.is_empty() {
            let definitions = report::definitions_csv(&modules, self.config.max_steps())?;
            self.storage
                .write_file(report::DEFINITIONS_FILE, &definitions)
                .await?;
            written.push(report::DEFINITIONS_FILE.to_string());
        }

        if self.config.differential_only() {
            let differential = table.differential();
            tracing::info!(
                "{} of {} modules are differentially present",
                differential.modules().len(),
                table.modules().len()
            );
            self.write_table_pair(
                &differential,
                report::DIFFERENTIAL_BINARY_FILE,
                report::DIFFERENTIAL_PERCENTAGE_FILE,
                &mut written,
            )
            .await?;
        }

        written.push(report::SUMMARY_FILE.to_string());
        summary.output_files = written
            .iter()
            .map(|file| format!("{}/{}", self.config.output_path(), file))
            .collect();
        summary.generated_at = chrono::Utc::now().to_rfc3339();

        let json = serde_json::to_string_pretty(&summary)?;
        self.storage
            .write_file(report::SUMMARY_FILE, json.as_bytes())
            .await?;

        Ok(summary)
    }
}
