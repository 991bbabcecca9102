use crate::domain::model::{ModuleDefinition, Organism, RunSummary, ScoreRecord};
use crate::domain::table::CompletenessTable;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of module definitions, e.g. the KEGG REST API.
#[async_trait]
pub trait ModuleCatalog: Send + Sync {
    /// `Ok(None)` when the catalog has no usable entry for `module_id`.
    async fn fetch_module(&self, module_id: &str) -> Result<Option<ModuleDefinition>>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn identifier_files(&self) -> &[String];
    fn first_module(&self) -> u32;
    fn last_module(&self) -> u32;
    fn batch_size(&self) -> usize;
    fn concurrent_requests(&self) -> usize;
    fn max_steps(&self) -> usize;
    fn differential_only(&self) -> bool;
}

/// Everything the load stage persists at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub table: CompletenessTable,
    pub modules: Vec<ModuleDefinition>,
    pub summary: RunSummary,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn load_organisms(&self) -> Result<Vec<Organism>>;
    async fn extract(&self, module_ids: &[String]) -> Result<Vec<ModuleDefinition>>;
    async fn transform(
        &self,
        modules: Arc<Vec<ModuleDefinition>>,
        organisms: Arc<Vec<Organism>>,
    ) -> Result<Vec<ScoreRecord>>;
    async fn load(&self, output: RunOutput) -> Result<RunSummary>;
}
