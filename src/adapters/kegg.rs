use crate::core::definition::parse_module;
use crate::domain::model::ModuleDefinition;
use crate::domain::ports::ModuleCatalog;
use crate::utils::error::{CompletenessError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_CATALOG_URL: &str = "https://rest.kegg.jp/get";

/// `M00001`-style identifier for a module number.
pub fn module_id(number: u32) -> String {
    format!("M{:05}", number)
}

/// Identifiers `first..=last`, chunked into batches of `batch_size`.
pub fn module_batches(first: u32, last: u32, batch_size: usize) -> Vec<Vec<String>> {
    let ids: Vec<String> = (first..=last).map(module_id).collect();
    ids.chunks(batch_size.max(1)).map(<[String]>::to_vec).collect()
}

/// NAME and DEFINITION of a KEGG flat-file module entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: Option<String>,
    pub definition: String,
}

/// Extract NAME and DEFINITION (with its indented continuation lines).
pub fn parse_entry(text: &str) -> ModuleEntry {
    let mut name = None;
    let mut definition: Vec<&str> = Vec::new();
    let mut in_definition = false;

    for line in text.lines() {
        let continuation = line.starts_with(char::is_whitespace);
        if in_definition && continuation {
            definition.push(line.trim());
            continue;
        }
        in_definition = false;

        let mut words = line.split_whitespace();
        match words.next() {
            Some("NAME") => {
                let value = words.collect::<Vec<_>>().join(" ");
                if !value.is_empty() {
                    name = Some(value);
                }
            }
            Some("DEFINITION") => {
                let rest = line.trim_start().strip_prefix("DEFINITION").unwrap_or_default();
                definition.push(rest.trim());
                in_definition = true;
            }
            Some("ORTHOLOGY") | Some("///") => break,
            _ => {}
        }
    }

    ModuleEntry {
        name,
        definition: definition.join(" ").trim().to_string(),
    }
}

/// Turn a flat-file entry into a module. Entries without a name or without
/// any step, and definitions that do not balance, yield `None`.
pub fn module_from_entry(module_id: &str, text: &str) -> Option<ModuleDefinition> {
    let entry = parse_entry(text);
    let Some(name) = entry.name else {
        tracing::debug!("Module {} has no NAME, skipping", module_id);
        return None;
    };

    match parse_module(module_id, &name, &entry.definition) {
        Ok(module) if module.steps.is_empty() => {
            tracing::debug!("Module {} has no steps, skipping", module_id);
            None
        }
        Ok(module) => Some(module),
        Err(e) => {
            tracing::warn!("Skipping module {}: {}", module_id, e);
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeggRestCatalog {
    client: Client,
    base_url: String,
}

impl KeggRestCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ModuleCatalog for KeggRestCatalog {
    async fn fetch_module(&self, module_id: &str) -> Result<Option<ModuleDefinition>> {
        let url = format!("{}/{}", self.base_url, module_id);
        tracing::debug!("Fetching module from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            tracing::debug!("Catalog returned {} for {}", response.status(), module_id);
            return Ok(None);
        }

        let text = response.text().await?;
        Ok(module_from_entry(module_id, &text))
    }
}

/// Caller-owned lookup of fetched modules. Misses are remembered too, so
/// each identifier hits the catalog at most once.
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    entries: HashMap<String, Option<ModuleDefinition>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module_id: &str) -> Option<&Option<ModuleDefinition>> {
        self.entries.get(module_id)
    }

    pub fn insert(&mut self, module_id: String, module: Option<ModuleDefinition>) {
        self.entries.insert(module_id, module);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch `module_ids` with at most `concurrency` requests in flight,
/// filling `cache`. Returns the modules that exist, in `module_ids` order.
pub async fn fetch_batch<C>(
    catalog: Arc<C>,
    cache: &mut ModuleCache,
    module_ids: &[String],
    concurrency: usize,
) -> Result<Vec<ModuleDefinition>>
where
    C: ModuleCatalog + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for id in module_ids.iter().filter(|id| cache.get(id).is_none()) {
        let catalog = Arc::clone(&catalog);
        let semaphore = Arc::clone(&semaphore);
        let id = id.clone();
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| CompletenessError::ProcessingError {
                    message: format!("fetch semaphore closed: {}", e),
                })?;
            let module = catalog.fetch_module(&id).await?;
            Ok::<_, CompletenessError>((id, module))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (id, module) = joined.map_err(|e| CompletenessError::ProcessingError {
            message: format!("fetch task failed: {}", e),
        })??;
        cache.insert(id, module);
    }

    Ok(module_ids
        .iter()
        .filter_map(|id| cache.get(id).cloned().flatten())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StepKind;
    use httpmock::prelude::*;

    const GLYCOLYSIS_ENTRY: &str = "\
ENTRY       M00001            Pathway   Module
NAME        Glycolysis (Embden-Meyerhof pathway), glucose => pyruvate
DEFINITION  (K00844,K12407,K00845) (K01810,K06859,
            K13810,K15916) K01803 -- M00002
ORTHOLOGY   K00844,K12407,K00845  hexokinase/glucokinase [EC:2.7.1.1 2.7.1.2] [RN:R01786]
CLASS       Pathway modules; Carbohydrate metabolism
///
";

    #[test]
    fn test_module_id_formatting() {
        assert_eq!(module_id(1), "M00001");
        assert_eq!(module_id(923), "M00923");
    }

    #[test]
    fn test_module_batches() {
        let batches = module_batches(1, 25, 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0][0], "M00001");
        assert_eq!(batches[2], vec!["M00021", "M00022", "M00023", "M00024", "M00025"]);
    }

    #[test]
    fn test_parse_entry_joins_continuation_lines() {
        let entry = parse_entry(GLYCOLYSIS_ENTRY);
        assert_eq!(
            entry.name.as_deref(),
            Some("Glycolysis (Embden-Meyerhof pathway), glucose => pyruvate")
        );
        assert_eq!(
            entry.definition,
            "(K00844,K12407,K00845) (K01810,K06859, K13810,K15916) K01803 -- M00002"
        );
    }

    #[test]
    fn test_module_from_entry() {
        let module = module_from_entry("M00001", GLYCOLYSIS_ENTRY).unwrap();
        assert_eq!(module.steps.len(), 5);
        assert_eq!(module.steps[1].raw, "(K01810,K06859, K13810,K15916)");
        assert_eq!(module.steps[3].kind, StepKind::Skip);
        assert_eq!(module.steps[4].kind, StepKind::SubmoduleReference);
    }

    #[test]
    fn test_module_from_entry_rejects_incomplete_entries() {
        assert!(module_from_entry("M00010", "ENTRY M00010\nDEFINITION K00001\n").is_none());
        assert!(module_from_entry("M00011", "NAME Empty module\n").is_none());
        assert!(module_from_entry("M00012", "NAME Cut\nDEFINITION (K00001 K00002\n").is_none());
    }

    #[tokio::test]
    async fn test_fetch_module_success_and_missing() {
        let server = MockServer::start();
        let found = server.mock(|when, then| {
            when.method(GET).path("/get/M00001");
            then.status(200).body(GLYCOLYSIS_ENTRY);
        });
        let missing = server.mock(|when, then| {
            when.method(GET).path("/get/M00002");
            then.status(404);
        });

        let catalog = KeggRestCatalog::new(server.url("/get/"));
        let module = catalog.fetch_module("M00001").await.unwrap().unwrap();
        assert_eq!(module.id, "M00001");
        assert!(catalog.fetch_module("M00002").await.unwrap().is_none());

        found.assert();
        missing.assert();
    }

    #[tokio::test]
    async fn test_fetch_batch_uses_cache() {
        let server = MockServer::start();
        let found = server.mock(|when, then| {
            when.method(GET).path("/get/M00001");
            then.status(200).body(GLYCOLYSIS_ENTRY);
        });
        let missing = server.mock(|when, then| {
            when.method(GET).path("/get/M00002");
            then.status(404);
        });

        let catalog = Arc::new(KeggRestCatalog::new(server.url("/get")));
        let mut cache = ModuleCache::new();
        let ids = vec!["M00001".to_string(), "M00002".to_string()];

        let first = fetch_batch(Arc::clone(&catalog), &mut cache, &ids, 2).await.unwrap();
        let second = fetch_batch(catalog, &mut cache, &ids, 2).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 2);
        found.assert_hits(1);
        missing.assert_hits(1);
    }
}
