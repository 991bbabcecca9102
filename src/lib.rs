pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use adapters::kegg::{KeggRestCatalog, ModuleCache};
pub use core::{engine::CompletenessEngine, pipeline::CompletenessPipeline};
pub use domain::model::{CompletenessScore, IdentifierSet, ModuleDefinition, Organism, RunSummary};
pub use utils::error::{CompletenessError, Result};
