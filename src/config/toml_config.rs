use crate::adapters::kegg::DEFAULT_CATALOG_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CompletenessError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_identifier_files, validate_module_range, validate_path, validate_positive_number,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub organisms: OrganismsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub first_module: u32,
    pub last_module: u32,
    pub batch_size: usize,
    pub concurrent_requests: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            first_module: 1,
            last_module: 1000,
            batch_size: 10,
            concurrent_requests: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismsConfig {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub max_steps: usize,
    pub differential: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            max_steps: 30,
            differential: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl TomlConfig {
    /// Read and parse a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse after replacing `${VAR}` with the environment value. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CompletenessError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_url(&self) -> &str {
        &self.catalog.url
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn identifier_files(&self) -> &[String] {
        &self.organisms.files
    }

    fn first_module(&self) -> u32 {
        self.run.first_module
    }

    fn last_module(&self) -> u32 {
        self.run.last_module
    }

    fn batch_size(&self) -> usize {
        self.run.batch_size
    }

    fn concurrent_requests(&self) -> usize {
        self.run.concurrent_requests
    }

    fn max_steps(&self) -> usize {
        self.output.max_steps
    }

    fn differential_only(&self) -> bool {
        self.output.differential
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_identifier_files("organisms.files", &self.organisms.files)?;
        validate_url("catalog.url", &self.catalog.url)?;
        validate_path("output.path", &self.output.path)?;
        validate_module_range(self.run.first_module, self.run.last_module)?;
        validate_positive_number("run.batch_size", self.run.batch_size, 1)?;
        validate_positive_number("run.concurrent_requests", self.run.concurrent_requests, 1)?;
        validate_positive_number("output.max_steps", self.output.max_steps, 1)?;
        Ok(())
    }
}
