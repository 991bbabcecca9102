use crate::adapters::kegg::DEFAULT_CATALOG_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_identifier_files, validate_module_range, validate_path, validate_positive_number,
    validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "module-completeness")]
#[command(about = "Assess pathway module completeness from per-organism identifier files")]
pub struct CliConfig {
    /// Identifier files, one per organism (one identifier per line)
    #[arg(required = true, value_name = "FILE")]
    pub identifier_files: Vec<String>,

    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "1")]
    pub first_module: u32,

    #[arg(long, default_value = "1000")]
    pub last_module: u32,

    #[arg(long, default_value = "10")]
    pub batch_size: usize,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    /// Rows per module column in module_definitions.csv
    #[arg(long, default_value = "30")]
    pub max_steps: usize,

    /// Also write tables restricted to modules present in some organisms only
    #[arg(long)]
    pub differential: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn identifier_files(&self) -> &[String] {
        &self.identifier_files
    }

    fn first_module(&self) -> u32 {
        self.first_module
    }

    fn last_module(&self) -> u32 {
        self.last_module
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn differential_only(&self) -> bool {
        self.differential
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_identifier_files("identifier_files", &self.identifier_files)?;
        validate_url("catalog_url", &self.catalog_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_module_range(self.first_module, self.last_module)?;
        validate_positive_number("batch_size", self.batch_size, 1)?;
        validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validate_positive_number("max_steps", self.max_steps, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config =
            CliConfig::try_parse_from(["module-completeness", "ecoli.txt", "bsub.txt"]).unwrap();
        assert_eq!(config.identifier_files, vec!["ecoli.txt", "bsub.txt"]);
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.first_module, 1);
        assert_eq!(config.last_module, 1000);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_steps, 30);
        assert!(!config.differential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_requires_identifier_files() {
        assert!(CliConfig::try_parse_from(["module-completeness"]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_range() {
        let config = CliConfig::try_parse_from([
            "module-completeness",
            "--first-module",
            "50",
            "--last-module",
            "10",
            "ecoli.txt",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }
}
