use clap::Parser;
use module_completeness::core::engine::run_with_config;
use module_completeness::utils::{logger, validation::Validate};
use module_completeness::CliConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.log_format);

    tracing::info!("Starting module-completeness");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let output_path = config.output_path.clone();
    match run_with_config(config).await {
        Ok(summary) => {
            tracing::info!(
                "Scored {} modules for {} organisms ({} skipped, {} malformed steps)",
                summary.modules_evaluated,
                summary.organisms,
                summary.modules_skipped.len(),
                summary.malformed_steps
            );
            println!("Completeness tables written to: {}", output_path);
            for file in &summary.output_files {
                println!("  {}", file);
            }
        }
        Err(e) => {
            tracing::error!(
                "Completeness run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
