use clap::Parser;
use module_completeness::adapters::kegg::module_batches;
use module_completeness::adapters::organisms::load_organisms;
use module_completeness::config::toml_config::TomlConfig;
use module_completeness::core::engine::run_with_config;
use module_completeness::domain::ports::ConfigProvider;
use module_completeness::utils::{logger, validation::Validate};

#[derive(Parser)]
#[command(name = "toml-completeness")]
#[command(about = "KEGG module completeness driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "completeness.toml")]
    config: String,

    /// Enable verbose output (overrides [logging] verbose)
    #[arg(short, long)]
    verbose: bool,

    /// Override the [output] differential setting
    #[arg(long)]
    differential: Option<bool>,

    /// Show what would be processed without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML");
            std::process::exit(1);
        }
    };

    logger::init_logger(
        args.verbose || config.logging.verbose,
        config.logging.format,
    );
    tracing::info!("Loaded configuration from: {}", args.config);

    if let Some(differential) = args.differential {
        config.output.differential = differential;
        tracing::info!("Differential output overridden to: {}", differential);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        perform_dry_run(&config).await?;
        return Ok(());
    }

    match run_with_config(config).await {
        Ok(summary) => {
            tracing::info!(
                "Scored {} modules for {} organisms at {}",
                summary.modules_evaluated,
                summary.organisms,
                summary.generated_at
            );
            for file in &summary.output_files {
                println!("Wrote {}", file);
            }
        }
        Err(e) => {
            tracing::error!(
                "Completeness run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("Configuration Summary:");
    println!("  Catalog: {}", config.catalog_url());
    println!(
        "  Modules: {} to {}",
        config.first_module(),
        config.last_module()
    );
    println!(
        "  Batch size: {} ({} concurrent requests)",
        config.batch_size(),
        config.concurrent_requests()
    );
    println!("  Organism files: {}", config.identifier_files().len());
    println!("  Output: {}", config.output_path());
    println!("  Differential tables: {}", config.differential_only());
    if args.dry_run {
        println!("  DRY RUN MODE ENABLED");
    }
    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let batches = module_batches(
        config.first_module(),
        config.last_module(),
        config.batch_size(),
    );
    let module_count: usize = batches.iter().map(Vec::len).sum();

    println!("Dry Run Analysis:");
    println!(
        "  {} module ids in {} batches would be requested",
        module_count,
        batches.len()
    );

    let organisms = load_organisms(config.identifier_files()).await?;
    for organism in &organisms {
        println!(
            "  {}: {} identifiers",
            organism.name,
            organism.identifiers.len()
        );
    }

    println!("  Step columns in module_definitions.csv: {}", config.max_steps());
    Ok(())
}
