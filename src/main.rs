use clap::Parser;
use volume_tracker::utils::{logger, validation::Validate};
use volume_tracker::{
    ChromeFetcher, CliConfig, LocalStorage, NotionStore, TrackerConfig, TrackerEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting volume-tracker");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match TrackerConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration from {}: {}", cli.config, e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Some(output_path) = cli.output_path {
        config.report.output_path = output_path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let output_path = config.report.output_path.clone();
    let storage = LocalStorage::new(output_path.clone());
    let fetcher = ChromeFetcher::new(config.fetch.clone());

    let store = config.store.as_ref().and_then(NotionStore::from_config);
    if store.is_some() {
        tracing::info!("🔗 Record store sync enabled");
    } else {
        tracing::info!("Record store sync disabled (secrets not configured)");
    }

    let engine = TrackerEngine::new(fetcher, storage, store, config);

    match engine.run().await {
        Ok(reports) => {
            let total_missing: usize = reports.iter().map(|r| r.missing_count).sum();
            tracing::info!("✅ Checked {} series, {} volumes missing", reports.len(), total_missing);
            println!("✅ Checked {} series, {} volumes missing", reports.len(), total_missing);
            println!("📁 Reports saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Tracker run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
