pub mod cli;
pub mod toml_config;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "volume-tracker")]
#[command(about = "Checks tracked series pages for volumes missing from your shelf")]
pub struct CliConfig {
    #[arg(long, default_value = "series.toml")]
    pub config: String,

    #[arg(long, help = "Override the report output directory")]
    pub output_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
