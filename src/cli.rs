use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tiercalc")]
#[command(version, about = "Flat and tiered module pricing calculator")]
pub struct Cli {
    /// Pricing configuration file (default: ~/.config/tiercalc/pricing.toml)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Usage quantity for a module, may be repeated
    #[arg(short = 'u', long = "usage", value_name = "MODULE=QTY")]
    pub usage: Vec<String>,

    /// Output format of the cost breakdown
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the breakdown to a file instead of stdout
    #[arg(short = 'o', long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Show cost totals per category
    #[arg(long = "categories")]
    pub categories: bool,

    /// Open the interactive simulator
    #[arg(short = 's', long = "simulate")]
    pub simulate: bool,

    /// Print current configuration
    #[arg(long = "print")]
    pub print: bool,

    /// Initialize config file
    #[arg(long = "init")]
    pub init: bool,

    /// Check configuration
    #[arg(long = "check")]
    pub check: bool,

    /// Override a module's flat unit price (admin)
    #[arg(long, value_name = "MODULE=PRICE")]
    pub set_price: Option<String>,

    /// Replace a module's tier rows (admin), e.g. "Parcel Manager=100:10,inf:5"
    #[arg(long, value_name = "MODULE=THRESHOLD:PRICE,...")]
    pub set_tiers: Option<String>,

    /// Remove a module's price override (admin)
    #[arg(long, value_name = "MODULE")]
    pub clear_override: Option<String>,

    /// Show stored price overrides
    #[arg(long)]
    pub show_overrides: bool,

    /// Ignore stored price overrides for this run
    #[arg(long)]
    pub no_overrides: bool,

    /// Overrides file (default: ~/.config/tiercalc/overrides.json)
    #[arg(long, value_name = "PATH")]
    pub overrides_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
