use std::collections::HashMap;
use std::path::PathBuf;
use tiercalc::billing::PricingType;
use tiercalc::cli::{Cli, OutputFormat};
use tiercalc::config::{
    parse_assignment, parse_tier_assignment, ConfigLoader, OverrideManager, PricingConfig,
};
use tiercalc::core::{
    render_categories, render_summary, render_table, to_csv, to_json, write_export, Breakdown,
};
use tiercalc::utils::{configure_thread_pool, init_tracing};
use tracing::{debug, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    init_tracing();

    // Handle configuration commands
    if cli.init {
        PricingConfig::init()?;
        return Ok(());
    }

    let config = load_config(cli.config.clone())?;

    if cli.print {
        config.print()?;
        return Ok(());
    }

    if cli.check {
        let warnings = config.check()?;
        for warning in &warnings {
            println!("⚠ {}", warning);
        }
        println!("✓ Configuration valid");
        return Ok(());
    }

    // Handle admin override management
    if cli.set_price.is_some()
        || cli.set_tiers.is_some()
        || cli.clear_override.is_some()
        || cli.show_overrides
    {
        handle_override_management(&cli, &config)?;
        return Ok(());
    }

    let overrides = if cli.no_overrides {
        None
    } else {
        let mut manager = override_manager(&cli);
        if let Err(e) = manager.load() {
            eprintln!("Error: Failed to load price overrides: {}", e);
            eprintln!(
                "  Fix or remove {:?}, or run with --no-overrides",
                manager.get_config_path()
            );
            std::process::exit(1);
        }
        Some(manager)
    };

    let snapshot = config.snapshot(overrides.as_ref());
    let usage = resolve_usage(&cli, &config)?;
    configure_thread_pool();

    if cli.simulate {
        #[cfg(feature = "tui")]
        {
            let final_usage = tiercalc::ui::run_simulator(snapshot.clone(), &usage, config.max_usage)?;
            let breakdown = Breakdown::compute(&snapshot, &final_usage);
            println!("{}", render_summary(&breakdown));
        }
        #[cfg(not(feature = "tui"))]
        {
            eprintln!("TUI feature is not enabled. Please install with --features tui");
            std::process::exit(1);
        }
        return Ok(());
    }

    let breakdown = Breakdown::compute(&snapshot, &usage);
    debug!(
        modules = breakdown.rows.len(),
        failed = breakdown.failed_modules,
        "Computed cost breakdown"
    );

    let output = match cli.format {
        OutputFormat::Table => {
            let mut out = format!(
                "{}\n\n{}",
                render_summary(&breakdown),
                render_table(&breakdown)
            );
            if cli.categories {
                out.push('\n');
                out.push_str(&render_categories(&breakdown));
            }
            out
        }
        OutputFormat::Csv => to_csv(&breakdown),
        OutputFormat::Json => to_json(&breakdown)?,
    };

    match &cli.export {
        Some(path) => {
            write_export(path, &output)?;
            println!("{}", render_summary(&breakdown));
            println!("Breakdown written to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<PricingConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => PricingConfig::load()?,
    };
    Ok(config)
}

fn override_manager(cli: &Cli) -> OverrideManager {
    match &cli.overrides_file {
        Some(path) => OverrideManager::with_path(path.clone()),
        None => OverrideManager::new(),
    }
}

/// Configured usage with `--usage` assignments layered on top
fn resolve_usage(
    cli: &Cli,
    config: &PricingConfig,
) -> Result<HashMap<String, f64>, Box<dyn std::error::Error>> {
    let mut usage = config.usage_map();

    for assignment in &cli.usage {
        let (module, quantity) = parse_assignment(assignment)?;
        if config.module(&module).is_none() {
            warn!("Usage given for unknown module '{}'", module);
            continue;
        }
        if quantity > config.max_usage as f64 {
            warn!(
                "Usage {} for '{}' exceeds the configured maximum of {}",
                quantity, module, config.max_usage
            );
        }
        usage.insert(module, quantity);
    }

    Ok(usage)
}

/// Handle admin override CLI commands
fn handle_override_management(
    cli: &Cli,
    config: &PricingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut manager = override_manager(cli);

    // Existing overrides must load, or a write would replace them
    if let Err(e) = manager.load() {
        eprintln!("Error: Failed to load existing overrides: {}", e);
        eprintln!("  Fix or remove {:?} first", manager.get_config_path());
        std::process::exit(1);
    }

    if let Some(assignment) = &cli.set_price {
        let (module, price) = parse_assignment(assignment)?;
        if let Err(e) = config.module_with_type(&module, &PricingType::Flat) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        let notes = Some(format!(
            "Set via CLI at {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        manager.set_flat_price(&module, price, "cli".to_string(), notes)?;
        println!("✓ Flat price for '{}' set to {:.2}", module, price);
        println!("  Overrides saved to: {:?}", manager.get_config_path());
    }

    if let Some(assignment) = &cli.set_tiers {
        let (module, rows) = parse_tier_assignment(assignment)?;
        if let Err(e) = config.module_with_type(&module, &PricingType::Tiered) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        let count = rows.len();
        manager.set_tiers(&module, rows, "cli".to_string(), None)?;
        println!("✓ {} tier rows set for '{}'", count, module);
        println!("  Overrides saved to: {:?}", manager.get_config_path());
    }

    if let Some(module) = &cli.clear_override {
        if manager.clear(module)? {
            println!("✓ Price override cleared for '{}'", module);
        } else {
            println!("ℹ No price override was set for '{}'", module);
        }
    }

    if cli.show_overrides {
        println!("Price Override Status:");
        println!("  Overrides file: {:?}", manager.get_config_path());
        println!("  Total overrides: {}", manager.override_count());

        for name in manager.module_names() {
            let Some(entry) = manager.get(&name) else {
                continue;
            };
            println!("\n  {}:", name);
            if let Some(price) = entry.flat_unit_price {
                let original = config
                    .module(&name)
                    .map(|m| format!("{:.2}", m.effective_flat_price()))
                    .unwrap_or_else(|| "unknown module".to_string());
                println!("    Flat price: {:.2} (configured: {})", price, original);
            }
            if let Some(rows) = &entry.tiers {
                println!("    Tier rows: {}", rows.len());
                for row in rows {
                    println!("      {} -> {}", row.threshold, row.price);
                }
            }
            println!("    Source: {}", entry.source);
            println!(
                "    Created: {}",
                entry.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            if let Some(ref notes) = entry.notes {
                println!("    Notes: {}", notes);
            }
        }
    }

    Ok(())
}
