use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::cluster::OutletMapping;
use crate::core::Config;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("path", _)) => show_path(),
        Some(("show", sub_matches)) => show_config(sub_matches),
        Some(("init", sub_matches)) => init_config(sub_matches),
        _ => {
            println!("Use 'clustertop config --help' for more information.");
            Ok(())
        }
    }
}

fn show_path() -> Result<()> {
    let path = Config::get_config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn show_config(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;

    println!("{}", "Cluster endpoints".cyan().bold());
    println!("  {:<18} {}", "ResourceManager:", config.resource_manager_url);
    println!("  {:<18} {}", "PDU exporter:", config.power_url);
    println!();
    println!("{}", "Refresh".cyan().bold());
    println!("  {:<18} {} ms", "Interval:", config.refresh_interval_ms);
    println!("  {:<18} {} ms", "Debounce:", config.debounce_ms);
    println!("  {:<18} {} ms", "Request timeout:", config.request_timeout_ms);
    println!();
    println!("{}", "Outlets".cyan().bold());

    let prefixes = &config.outlet_prefixes;
    println!(
        "  {:<18} {}, {}, {}",
        "Key prefixes:", prefixes.current, prefixes.energy, prefixes.power
    );

    if config.outlets.is_empty() {
        println!("  {}", "No outlet mapping configured".dimmed());
    } else {
        for rule in &config.outlets {
            println!("  {:<18} -> outlet {}", rule.host, rule.outlet.green());
        }
    }

    for note in overlap_notes(&config) {
        println!("  {}", note.yellow());
    }

    Ok(())
}

/// Overlapping outlet patterns, built without `Config::outlet_mapping` so
/// they are not logged a second time.
fn overlap_notes(config: &Config) -> Vec<String> {
    OutletMapping::new(config.outlets.clone(), config.outlet_prefixes.clone())
        .overlapping_keys()
        .into_iter()
        .map(|(a, b)| format!("'{}' and '{}' overlap, the first listed wins", a, b))
        .collect()
}

fn init_config(matches: &ArgMatches) -> Result<()> {
    let force = matches.get_flag("force");
    let path = match matches.get_one::<PathBuf>("config") {
        Some(path) => path.clone(),
        None => Config::get_config_path()?,
    };

    if path.exists() && !force {
        println!(
            "{} {}",
            "Configuration already exists:".yellow(),
            path.display()
        );
        println!("{}", "Use --force to overwrite it with defaults".dimmed());
        return Ok(());
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write default config to {:?}", path))?;

    println!("{} {}", "Configuration written to".green(), path.display());
    Ok(())
}
