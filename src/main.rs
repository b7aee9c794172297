mod collectors;
mod config;
mod error;
mod extract;
mod metrics;
mod models;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "storcli_exporter",
    about = "Prometheus text-collector exposing MegaRAID health via StorCLI",
    version = "0.1"
)]
struct Cli {
    /// Path to the StorCLI binary
    #[arg(long)]
    storcli_path: Option<PathBuf>,

    /// Write metrics to this file (atomic rename) instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.config {
        return run_print_config();
    }

    let cfg = config::Config::load();
    let storcli_path = cli.storcli_path.unwrap_or(cfg.storcli.path);
    let output = cli.output.or(cfg.output.path);

    // Acquire, extract, then render; any failure exits non-zero with no
    // metrics text, and the scraper treats the missing scrape as stale.
    let raw = collectors::storcli::run_storcli(&storcli_path)?;
    let inventory = extract::extract(&raw)?;
    let text = metrics::render(&inventory);

    match output {
        Some(path) => write_atomic(&path, &text)?,
        None       => print!("{text}"),
    }
    Ok(())
}

fn run_print_config() -> Result<()> {
    let cfg = config::Config::load();
    let path = config::Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[storcli]");
    println!("  path = {}", cfg.storcli.path.display());
    println!();
    println!("[output]");
    match cfg.output.path {
        Some(p) => println!("  path = {}", p.display()),
        None    => println!("  path = (stdout)"),
    }
    Ok(())
}

/// Write metrics beside the target and rename into place, so a textfile
/// collector scraping mid-write never sees a torn file.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}
