use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storcli: StorcliConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorcliConfig {
    /// Path to the StorCLI binary.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write metrics to this file (atomic rename) instead of stdout.
    /// Point it into node_exporter's textfile collector directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorcliConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("/usr/sbin/storcli") }
    }
}

// ── Load ─────────────────────────────────────────────────────────────

impl Config {
    /// Best-effort load: defaults when the file is missing or unreadable,
    /// written out on first run so operators have something to edit.
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("storcli_exporter").join("storcli_exporter.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# storcli_exporter configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
