use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// smartctl binary (name on PATH or absolute path)
    pub smartctl_path: String,
    /// Middleware client used for pool.query / disk.query
    pub midclt_path: String,
    /// Prefix smartctl with sudo when not already running as root
    pub use_sudo: bool,
}

/// Severity thresholds. Comparisons are strict `>` except the caution band,
/// which is open below and closed above: (caution, slowdown].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// SAS corrected errors per operation above this → replace the drive.
    pub sas_corrected_critical: u64,
    /// SAS corrected errors per operation above this → vdev slowdown warning.
    pub sas_corrected_slowdown: u64,
    /// SAS corrected errors per operation above this (up to slowdown) → caution.
    pub sas_corrected_caution:  u64,
    /// Upper bound of the (0, max] band for SATA read/write/verify error caution.
    pub sata_error_caution_max: u64,
    /// A successful self-test older than this many days is overdue.
    pub test_overdue_days:      f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// ANSI colors in the console tree
    pub color: bool,
    /// Always write the JSON export here (overridden by --json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<PathBuf>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            smartctl_path: "smartctl".into(),
            midclt_path:   "midclt".into(),
            use_sudo:      true,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sas_corrected_critical: 1_000_000,
            sas_corrected_slowdown: 100_000,
            sas_corrected_caution:  10_000,
            sata_error_caution_max: 10,
            test_overdue_days:      60.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true, json_path: None }
    }
}

impl Thresholds {
    /// The SAS tiers must nest: caution < slowdown < critical.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sas_corrected_caution < self.sas_corrected_slowdown
                && self.sas_corrected_slowdown < self.sas_corrected_critical,
            "sas_corrected_caution ({}) < sas_corrected_slowdown ({}) < sas_corrected_critical ({}) does not hold",
            self.sas_corrected_caution, self.sas_corrected_slowdown, self.sas_corrected_critical,
        );
        Ok(())
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        let path = match Config::config_path() {
            Some(p) => p,
            None    => return Config::default(),
        };
        if !path.exists() {
            // Write defaults on first run (best-effort)
            if let Err(e) = write_defaults(&path) {
                debug!(path = %path.display(), error = %e, "could not write default config");
            }
            return Config::default();
        }
        match Config::load_from(&path) {
            Ok(c)  => c,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "ignoring unreadable config");
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        cfg.thresholds.validate()
            .with_context(|| format!("invalid [thresholds] in {}", path.display()))?;
        Ok(cfg)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diskmap").join("diskmap.toml"))
    }
}

fn write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# diskmap configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
