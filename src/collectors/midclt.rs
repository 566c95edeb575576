use crate::models::inventory::{DiskRecord, PoolRecord};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Pools and disks as reported by the middleware.
#[derive(Debug, Default)]
pub struct Inventory {
    pub pools: Vec<PoolRecord>,
    pub disks: Vec<DiskRecord>,
}

/// Run `midclt call <method>` and decode its JSON array.
pub fn call<T: DeserializeOwned>(midclt: &str, method: &str) -> Result<Vec<T>> {
    debug!(midclt, method, "querying middleware");
    let out = Command::new(midclt)
        .args(["call", method])
        .output()
        .with_context(|| format!("{} not found", midclt))?;

    if !out.status.success() {
        bail!(
            "{} call {} failed: {}",
            midclt, method, String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    serde_json::from_slice(&out.stdout).with_context(|| format!("decoding {} response", method))
}

/// Read a saved `<method>` response from disk.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("decoding {}", path.display()))
}

/// Load pools and disks, each from its file when given, else from the middleware.
pub fn load(midclt: &str, pools_file: Option<&Path>, disks_file: Option<&Path>) -> Result<Inventory> {
    let pools = match pools_file {
        Some(p) => read_file(p)?,
        None    => call(midclt, "pool.query")?,
    };
    let disks = match disks_file {
        Some(p) => read_file(p)?,
        None    => call(midclt, "disk.query")?,
    };
    info!(pools = pools.len(), disks = disks.len(), "inventory loaded");
    Ok(Inventory { pools, disks })
}
