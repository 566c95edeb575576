use crate::models::export::{PoolExport, Snapshot};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Wrap the mapped pools with the local time of the run.
pub fn snapshot(pools: Vec<PoolExport>) -> Snapshot {
    Snapshot { pools, timestamp: chrono::Local::now().to_rfc3339() }
}

/// Write the snapshot as indented JSON.
pub fn write(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), pools = snapshot.pools.len(), "snapshot written");
    Ok(())
}
