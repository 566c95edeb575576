//! Records returned by the middleware inventory calls
//! (`midclt call pool.query` and `midclt call disk.query`).
//!
//! Only the fields the mapper reads are declared; everything else in the
//! payload is ignored. Every field is defaulted so a partially populated
//! record still deserializes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One pool from `pool.query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolRecord {
    #[serde(default = "unknown_name")]
    pub name:     String,
    #[serde(default)]
    pub topology: Topology,
}

/// Vdev sections of a pool, in the order the middleware lists them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub data:    Vec<VdevRecord>,
    #[serde(default)]
    pub log:     Vec<VdevRecord>,
    #[serde(default)]
    pub cache:   Vec<VdevRecord>,
    #[serde(default)]
    pub spare:   Vec<VdevRecord>,
    #[serde(default)]
    pub special: Vec<VdevRecord>,
    #[serde(default)]
    pub dedup:   Vec<VdevRecord>,
}

impl Topology {
    /// (section name, vdevs) pairs in display order.
    pub fn sections(&self) -> [(&'static str, &[VdevRecord]); 6] {
        [
            ("data",    &self.data),
            ("log",     &self.log),
            ("cache",   &self.cache),
            ("spare",   &self.spare),
            ("special", &self.special),
            ("dedup",   &self.dedup),
        ]
    }
}

/// A node in the vdev tree. Leaves have `kind == "DISK"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VdevRecord {
    #[serde(default)]
    pub name:     Option<String>,
    #[serde(rename = "type", default)]
    pub kind:     Option<String>,
    #[serde(default)]
    pub path:     Option<String>,
    /// Partition device, e.g. `ada0p2`.
    #[serde(default)]
    pub device:   Option<String>,
    /// Whole physical disk, e.g. `ada0`.
    #[serde(default)]
    pub disk:     Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub guid:     Option<String>,
    #[serde(default)]
    pub stats:    Option<VdevStats>,
    #[serde(default)]
    pub children: Vec<VdevRecord>,
}

impl VdevRecord {
    pub fn is_disk(&self) -> bool {
        self.kind.as_deref() == Some("DISK")
    }
}

/// Filesystem-level error counters reported by ZFS for a vdev.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VdevStats {
    #[serde(default)]
    pub read_errors:     u64,
    #[serde(default)]
    pub write_errors:    u64,
    #[serde(default)]
    pub checksum_errors: u64,
}

/// One physical disk from `disk.query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiskRecord {
    #[serde(default)]
    pub name:     Option<String>,
    #[serde(default)]
    pub devname:  Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub zfs_guid: Option<String>,
    #[serde(default)]
    pub serial:   Option<String>,
    #[serde(default)]
    pub model:    Option<String>,
    #[serde(default)]
    pub size:     Option<u64>,
}

fn unknown_name() -> String {
    "UNKNOWN".to_string()
}

/// GUIDs arrive as strings on some releases and as bare integers on others.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n))                  => Some(n.to_string()),
        _                                       => None,
    })
}
