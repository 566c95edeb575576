use crate::models::smart::SmartReport;
use crate::severity::Verdict;
use serde::Serialize;

/// Top-level export document.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pools:     Vec<PoolExport>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolExport {
    pub name:  String,
    pub vdevs: Vec<VdevExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VdevExport {
    pub name:     String,
    #[serde(rename = "type")]
    pub kind:     String,
    pub children: Vec<VdevChild>,
}

impl VdevExport {
    /// Every disk under this vdev, depth-first in topology order.
    pub fn disks(&self) -> Vec<&DiskExport> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                VdevChild::Disk(d) => out.push(d.as_ref()),
                VdevChild::Vdev(v) => out.extend(v.disks()),
            }
        }
        out
    }
}

/// A vdev child is either a leaf disk or a nested redundancy group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VdevChild {
    Disk(Box<DiskExport>),
    Vdev(VdevExport),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZfsErrors {
    pub read:     u64,
    pub write:    u64,
    pub checksum: u64,
}

/// Annotated leaf disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskExport {
    pub partition:  String,
    pub disk:       String,
    pub zfs_guid:   String,
    pub errors:     ZfsErrors,
    pub serial:     String,
    pub model:      String,
    pub size_bytes: u64,
    pub size_human: String,
    pub gptid:      String,
    pub smart_data: SmartReport,
    pub warnings:   Verdict,
}
