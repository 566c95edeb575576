//! Pool → vdev → disk traversal.
//!
//! The export tree mirrors the inventory topology one-to-one; every disk leaf
//! is resolved against `disk.query`, graded, and returned by value so sibling
//! leaves can be processed on separate threads.

use crate::collectors::TelemetrySource;
use crate::config::Thresholds;
use crate::models::export::{DiskExport, PoolExport, VdevChild, VdevExport, ZfsErrors};
use crate::models::inventory::{DiskRecord, PoolRecord, VdevRecord};
use crate::severity;
use crate::smart;
use crate::util::human::fmt_size;
use std::collections::HashMap;
use std::thread;
use tracing::debug;

const UNKNOWN: &str = "UNKNOWN";
const GPTID_PREFIX: &str = "gptid/";

/// Disk identity index over `disk.query` results.
pub struct DiskLookup<'a> {
    by_guid:    HashMap<&'a str, &'a DiskRecord>,
    by_devname: HashMap<&'a str, &'a DiskRecord>,
    by_gptid:   HashMap<&'a str, &'a DiskRecord>,
}

impl<'a> DiskLookup<'a> {
    pub fn new(disks: &'a [DiskRecord]) -> Self {
        let mut lookup = Self {
            by_guid:    HashMap::new(),
            by_devname: HashMap::new(),
            by_gptid:   HashMap::new(),
        };
        for disk in disks {
            if let Some(guid) = disk.zfs_guid.as_deref() {
                lookup.by_guid.insert(guid, disk);
            }
            if let Some(dev) = disk.devname.as_deref().filter(|d| !d.is_empty()) {
                lookup.by_devname.insert(dev, disk);
            }
            if let Some(id) = disk.name.as_deref().and_then(|n| n.strip_prefix(GPTID_PREFIX)) {
                lookup.by_gptid.insert(id, disk);
            }
        }
        lookup
    }

    /// ZFS GUID first, then the physical device name, then the GPT partition id.
    pub fn resolve(&self, leaf: &VdevRecord) -> Option<&'a DiskRecord> {
        let gptid = leaf.name.as_deref().map(|n| n.strip_prefix(GPTID_PREFIX).unwrap_or(n));
        leaf.guid.as_deref().and_then(|g| self.by_guid.get(g))
            .or_else(|| leaf.disk.as_deref().and_then(|d| self.by_devname.get(d)))
            .or_else(|| gptid.and_then(|id| self.by_gptid.get(id)))
            .copied()
    }
}

/// Builds annotated export trees from inventory records.
pub struct Mapper<'a> {
    lookup:     DiskLookup<'a>,
    telemetry:  &'a dyn TelemetrySource,
    thresholds: &'a Thresholds,
    parallel:   bool,
}

impl<'a> Mapper<'a> {
    pub fn new(disks: &'a [DiskRecord], telemetry: &'a dyn TelemetrySource, thresholds: &'a Thresholds) -> Self {
        Self { lookup: DiskLookup::new(disks), telemetry, thresholds, parallel: false }
    }

    /// Grade sibling disks concurrently. Output order is unaffected.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn map_pools(&self, pools: &[PoolRecord]) -> Vec<PoolExport> {
        pools.iter().map(|p| self.map_pool(p)).collect()
    }

    pub fn map_pool(&self, pool: &PoolRecord) -> PoolExport {
        let vdevs = pool.topology.sections().into_iter()
            .flat_map(|(section, vdevs)| vdevs.iter().map(move |v| (section, v)))
            .map(|(section, vdev)| self.map_vdev(vdev, section))
            .collect();
        PoolExport { name: pool.name.clone(), vdevs }
    }

    fn map_vdev(&self, vdev: &VdevRecord, kind: &str) -> VdevExport {
        let children: Vec<VdevChild> = if self.parallel && vdev.children.len() > 1 {
            thread::scope(|s| {
                let handles: Vec<_> = vdev.children.iter()
                    .map(|child| s.spawn(move || self.map_child(child)))
                    .collect();
                handles.into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            })
        } else {
            vdev.children.iter().map(|child| self.map_child(child)).collect()
        };

        VdevExport {
            name: or_unknown(vdev.name.clone()),
            kind: kind.to_string(),
            children,
        }
    }

    fn map_child(&self, child: &VdevRecord) -> VdevChild {
        if child.is_disk() {
            VdevChild::Disk(Box::new(self.map_disk(child)))
        } else {
            VdevChild::Vdev(self.map_vdev(child, child.kind.as_deref().unwrap_or(UNKNOWN)))
        }
    }

    fn map_disk(&self, leaf: &VdevRecord) -> DiskExport {
        let disk = or_unknown(leaf.disk.clone());
        let info = self.lookup.resolve(leaf);
        if info.is_none() {
            debug!(disk = %disk, guid = ?leaf.guid, "no disk.query record for leaf");
        }

        let stats = leaf.stats.unwrap_or_default();
        let errors = ZfsErrors {
            read:     stats.read_errors,
            write:    stats.write_errors,
            checksum: stats.checksum_errors,
        };

        let size_bytes = info.and_then(|d| d.size).unwrap_or(0);

        let smart_data = smart::parse_report(&self.telemetry.fetch(&disk));
        let warnings = severity::classify(errors, &smart_data, self.thresholds);
        debug!(disk = %disk, severity = warnings.severity().label(), "graded");

        DiskExport {
            partition:  or_unknown(leaf.device.clone()),
            zfs_guid:   leaf.guid.clone().unwrap_or_default(),
            serial:     or_unknown(info.and_then(|d| d.serial.clone())),
            model:      or_unknown(info.and_then(|d| d.model.clone())),
            size_human: if size_bytes > 0 { fmt_size(size_bytes) } else { UNKNOWN.to_string() },
            gptid:      gptid_path(leaf),
            disk,
            errors,
            size_bytes,
            smart_data,
            warnings,
        }
    }
}

fn or_unknown(v: Option<String>) -> String {
    v.unwrap_or_else(|| UNKNOWN.to_string())
}

fn gptid_path(leaf: &VdevRecord) -> String {
    if let Some(name) = leaf.name.as_deref().filter(|n| !n.is_empty()) {
        return format!("/dev/gptid/{}", name);
    }
    match leaf.path.as_deref() {
        Some(path) if path.contains("gptid") => path.to_string(),
        _                                    => "N/A".to_string(),
    }
}
