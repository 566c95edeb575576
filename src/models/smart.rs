use serde::{Serialize, Serializer};
use std::fmt;

/// Telemetry dialect that produced a smartctl report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDialect {
    Sata,
    Sas,
    Nvme,
}

impl DriveDialect {
    pub fn label(&self) -> &'static str {
        match self {
            DriveDialect::Sata => "SATA",
            DriveDialect::Sas  => "SAS",
            DriveDialect::Nvme => "NVMe",
        }
    }
}

/// A power-on hour count that may not have been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourCount {
    Known(u64),
    #[default]
    Unknown,
}

impl HourCount {
    pub fn known(&self) -> Option<u64> {
        match self {
            HourCount::Known(h) => Some(*h),
            HourCount::Unknown  => None,
        }
    }
}

impl From<Option<u64>> for HourCount {
    fn from(v: Option<u64>) -> Self {
        v.map(HourCount::Known).unwrap_or(HourCount::Unknown)
    }
}

impl fmt::Display for HourCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HourCount::Known(h) => write!(f, "{}", h),
            HourCount::Unknown  => f.write_str(UNKNOWN),
        }
    }
}

// Exported as a bare number, or "N/A" when missing.
impl Serialize for HourCount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            HourCount::Known(h) => s.serialize_u64(*h),
            HourCount::Unknown  => s.serialize_str(UNKNOWN),
        }
    }
}

/// Placeholder used for every field that could not be extracted.
pub const UNKNOWN: &str = "N/A";

/// Read / write / verify triple, as laid out in the SCSI error counter log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OperationCounts {
    pub read:   u64,
    pub write:  u64,
    pub verify: u64,
}

impl OperationCounts {
    pub fn is_zero(&self) -> bool {
        self.read == 0 && self.write == 0 && self.verify == 0
    }

    /// (operation name, value) pairs in read → write → verify order.
    pub fn iter(&self) -> [(&'static str, u64); 3] {
        [("read", self.read), ("write", self.write), ("verify", self.verify)]
    }
}

/// ATA attribute counters we grade on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SataCounters {
    pub raw_read_error_rate:   u64,
    pub seek_error_rate:       u64,
    pub offline_uncorrectable: u64,
    pub udma_crc_error_count:  u64,
    /// Only populated when the report also carries an error counter log
    /// (SATA behind a SAT translation layer).
    #[serde(skip_serializing_if = "OperationCounts::is_zero")]
    pub error_counts:          OperationCounts,
}

/// SCSI error counter log plus grown defect list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SasCounters {
    pub uncorrected_errors: OperationCounts,
    pub grown_defects:      u64,
    pub corrected_errors:   OperationCounts,
}

/// NVMe SMART / Health Information Log counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NvmeCounters {
    pub media_errors:      u64,
    pub error_log_entries: u64,
}

/// Dialect-specific payload; the tag doubles as the `drive_type` field on export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "drive_type")]
pub enum DialectMetrics {
    #[serde(rename = "SATA")]
    Sata(SataCounters),
    #[serde(rename = "SAS")]
    Sas(SasCounters),
    #[serde(rename = "NVMe")]
    Nvme(NvmeCounters),
}

impl DialectMetrics {
    pub fn dialect(&self) -> DriveDialect {
        match self {
            DialectMetrics::Sata(_) => DriveDialect::Sata,
            DialectMetrics::Sas(_)  => DriveDialect::Sas,
            DialectMetrics::Nvme(_) => DriveDialect::Nvme,
        }
    }
}

/// Most recent self-test entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastTest {
    pub description:    String,
    pub status:         String,
    pub lifetime_hours: HourCount,
    pub time_since:     String,
}

impl LastTest {
    /// Record used when no self-test history could be found.
    pub fn unknown() -> Self {
        Self {
            description:    UNKNOWN.to_string(),
            status:         UNKNOWN.to_string(),
            lifetime_hours: HourCount::Unknown,
            time_since:     UNKNOWN.to_string(),
        }
    }

    /// True when the status text reports a finished, successful run.
    pub fn completed_ok(&self) -> bool {
        let s = self.status.to_lowercase();
        s.contains("completed") || s.contains("success")
    }
}

/// Parsed SMART snapshot for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartMetrics {
    #[serde(flatten)]
    pub dialect:        DialectMetrics,
    pub health_status:  String,
    pub power_on_hours: HourCount,
    pub last_test:      LastTest,
}

impl SmartMetrics {
    pub fn drive_dialect(&self) -> DriveDialect {
        self.dialect.dialect()
    }

    pub fn passed(&self) -> bool {
        self.health_status == "PASSED"
    }
}

/// Outcome of telemetry acquisition + parsing for one disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SmartReport {
    Available(SmartMetrics),
    /// smartctl could not be run or refused the device; `error` is the truncated message.
    Unavailable { error: String },
}

impl SmartReport {
    pub fn metrics(&self) -> Option<&SmartMetrics> {
        match self {
            SmartReport::Available(m)      => Some(m),
            SmartReport::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hour_count_serializes_as_number_or_placeholder() {
        assert_eq!(serde_json::to_value(HourCount::Known(42)).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(HourCount::Unknown).unwrap(), json!("N/A"));
    }

    #[test]
    fn sas_metrics_export_shape() {
        let m = SmartMetrics {
            dialect: DialectMetrics::Sas(SasCounters {
                uncorrected_errors: OperationCounts { read: 0, write: 1, verify: 0 },
                grown_defects:      3,
                corrected_errors:   OperationCounts { read: 15, write: 0, verify: 2 },
            }),
            health_status:  "PASSED".into(),
            power_on_hours: HourCount::Known(100),
            last_test:      LastTest::unknown(),
        };
        let v = serde_json::to_value(SmartReport::Available(m)).unwrap();
        assert_eq!(v["drive_type"], "SAS");
        assert_eq!(v["uncorrected_errors"]["write"], 1);
        assert_eq!(v["corrected_errors"]["read"], 15);
        assert_eq!(v["grown_defects"], 3);
        assert_eq!(v["last_test"]["lifetime_hours"], "N/A");
    }

    #[test]
    fn sata_export_omits_empty_error_counts() {
        let m = SmartMetrics {
            dialect:        DialectMetrics::Sata(SataCounters::default()),
            health_status:  "PASSED".into(),
            power_on_hours: HourCount::Unknown,
            last_test:      LastTest::unknown(),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["drive_type"], "SATA");
        assert!(v.get("error_counts").is_none());
        assert_eq!(v["offline_uncorrectable"], 0);
    }

    #[test]
    fn unavailable_exports_only_error() {
        let v = serde_json::to_value(SmartReport::Unavailable { error: "Error: busy".into() }).unwrap();
        assert_eq!(v, json!({ "error": "Error: busy" }));
    }

    #[test]
    fn completed_ok_is_case_insensitive() {
        let mut t = LastTest::unknown();
        t.status = "Completed without error".into();
        assert!(t.completed_ok());
        t.status = "SUCCESS".into();
        assert!(t.completed_ok());
        t.status = "Aborted by host".into();
        assert!(!t.completed_ok());
    }
}
