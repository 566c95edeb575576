//! Field extraction from `smartctl -a` text.
//!
//! Each field has its own pattern (or ordered list of patterns); a miss on
//! one field never affects another. Counters default to 0, hour counts to
//! [`HourCount::Unknown`].

use crate::models::smart::{
    DialectMetrics, DriveDialect, HourCount, NvmeCounters, OperationCounts, SasCounters, SataCounters,
};
use once_cell::sync::Lazy;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static smartctl pattern")
}

static ATA_HEALTH: Lazy<Regex> =
    Lazy::new(|| re(r"SMART overall-health self-assessment test result:\s*(\w+)"));
static SCSI_HEALTH: Lazy<Regex> = Lazy::new(|| re(r"SMART Health Status:\s*(\w+)"));

static POH_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| re(r"9\s+Power_On_Hours\s+.*?-\s+(\d+)"));
static POH_LABELED: Lazy<Regex> = Lazy::new(|| re(r"(?i)Power[_ ]?On[_ ]?Hours[:\s]*([\d,]+)"));
static POH_ACCUMULATED: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)Accumulated power on time.*?(\d+):\d+"));

static NVME_MEDIA: Lazy<Regex> = Lazy::new(|| re(r"Media and Data Integrity Errors:\s*([\d,]+)"));
static NVME_ERROR_LOG: Lazy<Regex> = Lazy::new(|| re(r"Error Information Log Entries:\s*([\d,]+)"));

static GROWN_DEFECTS: Lazy<[Regex; 2]> = Lazy::new(|| [
    re(r"Elements in grown defect list:\s*(\d+)"),
    re(r"grown defect list:\s*(\d+)"),
]);

const OPERATIONS: [&str; 3] = ["read", "write", "verify"];

/// Last column of an error counter log row: total uncorrected errors.
static UNCORRECTED: Lazy<Vec<Regex>> = Lazy::new(|| {
    OPERATIONS.iter()
        .map(|op| re(&format!(r"(?m){}:\s+.*?\s+(\d+)[ \t\r]*$", op)))
        .collect()
});

/// Fourth numeric column of an error counter log row: total errors corrected.
static CORRECTED: Lazy<Vec<Regex>> = Lazy::new(|| {
    OPERATIONS.iter()
        .map(|op| re(&format!(r"{}:\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)", op)))
        .collect()
});

/// ATA attribute rows: ID, name, flag, value, worst, thresh, type, updated, when_failed, raw.
fn ata_attribute(id: u32, name: &str) -> Regex {
    re(&format!(r"{}\s+{}.*?\s+\d+\s+\d+\s+\d+\s+\S+\s+\S+\s+-\s+(\d+)", id, name))
}

static RAW_READ_ERROR_RATE: Lazy<Regex> = Lazy::new(|| ata_attribute(1, "Raw_Read_Error_Rate"));
static SEEK_ERROR_RATE: Lazy<Regex> = Lazy::new(|| ata_attribute(7, "Seek_Error_Rate"));
static OFFLINE_UNCORRECTABLE: Lazy<Regex> = Lazy::new(|| ata_attribute(198, "Offline_Uncorrectable"));
static UDMA_CRC_ERROR_COUNT: Lazy<Regex> = Lazy::new(|| ata_attribute(199, "UDMA_CRC_Error_Count"));

/// Capture `group` of the first match as an integer, thousands separators allowed.
pub(crate) fn capture_u64(re: &Regex, raw: &str, group: usize) -> Option<u64> {
    let caps = re.captures(raw)?;
    caps.get(group)?.as_str().replace(',', "").parse().ok()
}

fn count(re: &Regex, raw: &str) -> u64 {
    capture_u64(re, raw, 1).unwrap_or(0)
}

/// Overall health verdict as printed by the drive; SCSI "OK" reads as "PASSED".
pub fn health_status(raw: &str, dialect: DriveDialect) -> String {
    let re = match dialect {
        DriveDialect::Sas                     => &*SCSI_HEALTH,
        DriveDialect::Sata | DriveDialect::Nvme => &*ATA_HEALTH,
    };
    match re.captures(raw).and_then(|c| c.get(1)) {
        Some(m) if dialect == DriveDialect::Sas && m.as_str() == "OK" => "PASSED".to_string(),
        Some(m) => m.as_str().to_string(),
        None    => "UNKNOWN".to_string(),
    }
}

type HourExtractor = fn(&str) -> Option<u64>;

/// `  9 Power_On_Hours ... -  39612`
fn poh_attribute(raw: &str) -> Option<u64> {
    capture_u64(&POH_ATTRIBUTE, raw, 1)
}

/// `Power On Hours: 12,345`
fn poh_labeled(raw: &str) -> Option<u64> {
    capture_u64(&POH_LABELED, raw, 1)
}

/// `Accumulated power on time, hours:minutes 41234:17`
fn poh_accumulated(raw: &str) -> Option<u64> {
    capture_u64(&POH_ACCUMULATED, raw, 1)
}

/// Power-on hour strategies, first hit wins.
const POWER_ON_STRATEGIES: [HourExtractor; 3] = [poh_attribute, poh_labeled, poh_accumulated];

pub fn power_on_hours(raw: &str) -> HourCount {
    POWER_ON_STRATEGIES.iter()
        .find_map(|strategy| strategy(raw))
        .into()
}

fn per_operation(patterns: &[Regex], raw: &str, group: usize) -> OperationCounts {
    let get = |i: usize| capture_u64(&patterns[i], raw, group).unwrap_or(0);
    OperationCounts { read: get(0), write: get(1), verify: get(2) }
}

pub fn sata_counters(raw: &str) -> SataCounters {
    SataCounters {
        raw_read_error_rate:   count(&RAW_READ_ERROR_RATE, raw),
        seek_error_rate:       count(&SEEK_ERROR_RATE, raw),
        offline_uncorrectable: count(&OFFLINE_UNCORRECTABLE, raw),
        udma_crc_error_count:  count(&UDMA_CRC_ERROR_COUNT, raw),
        error_counts:          per_operation(&UNCORRECTED, raw, 1),
    }
}

pub fn sas_counters(raw: &str) -> SasCounters {
    let grown_defects = GROWN_DEFECTS.iter()
        .find_map(|re| capture_u64(re, raw, 1))
        .unwrap_or(0);
    SasCounters {
        uncorrected_errors: per_operation(&UNCORRECTED, raw, 1),
        grown_defects,
        corrected_errors:   per_operation(&CORRECTED, raw, 4),
    }
}

pub fn nvme_counters(raw: &str) -> NvmeCounters {
    NvmeCounters {
        media_errors:      count(&NVME_MEDIA, raw),
        error_log_entries: count(&NVME_ERROR_LOG, raw),
    }
}

pub fn dialect_metrics(raw: &str, dialect: DriveDialect) -> DialectMetrics {
    match dialect {
        DriveDialect::Sata => DialectMetrics::Sata(sata_counters(raw)),
        DriveDialect::Sas  => DialectMetrics::Sas(sas_counters(raw)),
        DriveDialect::Nvme => DialectMetrics::Nvme(nvme_counters(raw)),
    }
}
