use crate::config::Thresholds;
use crate::models::export::ZfsErrors;
use crate::models::smart::{DialectMetrics, NvmeCounters, SasCounters, SataCounters, SmartMetrics, SmartReport};
use crate::smart::elapsed;
use crate::util::human::titled;
use serde::Serialize;

/// Overall grade of a disk, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Caution,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok       => "OK",
            Severity::Caution  => "CAUTION",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Reasons per tier, in the order the checks produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verdict {
    pub critical: Vec<String>,
    pub caution:  Vec<String>,
    pub slowdown: Vec<String>,
    #[serde(rename = "test_warning")]
    pub test_overdue: bool,
}

impl Verdict {
    pub fn severity(&self) -> Severity {
        if !self.critical.is_empty() { Severity::Critical }
        else if !self.caution.is_empty() { Severity::Caution }
        else { Severity::Ok }
    }
}

/// Grade one disk from its ZFS error counters and SMART snapshot.
///
/// All critical checks run before any caution check that is suppressed by an
/// existing critical reason. Unavailable telemetry contributes no reasons;
/// the ZFS counters are still graded.
pub fn classify(zfs: ZfsErrors, report: &SmartReport, thr: &Thresholds) -> Verdict {
    let mut v = Verdict::default();

    // ── Critical ──────────────────────────────────────────────────────
    for (label, n) in [("Read", zfs.read), ("Write", zfs.write), ("Checksum", zfs.checksum)] {
        if n > 0 {
            v.critical.push(format!("ZFS {} errors: {}", label, n));
        }
    }

    let metrics = match report.metrics() {
        Some(m) => m,
        None    => return v,
    };

    match &metrics.dialect {
        DialectMetrics::Nvme(c) => nvme_critical(c, &mut v),
        DialectMetrics::Sas(c)  => sas_critical(c, thr, &mut v),
        DialectMetrics::Sata(c) => sata_critical(c, &mut v),
    }

    // ── Slowdown ──────────────────────────────────────────────────────
    if let DialectMetrics::Sas(c) = &metrics.dialect {
        for (op, n) in c.corrected_errors.iter() {
            if n > thr.sas_corrected_slowdown {
                v.slowdown.push(format!("Corrected {} errors: {}", op, n));
            }
        }
    }

    // ── Caution ───────────────────────────────────────────────────────
    match &metrics.dialect {
        DialectMetrics::Nvme(c) => nvme_caution(c, &mut v),
        DialectMetrics::Sas(c)  => sas_caution(c, thr, &mut v),
        DialectMetrics::Sata(c) => sata_caution(c, thr, &mut v),
    }

    if v.critical.is_empty() {
        test_overdue(metrics, thr, &mut v);
    }
    v
}

fn nvme_critical(c: &NvmeCounters, v: &mut Verdict) {
    if c.media_errors > 0 {
        v.critical.push(format!("Media Integrity Errors: {}", c.media_errors));
    }
}

fn sas_critical(c: &SasCounters, thr: &Thresholds, v: &mut Verdict) {
    for (op, n) in c.uncorrected_errors.iter() {
        if n > 0 {
            v.critical.push(format!("SAS {} Errors: {}", titled(op), n));
        }
    }
    for (op, n) in c.corrected_errors.iter() {
        if n > thr.sas_corrected_critical {
            v.critical.push(format!("Critical corrected {} errors: {}", op, n));
        }
    }
}

fn sata_critical(c: &SataCounters, v: &mut Verdict) {
    if c.offline_uncorrectable > 0 {
        v.critical.push(format!("Offline Uncorrectable: {}", c.offline_uncorrectable));
    }
}

fn nvme_caution(c: &NvmeCounters, v: &mut Verdict) {
    if c.error_log_entries > 0 && v.critical.is_empty() {
        v.caution.push(format!("Error Log Entries: {}", c.error_log_entries));
    }
}

// Not suppressed by critical reasons.
fn sas_caution(c: &SasCounters, thr: &Thresholds, v: &mut Verdict) {
    for (op, n) in c.corrected_errors.iter() {
        if n > thr.sas_corrected_caution && n <= thr.sas_corrected_slowdown {
            v.caution.push(format!("Corrected {} errors: {}", op, n));
        }
    }
    if c.grown_defects > 0 {
        v.caution.push(format!("Grown Defects: {}", c.grown_defects));
    }
}

fn sata_caution(c: &SataCounters, thr: &Thresholds, v: &mut Verdict) {
    if !v.critical.is_empty() {
        return;
    }
    let attrs = [
        ("Raw Read Error Rate",  c.raw_read_error_rate),
        ("Seek Error Rate",      c.seek_error_rate),
        ("UDMA CRC Error Count", c.udma_crc_error_count),
    ];
    for (label, n) in attrs {
        if n > 0 {
            v.caution.push(format!("{}: {}", label, n));
        }
    }
    for (op, n) in c.error_counts.iter() {
        if n > 0 && n <= thr.sata_error_caution_max {
            v.caution.push(format!("SATA {} Errors: {}", titled(op), n));
        }
    }
}

fn test_overdue(m: &SmartMetrics, thr: &Thresholds, v: &mut Verdict) {
    if !m.last_test.completed_ok() {
        return;
    }
    let days = match elapsed::since(m.power_on_hours, m.last_test.lifetime_hours).days {
        Some(d) => d,
        None    => return,
    };
    if days > thr.test_overdue_days {
        v.test_overdue = true;
        v.caution.push(format!(
            "Last SMART test was {} days ago - recommend running a new test",
            days as u64
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::smart::{HourCount, LastTest, OperationCounts};

    fn last_test(status: &str, hours: u64) -> LastTest {
        LastTest {
            description:    "Short offline".into(),
            status:         status.into(),
            lifetime_hours: HourCount::Known(hours),
            time_since:     String::new(),
        }
    }

    fn metrics(dialect: DialectMetrics, poh: u64, test: LastTest) -> SmartReport {
        SmartReport::Available(SmartMetrics {
            dialect,
            health_status:  "PASSED".into(),
            power_on_hours: HourCount::Known(poh),
            last_test:      test,
        })
    }

    fn sas_corrected(read: u64, write: u64, verify: u64) -> SmartReport {
        metrics(
            DialectMetrics::Sas(SasCounters {
                corrected_errors: OperationCounts { read, write, verify },
                ..Default::default()
            }),
            100,
            LastTest::unknown(),
        )
    }

    fn grade(report: &SmartReport) -> Verdict {
        classify(ZfsErrors::default(), report, &Thresholds::default())
    }

    #[test]
    fn severity_orders_best_to_worst() {
        assert!(Severity::Ok < Severity::Caution);
        assert!(Severity::Caution < Severity::Critical);
        assert_eq!(Severity::Critical.label(), "CRITICAL");
    }

    #[test]
    fn sata_recent_test_is_clean() {
        let r = metrics(DialectMetrics::Sata(SataCounters::default()), 1000, last_test("Completed without error", 100));
        let v = grade(&r);
        assert_eq!(v, Verdict::default());
        assert_eq!(v.severity(), Severity::Ok);
    }

    #[test]
    fn sata_stale_test_is_overdue() {
        let r = metrics(DialectMetrics::Sata(SataCounters::default()), 2500, last_test("Completed without error", 100));
        let v = grade(&r);
        assert!(v.critical.is_empty());
        assert_eq!(v.caution, vec!["Last SMART test was 100 days ago - recommend running a new test"]);
        assert!(v.test_overdue);
        assert_eq!(v.severity(), Severity::Caution);
    }

    #[test]
    fn failed_test_is_never_overdue() {
        let r = metrics(DialectMetrics::Sata(SataCounters::default()), 9000, last_test("Aborted by host", 100));
        assert!(!grade(&r).test_overdue);
    }

    #[test]
    fn unavailable_telemetry_has_no_reasons() {
        let r = SmartReport::Unavailable { error: "Error: device busy".into() };
        let v = grade(&r);
        assert_eq!(v, Verdict::default());
    }

    #[test]
    fn zfs_errors_are_critical_even_without_telemetry() {
        let r = SmartReport::Unavailable { error: "Error: device busy".into() };
        let v = classify(ZfsErrors { read: 1, write: 0, checksum: 4 }, &r, &Thresholds::default());
        assert_eq!(v.critical, vec!["ZFS Read errors: 1", "ZFS Checksum errors: 4"]);
    }

    #[test]
    fn sas_critical_boundary() {
        assert!(grade(&sas_corrected(1_000_000, 0, 0)).critical.is_empty());
        let v = grade(&sas_corrected(1_000_001, 0, 0));
        assert_eq!(v.critical, vec!["Critical corrected read errors: 1000001"]);
        assert_eq!(v.slowdown, vec!["Corrected read errors: 1000001"]);
        assert!(v.caution.is_empty());
    }

    #[test]
    fn sas_caution_band_is_open_below_closed_above() {
        assert!(grade(&sas_corrected(10_000, 0, 0)).caution.is_empty());
        assert_eq!(grade(&sas_corrected(10_001, 0, 0)).caution, vec!["Corrected read errors: 10001"]);
        let v = grade(&sas_corrected(0, 100_000, 0));
        assert_eq!(v.caution, vec!["Corrected write errors: 100000"]);
        assert!(v.slowdown.is_empty());
        let v = grade(&sas_corrected(0, 0, 100_001));
        assert!(v.caution.is_empty());
        assert_eq!(v.slowdown, vec!["Corrected verify errors: 100001"]);
    }

    #[test]
    fn sas_operations_are_independent() {
        let v = grade(&sas_corrected(2_000_000, 50_000, 200_000));
        assert_eq!(v.critical, vec!["Critical corrected read errors: 2000000"]);
        assert_eq!(v.slowdown, vec!["Corrected read errors: 2000000", "Corrected verify errors: 200000"]);
        // SAS caution is not suppressed by critical reasons.
        assert_eq!(v.caution, vec!["Corrected write errors: 50000"]);
    }

    #[test]
    fn sas_uncorrected_and_grown_defects() {
        let r = metrics(
            DialectMetrics::Sas(SasCounters {
                uncorrected_errors: OperationCounts { read: 2, write: 0, verify: 1 },
                grown_defects:      12,
                corrected_errors:   OperationCounts::default(),
            }),
            100,
            LastTest::unknown(),
        );
        let v = grade(&r);
        assert_eq!(v.critical, vec!["SAS Read Errors: 2", "SAS Verify Errors: 1"]);
        assert_eq!(v.caution, vec!["Grown Defects: 12"]);
    }

    #[test]
    fn sata_caution_suppressed_by_zfs_critical() {
        let counters = SataCounters { raw_read_error_rate: 5, udma_crc_error_count: 2, ..Default::default() };
        let r = metrics(DialectMetrics::Sata(counters), 100, LastTest::unknown());

        let v = grade(&r);
        assert_eq!(v.caution, vec!["Raw Read Error Rate: 5", "UDMA CRC Error Count: 2"]);

        let v = classify(ZfsErrors { read: 0, write: 3, checksum: 0 }, &r, &Thresholds::default());
        assert_eq!(v.critical, vec!["ZFS Write errors: 3"]);
        assert!(v.caution.is_empty());
    }

    #[test]
    fn sata_offline_uncorrectable_suppresses_caution_and_overdue() {
        let counters = SataCounters { offline_uncorrectable: 1, seek_error_rate: 9, ..Default::default() };
        let r = metrics(DialectMetrics::Sata(counters), 5000, last_test("Completed without error", 0));
        let v = grade(&r);
        assert_eq!(v.critical, vec!["Offline Uncorrectable: 1"]);
        assert!(v.caution.is_empty());
        assert!(!v.test_overdue);
    }

    #[test]
    fn sata_error_counter_band() {
        let counters = SataCounters {
            error_counts: OperationCounts { read: 10, write: 11, verify: 1 },
            ..Default::default()
        };
        let v = grade(&metrics(DialectMetrics::Sata(counters), 100, LastTest::unknown()));
        assert_eq!(v.caution, vec!["SATA Read Errors: 10", "SATA Verify Errors: 1"]);
    }

    #[test]
    fn nvme_tiers() {
        let r = metrics(DialectMetrics::Nvme(NvmeCounters { media_errors: 0, error_log_entries: 7 }), 100, LastTest::unknown());
        assert_eq!(grade(&r).caution, vec!["Error Log Entries: 7"]);

        let r = metrics(DialectMetrics::Nvme(NvmeCounters { media_errors: 3, error_log_entries: 7 }), 100, LastTest::unknown());
        let v = grade(&r);
        assert_eq!(v.critical, vec!["Media Integrity Errors: 3"]);
        assert!(v.caution.is_empty());
    }

    #[test]
    fn classification_is_deterministic() {
        let r = sas_corrected(2_000_000, 50_000, 200_000);
        let zfs = ZfsErrors { read: 1, write: 1, checksum: 1 };
        assert_eq!(classify(zfs, &r, &Thresholds::default()), classify(zfs, &r, &Thresholds::default()));
    }

    #[test]
    fn thresholds_are_configurable() {
        let thr = Thresholds { test_overdue_days: 30.0, ..Thresholds::default() };
        let r = metrics(DialectMetrics::Sata(SataCounters::default()), 1000, last_test("Completed without error", 100));
        assert!(classify(ZfsErrors::default(), &r, &thr).test_overdue);
    }

    #[test]
    fn verdict_export_uses_test_warning_key() {
        let v = serde_json::to_value(Verdict::default()).unwrap();
        assert_eq!(v["test_warning"], false);
        assert!(v["critical"].as_array().unwrap().is_empty());
    }
}
