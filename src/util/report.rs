use crate::models::export::{DiskExport, PoolExport, VdevChild, VdevExport};
use crate::models::smart::{DialectMetrics, SmartMetrics, SmartReport};
use crate::severity::Verdict;
use crate::util::human::titled;
use crossterm::style::{Color, Stylize};
use std::fmt::Display;

const RULE: usize = 60;

/// Optional ANSI styling; plain text when disabled.
#[derive(Clone, Copy)]
struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, text: impl Display, color: Color) -> String {
        if self.color {
            text.to_string().with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Writes indented lines into the report buffer.
struct Out {
    buf:   String,
    paint: Painter,
}

impl Out {
    fn line(&mut self, indent: usize, text: impl AsRef<str>) {
        self.buf.push_str(&"  ".repeat(indent));
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }
}

/// Render the annotated tree for console display.
pub fn generate(pools: &[PoolExport], color: bool) -> String {
    let mut out = Out { buf: String::new(), paint: Painter { color } };
    for pool in pools {
        out.blank();
        let banner = format!("{:=^80}", format!(" POOL: {} ", pool.name));
        let banner = out.paint.paint(banner, Color::Cyan);
        out.line(0, banner);
        for vdev in &pool.vdevs {
            vdev_block(&mut out, vdev, 1);
        }
    }
    out.buf
}

fn vdev_block(out: &mut Out, vdev: &VdevExport, indent: usize) {
    out.blank();
    let header = out.paint.paint(format!("VDEV: {} ({})", vdev.name, vdev.kind.to_uppercase()), Color::Yellow);
    out.line(indent, header);
    out.line(indent, "-".repeat(RULE));
    for child in &vdev.children {
        match child {
            VdevChild::Disk(d) => disk_block(out, d, indent + 1),
            VdevChild::Vdev(v) => vdev_block(out, v, indent + 1),
        }
    }
    out.line(indent, "#".repeat(RULE));
}

fn disk_block(out: &mut Out, d: &DiskExport, indent: usize) {
    let p = out.paint;
    out.line(indent, p.paint(format!("Pool Device: /dev/{}", d.partition), Color::Green));
    out.line(indent, format!("├─ ZFS GUID: {}", p.paint(&d.zfs_guid, Color::Magenta)));
    out.line(indent, format!("├─ Physical Disk: /dev/{}", d.disk));
    out.line(indent, format!(
        "├─ Errors: ZFS Read: {}, ZFS Write: {}, ZFS Checksum: {}",
        p.paint(d.errors.read, Color::Red),
        p.paint(d.errors.write, Color::Red),
        p.paint(d.errors.checksum, Color::Red),
    ));
    out.line(indent, format!("├─ Serial: {}", p.paint(&d.serial, Color::Blue)));
    out.line(indent, format!("├─ Model: {}", d.model));
    out.line(indent, format!("├─ Size: {} ({} bytes)", d.size_human, d.size_bytes));
    out.line(indent, format!("└─ GPTID: {}", p.paint(&d.gptid, Color::Magenta)));

    out.line(indent, "-".repeat(RULE));
    out.line(indent, p.paint(format!("SMART DATA FOR /dev/{}:", d.disk), Color::Blue));
    match &d.smart_data {
        SmartReport::Available(m)      => smart_block(out, m, indent),
        SmartReport::Unavailable { error } => {
            out.line(indent, p.paint(format!("SMART data unavailable: {}", error), Color::Red));
        }
    }

    warning_boxes(out, &d.warnings, indent);
    out.line(indent, ".".repeat(RULE));
}

fn smart_block(out: &mut Out, m: &SmartMetrics, indent: usize) {
    let p = out.paint;
    let health_color = if m.passed() { Color::Green } else { Color::Red };
    out.line(indent, format!("├─ Drive Type: {}", m.drive_dialect().label()));
    out.line(indent, format!("├─ Health Status: {}", p.paint(&m.health_status, health_color)));
    out.line(indent, format!("├─ Power On Hours: {}", p.paint(m.power_on_hours, Color::Yellow)));

    match &m.dialect {
        DialectMetrics::Nvme(c) => {
            out.line(indent, format!("├─ Media Integrity Errors: {}", p.paint(c.media_errors, Color::Red)));
            out.line(indent, format!("├─ Error Log Entries: {}", p.paint(c.error_log_entries, Color::Red)));
        }
        DialectMetrics::Sas(c) => {
            out.line(indent, "├─ Uncorrected Errors:");
            operation_lines(out, c.uncorrected_errors.iter(), Color::Red, indent);
            out.line(indent, format!("├─ Grown Defects: {}", p.paint(c.grown_defects, Color::Red)));
            out.line(indent, "├─ Corrected Errors:");
            operation_lines(out, c.corrected_errors.iter(), Color::Yellow, indent);
        }
        DialectMetrics::Sata(c) => {
            out.line(indent, "├─ SMART Attributes:");
            out.line(indent, format!("│  ├─ Raw Read Error Rate: {}", p.paint(c.raw_read_error_rate, Color::Red)));
            out.line(indent, format!("│  ├─ Seek Error Rate: {}", p.paint(c.seek_error_rate, Color::Red)));
            out.line(indent, format!("│  ├─ Offline Uncorrectable: {}", p.paint(c.offline_uncorrectable, Color::Red)));
            out.line(indent, format!("│  └─ UDMA CRC Error Count: {}", p.paint(c.udma_crc_error_count, Color::Red)));
        }
    }

    let t = &m.last_test;
    out.line(indent, format!("└─ Last Test: {}", p.paint(&t.description, Color::Magenta)));
    out.line(indent, format!("   ├─ Status: {}", t.status));
    out.line(indent, format!("   ├─ Lifetime Hours: {}", t.lifetime_hours));
    out.line(indent, format!("   └─ Time Since: {}", t.time_since));
}

fn operation_lines(out: &mut Out, ops: [(&str, u64); 3], color: Color, indent: usize) {
    let p = out.paint;
    for (i, (op, n)) in ops.iter().enumerate() {
        let branch = if i == ops.len() - 1 { "└─" } else { "├─" };
        out.line(indent, format!("│  {} {}: {}", branch, titled(op), p.paint(n, color)));
    }
}

fn warning_boxes(out: &mut Out, v: &Verdict, indent: usize) {
    let p = out.paint;
    if !v.critical.is_empty() {
        out.blank();
        out.line(indent, "*".repeat(RULE));
        out.line(indent, p.paint("CRITICAL WARNING: THIS DISK SHOULD BE REPLACED IMMEDIATELY!", Color::Red));
        out.line(indent, "Reasons:");
        for r in &v.critical {
            out.line(indent, format!("  • {}", r));
        }
        out.line(indent, "*".repeat(RULE));
    } else if !v.caution.is_empty() {
        out.blank();
        out.line(indent, "-".repeat(RULE));
        out.line(indent, p.paint("CAUTION: MONITOR THIS DRIVE CLOSELY", Color::Yellow));
        out.line(indent, "The disk shows some errors but doesn't appear to be failing yet:");
        for r in &v.caution {
            out.line(indent, format!("  • {}", r));
        }
        out.line(indent, "Recommendations:");
        out.line(indent, "  • Monitor SMART attributes regularly");
        if v.test_overdue {
            out.line(indent, "  • Run a new SMART short test");
        }
        out.line(indent, "-".repeat(RULE));
    }

    if !v.slowdown.is_empty() {
        out.blank();
        out.line(indent, "-".repeat(RULE));
        out.line(indent, p.paint("PERFORMANCE WARNING: DRIVE MAY BE SLOWING DOWN ITS VDEV", Color::Yellow));
        out.line(indent, "High error correction rates may be impacting performance:");
        out.line(indent, "For some drive models and firmwares, higher numbers may be part of \"normal\" operation.");
        for r in &v.slowdown {
            out.line(indent, format!("  • {}", r));
        }
        out.line(indent, "Recommendations:");
        out.line(indent, "  • Consider replacing this drive");
        out.line(indent, "  • Monitor vdev performance metrics");
        out.line(indent, "-".repeat(RULE));
    }
}
