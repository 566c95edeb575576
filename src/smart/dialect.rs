use crate::models::smart::DriveDialect;

/// Decide which dialect produced a smartctl report.
///
/// NVMe and SAS need explicit evidence in the text; anything else is read
/// as ATA, whose extractors all degrade to zero on a mismatch.
pub fn classify(raw: &str) -> DriveDialect {
    if raw.contains("NVMe") || raw.contains("Namespace") {
        DriveDialect::Nvme
    } else if raw.contains("SAS") || raw.contains("SCSI") {
        DriveDialect::Sas
    } else {
        DriveDialect::Sata
    }
}
