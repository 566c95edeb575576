pub mod midclt;
pub mod smartctl;

/// Supplies raw `smartctl -a` text for a whole-disk device name.
///
/// Never fails: when the report cannot be obtained the returned text starts
/// with [`crate::smart::FAILURE_MARKER`] followed by the reason.
pub trait TelemetrySource: Sync {
    fn fetch(&self, disk: &str) -> String;
}
