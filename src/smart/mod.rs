//! smartctl text → typed metrics.

pub mod dialect;
pub mod elapsed;
pub mod extract;

use crate::models::smart::{SmartMetrics, SmartReport};
use crate::util::human::truncate;

/// Prefix the telemetry source uses to signal that smartctl could not be read.
pub const FAILURE_MARKER: &str = "Error";

const MAX_ERROR_CHARS: usize = 200;

/// Parse one raw report, or wrap a failure marker as unavailable telemetry.
pub fn parse_report(raw: &str) -> SmartReport {
    if raw.starts_with(FAILURE_MARKER) {
        return SmartReport::Unavailable { error: truncate(raw, MAX_ERROR_CHARS) };
    }
    SmartReport::Available(parse_metrics(raw))
}

pub fn parse_metrics(raw: &str) -> SmartMetrics {
    let dialect        = dialect::classify(raw);
    let power_on_hours = extract::power_on_hours(raw);

    let mut last_test = self_test::last_test(raw, power_on_hours);
    last_test.time_since = elapsed::since(power_on_hours, last_test.lifetime_hours).display;

    SmartMetrics {
        dialect:       extract::dialect_metrics(raw, dialect),
        health_status: extract::health_status(raw, dialect),
        power_on_hours,
        last_test,
    }
}
