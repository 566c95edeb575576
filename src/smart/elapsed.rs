use crate::models::smart::{HourCount, UNKNOWN};

/// Time elapsed between a self-test and now, measured in power-on hours.
#[derive(Debug, Clone, PartialEq)]
pub struct Elapsed {
    /// "5 hours ago", "37 days ago" or the unknown placeholder.
    pub display: String,
    /// Fractional days; None when either side is unknown or the counter went backwards.
    pub days:    Option<f64>,
}

impl Elapsed {
    fn unknown() -> Self {
        Self { display: UNKNOWN.to_string(), days: None }
    }
}

pub fn since(current: HourCount, at_test: HourCount) -> Elapsed {
    let (now, then) = match (current.known(), at_test.known()) {
        (Some(n), Some(t)) => (n, t),
        _                  => return Elapsed::unknown(),
    };
    // A rolled-over or inconsistent counter is not an elapsed time.
    let delta = match now.checked_sub(then) {
        Some(d) => d,
        None    => return Elapsed::unknown(),
    };

    let display = if delta < 24 {
        format!("{} hours ago", delta)
    } else {
        format!("{} days ago", delta / 24)
    };
    Elapsed { display, days: Some(delta as f64 / 24.0) }
}
