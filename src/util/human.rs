const UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Format a raw byte count in binary units: "3.64 TiB", "1.5 GiB", "512.0 B".
/// Two decimals at most, at least one.
pub fn fmt_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(scaled), UNITS[unit])
}

fn trim_decimals(v: f64) -> String {
    let s = format!("{:.2}", v);
    let trimmed = s.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Cut `s` to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Uppercase the first character: "read" → "Read".
pub fn titled(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None    => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(fmt_size(0), "0B");
        assert_eq!(fmt_size(512), "512.0 B");
        assert_eq!(fmt_size(1536), "1.5 KiB");
        assert_eq!(fmt_size(1_073_741_824), "1.0 GiB");
        assert_eq!(fmt_size(4_000_787_030_016), "3.64 TiB");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn titles() {
        assert_eq!(titled("verify"), "Verify");
        assert_eq!(titled(""), "");
    }
}
