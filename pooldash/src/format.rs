//! Display formatting for raw telemetry values.
//!
//! Everything here is pure and presentation-only: the underlying numbers
//! are never rounded in place, only rendered.

use time::{
    OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339, macros::format_description,
};

/// Shown for values the API did not provide.
pub const PLACEHOLDER_UNKNOWN: &str = "N/A";

/// Shown for payments that have not been broadcast yet.
pub const PLACEHOLDER_PENDING: &str = "Pending";

const HASHRATE_UNITS: [&str; 6] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s"];

/// Format a hashrate in H/s with a scaled unit and two decimals.
///
/// Scales by 1000 until the value drops below 1000 or the largest unit
/// (PH/s) is reached, so very large rates show as e.g. "12000.00 PH/s".
/// Negative and non-finite inputs render as zero.
///
/// ```
/// # use pooldash::format::format_hashrate;
/// assert_eq!(format_hashrate(1_234_567.0), "1.23 MH/s");
/// ```
pub fn format_hashrate(hashes_per_sec: f64) -> String {
    let mut value = if hashes_per_sec.is_finite() && hashes_per_sec > 0.0 {
        hashes_per_sec
    } else {
        0.0
    };

    let mut unit = 0;
    while value >= 1000.0 && unit < HASHRATE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    format!("{:.2} {}", value, HASHRATE_UNITS[unit])
}

/// Format an integer counter with thousands separators ("1,234,567").
pub fn format_count(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Format a possibly fractional quantity (difficulty, heights from JSON
/// floats) with thousands separators and up to three decimals, trailing
/// zeros trimmed.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER_UNKNOWN.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    // -0.0001 rounds to "0.000"; don't print "-0".
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fixed-decimal amount, e.g. balances (8 places) or block rewards (2).
pub fn format_amount(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Percentage label with two decimals. Not clamped: an estimate of 100.4%
/// is shown as such.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Width of a progress bar in percent, clamped to 0..=100.
pub fn progress_width(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Shorten an identifier (hash, address, txid) to its first `len`
/// characters followed by "...". Identifiers that already fit are
/// returned whole.
pub fn truncate_id(id: &str, len: usize) -> String {
    match id.char_indices().nth(len) {
        Some((cut, _)) => format!("{}...", &id[..cut]),
        None => id.to_string(),
    }
}

/// Truncate an optional identifier, falling back to `placeholder` when it
/// is absent or empty.
pub fn truncate_or(id: Option<&str>, len: usize, placeholder: &str) -> String {
    match id {
        Some(id) if !id.is_empty() => truncate_id(id, len),
        _ => placeholder.to_string(),
    }
}

/// Render an RFC 3339 timestamp in the local time zone.
pub fn format_timestamp(raw: &str) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_timestamp_in(raw, offset)
}

/// Render an RFC 3339 timestamp at a fixed offset.
///
/// Empty input gives the unknown placeholder; anything unparseable is shown
/// verbatim rather than hidden.
pub fn format_timestamp_in(raw: &str, offset: UtcOffset) -> String {
    if raw.is_empty() {
        return PLACEHOLDER_UNKNOWN.to_string();
    }

    let layout = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|ts| ts.to_offset(offset).format(&layout).ok())
        .unwrap_or_else(|| raw.to_string())
}
