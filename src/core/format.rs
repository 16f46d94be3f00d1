//! Shared display formatting helpers.
//!
//! Single definitions for the size/text/date formatting used across every
//! view — the upload table, document cards, folder stats, and recent views
//! all render through these.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Human-readable byte count ("1.5 MB"), 1024-based.
pub fn file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exp = (bytes.ilog2() / 10).min(UNITS.len() as u32 - 1);
    let value = bytes as f64 / f64::powi(1024.0, exp as i32);

    // Two decimals, trailing zeros trimmed ("1.50" -> "1.5", "2.00" -> "2")
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exp as usize])
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
/// Char-boundary safe.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}

/// Parse the server's upload-date strings. Accepts RFC 3339 timestamps and
/// bare `YYYY-MM-DD` dates; anything else maps to the epoch so unparseable
/// entries sort last under descending date order.
pub fn parse_upload_date(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc();
        }
    }
    DateTime::<Utc>::UNIX_EPOCH
}

/// Relative age ("just now", "5 minutes ago", ...), falling back to a plain
/// date beyond thirty days.
pub fn time_ago(raw: &str) -> String {
    let date = parse_upload_date(raw);
    let seconds = (Utc::now() - date).num_seconds().max(0);

    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} minutes ago", seconds / 60),
        3600..=86_399 => format!("{} hours ago", seconds / 3600),
        86_400..=2_591_999 => format!("{} days ago", seconds / 86_400),
        _ => date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    }
}

/// Short local date for list rows.
pub fn short_date(raw: &str) -> String {
    parse_upload_date(raw)
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string()
}

/// Category ids arrive snake_cased ("policies_guidelines"); display them
/// title-cased with spaces.
pub fn category_label(category: &str) -> String {
    category
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_zero() {
        assert_eq!(file_size(0), "0 B");
    }

    #[test]
    fn test_file_size_units() {
        assert_eq!(file_size(512), "512 B");
        assert_eq!(file_size(1024), "1 KB");
        assert_eq!(file_size(1536), "1.5 KB");
        assert_eq!(file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let s = "héllø wörld";
        let cut = truncate(s, 4);
        assert_eq!(cut, "héll...");
    }

    #[test]
    fn test_parse_upload_date_rfc3339() {
        let dt = parse_upload_date("2024-01-15T10:30:00Z");
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
    }

    #[test]
    fn test_parse_upload_date_bare_date() {
        let dt = parse_upload_date("2024-02-01");
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-02-01");
    }

    #[test]
    fn test_parse_upload_date_garbage_is_epoch() {
        assert_eq!(parse_upload_date("not a date"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_time_ago_recent() {
        let now = Utc::now().to_rfc3339();
        assert_eq!(time_ago(&now), "just now");
    }

    #[test]
    fn test_time_ago_minutes() {
        let earlier = (Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
        assert_eq!(time_ago(&earlier), "5 minutes ago");
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label("policies_guidelines"), "Policies Guidelines");
        assert_eq!(category_label("others"), "Others");
        assert_eq!(category_label(""), "");
    }
}
