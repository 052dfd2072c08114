use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Canonicalize a date input to zero-padded `YYYY-MM-DD` for storage and
/// comparison. Already-canonical strings pass through unchanged, date-times
/// are truncated at the date boundary, other parseable forms are
/// reformatted, and blank or unparsable input yields `None`.
pub fn normalize(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if canonical_re().is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Some((date_part, _)) = trimmed.split_once('T') {
        if canonical_re().is_match(date_part) {
            return Some(date_part.to_string());
        }
        return parse_date(date_part).map(|d| d.format("%Y-%m-%d").to_string());
    }
    parse_date(trimmed).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse any accepted date form into a `NaiveDate`; `None` when blank or
/// unparsable (explicit absence, not an error).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split_once('T').map(|(d, _)| d).unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
