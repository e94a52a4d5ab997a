use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Strips invisible marks and collapses runs of whitespace.
pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to spot repeat registrations for the same child.
pub(crate) fn identity_key(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

pub(crate) fn mentions_token(response: &str, token: &str) -> bool {
    response.contains(token)
}

pub(crate) fn is_affirmative(response: &str) -> bool {
    response.trim() == "Yes"
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%m/%d/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
