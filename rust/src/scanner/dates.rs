//! Date normalization for scanned documents
//!
//! Everything is normalized to `YYYY-MM-DD`, the shape the field type
//! inferrer recognizes as a date.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

const OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Formats accepted on citizenship certificates
const CITIZENSHIP_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Citizenship dates carry a four-digit year at one end
static CITIZENSHIP_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}|[0-9]{1,2}[-/][0-9]{1,2}[-/][0-9]{4})$")
        .expect("valid citizenship date regex")
});

static MRZ_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{2})$").expect("valid MRZ date regex"));

static PRINTED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2})\s*([A-Z]{3,})\s*([0-9]{2,4})$").expect("valid printed date regex")
});

/// Replace Devanagari digits (०-९) with ASCII digits
pub fn devanagari_to_ascii_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\u{0966}'..='\u{096F}' => {
                char::from(b'0' + (c as u32 - 0x0966) as u8)
            }
            other => other,
        })
        .collect()
}

/// Normalize a citizenship date, or `None` when no known format matches
pub fn normalize_citizenship_date(value: &str) -> Option<String> {
    let ascii = devanagari_to_ascii_digits(value);
    // chrono's %Y takes any digit count, so short years are rejected here
    if !CITIZENSHIP_SHAPE.is_match(&ascii) {
        return None;
    }
    CITIZENSHIP_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&ascii, format).ok())
        .map(|date| date.format(OUTPUT_FORMAT).to_string())
}

/// Parse a passport date: MRZ `YYMMDD` or printed `13 OCT 2005`
///
/// Two-digit MRZ years below 30 are read as 20xx, the rest as 19xx.
pub fn parse_passport_date(value: &str) -> Option<String> {
    let value = value.trim();

    if let Some(caps) = MRZ_DATE.captures(value) {
        let yy: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let year = if yy < 30 { 2000 + yy } else { 1900 + yy };
        return NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| date.format(OUTPUT_FORMAT).to_string());
    }

    if let Some(caps) = PRINTED_DATE.captures(value) {
        // Printed dates need a four-digit year
        if caps[3].len() != 4 {
            return None;
        }
        let normalized = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        return NaiveDate::parse_from_str(&normalized, "%d %b %Y")
            .or_else(|_| NaiveDate::parse_from_str(&normalized, "%d %B %Y"))
            .ok()
            .map(|date| date.format(OUTPUT_FORMAT).to_string());
    }

    None
}
