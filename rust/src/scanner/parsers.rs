//! Document-specific text parsers
//!
//! Each parser reads OCR text (Nepali Devanagari and English mixed) and
//! returns the extracted fields in a fixed order. Fields that could not be
//! found are present with an empty value so the form still shows them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use setu_types::ExtractedData;
use tracing::debug;

use super::dates::{normalize_citizenship_date, parse_passport_date};
use super::detector::DocumentType;

/// Run the parser registered for a document type
pub fn parse_document(document_type: DocumentType, text: &str) -> ExtractedData {
    let data = match document_type {
        DocumentType::Citizenship => parse_citizenship(text),
        DocumentType::Passport => parse_passport(text),
        DocumentType::Pan => parse_pan(text),
        DocumentType::DrivingLicense => parse_driving_license(text),
    };
    debug!("Parsed {} fields from {} text", data.len(), document_type);
    data
}

// ============================================================================
// CITIZENSHIP
// ============================================================================

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid citizenship pattern"))
        .collect()
}

static CITIZENSHIP_NAME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"नाम[:\s]+([\u{0900}-\u{097F} A-Za-z.]+)",
        r"Name[:\s]+([A-Za-z .]+)",
    ])
});

static CITIZENSHIP_DOB: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"जन्म मिति[:\s]+([\d\-/०१२३४५६७८९]+)",
        r"Date of Birth[:\s]+([\d\-/]+)",
    ])
});

static CITIZENSHIP_NUMBER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"नागरिकता नं[:\s]+([\w\d\-/]+)",
        r"Citizenship No[:\s]+([A-Za-z0-9-]+)",
    ])
});

static CITIZENSHIP_DISTRICT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"जिल्ला[:\s]+([\u{0900}-\u{097F} A-Za-z.]+)",
        r"District[:\s]+([A-Za-z .]+)",
    ])
});

/// First capture of the first pattern that matches, trimmed
fn search_patterns(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Nepali citizenship certificate: full_name, dob, citizenship_number, district
///
/// Dates are normalized to `YYYY-MM-DD` when they match a known format and
/// kept verbatim otherwise.
pub fn parse_citizenship(text: &str) -> ExtractedData {
    let dob = search_patterns(&CITIZENSHIP_DOB, text)
        .map(|raw| normalize_citizenship_date(&raw).unwrap_or(raw));

    ExtractedData::new()
        .with(
            "full_name",
            search_patterns(&CITIZENSHIP_NAME, text).unwrap_or_default(),
        )
        .with("dob", dob.unwrap_or_default())
        .with(
            "citizenship_number",
            search_patterns(&CITIZENSHIP_NUMBER, text).unwrap_or_default(),
        )
        .with(
            "district",
            search_patterns(&CITIZENSHIP_DISTRICT, text).unwrap_or_default(),
        )
}

// ============================================================================
// PASSPORT
// ============================================================================

static MRZ_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9<]{20,}$").expect("valid MRZ line regex"));
static PASSPORT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\b[A-Z]{1,2}[0-9]{6,8}\b").expect("valid passport number regex"));
static COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid country code regex"));

/// Output keys of the passport parser, in order
pub const PASSPORT_FIELDS: [&str; 12] = [
    "passport_number",
    "surname",
    "given_names",
    "nationality",
    "date_of_birth",
    "date_of_issue",
    "date_of_expiry",
    "sex",
    "place_of_birth",
    "issuing_authority",
    "personal_number",
    "country_code",
];

/// Printed labels per field; a field's value is the next non-label line
const PASSPORT_LABELS: [(&str, &[&str]); 12] = [
    ("surname", &["SURNAME"]),
    ("given_names", &["GIVEN NAMES", "GIVEN NAME"]),
    ("passport_number", &["PASSPORT NO", "PASSPORT NUMBER"]),
    ("nationality", &["NATIONALITY"]),
    ("date_of_birth", &["DATE OF BIRTH", "DOB"]),
    ("date_of_issue", &["DATE OF ISSUE"]),
    ("date_of_expiry", &["DATE OF EXPIRY"]),
    ("place_of_birth", &["PLACE OF BIRTH"]),
    ("issuing_authority", &["ISSUING AUTHORITY", "AUTHORITY"]),
    ("personal_number", &["PERSONAL NO", "PERSONAL NUMBER"]),
    ("sex", &["SEX"]),
    ("country_code", &["COUNTRY CODE"]),
];

type PassportFields = HashMap<&'static str, Option<String>>;

/// Replace MRZ filler with spaces and trim; empty becomes `None`
fn clean(value: &str) -> Option<String> {
    let cleaned = value.replace(['<', '\n'], " ");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Byte slice clamped to the string, like a Python slice
fn slice(value: &str, start: usize, end: usize) -> &str {
    let end = end.min(value.len());
    let start = start.min(end);
    &value[start..end]
}

fn is_mrz_line(line: &str) -> bool {
    line.matches('<').count() > 5 && line.len() >= 20 && MRZ_LINE.is_match(line)
}

/// Read the two-line TD3 machine-readable zone
///
/// Fields are read in order and reading stops at the first position past the
/// end of line 2, leaving later fields unset.
fn parse_mrz(line1: &str, line2: &str, out: &mut PassportFields) {
    let mrz1 = slice(line1, 0, 44);
    let mrz2 = slice(line2, 0, 44);

    let country = slice(mrz1, 2, 5);
    out.insert(
        "country_code",
        COUNTRY_CODE.is_match(country).then(|| clean(country)).flatten(),
    );

    let mut names = slice(mrz1, 5, mrz1.len()).split("<<");
    out.insert("surname", names.next().and_then(clean));
    out.insert("given_names", names.next().and_then(clean));

    let number = slice(mrz2, 0, 9);
    out.insert(
        "passport_number",
        PASSPORT_NUMBER.is_match(number).then(|| clean(number)).flatten(),
    );

    let nationality = slice(mrz2, 10, 13);
    out.insert(
        "nationality",
        (nationality.len() == 3 && nationality.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| clean(nationality))
            .flatten(),
    );
    out.insert("date_of_birth", parse_passport_date(slice(mrz2, 13, 19)));

    let Some(sex) = mrz2.chars().nth(20) else {
        return;
    };
    out.insert(
        "sex",
        matches!(sex, 'M' | 'F').then(|| sex.to_string()),
    );
    out.insert("date_of_expiry", parse_passport_date(slice(mrz2, 21, 27)));

    let personal = slice(mrz2, 28, 42);
    out.insert(
        "personal_number",
        is_all_digits(personal).then(|| personal.to_string()),
    );
}

fn starts_with_any_label(line: &str) -> bool {
    let upper = line.to_uppercase();
    PASSPORT_LABELS
        .iter()
        .flat_map(|(_, labels)| labels.iter())
        .any(|label| upper.starts_with(label))
}

fn label_value(field: &str, value: &str) -> Option<String> {
    if field.contains("date") {
        return parse_passport_date(value);
    }
    match field {
        "sex" => matches!(value, "M" | "F").then(|| value.to_string()),
        "country_code" => COUNTRY_CODE.is_match(value).then(|| value.to_string()),
        "passport_number" => PASSPORT_NUMBER.is_match(value).then(|| value.to_string()),
        "personal_number" => is_all_digits(value).then(|| value.to_string()),
        _ => clean(value),
    }
}

/// Printed-label extraction: each label takes the next line that is not
/// itself a label
fn parse_labels(lines: &[&str], out: &mut PassportFields) {
    for (idx, line) in lines.iter().enumerate() {
        let upper = line.to_uppercase();
        for (field, labels) in PASSPORT_LABELS {
            if !labels.iter().any(|label| upper.starts_with(label)) {
                continue;
            }
            let next = lines[idx + 1..]
                .iter()
                .find(|candidate| !starts_with_any_label(candidate));
            if let Some(next) = next {
                out.insert(field, label_value(field, next));
            }
        }
    }
}

/// Nepali passport: MRZ values preferred, printed labels as fallback
pub fn parse_passport(text: &str) -> ExtractedData {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mrz_lines: Vec<&str> = lines.iter().copied().filter(|l| is_mrz_line(l)).collect();
    let mut mrz = PassportFields::new();
    if let [.., line1, line2] = mrz_lines.as_slice() {
        parse_mrz(line1, line2, &mut mrz);
    }

    let mut labels = PassportFields::new();
    parse_labels(&lines, &mut labels);

    let mut data = ExtractedData::new().with("document_type", "passport");
    for field in PASSPORT_FIELDS {
        let value = mrz
            .get(field)
            .cloned()
            .flatten()
            .or_else(|| labels.get(field).cloned().flatten())
            .unwrap_or_default();
        data.insert(field, value);
    }
    data
}

// ============================================================================
// PAN / DRIVING LICENSE
// ============================================================================

/// PAN card: no extraction rules yet, the form falls back to manual entry
pub fn parse_pan(_text: &str) -> ExtractedData {
    ExtractedData::new()
}

/// Driving license: no extraction rules yet, the form falls back to manual entry
pub fn parse_driving_license(_text: &str) -> ExtractedData {
    ExtractedData::new()
}
