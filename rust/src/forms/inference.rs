//! Field Type Inferrer
//!
//! Classifies a field as a date or free-text input from its name and value.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use setu_types::FieldKind;

use crate::error::ConfigError;

static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid ISO date regex"));

const DATE_MARKERS: [&str; 2] = ["date", "dob"];

/// How field names are matched against the date markers `date` and `dob`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateHeuristic {
    /// Marker anywhere in the lowercased name (`update` counts as a date)
    #[default]
    Substring,
    /// Marker must be a whole word (`expiry_date`, `dateOfBirth`, not `update`)
    WordBoundary,
}

impl FromStr for DateHeuristic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(DateHeuristic::Substring),
            "word-boundary" | "word_boundary" => Ok(DateHeuristic::WordBoundary),
            other => Err(ConfigError::InvalidValue {
                key: "date heuristic".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Infer the input kind for a field
///
/// A name match wins even when the value is empty.
pub fn infer_field_kind(name: &str, value: &str, heuristic: DateHeuristic) -> FieldKind {
    let name_matches = match heuristic {
        DateHeuristic::Substring => {
            let lower = name.to_lowercase();
            DATE_MARKERS.iter().any(|marker| lower.contains(marker))
        }
        DateHeuristic::WordBoundary => name_words(name)
            .iter()
            .any(|word| DATE_MARKERS.contains(&word.as_str())),
    };

    if name_matches || ISO_DATE_PREFIX.is_match(value) {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}

/// Split a key into lowercased words on `_`, `-`, spaces and camel-case humps
fn name_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
