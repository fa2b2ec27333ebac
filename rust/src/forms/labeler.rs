//! Field Labeler
//!
//! Maps raw extracted keys such as `citizenship_number` to display labels.

/// Convert a raw field key into a human-readable label
///
/// Underscores become spaces, camel-case boundaries are split, and the first
/// character of every word is upper-cased. The rest of each word is left as
/// is, so acronyms are not special-cased: `dob` becomes `"Dob"`.
pub fn field_label(name: &str) -> String {
    let chars: Vec<char> = name.chars().map(|c| if c == '_' { ' ' } else { c }).collect();

    let mut spaced = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        spaced.push(c);
        if c.is_ascii_lowercase() && chars.get(i + 1).is_some_and(|n| n.is_ascii_uppercase()) {
            spaced.push(' ');
        }
    }

    let mut label = String::with_capacity(spaced.len());
    let mut prev_is_word = false;
    for c in spaced.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            label.push(c.to_ascii_uppercase());
        } else {
            label.push(c);
        }
        prev_is_word = is_word;
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_keys() {
        assert_eq!(field_label("full_name"), "Full Name");
        assert_eq!(field_label("citizenship_number"), "Citizenship Number");
        assert_eq!(field_label("date_of_birth"), "Date Of Birth");
    }

    #[test]
    fn test_acronyms_are_not_special_cased() {
        assert_eq!(field_label("dob"), "Dob");
        assert_eq!(field_label("pan_number"), "Pan Number");
        assert_eq!(field_label("PAN_number"), "PAN Number");
    }

    #[test]
    fn test_camel_case_keys() {
        assert_eq!(field_label("issuedBy"), "Issued By");
        assert_eq!(field_label("dateOfExpiry"), "Date Of Expiry");
        assert_eq!(field_label("aBcD"), "A Bc D");
    }

    #[test]
    fn test_edge_inputs() {
        assert_eq!(field_label(""), "");
        assert_eq!(field_label("_"), " ");
        assert_eq!(field_label("address2"), "Address2");
        assert_eq!(field_label("2nd_line"), "2nd Line");
        // Non-ASCII words are passed through unchanged
        assert_eq!(field_label("नाम"), "नाम");
    }
}
