//! Guided form prefill
//!
//! Guided forms are service templates made of free-text questions. After a
//! document scan, each question is prefilled from the extracted key equal to
//! the question text (exact, then lowercased).

use indexmap::IndexMap;
use setu_types::{ExtractedData, GuidedForm};

/// Answer value per question id
pub type Answers = IndexMap<u64, String>;

/// Document type requested when a form name is not mapped
pub const DEFAULT_GUIDED_DOCUMENT_TYPE: &str = "passport";

/// Document type to scan for a guided form, by form name
pub fn document_type_for_form(form_name: &str) -> &'static str {
    match form_name {
        "Citizenship Certificate Application Form" => "citizenship",
        "Passport Application Form" => "passport",
        "Driving License Form" => "driving_license",
        "Land Registration Form" => "land_registration",
        _ => DEFAULT_GUIDED_DOCUMENT_TYPE,
    }
}

/// Prefill answers for every question from extracted data
pub fn prefill_answers(form: &GuidedForm, extracted: &ExtractedData) -> Answers {
    form.questions
        .iter()
        .map(|question| {
            let value = extracted
                .get(&question.text)
                .filter(|v| !v.is_empty())
                .or_else(|| extracted.get(&question.text.to_lowercase()))
                .unwrap_or_default();
            (question.id, value.to_string())
        })
        .collect()
}

/// First unanswered required question, as a user-facing message
pub fn validate_answers(form: &GuidedForm, answers: &Answers) -> Result<(), String> {
    let mut questions: Vec<_> = form.questions.iter().collect();
    questions.sort_by_key(|q| q.order);

    match questions.into_iter().find(|q| {
        q.required && answers.get(&q.id).map_or(true, |answer| answer.is_empty())
    }) {
        Some(question) => Err(format!("Please answer: {}", question.text)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setu_types::{Question, QuestionType};

    fn question(id: u64, text: &str, required: bool, order: u32) -> Question {
        Question {
            id,
            text: text.to_string(),
            question_type: QuestionType::Text,
            required,
            order,
            choices: None,
        }
    }

    fn form() -> GuidedForm {
        GuidedForm {
            id: 7,
            name: "Passport Application Form".into(),
            description: String::new(),
            questions: vec![
                question(1, "full_name", true, 1),
                question(2, "Nationality", true, 0),
                question(3, "Remarks", false, 2),
            ],
        }
    }

    #[test]
    fn test_document_type_mapping() {
        assert_eq!(document_type_for_form("Driving License Form"), "driving_license");
        assert_eq!(
            document_type_for_form("Citizenship Certificate Application Form"),
            "citizenship"
        );
        assert_eq!(document_type_for_form("Business Registration"), "passport");
    }

    #[test]
    fn test_prefill_exact_then_lowercase() {
        let data = ExtractedData::new()
            .with("full_name", "Ram Sharma")
            .with("nationality", "NPL");
        let answers = prefill_answers(&form(), &data);

        assert_eq!(answers[&1], "Ram Sharma");
        assert_eq!(answers[&2], "NPL");
        assert_eq!(answers[&3], "");
    }

    #[test]
    fn test_validate_reports_first_by_order() {
        let mut answers = Answers::new();
        answers.insert(1, String::new());
        answers.insert(2, String::new());
        assert_eq!(
            validate_answers(&form(), &answers),
            Err("Please answer: Nationality".to_string())
        );

        answers.insert(2, "NPL".into());
        assert_eq!(
            validate_answers(&form(), &answers),
            Err("Please answer: full_name".to_string())
        );

        answers.insert(1, "Ram".into());
        assert_eq!(validate_answers(&form(), &answers), Ok(()));
    }
}
