//! Bulk question import and shared question validation.
//!
//! The importer never aborts the batch: malformed or invalid items are
//! collected into the report, duplicates are skipped, and a question row
//! is only ever stored together with its answers.

use crate::curriculum::structure;
use crate::models::api::{ImportItemError, ImportReport};
use crate::models::question::{Answer, NewQuestion};
use crate::stores::question_store::{QuestionStore, QuestionStoreError};
use std::collections::HashSet;
use tracing::info;

/// Validate the curriculum coherence and answer invariants of a question
/// payload. Used by the create/update endpoints and by every import item.
pub fn validate_question(new: &NewQuestion) -> Result<(), String> {
    if !(1..=3).contains(&new.study_year) {
        return Err(format!("study_year must be 1-3, got {}", new.study_year));
    }

    let allowed = structure::exam_types_for_module(new.study_year, &new.module);
    if allowed.is_empty() {
        return Err(format!(
            "Unknown module '{}' for study year {}",
            new.module, new.study_year
        ));
    }
    if !allowed.contains(&new.exam_type) {
        return Err(format!(
            "Exam type {} is not valid for module '{}' in study year {}",
            new.exam_type.as_str(),
            new.module,
            new.study_year
        ));
    }

    match (&new.unite, new.study_year) {
        (Some(_), 1) => {
            return Err("First-year questions cannot carry a unite".to_string());
        }
        (Some(unite), study_year) => {
            if !structure::is_unite(study_year, unite) {
                return Err(format!(
                    "Unknown unite '{unite}' for study year {study_year}"
                ));
            }
            if !structure::modules_in_unite(study_year, unite)
                .iter()
                .any(|member| *member == new.module)
            {
                return Err(format!(
                    "Module '{}' does not belong to unite '{unite}'",
                    new.module
                ));
            }
        }
        (None, _) => {}
    }

    if new.cours.is_empty() || new.cours.iter().any(|label| label.trim().is_empty()) {
        return Err("cours must contain at least one non-empty course label".to_string());
    }

    if new.question_text.trim().is_empty() {
        return Err("question_text must not be empty".to_string());
    }

    validate_answers(&new.answers)
}

pub fn validate_answers(answers: &[Answer]) -> Result<(), String> {
    if answers.len() < 2 {
        return Err("Must have at least 2 answers".to_string());
    }

    if !answers.iter().any(|answer| answer.is_correct) {
        return Err("Must have at least one correct answer".to_string());
    }

    let mut labels = HashSet::new();
    for answer in answers {
        if answer.answer_text.trim().is_empty() {
            return Err("answer_text must not be empty".to_string());
        }
        if !labels.insert(answer.option_label) {
            return Err("Duplicate option label".to_string());
        }
    }

    Ok(())
}

/// Import a JSON array of question objects.
///
/// Each item is deserialized and validated on its own, so one bad item
/// never poisons the rest.
pub fn import_questions(
    store: &QuestionStore,
    items: Vec<serde_json::Value>,
    now: i64,
) -> ImportReport {
    let total = items.len();
    let mut imported = 0;
    let mut skipped = 0;
    let mut errors = Vec::new();

    for (index, value) in items.into_iter().enumerate() {
        let question: NewQuestion = match serde_json::from_value(value) {
            Ok(question) => question,
            Err(e) => {
                errors.push(ImportItemError {
                    index,
                    error: format!("Malformed question object: {e}"),
                });
                continue;
            }
        };

        if let Err(error) = validate_question(&question) {
            errors.push(ImportItemError { index, error });
            continue;
        }

        match store.insert(question, now) {
            Ok(_) => imported += 1,
            Err(QuestionStoreError::Duplicate) => skipped += 1,
        }
    }

    info!(
        total = total,
        imported = imported,
        skipped = skipped,
        errors = errors.len(),
        "Question import finished"
    );

    ImportReport {
        total,
        imported,
        skipped,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{ExamType, OptionLabel};
    use serde_json::json;

    fn answers_json() -> serde_json::Value {
        json!([
            {"answer_text": "Femur", "option_label": "a", "is_correct": true},
            {"answer_text": "Tibia", "option_label": "b", "is_correct": false}
        ])
    }

    fn item(number: u32) -> serde_json::Value {
        json!({
            "year": 2023,
            "study_year": 1,
            "module": "Anatomie",
            "speciality": "Medecine",
            "cours": ["Osteologie"],
            "exam_type": "EMD1",
            "number": number,
            "question_text": "Which bone?",
            "answers": answers_json()
        })
    }

    fn parse(value: serde_json::Value) -> NewQuestion {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(validate_question(&parse(item(1))).is_ok());
    }

    #[test]
    fn test_unknown_module_rejected() {
        let mut value = item(1);
        value["module"] = json!("Alchimie");
        assert!(validate_question(&parse(value)).unwrap_err().contains("Unknown module"));
    }

    #[test]
    fn test_exam_type_checked_against_curriculum() {
        // Physiologie in first year has EMD/RATTRAPAGE, not EMD1
        let mut value = item(1);
        value["module"] = json!("Physiologie");
        let error = validate_question(&parse(value)).unwrap_err();
        assert!(error.contains("not valid for module"));
    }

    #[test]
    fn test_unite_rules() {
        let mut value = item(1);
        value["unite"] = json!("Appareil Digestif");
        let error = validate_question(&parse(value)).unwrap_err();
        assert!(error.contains("First-year"));

        let second_year = json!({
            "year": 2023,
            "study_year": 2,
            "module": "Histologie",
            "unite": "Appareil Digestif",
            "speciality": "Medecine",
            "cours": ["Tube digestif"],
            "exam_type": "EMD",
            "number": 1,
            "question_text": "Q?",
            "answers": answers_json()
        });
        assert!(validate_question(&parse(second_year)).is_ok());

        let wrong_member = json!({
            "year": 2023,
            "study_year": 2,
            "module": "Biophysique",
            "unite": "Appareil Digestif",
            "speciality": "Medecine",
            "cours": ["Tube digestif"],
            "exam_type": "EMD",
            "number": 1,
            "question_text": "Q?",
            "answers": answers_json()
        });
        let error = validate_question(&parse(wrong_member)).unwrap_err();
        assert!(error.contains("does not belong to unite"));
    }

    #[test]
    fn test_answer_invariants() {
        let one_answer = vec![Answer {
            answer_text: "Femur".to_string(),
            image: None,
            option_label: OptionLabel::A,
            is_correct: true,
        }];
        assert!(validate_answers(&one_answer).unwrap_err().contains("at least 2"));

        let no_correct = vec![
            Answer {
                answer_text: "Femur".to_string(),
                image: None,
                option_label: OptionLabel::A,
                is_correct: false,
            },
            Answer {
                answer_text: "Tibia".to_string(),
                image: None,
                option_label: OptionLabel::B,
                is_correct: false,
            },
        ];
        assert!(validate_answers(&no_correct).unwrap_err().contains("correct answer"));

        let duplicate_label = vec![
            Answer {
                answer_text: "Femur".to_string(),
                image: None,
                option_label: OptionLabel::A,
                is_correct: true,
            },
            Answer {
                answer_text: "Tibia".to_string(),
                image: None,
                option_label: OptionLabel::A,
                is_correct: false,
            },
        ];
        assert!(validate_answers(&duplicate_label)
            .unwrap_err()
            .contains("Duplicate option label"));
    }

    #[test]
    fn test_import_report_counts() {
        let store = QuestionStore::new();

        // Pre-existing question makes item(1) a duplicate
        let existing = parse(item(1));
        store.insert(existing, 50).unwrap();

        let mut missing_field = item(4);
        missing_field.as_object_mut().unwrap().remove("question_text");

        let mut bad_answers = item(5);
        bad_answers["answers"] = json!([]);

        let batch = vec![item(1), item(2), item(3), missing_field, bad_answers];
        let report = import_questions(&store, batch, 100);

        assert_eq!(report.total, 5);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].index, 3);
        assert_eq!(report.errors[1].index, 4);

        // total = imported + skipped + errors
        assert_eq!(
            report.total,
            report.imported + report.skipped + report.errors.len()
        );
    }

    #[test]
    fn test_import_never_stores_partial_items() {
        let store = QuestionStore::new();

        let mut no_correct = item(1);
        no_correct["answers"] = json!([
            {"answer_text": "Femur", "option_label": "a", "is_correct": false},
            {"answer_text": "Tibia", "option_label": "b", "is_correct": false}
        ]);

        let report = import_questions(&store, vec![no_correct], 100);

        assert_eq!(report.imported, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(store.is_empty(), "failed item must leave no partial row");
    }

    #[test]
    fn test_import_accepts_legacy_cours_string() {
        let store = QuestionStore::new();
        let mut legacy = item(1);
        legacy["cours"] = json!("Osteologie");

        let report = import_questions(&store, vec![legacy], 100);
        assert_eq!(report.imported, 1);

        let stored = store.list(&crate::models::api::QuestionFilter {
            limit: 10,
            ..Default::default()
        });
        assert_eq!(stored[0].cours, vec!["Osteologie".to_string()]);
        assert_eq!(stored[0].exam_type, ExamType::Emd1);
    }
}
