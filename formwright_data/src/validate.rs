use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed or dangling data in a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate ids and basic invariants of a questionnaire.
///
/// All problems are collected; validation does not stop at the first one.
///
/// ```
/// use formwright_data::{Question, QuestionType, Questionnaire, QuestionnaireSettings, validate_questionnaire};
/// use time::OffsetDateTime;
///
/// let now = OffsetDateTime::UNIX_EPOCH;
/// let questionnaire = Questionnaire {
///     id: "questionnaire-1".into(),
///     slug: "demo".into(),
///     title: "Demo".into(),
///     description: None,
///     questions: vec![Question::new("q1", QuestionType::Text, "Name?")],
///     settings: QuestionnaireSettings::default(),
///     created_at: now,
///     updated_at: now,
/// };
/// assert!(validate_questionnaire(&questionnaire).is_empty());
/// ```
pub fn validate_questionnaire(questionnaire: &Questionnaire) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if questionnaire.title.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "questionnaire title missing".to_string(),
        });
    }

    if questionnaire.settings.time_limit == Some(0) {
        errors.push(ValidationError::InvalidValue {
            context: "time limit must be at least one minute".to_string(),
        });
    }

    let mut questions = HashSet::new();
    track_ids(
        "question",
        questionnaire.questions.iter().map(|q| q.id.as_str()),
        &mut questions,
        &mut errors,
    );

    for question in &questionnaire.questions {
        validate_question(question, &mut errors);
    }

    errors
}

/// Validate a submitted response against the questionnaire it answers.
pub fn validate_response(questionnaire: &Questionnaire, response: &QuestionnaireResponse) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if response.questionnaire_id != questionnaire.id {
        errors.push(ValidationError::MissingReference {
            kind: "questionnaire",
            id: response.questionnaire_id.clone(),
            context: format!("response '{}'", response.id),
        });
    }

    let questions: HashSet<String> = questionnaire.questions.iter().map(|q| q.id.clone()).collect();
    for (question_id, answer) in &response.answers {
        check_ref(
            "question",
            question_id,
            &questions,
            format!("response '{}' answer", response.id),
            &mut errors,
        );
        let Some(question) = questionnaire.question(question_id) else {
            continue;
        };
        if !question.kind.has_options() {
            continue;
        }
        let picked: &[String] = match answer {
            Answer::Text(value) if value.is_empty() => &[],
            Answer::Text(value) => std::slice::from_ref(value),
            Answer::Choices(values) => values,
        };
        for value in picked {
            if !question.options().iter().any(|opt| &opt.value == value) {
                errors.push(ValidationError::InvalidValue {
                    context: format!("question '{question_id}' has no option with value '{value}'"),
                });
            }
        }
    }

    errors
}

fn validate_question(question: &Question, errors: &mut Vec<ValidationError>) {
    if question.kind.has_options() && question.options().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("{} question '{}' has no options", question.kind, question.id),
        });
    }

    let mut options = HashSet::new();
    track_ids(
        "option",
        question.options().iter().map(|o| o.id.as_str()),
        &mut options,
        errors,
    );

    if let (Some(min), Some(max)) = (question.min, question.max)
        && min > max
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("question '{}' min {min} exceeds max {max}", question.id),
        });
    }

    if let Some(step) = question.step
        && step <= 0.0
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("question '{}' step must be positive ({step})", question.id),
        });
    }

    if let Some(rules) = &question.validation
        && let (Some(min), Some(max)) = (rules.min_length, rules.max_length)
        && min > max
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("question '{}' minLength {min} exceeds maxLength {max}", question.id),
        });
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}
