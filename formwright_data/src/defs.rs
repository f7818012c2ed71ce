use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Stable identifier used across questionnaire and roster references.
pub type Id = String;

/// Kind of input a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Radio,
    Checkbox,
    Select,
    Number,
    Email,
    Date,
    Rating,
}

impl QuestionType {
    /// Every question type, in palette order.
    pub const ALL: [QuestionType; 9] = [
        QuestionType::Text,
        QuestionType::Textarea,
        QuestionType::Radio,
        QuestionType::Checkbox,
        QuestionType::Select,
        QuestionType::Number,
        QuestionType::Email,
        QuestionType::Date,
        QuestionType::Rating,
    ];

    /// Human-facing label shown in the question palette.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Text => "Short Text",
            QuestionType::Textarea => "Long Text",
            QuestionType::Radio => "Single Choice",
            QuestionType::Checkbox => "Multiple Choice",
            QuestionType::Select => "Dropdown",
            QuestionType::Number => "Number",
            QuestionType::Email => "Email",
            QuestionType::Date => "Date",
            QuestionType::Rating => "Rating",
        }
    }

    /// Lowercase key used in serialized data.
    pub fn key(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Select => "select",
            QuestionType::Number => "number",
            QuestionType::Email => "email",
            QuestionType::Date => "date",
            QuestionType::Rating => "rating",
        }
    }

    /// Parse a serialized key back into a question type.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// True for types answered by picking from a list of options.
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Radio | QuestionType::Checkbox | QuestionType::Select)
    }

    /// True for types that accept several option values at once.
    pub fn is_multi_choice(self) -> bool {
        matches!(self, QuestionType::Checkbox)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: Id,
    pub label: String,
    pub value: String,
}

/// Extra answer constraints for free-text questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// A single question within a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

impl Question {
    /// Bare question of the given kind with no options or constraints.
    pub fn new(id: impl Into<Id>, kind: QuestionType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: None,
            required: false,
            options: None,
            placeholder: None,
            min: None,
            max: None,
            step: None,
            validation: None,
        }
    }

    /// Options of this question, empty when it has none.
    pub fn options(&self) -> &[QuestionOption] {
        self.options.as_deref().unwrap_or_default()
    }
}

/// Behavior switches for a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireSettings {
    #[serde(default = "default_true")]
    pub allow_anonymous: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
    #[serde(default)]
    pub randomize_questions: bool,
    /// Time limit in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

impl Default for QuestionnaireSettings {
    fn default() -> Self {
        Self {
            allow_anonymous: true,
            show_progress: true,
            randomize_questions: false,
            time_limit: None,
        }
    }
}

/// Top-level questionnaire document, as exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub id: Id,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub settings: QuestionnaireSettings,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Questionnaire {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A respondent's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Choices(Vec<String>),
}

impl Answer {
    /// True when nothing was entered or chosen.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Text(text) => text.is_empty(),
            Answer::Choices(values) => values.is_empty(),
        }
    }
}

/// A completed submission for a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub id: Id,
    pub questionnaire_id: Id,
    #[serde(default)]
    pub answers: BTreeMap<Id, Answer>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_id: Option<String>,
}

/// Entry of a simple named list such as professors or facilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: Id,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_keys_round_trip() {
        for kind in QuestionType::ALL {
            assert_eq!(QuestionType::from_key(kind.key()), Some(kind));
        }
        assert_eq!(QuestionType::from_key("slider"), None);
    }

    #[test]
    fn only_choice_types_have_options() {
        let choice: Vec<_> = QuestionType::ALL.into_iter().filter(|k| k.has_options()).collect();
        assert_eq!(
            choice,
            vec![QuestionType::Radio, QuestionType::Checkbox, QuestionType::Select]
        );
    }

    #[test]
    fn question_json_uses_type_key_and_camel_case() {
        let mut question = Question::new("q1", QuestionType::Textarea, "Tell us more");
        question.validation = Some(ValidationRules {
            min_length: Some(3),
            ..ValidationRules::default()
        });
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "textarea");
        assert_eq!(json["validation"]["minLength"], 3);
        assert!(json.get("options").is_none());
    }

    #[test]
    fn settings_default_when_missing() {
        let settings: QuestionnaireSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, QuestionnaireSettings::default());
    }

    #[test]
    fn answers_deserialize_untagged() {
        let text: Answer = serde_json::from_str("\"hello\"").unwrap();
        let choices: Answer = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(text, Answer::Text("hello".into()));
        assert_eq!(choices, Answer::Choices(vec!["a".into(), "b".into()]));
        assert!(Answer::Choices(Vec::new()).is_blank());
    }
}
