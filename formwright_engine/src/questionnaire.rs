//! Questionnaire builder model.
//!
//! A [`QuestionnaireDraft`] is what the builder screen edits: questionnaire
//! metadata, a slug kept in step with the title, and the question list held in
//! an [`OrderedStore`]. Like the store, a draft is a value; every edit returns
//! the next draft and refreshes `updated_at`.

use std::collections::HashSet;

use formwright_data::{
    Id, Question, QuestionOption, QuestionType, Questionnaire, QuestionnaireSettings, ValidationError,
    validate_questionnaire,
};
use log::debug;
use time::OffsetDateTime;

use crate::config::EditorConfig;
use crate::idgen::{NAMESPACE_OPTION, NAMESPACE_QUESTION, prefixed_id};
use crate::slug::{self, MAX_LEN, MIN_LEN, SlugCodec};
use crate::store::{OrderedStore, Record, StoreError, copy_label};

impl Record for Question {
    type Id = Id;

    fn id(&self) -> &Id {
        &self.id
    }

    fn duplicate(&self, id: Id) -> Self {
        Question {
            id,
            title: copy_label(&self.title),
            ..self.clone()
        }
    }
}

impl Record for QuestionOption {
    type Id = Id;

    fn id(&self) -> &Id {
        &self.id
    }

    fn duplicate(&self, id: Id) -> Self {
        QuestionOption {
            id,
            label: copy_label(&self.label),
            value: format!("{}-copy", self.value),
        }
    }
}

/// Message shown next to a slug that fails [`slug::is_valid`].
pub fn slug_error_message() -> String {
    format!("Slug must be {MIN_LEN}-{MAX_LEN} characters, contain only lowercase letters, numbers, and hyphens")
}

/// Option value derived from a label: trimmed, lowercased, whitespace runs
/// replaced by hyphens.
pub fn option_value(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Question as first inserted from the palette.
pub fn new_question(id: Id, kind: QuestionType) -> Question {
    let mut question = Question::new(id, kind, format!("New {}", kind.label()));
    if kind.has_options() {
        question.options = Some(
            (1..=2)
                .map(|n| QuestionOption {
                    id: format!("{NAMESPACE_OPTION}-{n}"),
                    label: format!("Option {n}"),
                    value: format!("{NAMESPACE_OPTION}-{n}"),
                })
                .collect(),
        );
    }
    question
}

/// Editable questionnaire state.
#[derive(Debug, Clone)]
pub struct QuestionnaireDraft {
    id: Id,
    slug: String,
    slug_error: Option<String>,
    title: String,
    description: Option<String>,
    settings: QuestionnaireSettings,
    questions: OrderedStore<Question>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    codec: SlugCodec,
}

impl QuestionnaireDraft {
    /// Fresh, empty questionnaire titled `title`.
    pub fn new(title: &str, config: &EditorConfig) -> Self {
        let codec = config.slug_codec();
        let slug = codec.from_title(title);
        let now = OffsetDateTime::now_utc();
        Self {
            id: prefixed_id("questionnaire"),
            slug_error: slug_problem(&slug),
            slug,
            title: title.to_string(),
            description: None,
            settings: config.settings(),
            questions: OrderedStore::new(NAMESPACE_QUESTION),
            created_at: now,
            updated_at: now,
            codec,
        }
    }

    /// Draft editing an existing questionnaire, e.g. one just imported.
    ///
    /// # Errors
    /// `DuplicateIdentifier` if two questions share an id.
    pub fn from_questionnaire(questionnaire: Questionnaire, config: &EditorConfig) -> Result<Self, StoreError> {
        let questions = OrderedStore::from_items(NAMESPACE_QUESTION, questionnaire.questions)?;
        Ok(Self {
            id: questionnaire.id,
            slug_error: slug_problem(&questionnaire.slug),
            slug: questionnaire.slug,
            title: questionnaire.title,
            description: questionnaire.description,
            settings: questionnaire.settings,
            questions,
            created_at: questionnaire.created_at,
            updated_at: questionnaire.updated_at,
            codec: config.slug_codec(),
        })
    }

    /// Snapshot as the exportable data model.
    pub fn to_questionnaire(&self) -> Questionnaire {
        Questionnaire {
            id: self.id.clone(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            questions: self.questions.to_vec(),
            settings: self.settings.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Why the current slug is unusable, if it is.
    pub fn slug_error(&self) -> Option<&str> {
        self.slug_error.as_deref()
    }

    pub fn settings(&self) -> &QuestionnaireSettings {
        &self.settings
    }

    pub fn questions(&self) -> &OrderedStore<Question> {
        &self.questions
    }

    pub fn selected_question(&self) -> Option<&Question> {
        self.questions.selected()
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Public path of the questionnaire, available only while the slug is valid.
    pub fn share_path(&self) -> Option<String> {
        (self.slug_error.is_none() && !self.slug.is_empty()).then(|| format!("/questionnaire/{}", self.slug))
    }

    /// Structural problems plus an unusable slug.
    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = validate_questionnaire(&self.to_questionnaire());
        if let Some(problem) = &self.slug_error {
            errors.push(ValidationError::InvalidValue {
                context: format!("slug '{}': {problem}", self.slug),
            });
        }
        errors
    }

    /// Change the title and derive a new slug from it.
    pub fn set_title(&self, title: &str) -> Self {
        let mut next = self.with_slug(self.codec.from_title(title));
        next.title = title.to_string();
        next
    }

    pub fn set_description(&self, description: &str) -> Self {
        let mut next = self.touched();
        next.description = (!description.trim().is_empty()).then(|| description.to_string());
        next
    }

    /// Take a hand-edited slug. The input is sanitized; if the result is still
    /// invalid it is kept and [`slug_error`](Self::slug_error) explains why.
    pub fn set_slug(&self, raw: &str) -> Self {
        self.with_slug(slug::sanitize(raw))
    }

    /// Derive the slug from the current title again.
    pub fn regenerate_slug(&self) -> Self {
        self.with_slug(self.codec.from_title(&self.title))
    }

    /// Suffix the slug so it does not collide with `existing`.
    pub fn claim_unique_slug(&self, existing: &HashSet<String>) -> Self {
        self.with_slug(slug::unique(&self.slug, existing))
    }

    pub fn update_settings(&self, edit: impl FnOnce(&mut QuestionnaireSettings)) -> Self {
        let mut next = self.touched();
        edit(&mut next.settings);
        next
    }

    /// Append a new question of `kind` and select it.
    ///
    /// # Errors
    /// Only on a broken store invariant; see [`OrderedStore::append_with`].
    pub fn add_question(&self, kind: QuestionType) -> Result<Self, StoreError> {
        let (questions, id) = self.questions.append_with(|id| new_question(id, kind))?;
        debug!("added {kind} question '{id}'");
        Ok(self.with_questions(questions.select_by_id(&id)?))
    }

    /// Apply `edit` to question `id`. The edit must not change the id.
    ///
    /// # Errors
    /// `UnknownIdentifier` or `IdentifierMismatch` from the store.
    pub fn update_question(&self, id: &Id, edit: impl FnOnce(Question) -> Question) -> Result<Self, StoreError> {
        Ok(self.with_questions(self.questions.update_by_id(id, edit)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn delete_question(&self, id: &Id) -> Result<Self, StoreError> {
        let questions = self.questions.delete_by_id(id)?;
        debug!("deleted question '{id}'");
        Ok(self.with_questions(questions))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn duplicate_question(&self, id: &Id) -> Result<Self, StoreError> {
        Ok(self.with_questions(self.questions.duplicate_by_id(id)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn move_question(&self, id: &Id, new_index: usize) -> Result<Self, StoreError> {
        Ok(self.with_questions(self.questions.move_to(id, new_index)?))
    }

    /// Selection does not count as an edit and leaves `updated_at` alone.
    ///
    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn select_question(&self, id: &Id) -> Result<Self, StoreError> {
        let mut next = self.clone();
        next.questions = self.questions.select_by_id(id)?;
        Ok(next)
    }

    pub fn deselect_question(&self) -> Self {
        let mut next = self.clone();
        next.questions = self.questions.deselect();
        next
    }

    /// Add an answer option to question `question_id`. Blank labels are ignored.
    ///
    /// # Errors
    /// `UnknownIdentifier` if the question is absent, `DuplicateIdentifier` if
    /// its existing options already share an id.
    pub fn add_option(&self, question_id: &Id, label: &str) -> Result<Self, StoreError> {
        let label = label.trim();
        if label.is_empty() {
            debug!("ignoring blank option label for question '{question_id}'");
            return Ok(self.clone());
        }
        self.edit_options(question_id, |options| {
            let (options, _) = options.append_with(|id| QuestionOption {
                id,
                label: label.to_string(),
                value: option_value(label),
            })?;
            Ok(options)
        })
    }

    /// # Errors
    /// `UnknownIdentifier` if the question or option is absent.
    pub fn update_option_label(&self, question_id: &Id, option_id: &Id, label: &str) -> Result<Self, StoreError> {
        self.edit_options(question_id, |options| {
            options.update_by_id(option_id, |mut option| {
                option.label = label.to_string();
                option
            })
        })
    }

    /// # Errors
    /// `UnknownIdentifier` if the question or option is absent.
    pub fn delete_option(&self, question_id: &Id, option_id: &Id) -> Result<Self, StoreError> {
        self.edit_options(question_id, |options| options.delete_by_id(option_id))
    }

    /// Copy option `option_id` directly after itself. The copy's value gets a
    /// `-copy` suffix so the two stay distinguishable in responses.
    ///
    /// # Errors
    /// `UnknownIdentifier` if the question or option is absent.
    pub fn duplicate_option(&self, question_id: &Id, option_id: &Id) -> Result<Self, StoreError> {
        self.edit_options(question_id, |options| options.duplicate_by_id(option_id))
    }

    fn edit_options(
        &self,
        question_id: &Id,
        edit: impl FnOnce(OrderedStore<QuestionOption>) -> Result<OrderedStore<QuestionOption>, StoreError>,
    ) -> Result<Self, StoreError> {
        let question = self
            .questions
            .find(question_id)
            .ok_or_else(|| StoreError::UnknownIdentifier(question_id.clone()))?;
        let options = OrderedStore::from_items(NAMESPACE_OPTION, question.options().iter().cloned())?;
        let options = edit(options)?.to_vec();
        self.update_question(question_id, |mut question| {
            question.options = Some(options);
            question
        })
    }

    fn with_questions(&self, questions: OrderedStore<Question>) -> Self {
        let mut next = self.touched();
        next.questions = questions;
        next
    }

    fn with_slug(&self, slug: String) -> Self {
        let mut next = self.touched();
        next.slug_error = slug_problem(&slug);
        next.slug = slug;
        next
    }

    fn touched(&self) -> Self {
        let mut next = self.clone();
        next.updated_at = OffsetDateTime::now_utc();
        next
    }
}

fn slug_problem(slug: &str) -> Option<String> {
    (!slug::is_valid(slug)).then(slug_error_message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionnaireDraft {
        QuestionnaireDraft::new("New Questionnaire", &EditorConfig::default())
    }

    fn qid(draft: &QuestionnaireDraft, index: usize) -> Id {
        draft.questions().get(index).unwrap().id.clone()
    }

    #[test]
    fn new_draft_derives_slug_from_title() {
        let draft = draft();
        assert_eq!(draft.slug(), "new-questionnaire");
        assert_eq!(draft.slug_error(), None);
        assert_eq!(draft.share_path().as_deref(), Some("/questionnaire/new-questionnaire"));
        assert!(draft.id().starts_with("questionnaire-"));
        assert!(draft.questions().is_empty());
    }

    #[test]
    fn title_changes_regenerate_slug() {
        let draft = draft().set_title("  Staff Feedback 2024! ");
        assert_eq!(draft.title(), "  Staff Feedback 2024! ");
        assert_eq!(draft.slug(), "staff-feedback-2024");

        let blank = draft.set_title("");
        assert!(blank.slug().starts_with("questionnaire-"));
        assert_eq!(blank.slug_error(), None);

        let short = draft.set_title("Hi");
        assert_eq!(short.slug(), "hi");
        assert_eq!(short.slug_error(), Some(slug_error_message().as_str()));
        assert_eq!(short.share_path(), None);
    }

    #[test]
    fn hand_edited_slug_is_sanitized_and_checked() {
        let draft = draft().set_slug("My_Custom Slug");
        assert_eq!(draft.slug(), "my-custom-slug");
        assert!(draft.slug_error().is_none());

        let bad = draft.set_slug("!!");
        assert_eq!(bad.slug(), "");
        assert!(bad.slug_error().is_some());
        assert!(bad.check().iter().any(|e| e.to_string().contains("slug")));

        let fixed = bad.regenerate_slug();
        assert_eq!(fixed.slug(), "new-questionnaire");
    }

    #[test]
    fn claim_unique_slug_suffixes() {
        let taken: HashSet<String> = ["new-questionnaire".to_string(), "new-questionnaire-1".to_string()].into();
        assert_eq!(draft().claim_unique_slug(&taken).slug(), "new-questionnaire-2");
    }

    #[test]
    fn add_question_selects_it_with_defaults() {
        let draft = draft().add_question(QuestionType::Radio).unwrap();
        let question = draft.selected_question().unwrap();
        assert_eq!(question.id, "question-1");
        assert_eq!(question.title, "New Single Choice");
        let labels: Vec<_> = question.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Option 1", "Option 2"]);

        let draft = draft.add_question(QuestionType::Email).unwrap();
        let email = draft.selected_question().unwrap();
        assert_eq!(email.id, "question-2");
        assert!(email.options.is_none());
        assert!(draft.updated_at() >= draft.created_at());
    }

    #[test]
    fn duplicate_question_lands_after_original() {
        let draft = draft()
            .add_question(QuestionType::Text)
            .unwrap()
            .add_question(QuestionType::Number)
            .unwrap();
        let first = qid(&draft, 0);
        let draft = draft.duplicate_question(&first).unwrap();
        let titles: Vec<_> = draft.questions().iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, ["New Short Text", "New Short Text (Copy)", "New Number"]);
        assert_eq!(qid(&draft, 1), "question-3");
    }

    #[test]
    fn delete_selected_question_clears_editor_pane() {
        let draft = draft().add_question(QuestionType::Date).unwrap();
        let id = qid(&draft, 0);
        let draft = draft.delete_question(&id).unwrap();
        assert!(draft.selected_question().is_none());
        assert_eq!(
            draft.delete_question(&id).unwrap_err(),
            StoreError::UnknownIdentifier(id)
        );
    }

    #[test]
    fn move_and_update_question() {
        let draft = draft()
            .add_question(QuestionType::Text)
            .unwrap()
            .add_question(QuestionType::Rating)
            .unwrap();
        let first = qid(&draft, 0);
        let draft = draft.move_question(&first, 1).unwrap();
        assert_eq!(qid(&draft, 1), first);

        let draft = draft
            .update_question(&first, |mut q| {
                q.required = true;
                q
            })
            .unwrap();
        assert!(draft.questions().find(&first).unwrap().required);
    }

    #[test]
    fn option_editing() {
        let draft = draft().add_question(QuestionType::Checkbox).unwrap();
        let id = qid(&draft, 0);

        let draft = draft.add_option(&id, "  Very  Likely ").unwrap();
        let added = draft.questions().find(&id).unwrap().options()[2].clone();
        assert_eq!(added.id, "option-3");
        assert_eq!(added.label, "Very  Likely");
        assert_eq!(added.value, "very-likely");

        let unchanged = draft.add_option(&id, "   ").unwrap();
        assert_eq!(unchanged.questions().find(&id).unwrap().options().len(), 3);

        let draft = draft.update_option_label(&id, &"option-1".to_string(), "Yes").unwrap();
        let draft = draft.delete_option(&id, &"option-2".to_string()).unwrap();
        let options = draft.questions().find(&id).unwrap().options().to_vec();
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Yes", "Very  Likely"]);

        assert!(draft.delete_option(&id, &"option-9".to_string()).is_err());
        assert!(draft.add_option(&"question-9".to_string(), "x").is_err());
    }

    #[test]
    fn duplicate_option_lands_after_original() {
        let draft = draft().add_question(QuestionType::Select).unwrap();
        let id = qid(&draft, 0);
        let draft = draft.duplicate_option(&id, &"option-1".to_string()).unwrap();
        let options = draft.questions().find(&id).unwrap().options().to_vec();
        let summary: Vec<_> = options
            .iter()
            .map(|o| (o.id.as_str(), o.label.as_str(), o.value.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("option-1", "Option 1", "option-1"),
                ("option-3", "Option 1 (Copy)", "option-1-copy"),
                ("option-2", "Option 2", "option-2"),
            ]
        );
        assert!(draft.check().is_empty());
        assert!(draft.duplicate_option(&id, &"option-9".to_string()).is_err());
    }

    #[test]
    fn round_trips_through_data_model() {
        let draft = draft()
            .add_question(QuestionType::Select)
            .unwrap()
            .set_description("About the team")
            .update_settings(|s| s.time_limit = Some(15));
        let questionnaire = draft.to_questionnaire();
        let restored = QuestionnaireDraft::from_questionnaire(questionnaire.clone(), &EditorConfig::default()).unwrap();
        assert_eq!(restored.to_questionnaire(), questionnaire);
        assert!(restored.selected_question().is_none());
        assert!(restored.check().is_empty());
    }

    #[test]
    fn import_with_duplicate_question_ids_is_rejected() {
        let mut questionnaire = draft().add_question(QuestionType::Text).unwrap().to_questionnaire();
        questionnaire.questions.push(questionnaire.questions[0].clone());
        let err = QuestionnaireDraft::from_questionnaire(questionnaire, &EditorConfig::default()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateIdentifier("question-1".into()));
    }
}
