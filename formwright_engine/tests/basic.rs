use fe::*;
use formwright_data::{Answer, NamedEntity, QuestionType, validate_response};
use formwright_engine as fe;
use std::collections::HashSet;

fn two_entries() -> OrderedStore<NamedEntity> {
    OrderedStore::from_items("entry", [NamedEntity::new("a", "X"), NamedEntity::new("b", "Y")]).unwrap()
}

#[test]
fn test_sanitize_title() {
    assert_eq!(slug::sanitize("  My Great Title!! "), "my-great-title");
}

#[test]
fn test_slug_validity() {
    assert!(!slug::is_valid("ab"));
    assert!(slug::is_valid("a1-b2"));
}

#[test]
fn test_unique_slug() {
    let existing: HashSet<String> = ["survey".to_string(), "survey-1".to_string()].into();
    assert_eq!(slug::unique("survey", &existing), "survey-2");
    assert_eq!(slug::unique("poll", &existing), "poll");
}

#[test]
fn test_move_first_to_end() {
    let store = two_entries().move_to(&"a".to_string(), 1).unwrap();
    let ids: Vec<_> = store.ids().cloned().collect();
    assert_eq!(ids, ["b", "a"]);
}

#[test]
fn test_delete_from_empty_store() {
    let store: OrderedStore<NamedEntity> = OrderedStore::new("entry");
    assert_eq!(
        store.delete_by_id(&"x".to_string()).unwrap_err(),
        StoreError::UnknownIdentifier("x".into())
    );
}

#[test]
fn test_delete_selected_clears_selection() {
    let store = two_entries().select_by_id(&"b".to_string()).unwrap();
    assert_eq!(store.selected().map(|e| e.name.as_str()), Some("Y"));
    let store = store.delete_by_id(&"b".to_string()).unwrap();
    assert!(store.selected_id().is_none());
}

#[test]
fn test_questionnaire_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = EditorConfig::default();
    let draft = QuestionnaireDraft::new("Course Evaluation", &config)
        .add_question(QuestionType::Rating)?
        .add_question(QuestionType::Checkbox)?;
    let rating = draft.questions().get(0).unwrap().id.clone();
    let draft = draft.move_question(&rating, 5)?;

    for name in ["eval.json", "eval.ron"] {
        let path = dir.path().join(name);
        write_questionnaire(&path, &draft.to_questionnaire())?;
        let loaded = read_questionnaire(&path)?;
        assert_eq!(loaded, draft.to_questionnaire());
        assert_eq!(loaded.slug, "course-evaluation");
        assert_eq!(loaded.questions[1].id, rating);

        let reopened = QuestionnaireDraft::from_questionnaire(loaded, &config)?;
        assert!(reopened.check().is_empty());
        let reopened = reopened.add_question(QuestionType::Text)?;
        assert_eq!(reopened.selected_question().unwrap().id, "question-3");
    }
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_questionnaire(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn test_fill_in_and_submit() {
    let questionnaire = QuestionnaireDraft::new("Quick Poll", &EditorConfig::default())
        .add_question(QuestionType::Radio)
        .unwrap()
        .update_question(&"question-1".to_string(), |mut q| {
            q.required = true;
            q
        })
        .unwrap()
        .to_questionnaire();

    let mut session = ResponseSession::start(&questionnaire);
    assert!(!session.is_step_valid());
    session
        .answer("question-1", Answer::Text("option-2".into()))
        .unwrap();
    assert!(session.is_step_valid());
    assert!(session.is_last_step());
    assert_eq!(session.progress_percent(), 100);

    let response = session.submit(Some("student-7")).unwrap();
    assert!(validate_response(&questionnaire, &response).is_empty());
}

#[test]
fn test_rosters_share_the_store_behaviour() {
    for kind in [RosterKind::Professor, RosterKind::Facility, RosterKind::Maintenance] {
        let roster = Roster::new(kind).add("First").unwrap().add("Second").unwrap();
        let first = roster.entries().get(0).unwrap().id.clone();
        assert!(first.starts_with(kind.namespace()));
        let roster = roster.duplicate(&first).unwrap();
        let names: Vec<_> = roster.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["First", "First (Copy)", "Second"]);
    }
}
