//! Integration tests for editor crate

use serde_json::json;
use sitedraft_editor::{
    path, AuthoringState, ContentState, ContentStore, ImportError, Path, TemplateId,
};

#[test]
fn test_valid_import_scenario() {
    let mut state = AuthoringState::new();

    let result = state.import(r#"{"content":{"site":{"name":"Acme"}}}"#);
    assert!(result.is_ok());
    assert_eq!(state.content.draft()["site"]["name"], json!("Acme"));
}

#[test]
fn test_missing_content_scenario() {
    let mut state = AuthoringState::new();
    assert_eq!(state.import(r#"{"foo":1}"#), Err(ImportError::MissingContent));
}

#[test]
fn test_malformed_json_scenario() {
    let mut state = AuthoringState::with_template(TemplateId::Bold);
    state.content.update_draft("site.name", "Keep me").unwrap();
    let before = state.content.draft().clone();

    let err = state.import("{not json").unwrap_err();
    assert!(matches!(err, ImportError::InvalidJson(_)));
    assert_eq!(state.content.draft(), &before);
    assert_eq!(state.template, TemplateId::Bold);
    assert_eq!(state.content.state(), ContentState::Dirty);
}

#[test]
fn test_bracket_path_write_scenario() {
    let tree = json!({"blog": [{"title": "A"}]});
    let path = Path::parse("blog[0].title").unwrap();

    let updated = path::set(&tree, &path, json!("B")).unwrap();
    assert_eq!(updated, json!({"blog": [{"title": "B"}]}));
}

#[test]
fn test_draft_publish_revert_algebra() {
    let mut store = ContentStore::new(json!({"hero": {"title": "Hello"}}));
    assert_eq!(store.state(), ContentState::Clean);
    assert_eq!(store.draft(), store.published());

    store.update_draft("hero.title", "Welcome").unwrap();
    assert_eq!(store.state(), ContentState::Dirty);
    assert_ne!(store.draft(), store.published());

    store.publish();
    assert_eq!(store.state(), ContentState::Clean);
    assert_eq!(store.draft(), store.published());

    let published = store.published().clone();
    store.revert();
    assert_eq!(store.state(), ContentState::Clean);
    assert_eq!(store.draft(), &published);
    assert_eq!(store.published(), &published);
}

#[test]
fn test_export_import_round_trip_clears_dirty_flag() {
    let mut state = AuthoringState::with_template(TemplateId::Modern);
    state.content.update_draft("site.name", "Acme").unwrap();
    state.content.update_draft("blog[0]", json!({"title": "First"})).unwrap();

    let envelope = state.export();
    let raw = serde_json::to_string(&envelope).unwrap();

    state.import(&raw).unwrap();
    assert_eq!(state.content.draft(), &envelope.content);
    assert_eq!(state.assets, envelope.asset_library);
    assert_eq!(state.template, TemplateId::Modern);
    assert!(!state.content.has_unsaved_changes());
}
