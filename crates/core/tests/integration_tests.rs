//! Integration tests for the prompt library
//!
//! These tests verify:
//! - Persistence through the file-backed blob store across app instances
//! - The host command flow (create, search, copy/paste, delete)
//! - Recovery from partially corrupted and fully corrupted storage files

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

use prompt_pocket_core::clipboard::MemoryClipboard;
use prompt_pocket_core::commands::call;
use prompt_pocket_core::config::Config;
use prompt_pocket_core::store::{CreatePrompt, FileBlobStore, PromptStore};
use prompt_pocket_core::{App, ErrorKind};

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

fn app_in(dir: &TempDir, clipboard: Arc<MemoryClipboard>) -> App {
    App::from_config(config_in(dir), clipboard).unwrap()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[test]
fn test_prompts_survive_restart() {
    let dir = TempDir::new().unwrap();

    let first = app_in(&dir, Arc::new(MemoryClipboard::new()));
    let created = call(
        &first,
        "prompts.create",
        json!({"title": "Standup", "body": "Yesterday: {cursor}", "tags": "daily, work"}),
    );
    assert!(created.get("error").is_none(), "create failed: {}", created);
    drop(first);

    let second = app_in(&dir, Arc::new(MemoryClipboard::new()));
    let listed = call(&second, "prompts.list", Value::Null);
    let prompts = listed["prompts"].as_array().unwrap();

    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], created);
    assert_eq!(prompts[0]["tags"], json!(["daily", "work"]));
}

#[test]
fn test_full_command_flow() {
    let dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::with_text("let x = 1;"));
    let app = app_in(&dir, clipboard.clone());

    let review = call(
        &app,
        "prompts.create",
        json!({"title": "Review", "body": "Please review:\n{clipboard}", "tags": ["code"]}),
    );
    // Timestamps have millisecond resolution
    std::thread::sleep(Duration::from_millis(5));
    let note = call(&app, "prompts.create", json!({"title": "Note", "body": "Plain note"}));

    // Most recently updated first
    let listed = call(&app, "prompts.list", Value::Null);
    assert_eq!(listed["prompts"][0]["id"], note["id"]);

    let found = call(&app, "prompts.find_by_tag", json!({"tag": "CODE"}));
    assert_eq!(found["prompts"].as_array().unwrap().len(), 1);

    let searched = call(&app, "prompts.search", json!({"query": "plain"}));
    assert_eq!(searched["prompts"][0]["id"], note["id"]);

    let copied = call(&app, "prompts.copy", json!({"id": id_of(&review)}));
    assert_eq!(copied["style"], "success");
    assert_eq!(clipboard.contents().as_deref(), Some("Please review:\nlet x = 1;"));

    let pasted = call(&app, "prompts.paste", json!({"id": id_of(&note)}));
    assert_eq!(pasted["style"], "success");
    assert_eq!(clipboard.pasted(), vec!["Plain note".to_string()]);

    let fetched = call(&app, "prompts.get", json!({"id": id_of(&review)}));
    assert!(fetched["lastUsedAt"].is_string());
    assert_eq!(fetched["updatedAt"], review["updatedAt"]);

    let deleted = call(&app, "prompts.delete", json!({"id": id_of(&review)}));
    assert_eq!(deleted, json!({"success": true}));
    assert_eq!(call(&app, "prompts.count", Value::Null), json!({"count": 1}));
}

#[test]
fn test_errors_come_back_as_objects() {
    let dir = TempDir::new().unwrap();
    let app = app_in(&dir, Arc::new(MemoryClipboard::new()));

    let invalid = call(&app, "prompts.create", json!({"title": "   ", "body": "x"}));
    assert_eq!(invalid["error"], true);
    assert_eq!(invalid["kind"], "VALIDATION_FAILED");
    assert_eq!(invalid["message"], "Title is required");

    let missing = call(&app, "prompts.update", json!({"id": "missing", "title": "x"}));
    assert_eq!(missing["kind"], "PROMPT_NOT_FOUND");

    let unknown = call(&app, "prompts.rename", json!({}));
    assert_eq!(unknown["category"], "command");
}

#[test]
fn test_partially_corrupted_file_keeps_valid_records() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("prompts.json"),
        r#"[
            {"id": "good", "title": "Good", "body": "ok",
             "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"},
            {"id": "bad", "body": "no title"}
        ]"#,
    )
    .unwrap();

    let app = app_in(&dir, Arc::new(MemoryClipboard::new()));
    let listed = call(&app, "prompts.list", Value::Null);
    let prompts = listed["prompts"].as_array().unwrap();

    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0]["id"], "good");
}

#[test]
fn test_corrupted_file_is_reported_not_emptied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prompts.json");
    std::fs::write(&path, "{definitely not json").unwrap();

    let app = app_in(&dir, Arc::new(MemoryClipboard::new()));

    let listed = call(&app, "prompts.list", Value::Null);
    assert_eq!(listed["kind"], "STORAGE_READ_FAILED");

    let created = call(&app, "prompts.create", json!({"title": "t", "body": "b"}));
    assert_eq!(created["error"], true);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{definitely not json");
}

#[tokio::test]
async fn test_store_over_file_blobs() {
    let dir = TempDir::new().unwrap();
    let store = PromptStore::new(Arc::new(FileBlobStore::new(dir.path())));

    let created = store
        .create(CreatePrompt::new("Async", "body").with_tags(Vec::<String>::new()))
        .await
        .unwrap();
    assert_eq!(created.tags, None);

    let raw = std::fs::read_to_string(dir.path().join("prompts.json")).unwrap();
    assert!(!raw.contains("\"tags\""));

    store.clear().await.unwrap();
    assert!(!dir.path().join("prompts.json").exists());

    let err = store.delete(&created.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PromptNotFound);
}
