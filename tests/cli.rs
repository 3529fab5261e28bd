//! End-to-end tests for the tagsync binary.
//!
//! Stdout is a pipe under assert_cmd, so every command answers in JSON.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r##"{
    "tag_handlers": {
        "#thought": {
            "type": "thought",
            "script": "scripts/add-thought.sh",
            "description": "Short thoughts",
            "aliases": ["#idea"]
        }
    },
    "default_handler": {"description": "Blog post fallback"}
}"##;

const NOTES: &str = r##"[
    {
        "id": "n1",
        "title": "Hello world",
        "body": "#misc Hello there",
        "modification_date": "2024-03-02T10:30:00+08:00",
        "tags": ["#misc"]
    },
    {"id": "n2", "title": "Untagged", "body": "nothing here"}
]"##;

fn tagsync(site: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tagsync").unwrap();
    cmd.current_dir(site)
        .env_remove("RUST_LOG")
        .env_remove("TAGSYNC_CONFIG")
        .env_remove("TAGSYNC_STATE")
        .env_remove("TAGSYNC_NOTES")
        .env_remove("MASTODON_BASE_URL")
        .env_remove("MASTODON_ACCESS_TOKEN")
        .env_remove("MASTODON_VISIBILITY")
        .arg("--site-root")
        .arg(site);
    cmd
}

fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("multi_tag_config.json"), CONFIG).unwrap();
    fs::write(dir.path().join("notes.json"), NOTES).unwrap();
    dir
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_version_json() {
    let dir = TempDir::new().unwrap();
    let output = tagsync(dir.path()).arg("version").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_tags_lists_registry() {
    let dir = site();
    let output = tagsync(dir.path()).arg("tags").output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["tags"][0]["tag"], "#thought");
    assert_eq!(json["tags"][0]["type"], "thought");
    assert_eq!(json["tags"][0]["aliases"][0], "#idea");
    assert_eq!(json["default_handler"], "Blog post fallback");
}

#[test]
fn test_missing_config_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let output = tagsync(dir.path())
        .args(["-q", "--config", "nope.json", "tags"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "CONFIG_NOT_FOUND");
}

#[test]
fn test_sync_runs_default_handler_once() {
    let dir = site();

    let output = tagsync(dir.path())
        .arg("--no-hashtags-json")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = stdout_json(&output);
    assert_eq!(report["stats"]["success"], 1);
    assert_eq!(report["stats"]["unknown_tags"], 1);
    assert_eq!(report["scanned"], 2);
    assert_eq!(report["tagged"], 1);
    assert_eq!(report["state_saved"], true);

    let article = dir.path().join("content/blog/2024-03-02-hello-world.md");
    let text = fs::read_to_string(article).unwrap();
    assert!(text.contains("Hello there"));
    assert!(!text.contains("#misc Hello"));

    let state = fs::read_to_string(dir.path().join("multi_tag_sync_state.json")).unwrap();
    assert!(state.contains("n1"));

    // Second run skips the note.
    let output = tagsync(dir.path())
        .args(["sync", "--no-hashtags-json"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    assert_eq!(report["stats"]["success"], 0);
    assert_eq!(report["stats"]["skipped"], 1);
}

#[test]
fn test_reset_clears_state() {
    let dir = site();
    fs::write(
        dir.path().join("multi_tag_sync_state.json"),
        r#"{"processed_notes": ["a", "b"]}"#,
    )
    .unwrap();

    let output = tagsync(dir.path()).arg("reset").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["cleared"], 2);
    assert!(!dir.path().join("multi_tag_sync_state.json").exists());
}

#[test]
fn test_list_reports_pending_notes() {
    let dir = site();
    let output = tagsync(dir.path())
        .args(["list", "--no-hashtags-json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["count"], 1);
    assert_eq!(json["notes"][0]["id"], "n1");
    assert_eq!(json["notes"][0]["processed"], false);
}
