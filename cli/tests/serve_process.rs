//! Runs the real `dbassist serve` process and talks to it over stdio.

use dbassist_domain::{FailureKind, ToolCall};
use dbassist_infrastructure::{LaunchSpec, SessionOptions, ToolSession};
use std::path::Path;
use std::process::Command;

fn serve_spec(db: &Path) -> LaunchSpec {
    LaunchSpec::new(env!("CARGO_BIN_EXE_dbassist")).with_args([
        "serve",
        "--no-config",
        "--db",
        db.to_str().unwrap(),
    ])
}

#[tokio::test]
async fn session_with_serve_process() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("users.db");

    let session = ToolSession::open(&serve_spec(&db), SessionOptions::default())
        .await
        .unwrap();

    let mut names: Vec<&str> = session.tools().iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["create_table", "insert_user", "list_users"]);
    assert_eq!(session.server_info().name, "dbassist-tools");

    let created = session.invoke(&ToolCall::new("create_table")).await;
    assert_eq!(created.output(), Some("Table 'users' created successfully."));

    let insert = ToolCall::new("insert_user")
        .with_arg("name", "Bob")
        .with_arg("email", "bob@x.com");
    let first = session.invoke(&insert).await;
    assert_eq!(first.metadata.rows_affected, Some(1));

    let second = session.invoke(&insert).await;
    assert_eq!(second.failure_kind(), Some(FailureKind::Constraint));
    assert_eq!(second.metadata.rows_affected, Some(0));

    // Legacy alias reaches the same tool
    let listed = session.invoke(&ToolCall::new("get_users")).await;
    assert_eq!(
        listed.output(),
        Some("1 user(s):\n  - ID: 1, Name: Bob, Email: bob@x.com")
    );

    session.ping().await.unwrap();
    session.close().await;
    assert!(db.exists());
}

#[tokio::test]
async fn missing_server_binary_fails_to_open() {
    let spec = LaunchSpec::new("/nonexistent/dbassist-tools");
    assert!(ToolSession::open(&spec, SessionOptions::default()).await.is_err());
}

#[test]
fn call_subcommand_prints_json_result() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("users.db");
    let db = db.to_str().unwrap();

    let run = |args: &[&str]| {
        let output = Command::new(env!("CARGO_BIN_EXE_dbassist"))
            .args(["--no-config", "--db", db])
            .args(args)
            .env("NO_COLOR", "1")
            .output()
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        (output.status.success(), json)
    };

    let (ok, created) = run(&["call", "create_table", "-o", "json"]);
    assert!(ok);
    assert_eq!(created["tool_name"], "create_table");

    let (ok, _) = run(&[
        "call",
        "insert_user",
        "-a",
        "name=Ann",
        "-a",
        "email=ann@x.com",
        "-o",
        "json",
    ]);
    assert!(ok);

    let (ok, rejected) = run(&[
        "call",
        "insert_user",
        "-a",
        "name=Ann",
        "-a",
        "email=not-an-email",
        "-o",
        "json",
    ]);
    assert!(!ok);
    assert_eq!(rejected["tool_name"], "insert_user");

    let (ok, listed) = run(&["call", "list_users", "-o", "json"]);
    assert!(ok);
    assert_eq!(listed["data"][0]["email"], "ann@x.com");
}
