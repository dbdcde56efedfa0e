// tests/ansible_runner.rs
//
// The process-backed collaborator, driven with stand-in scripts for the
// ansible binaries.
#![cfg(unix)]

mod common;
use crate::common::builders::write_executable;
use crate::common::init_tracing;

use lso::runner::{
    AnsibleProcessRunner, ExecutableSpec, ExecutionCollaborator, PlaybookSpec, RunEvent,
};
use lso::model::Inventory;
use serde_json::{Map, json};
use tokio::sync::mpsc;

async fn collect(mut rx: mpsc::Receiver<RunEvent>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(event) = rx.recv().await {
        lines.push(event.into_line());
    }
    lines
}

#[tokio::test]
async fn playbook_gets_inventory_vars_and_jsonl_callback() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let playbook_bin = write_executable(
        dir.path(),
        "ansible-playbook",
        r#"echo "{\"callback\": \"$ANSIBLE_STDOUT_CALLBACK\"}"
echo "inventory flag $1"
cat "$2"
echo
echo "vars flag $3"
cat "${4#@}"
echo
echo "playbook $5"
echo "noise" >&2
exit 2"#,
    );

    let runner = AnsibleProcessRunner::new(
        playbook_bin.to_str().unwrap(),
        "ansible-inventory",
    )
    .unwrap();

    let mut extra_vars = Map::new();
    extra_vars.insert("dry_run".to_string(), json!(true));
    let spec = PlaybookSpec {
        playbook_path: dir.path().join("deploy.yml"),
        inventory: Inventory::from("host1"),
        extra_vars,
    };

    let (tx, rx) = mpsc::channel(16);
    let collector = tokio::spawn(collect(rx));
    let outcome = runner.run_playbook(spec, tx).await.unwrap();
    let lines = collector.await.unwrap();

    assert_eq!(outcome.return_code, 2);
    assert_eq!(lines[0], r#"{"callback": "ansible.posix.jsonl"}"#);
    assert_eq!(lines[1], "inventory flag -i");
    assert_eq!(lines[2], "host1");
    assert_eq!(lines[3], "vars flag -e");
    assert_eq!(lines[4], r#"{"dry_run":true}"#);
    assert!(lines[5].ends_with("deploy.yml"), "{lines:?}");
    assert!(!lines.contains(&"noise".to_string()), "stderr is logged, not relayed");
}

#[tokio::test]
async fn executable_relays_both_streams() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_executable(dir.path(), "job.sh", "echo \"out $1\"\necho err >&2");
    let runner = AnsibleProcessRunner::new("ansible-playbook", "ansible-inventory").unwrap();

    let (tx, rx) = mpsc::channel(16);
    let collector = tokio::spawn(collect(rx));
    let outcome = runner
        .run_executable(
            ExecutableSpec {
                executable_path: script,
                args: vec!["x".to_string()],
            },
            tx,
        )
        .await
        .unwrap();
    let mut lines = collector.await.unwrap();
    lines.sort();

    assert_eq!(outcome.return_code, 0);
    assert_eq!(lines, vec!["err".to_string(), "out x".to_string()]);
}

#[tokio::test]
async fn missing_binary_is_an_error() {
    let runner = AnsibleProcessRunner::new("/nonexistent/ansible-playbook", "x").unwrap();
    let (tx, _rx) = mpsc::channel(1);

    let spec = PlaybookSpec {
        playbook_path: "deploy.yml".into(),
        inventory: Inventory::from("host1"),
        extra_vars: Map::new(),
    };

    assert!(runner.run_playbook(spec, tx).await.is_err());
}

#[tokio::test]
async fn inventory_warnings_are_collected() {
    let dir = tempfile::tempdir().unwrap();
    let inventory_bin = write_executable(
        dir.path(),
        "ansible-inventory",
        r#"echo '{"_meta": {}}'
echo '[WARNING]:  * Failed to parse inventory' >&2
echo 'plain stderr chatter' >&2
echo '[WARNING]: Unable to parse as an inventory source' >&2"#,
    );
    let runner =
        AnsibleProcessRunner::new("ansible-playbook", inventory_bin.to_str().unwrap()).unwrap();

    let problems = runner
        .check_inventory(&Inventory::from("[broken"))
        .await
        .unwrap();

    assert_eq!(problems.len(), 2, "{problems:?}");
    assert!(problems.iter().all(|p| p.starts_with("[WARNING]")));
}

#[tokio::test]
async fn clean_inventory_has_no_problems() {
    let dir = tempfile::tempdir().unwrap();
    let inventory_bin = write_executable(
        dir.path(),
        "ansible-inventory",
        r#"test "$1" = "-i" && test -f "$2" && test "$3" = "--list" || exit 5
echo '{"all": {"hosts": ["r1"]}}'"#,
    );
    let runner =
        AnsibleProcessRunner::new("ansible-playbook", inventory_bin.to_str().unwrap()).unwrap();

    let structured: Inventory =
        serde_json::from_value(json!({"all": {"hosts": {"r1": null}}})).unwrap();
    let problems = runner.check_inventory(&structured).await.unwrap();

    assert!(problems.is_empty(), "{problems:?}");
}

#[tokio::test]
async fn failing_inventory_tool_without_diagnostics_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let inventory_bin = write_executable(dir.path(), "ansible-inventory", "exit 1");
    let runner =
        AnsibleProcessRunner::new("ansible-playbook", inventory_bin.to_str().unwrap()).unwrap();

    let problems = runner.check_inventory(&Inventory::from("h")).await.unwrap();

    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("exited with status 1"), "{problems:?}");
}
