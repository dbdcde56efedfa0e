// tests/output_filter.rs

mod common;
use crate::common::builders::{host_record, play_banner, stats_record};

use lso::filter::{DENYLISTED_FIELDS, UNPARSABLE_KEY, filter_output, filter_records};
use serde_json::{Map, Value, json};

fn hosts_of(record: &Value) -> &Map<String, Value> {
    record["hosts"].as_object().expect("per-host record")
}

#[test]
fn successful_run_keeps_changed_steps_and_summary() {
    let lines = vec![
        play_banner("deploy"),
        host_record("host1", json!({"changed": false, "msg": "noop"})),
        host_record("host1", json!({"changed": true, "msg": "updated"})),
        stats_record("host1", 1, 0),
    ];

    let out = filter_output(&lines, 0);

    assert_eq!(out.len(), 2, "{out:#?}");
    assert_eq!(hosts_of(&out[0])["host1"]["msg"], "updated");
    assert!(out[1].get("stats").is_some());
}

#[test]
fn failed_run_keeps_every_host_step() {
    let lines = vec![
        host_record("host1", json!({"changed": false, "msg": "ok"})),
        host_record("host1", json!({"failed": true, "msg": "boom"})),
        stats_record("host1", 0, 1),
    ];

    let out = filter_output(&lines, 2);

    assert_eq!(out.len(), 3);
    assert_eq!(hosts_of(&out[1])["host1"]["msg"], "boom");
}

#[test]
fn unchanged_successful_run_reduces_to_summary() {
    let lines = vec![
        play_banner("deploy"),
        host_record("host1", json!({"changed": false})),
        host_record("host2", json!({"changed": false})),
        stats_record("host1", 0, 0),
    ];

    let out = filter_output(&lines, 0);

    let summary: Value = serde_json::from_str(&lines[3]).unwrap();
    assert_eq!(out, vec![summary]);
}

#[test]
fn unparsable_lines_are_wrapped_and_kept() {
    let lines = vec![
        "PLAY RECAP *****".to_string(),
        "".to_string(),
        "[1, 2, 3]".to_string(),
        stats_record("host1", 0, 0),
    ];

    let out = filter_output(&lines, 0);

    assert_eq!(out.len(), 3);
    assert_eq!(out[0], json!({UNPARSABLE_KEY: "PLAY RECAP *****"}));
    assert_eq!(out[1], json!({UNPARSABLE_KEY: "[1, 2, 3]"}));
}

#[test]
fn denylisted_fields_are_stripped() {
    let mut result = json!({"changed": true, "msg": "done"});
    for field in DENYLISTED_FIELDS {
        result[*field] = json!("noise");
    }

    let out = filter_output(&[host_record("host1", result)], 0);

    let host = &hosts_of(&out[0])["host1"];
    for field in DENYLISTED_FIELDS {
        assert!(host.get(*field).is_none(), "{field} should be stripped");
    }
    assert_eq!(host["msg"], "done");
}

#[test]
fn staging_steps_are_dropped_on_success_only() {
    let staging = host_record(
        "host1",
        json!({"changed": true, "state": "directory", "path": "/tmp/x"}),
    );

    assert!(filter_output(&[staging.clone()], 0).is_empty());
    assert_eq!(filter_output(&[staging], 1).len(), 1);
}

#[test]
fn mixed_staging_step_is_kept() {
    let line = json!({
        "hosts": {
            "host1": {"changed": true, "state": "file"},
            "host2": {"changed": true, "state": "present"},
        }
    })
    .to_string();

    assert_eq!(filter_output(&[line], 0).len(), 1);
}

#[test]
fn diff_lines_replace_raw_diff() {
    let line = host_record(
        "host1",
        json!({
            "changed": true,
            "diff_lines": ["-a", "+b"],
            "diff": {"before": "a", "after": "b"},
        }),
    );

    let out = filter_output(&[line], 0);

    let host = &hosts_of(&out[0])["host1"];
    assert!(host.get("diff").is_none());
    assert_eq!(host["diff_lines"], json!(["-a", "+b"]));
}

#[test]
fn prepared_diff_drops_before_and_after() {
    let line = host_record(
        "host1",
        json!({
            "changed": true,
            "diff": {"prepared": "[edit]\n+ set x", "before": "<a/>", "after": "<b/>"},
        }),
    );

    let out = filter_output(&[line], 0);

    assert_eq!(
        hosts_of(&out[0])["host1"]["diff"],
        json!({"prepared": "[edit]\n+ set x"})
    );
}

#[test]
fn xml_diff_is_reduced_to_first_difference() {
    let before = "<configuration><system><host-name>r1</host-name></system></configuration>";
    let after = "<configuration><system><host-name>r2</host-name></system></configuration>";
    let line = host_record(
        "host1",
        json!({"changed": true, "diff": {"before": before, "after": after}}),
    );

    let out = filter_output(&[line], 0);

    let diff = &hosts_of(&out[0])["host1"]["diff"];
    assert!(diff.get("before").is_none());
    assert_eq!(
        diff["structural"],
        json!({
            "kind": "changed",
            "path": "configuration/system/host-name",
            "before": "r1",
            "after": "r2",
        })
    );
}

#[test]
fn identical_json_configs_remove_the_diff() {
    let config = r#"{"port": {"1/1/1": {"admin-state": "enable"}}}"#;
    let line = host_record(
        "host1",
        json!({"changed": true, "diff": {"before": config, "after": config}}),
    );

    let out = filter_output(&[line], 0);

    assert!(hosts_of(&out[0])["host1"].get("diff").is_none());
}

#[test]
fn plain_text_diff_is_left_alone() {
    let diff = json!({"before": "line one\n", "after": "line two\n"});
    let line = host_record("host1", json!({"changed": true, "diff": diff.clone()}));

    let out = filter_output(&[line], 0);

    assert_eq!(hosts_of(&out[0])["host1"]["diff"], diff);
}

#[test]
fn diff_list_drops_identical_entries() {
    let same = r#"{"a": 1}"#;
    let line = host_record(
        "host1",
        json!({
            "changed": true,
            "diff": [
                {"before": same, "after": same},
                {"before": "x\n", "after": "y\n"},
            ],
        }),
    );

    let out = filter_output(&[line], 0);

    assert_eq!(
        hosts_of(&out[0])["host1"]["diff"],
        json!([{"before": "x\n", "after": "y\n"}])
    );
}

#[test]
fn empty_input_gives_empty_output() {
    let none: [&str; 0] = [];
    assert!(filter_output(&none, 0).is_empty());
    assert!(filter_output(&none, 3).is_empty());
}

#[test]
fn deploy_scenario_failed_on_host1() {
    let lines = vec![
        play_banner("deploy.yml"),
        host_record(
            "host1",
            json!({
                "changed": false,
                "ansible_facts": {"os": "junos"},
                "invocation": {"module_args": {}},
                "msg": "facts gathered",
            }),
        ),
        host_record("host1", json!({"failed": true, "msg": "commit failed"})),
        stats_record("host1", 0, 1),
    ];

    let out = filter_output(&lines, 2);

    assert_eq!(out.len(), 3);
    let facts = &hosts_of(&out[0])["host1"];
    assert!(facts.get("ansible_facts").is_none());
    assert!(facts.get("invocation").is_none());
    assert_eq!(facts["msg"], "facts gathered");
    assert_eq!(hosts_of(&out[1])["host1"]["msg"], "commit failed");
}

#[test]
fn refiltering_is_stable() {
    let before = "<c><a>1</a></c>";
    let after = "<c><a>2</a></c>";
    let lines = vec![
        "garbage".to_string(),
        host_record(
            "h",
            json!({"changed": true, "diff": {"before": before, "after": after}}),
        ),
        stats_record("h", 1, 0),
    ];

    let once = filter_output(&lines, 0);
    let twice = filter_records(once.clone(), 0);

    assert_eq!(once, twice);
}
