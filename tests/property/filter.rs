use proptest::prelude::*;
use serde_json::{Value, json};

use lso::filter::{UNPARSABLE_KEY, filter_output, filter_records};
use lso_test_utils::builders::{host_record, play_banner, stats_record};

/// One output line of a run, as the collaborator would emit it.
fn line_strategy() -> impl Strategy<Value = String> {
    let host = prop::sample::select(vec!["host1", "host2", "r1"]);
    prop_oneof![
        (host.clone(), any::<bool>(), prop::option::of(prop::sample::select(vec!["file", "directory", "present"])))
            .prop_map(|(h, changed, state)| {
                let mut result = json!({"changed": changed, "invocation": {}, "msg": "m"});
                if let Some(state) = state {
                    result["state"] = json!(state);
                }
                host_record(h, result)
            }),
        (host.clone(), 0u32..3, 0u32..2).prop_map(|(h, c, f)| stats_record(h, c, f)),
        "[a-z]{1,8}".prop_map(|name| play_banner(&name)),
        // Free text that is never a JSON object.
        "[A-Z][a-z *:]{0,20}",
    ]
}

fn is_host_record(line: &str) -> bool {
    serde_json::from_str::<Value>(line)
        .ok()
        .is_some_and(|v| v.get("hosts").is_some())
}

fn is_summary(value: &Value) -> bool {
    value.get("stats").is_some()
}

proptest! {
    #[test]
    fn unparsable_lines_always_survive(
        lines in prop::collection::vec(line_strategy(), 0..20),
        rc in -1i32..3,
    ) {
        let out = filter_output(&lines, rc);
        let wrapped = out.iter().filter(|v| v.get(UNPARSABLE_KEY).is_some()).count();
        let free_text = lines
            .iter()
            .filter(|l| !l.trim().is_empty() && serde_json::from_str::<Value>(l).map(|v| !v.is_object()).unwrap_or(true))
            .count();
        prop_assert_eq!(wrapped, free_text);
    }

    #[test]
    fn filtering_is_idempotent(
        lines in prop::collection::vec(line_strategy(), 0..20),
        rc in -1i32..3,
    ) {
        let once = filter_output(&lines, rc);
        let twice = filter_records(once.clone(), rc);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn failed_runs_keep_every_host_record(
        lines in prop::collection::vec(line_strategy(), 0..20),
        rc in 1i32..5,
    ) {
        let out = filter_output(&lines, rc);
        let kept = out.iter().filter(|v| v.get("hosts").is_some()).count();
        let emitted = lines.iter().filter(|l| is_host_record(l)).count();
        prop_assert_eq!(kept, emitted);
    }

    #[test]
    fn unchanged_successful_runs_keep_only_summaries(
        hosts in prop::collection::vec(prop::sample::select(vec!["host1", "host2"]), 0..10),
        banners in prop::collection::vec("[a-z]{1,8}", 0..3),
    ) {
        let mut lines: Vec<String> = banners.iter().map(|b| play_banner(b)).collect();
        lines.extend(hosts.iter().map(|h| host_record(h, json!({"changed": false}))));
        lines.push(stats_record("host1", 0, 0));

        let out = filter_output(&lines, 0);

        prop_assert_eq!(out.len(), 1);
        prop_assert!(is_summary(&out[0]));
    }

    #[test]
    fn output_never_grows(
        lines in prop::collection::vec(line_strategy(), 0..20),
        rc in -1i32..3,
    ) {
        prop_assert!(filter_output(&lines, rc).len() <= lines.len());
    }
}
