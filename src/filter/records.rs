// src/filter/records.rs

//! Record selection and field reduction.
//!
//! Record shapes (one JSON object per line):
//!
//! ```json
//! {"_event": "v2_runner_on_ok", "hosts": {"host1": {"changed": true, ...}}, "task": {...}}
//! {"_event": "v2_playbook_on_stats", "stats": {"host1": {"ok": 3, "changed": 1, ...}}}
//! ```
//!
//! Rules, applied in emission order:
//! - lines that are not JSON objects become `{"unparsable_line": <raw>}`
//!   and are always kept;
//! - per-host records (`hosts`) are kept when the run failed or when a host
//!   reports `changed: true`; in a successful run, steps where every host
//!   only staged a file/directory are dropped as well;
//! - summary records (`stats`) are always kept;
//! - anything else (play and task banners) is dropped.

use serde_json::{Map, Value};
use tracing::debug;

use super::diff::first_difference;
use super::markup::parse_config;

/// Key used for lines that could not be parsed into a record.
pub const UNPARSABLE_KEY: &str = "unparsable_line";

/// Host result fields that are internal bookkeeping or bulk dumps.
pub const DENYLISTED_FIELDS: &[&str] = &[
    "_ansible_no_log",
    "_ansible_delegated_vars",
    "_ansible_verbose_always",
    "_ansible_verbose_override",
    "_ansible_item_label",
    "ansible_facts",
    "invocation",
];

/// `state` values of steps that only staged temporary files.
const STAGING_STATES: &[&str] = &["file", "directory"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Opaque,
    Summary,
    HostResult,
    Other,
}

/// Parse and filter the raw output lines of one run.
///
/// Blank lines are skipped; every other line ends up either parsed or as an
/// `unparsable_line` entry before filtering.
pub fn filter_output<S: AsRef<str>>(lines: &[S], return_code: i32) -> Vec<Value> {
    let records = lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect::<Vec<_>>();

    filter_records(records, return_code)
}

/// Parse a single output line into a record.
///
/// Never fails: anything that is not a JSON object is wrapped verbatim.
pub fn parse_line(line: &str) -> Value {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(_) => unparsable(line),
        Err(e) => {
            debug!(error = %e, "output line is not valid JSON; passing through");
            unparsable(line)
        }
    }
}

fn unparsable(line: &str) -> Value {
    let mut map = Map::new();
    map.insert(UNPARSABLE_KEY.to_string(), Value::String(line.to_string()));
    Value::Object(map)
}

/// Filter already-parsed records.
///
/// Running this over its own output returns the same list.
pub fn filter_records<I>(records: I, return_code: i32) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let failed_run = return_code != 0;

    records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(map) => match classify(&map) {
                RecordKind::Opaque | RecordKind::Summary => Some(Value::Object(map)),
                RecordKind::HostResult => reduce_host_record(map, failed_run).map(Value::Object),
                RecordKind::Other => None,
            },
            // Non-object values only show up when re-filtering foreign input;
            // keep them untouched rather than lose them.
            other => Some(other),
        })
        .collect()
}

fn classify(map: &Map<String, Value>) -> RecordKind {
    if map.contains_key(UNPARSABLE_KEY) {
        RecordKind::Opaque
    } else if map.get("stats").is_some_and(Value::is_object) {
        RecordKind::Summary
    } else if map.get("hosts").is_some_and(Value::is_object) {
        RecordKind::HostResult
    } else {
        RecordKind::Other
    }
}

fn reduce_host_record(
    mut map: Map<String, Value>,
    failed_run: bool,
) -> Option<Map<String, Value>> {
    let hosts = map.get_mut("hosts").and_then(Value::as_object_mut)?;

    if !failed_run && !hosts.values().any(is_changed) {
        return None;
    }

    // A failed run keeps every step for diagnosis, staging steps included.
    if !failed_run && !hosts.is_empty() && hosts.values().all(is_staging_step) {
        debug!("dropping file/directory staging step");
        return None;
    }

    for result in hosts.values_mut() {
        if let Value::Object(result) = result {
            strip_denylisted(result);
            reduce_diff(result);
        }
    }

    Some(map)
}

fn is_changed(result: &Value) -> bool {
    result.get("changed").and_then(Value::as_bool).unwrap_or(false)
}

fn is_staging_step(result: &Value) -> bool {
    result
        .get("state")
        .and_then(Value::as_str)
        .is_some_and(|state| STAGING_STATES.contains(&state))
}

fn strip_denylisted(result: &mut Map<String, Value>) {
    for field in DENYLISTED_FIELDS {
        result.remove(*field);
    }
}

/// What to do with one diff entry after reduction.
enum DiffAction {
    Keep,
    Remove,
}

fn reduce_diff(result: &mut Map<String, Value>) {
    // `diff_lines` is the already formatted diff; the raw pair is redundant.
    if result.contains_key("diff_lines") {
        result.remove("diff");
        return;
    }

    let remove = match result.get_mut("diff") {
        Some(Value::Object(diff)) => matches!(reduce_diff_entry(diff), DiffAction::Remove),
        Some(Value::Array(entries)) => {
            entries.retain_mut(|entry| match entry {
                Value::Object(diff) => matches!(reduce_diff_entry(diff), DiffAction::Keep),
                _ => true,
            });
            entries.is_empty()
        }
        _ => false,
    };

    if remove {
        result.remove("diff");
    }
}

fn reduce_diff_entry(diff: &mut Map<String, Value>) -> DiffAction {
    if diff.contains_key("prepared") {
        diff.remove("before");
        diff.remove("after");
        return DiffAction::Keep;
    }

    let (Some(Value::String(before)), Some(Value::String(after))) =
        (diff.get("before"), diff.get("after"))
    else {
        return DiffAction::Keep;
    };

    let trees = parse_config(before).and_then(|b| parse_config(after).map(|a| (b, a)));
    let (before_tree, after_tree) = match trees {
        Ok(trees) => trees,
        Err(e) => {
            debug!(error = %e, "diff sides are not comparable markup; leaving as-is");
            return DiffAction::Keep;
        }
    };

    match first_difference(&before_tree, &after_tree) {
        Some(difference) => {
            diff.remove("before");
            diff.remove("after");
            match serde_json::to_value(difference) {
                Ok(value) => {
                    diff.insert("structural".to_string(), value);
                }
                Err(e) => debug!(error = %e, "could not serialize structural diff"),
            }
            DiffAction::Keep
        }
        None => DiffAction::Remove,
    }
}
