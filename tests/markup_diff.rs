// tests/markup_diff.rs

use lso::filter::{ChangeKind, MarkupError, first_difference, parse_config};
use serde_json::json;

#[test]
fn xml_elements_attributes_and_repeats() {
    let xml = r#"
        <configuration xmlns:junos="http://xml.juniper.net/junos/" junos:changed-seconds="1700000000">
            <interfaces>
                <interface><name>ge-0/0/0</name><mtu>9192</mtu></interface>
                <interface><name>ge-0/0/1</name><disable/></interface>
            </interfaces>
            <version inactive="inactive">23.2R1</version>
        </configuration>
    "#;

    let tree = parse_config(xml).expect("valid xml");

    assert_eq!(
        tree,
        json!({
            "configuration": {
                "interfaces": {
                    "interface": [
                        {"name": "ge-0/0/0", "mtu": "9192"},
                        {"name": "ge-0/0/1", "disable": null},
                    ]
                },
                "version": {"@inactive": "inactive", "#text": "23.2R1"},
            }
        })
    );
}

#[test]
fn json_markup_is_parsed_as_is() {
    let tree = parse_config(r#"  {"card": [{"slot": 1}]}"#).unwrap();
    assert_eq!(tree, json!({"card": [{"slot": 1}]}));
}

#[test]
fn other_text_is_rejected() {
    assert!(matches!(parse_config("hostname r1"), Err(MarkupError::Unrecognised)));
    assert!(matches!(parse_config("<open>"), Err(MarkupError::Xml(_))));
    assert!(matches!(parse_config("{not json"), Err(MarkupError::Json(_))));
}

#[test]
fn equal_trees_have_no_difference() {
    let a = json!({"x": [1, {"y": null}]});
    assert_eq!(first_difference(&a, &a.clone()), None);
}

#[test]
fn first_difference_follows_sorted_keys() {
    let before = json!({"b": 1, "a": {"z": 1, "m": 1}});
    let after = json!({"b": 2, "a": {"z": 2, "m": 2}});

    let diff = first_difference(&before, &after).unwrap();

    assert_eq!(diff.kind, ChangeKind::Changed);
    assert_eq!(diff.path, "a/m");
    assert_eq!(diff.before, Some(json!(1)));
    assert_eq!(diff.after, Some(json!(2)));
}

#[test]
fn added_and_removed_entries() {
    let added = first_difference(&json!({"a": 1}), &json!({"a": 1, "b": 2})).unwrap();
    assert_eq!(added.kind, ChangeKind::Added);
    assert_eq!(added.path, "b");
    assert_eq!(added.before, None);

    let removed = first_difference(&json!([1, 2, 3]), &json!([1, 2])).unwrap();
    assert_eq!(removed.kind, ChangeKind::Removed);
    assert_eq!(removed.path, "2");
    assert_eq!(removed.after, None);
}

#[test]
fn type_change_is_a_change_at_that_node() {
    let diff = first_difference(&json!({"a": "x"}), &json!({"a": {"b": 1}})).unwrap();
    assert_eq!(diff.kind, ChangeKind::Changed);
    assert_eq!(diff.path, "a");
}

#[test]
fn difference_serializes_without_missing_sides() {
    let diff = first_difference(&json!({}), &json!({"k": true})).unwrap();
    assert_eq!(
        serde_json::to_value(diff).unwrap(),
        json!({"kind": "added", "path": "k", "after": true})
    );
}
