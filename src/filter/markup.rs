// src/filter/markup.rs

//! Vendor configuration markup → comparable tree.
//!
//! Device modules report `before`/`after` configuration as text: XML for
//! Junos-style devices, JSON for model-driven (OpenConfig / SR OS) devices.
//! Both are turned into a `serde_json::Value` so one diff routine covers them.
//!
//! XML mapping:
//! - an element with only text becomes a string (empty element → `null`);
//! - attributes become `@name` keys, mixed text becomes `#text`;
//! - repeated child elements collapse into an array in document order.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("text is neither XML nor JSON markup")]
    Unrecognised,

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a configuration blob into a tree, guessing the markup from its
/// first non-blank character.
pub fn parse_config(text: &str) -> Result<Value, MarkupError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('<') {
        xml_to_tree(trimmed)
    } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Err(MarkupError::Unrecognised)
    }
}

fn xml_to_tree(text: &str) -> Result<Value, MarkupError> {
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();

    let mut tree = Map::new();
    tree.insert(root.tag_name().name().to_string(), element_to_value(root));
    Ok(Value::Object(tree))
}

fn element_to_value(node: roxmltree::Node<'_, '_>) -> Value {
    let mut map = Map::new();
    let mut text = String::new();

    // Namespaced attributes carry device metadata such as commit
    // timestamps, which differ on every commit.
    for attr in node.attributes().filter(|a| a.namespace().is_none()) {
        map.insert(
            format!("@{}", attr.name()),
            Value::String(attr.value().to_string()),
        );
    }

    for child in node.children() {
        if child.is_element() {
            insert_child(
                &mut map,
                child.tag_name().name().to_string(),
                element_to_value(child),
            );
        } else if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t.trim());
            }
        }
    }

    if map.is_empty() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        };
    }

    if !text.is_empty() {
        map.insert("#text".to_string(), Value::String(text));
    }
    Value::Object(map)
}

fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        // Element values are never arrays, so an array here is one we built.
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}
