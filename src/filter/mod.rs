// src/filter/mod.rs

//! Output post-processing for playbook runs.
//!
//! The execution collaborator emits one JSON record per line (Ansible's
//! `jsonl` stdout callback). Before that stream is handed to the completion
//! callback it is reduced to what an operator cares about:
//!
//! - [`records`] decides which records survive and strips noisy fields.
//! - [`markup`] turns vendor configuration blobs (XML or JSON text) into
//!   comparable `serde_json::Value` trees.
//! - [`diff`] computes the first structural difference between two trees.
//!
//! Everything in here is pure: no IO, no async, no shared state.

pub mod diff;
pub mod markup;
pub mod records;

pub use diff::{ChangeKind, Difference, first_difference};
pub use markup::{MarkupError, parse_config};
pub use records::{
    DENYLISTED_FIELDS, UNPARSABLE_KEY, filter_output, filter_records, parse_line,
};
