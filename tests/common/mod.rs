#![allow(dead_code)]

pub use lso_test_utils::builders;
pub use lso_test_utils::{FakeCollaborator, RecordedCall, init_tracing, with_timeout};

use std::path::Path;

use lso::model::Inventory;

pub const PLAYBOOK: &str = "deploy.yml";

/// Create a playbook file so the existence check passes.
pub fn touch_playbook(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), "- hosts: all\n  tasks: []\n").expect("write playbook");
}

pub fn hosts(list: &str) -> Inventory {
    Inventory::from(list)
}
