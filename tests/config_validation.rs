// tests/config_validation.rs

mod common;
use crate::common::builders::ConfigBuilder;

use std::io::Write;

use lso::config::{ConfigFile, RawConfigFile, default_config_path, load_and_validate};
use lso::config::model::default_max_workers;
use lso::errors::LsoError;
use lso::types::ExecutorType;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_error(raw: RawConfigFile) -> String {
    match ConfigFile::try_from(raw) {
        Err(LsoError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn empty_file_gives_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.executor.kind, ExecutorType::Threadpool);
    assert_eq!(cfg.executor.max_workers, default_max_workers());
    assert!(!cfg.executor.testing);
    assert_eq!(cfg.http.request_timeout_sec, 10);
    assert_eq!(cfg.execution.executable_timeout_sec, 300);
    assert_eq!(cfg.connect_timeout().as_secs(), 5);
    assert_eq!(cfg.runner.ansible_playbook_bin, "ansible-playbook");
    assert_eq!(default_config_path().to_str(), Some("lso.toml"));
}

#[test]
fn default_pool_size_is_bounded() {
    let n = default_max_workers();
    assert!((5..=32).contains(&n), "got {n}");
}

#[test]
fn full_file_is_loaded() {
    let file = write_config(
        r#"
        [executor]
        kind = "worker"
        max_workers = 3

        [queue]
        broker_url = "tcp://127.0.0.1:5555"
        worker_url = "tcp://127.0.0.1:5556"
        queue_name = "lso"
        connect_timeout_sec = 2

        [paths]
        ansible_playbooks_root_dir = "/opt/playbooks"
        executables_root_dir = "/opt/bin"

        [http]
        request_timeout_sec = 4
        "#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.executor.kind, ExecutorType::Worker);
    assert_eq!(cfg.executor.max_workers, 3);
    assert_eq!(cfg.queue.queue_name.as_deref(), Some("lso"));
    assert_eq!(cfg.queue.worker_url.as_deref(), Some("tcp://127.0.0.1:5556"));
    assert_eq!(cfg.connect_timeout().as_secs(), 2);
    assert_eq!(cfg.paths.executables_root_dir.to_str(), Some("/opt/bin"));
    assert_eq!(cfg.request_timeout().as_secs(), 4);
}

#[test]
fn zero_workers_rejected() {
    let msg = config_error(ConfigBuilder::new().max_workers(0).raw());
    assert!(msg.contains("max_workers"), "{msg}");
}

#[test]
fn zero_timeouts_rejected() {
    let msg = config_error(ConfigBuilder::new().request_timeout_sec(0).raw());
    assert!(msg.contains("request_timeout_sec"), "{msg}");

    let msg = config_error(ConfigBuilder::new().executable_timeout_sec(0).raw());
    assert!(msg.contains("executable_timeout_sec"), "{msg}");

    let msg = config_error(ConfigBuilder::new().connect_timeout_sec(0).raw());
    assert!(msg.contains("connect_timeout_sec"), "{msg}");
}

#[test]
fn worker_backend_needs_broker() {
    let mut raw = ConfigBuilder::new().raw();
    raw.executor.kind = ExecutorType::Worker;
    let msg = config_error(raw);
    assert!(msg.contains("broker_url"), "{msg}");

    let msg = config_error(ConfigBuilder::new().worker_queue("redis://localhost", None).raw());
    assert!(msg.contains("tcp://"), "{msg}");
}

#[test]
fn worker_url_must_be_a_zeromq_endpoint() {
    let mut raw = ConfigBuilder::new().raw();
    raw.queue.worker_url = Some("http://127.0.0.1:5556".to_string());
    let msg = config_error(raw);
    assert!(msg.contains("worker_url"), "{msg}");

    let mut raw = ConfigBuilder::new().raw();
    raw.queue.worker_url = Some("ipc:///tmp/lso-workers".to_string());
    assert!(ConfigFile::try_from(raw).is_ok());
}

#[test]
fn unknown_executor_kind_is_a_toml_error() {
    let file = write_config("[executor]\nkind = \"celery\"\n");
    assert!(matches!(load_and_validate(file.path()), Err(LsoError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(LsoError::IoError(_))));
}

#[test]
fn executor_kind_parses_from_str() {
    assert_eq!("Worker".parse::<ExecutorType>().unwrap(), ExecutorType::Worker);
    assert_eq!(" threadpool ".parse::<ExecutorType>().unwrap(), ExecutorType::Threadpool);
    assert!("celery".parse::<ExecutorType>().is_err());
    assert_eq!(ExecutorType::Worker.to_string(), "worker");
}
