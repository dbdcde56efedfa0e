// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{LsoError, Result};
use crate::types::ExecutorType;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::LsoError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_executor(cfg)?;
    validate_timeouts(cfg)?;
    validate_queue(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.executor.max_workers == 0 {
        return Err(LsoError::ConfigError(
            "[executor].max_workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeouts(cfg: &RawConfigFile) -> Result<()> {
    if cfg.http.request_timeout_sec == 0 {
        return Err(LsoError::ConfigError(
            "[http].request_timeout_sec must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.queue.connect_timeout_sec == 0 {
        return Err(LsoError::ConfigError(
            "[queue].connect_timeout_sec must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.execution.executable_timeout_sec == 0 {
        return Err(LsoError::ConfigError(
            "[execution].executable_timeout_sec must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_queue(cfg: &RawConfigFile) -> Result<()> {
    if cfg.executor.kind == ExecutorType::Worker && cfg.queue.broker_url.is_none() {
        return Err(LsoError::ConfigError(
            "[queue].broker_url is required when [executor].kind = \"worker\"".to_string(),
        ));
    }

    validate_endpoint("broker_url", cfg.queue.broker_url.as_deref())?;
    validate_endpoint("worker_url", cfg.queue.worker_url.as_deref())?;
    Ok(())
}

fn validate_endpoint(key: &str, url: Option<&str>) -> Result<()> {
    match url {
        Some(url) if !(url.starts_with("tcp://") || url.starts_with("ipc://")) => {
            Err(LsoError::ConfigError(format!(
                "[queue].{key} must be a tcp:// or ipc:// endpoint (got '{url}')"
            )))
        }
        _ => Ok(()),
    }
}
