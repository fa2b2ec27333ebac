//! Runtime configuration
//!
//! Read from `SETU_*` environment variables. The server binary loads a `.env`
//! file first; library users can build a config from any key lookup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::forms::{DateHeuristic, FormConfig, ReconcileOptions, Reconciler};
use crate::scanner::{DocumentScanService, PlainTextExtractor, ScanArchive};

pub const BIND_ADDR_VAR: &str = "SETU_BIND_ADDR";
pub const FORMS_CONFIG_VAR: &str = "SETU_FORMS_CONFIG";
pub const DYNAMIC_FIELDS_VAR: &str = "SETU_DYNAMIC_FIELDS";
pub const DATE_HEURISTIC_VAR: &str = "SETU_DATE_HEURISTIC";
pub const SCAN_ARCHIVE_DIR_VAR: &str = "SETU_SCAN_ARCHIVE_DIR";
pub const SESSION_IDLE_SECS_VAR: &str = "SETU_SESSION_IDLE_SECS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Setu runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetuConfig {
    pub bind_addr: String,
    /// Static field table; the built-in table when `None`
    pub forms_config_path: Option<PathBuf>,
    pub use_dynamic_fields: bool,
    pub date_heuristic: DateHeuristic,
    /// Where scan records are archived; no archiving when `None`
    pub scan_archive_dir: Option<PathBuf>,
    /// Form sessions untouched for this long are evicted; never when `None`
    pub session_idle_timeout: Option<Duration>,
}

impl Default for SetuConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            forms_config_path: None,
            use_dynamic_fields: true,
            date_heuristic: DateHeuristic::default(),
            scan_archive_dir: None,
            session_idle_timeout: Some(DEFAULT_SESSION_IDLE),
        }
    }
}

impl SetuConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary key lookup; unset or blank keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(addr) = get(BIND_ADDR_VAR) {
            config.bind_addr = addr;
        }
        config.forms_config_path = get(FORMS_CONFIG_VAR).map(PathBuf::from);
        if let Some(flag) = get(DYNAMIC_FIELDS_VAR) {
            config.use_dynamic_fields = parse_bool(DYNAMIC_FIELDS_VAR, &flag)?;
        }
        if let Some(heuristic) = get(DATE_HEURISTIC_VAR) {
            config.date_heuristic = heuristic.parse()?;
        }
        config.scan_archive_dir = get(SCAN_ARCHIVE_DIR_VAR).map(PathBuf::from);
        if let Some(secs) = get(SESSION_IDLE_SECS_VAR) {
            config.session_idle_timeout = parse_idle_secs(&secs)?;
        }

        Ok(config)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            use_dynamic_fields: self.use_dynamic_fields,
            date_heuristic: self.date_heuristic,
        }
    }

    /// The configured field table, or the built-in one
    pub fn load_form_config(&self) -> Result<FormConfig, ConfigError> {
        match &self.forms_config_path {
            Some(path) => FormConfig::load_file(path),
            None => Ok(FormConfig::builtin()),
        }
    }

    pub fn build_reconciler(&self) -> Result<Reconciler, ConfigError> {
        Ok(Reconciler::new(
            Arc::new(self.load_form_config()?),
            self.reconcile_options(),
        ))
    }

    /// Scan service over plain-text uploads, archiving when configured
    pub fn build_scan_service(&self) -> DocumentScanService {
        let service = DocumentScanService::new(Arc::new(PlainTextExtractor));
        match &self.scan_archive_dir {
            Some(dir) => service.with_archive(ScanArchive::new(dir)),
            None => service,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Seconds of idleness before eviction; `0` turns eviction off
fn parse_idle_secs(value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
        key: SESSION_IDLE_SECS_VAR.to_string(),
        value: value.to_string(),
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
