//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer gets its own
//! enum; the CLI wraps them all in [`CliError`].

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a scan before (or while) it runs.
///
/// Everything here is raised during setup, before the first worker starts,
/// except [`ScanError::WorkerFailed`].
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("no ports to scan")]
    EmptyPortList,

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    #[error("failed to open {sink} sink: {source}")]
    SinkSetup {
        sink: String,
        #[source]
        source: SinkError,
    },

    #[error("worker task failed: {0}")]
    WorkerFailed(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Why a single connect probe did not succeed.
///
/// Only ever logged; the scan itself reads every variant as "closed".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("connection refused")]
    Refused,

    #[error("connection timed out")]
    TimedOut,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("name resolution failed: {0}")]
    Resolution(String),

    #[error("connection failed: {0}")]
    Other(String),
}

/// Errors raised by a result sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0} sink lock poisoned")]
    Poisoned(String),

    #[error("{0} sink already closed")]
    Closed(String),
}

/// Configuration file and directory errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("settings file {0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid port specification: {0}")]
    Port(#[from] PortError),

    #[error("invalid target: {0}")]
    Target(#[from] TargetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
