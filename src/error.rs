//! Error types.

use crate::api::model::RequestError;
use axum::extract::rejection::JsonRejection;
use std::path::PathBuf;

/// Error enumerates the possible Sandcastle error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by the [config parser][crate::caddy::parser::parse] when the brace structure of
    /// a configuration file is broken. See [`MalformedConfig`] for the individual cases.
    #[error("malformed config: {0}")]
    MalformedConfig(#[from] MalformedConfig),

    /// Returned by the [config parser][crate::caddy::parser::parse] when a `tls` entry does not
    /// have exactly two arguments (certificate path and key path).
    #[error("line {line}: tls entry expects a certificate and a key path, found {tokens} argument(s)")]
    MalformedTlsEntry { line: usize, tokens: usize },

    /// Returned when the per-domain configuration file does not exist. The base file is
    /// provisioned out of band and must be present before a site can be updated.
    #[error("config file {} doesn't exist", .0.display())]
    ConfigFileNotFound(PathBuf),

    /// Returned by the [synthesizer][crate::caddy::synth::synthesize] when the configuration
    /// file has no root-level block for the domain.
    #[error("domain \"{0}\" is not configured")]
    DomainNotConfigured(String),

    /// Returned by the [synthesizer][crate::caddy::synth::synthesize] when the domain's block has
    /// no `tls` entry. Certificates are never invented.
    #[error("domain \"{0}\" has no tls entry")]
    MissingTls(String),

    /// Returned when `POST /api` is called without the configured bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Returned when a [provisioning request][crate::api#api-post] fails validation.
    #[error("{0}")]
    InvalidRequest(#[from] RequestError),

    /// Returned when the [`Config`][crate::config::Config] is structurally valid JSON but
    /// unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Returned when clients `POST` invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when processing JSON from disk (e.g. when
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to invalid
    /// JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when a blocking config write task panics or is cancelled.
    #[error("config write task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Structural violations of the brace-delimited configuration format. Each case names the
/// 1-based line it was detected on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedConfig {
    #[error("line {line}: closing brace without an open block")]
    UnbalancedBlock { line: usize },

    #[error("line {line}: block \"{name}\" is never closed")]
    UnclosedBlock { line: usize, name: String },

    #[error("line {line}: entry outside of any block")]
    DanglingEntry { line: usize },
}
