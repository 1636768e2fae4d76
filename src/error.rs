//! # Error Handling
//!
//! Centralized error type for the `backup-source` pipeline, built with
//! `thiserror`. Every failure mode of the pipeline maps to one variant with
//! enough context to report a precise message: which manifest failed to load,
//! which repository failed to clone, which reference could not be archived.
//!
//! The pipeline has no partial-success mode, so every variant is terminal:
//! the first error aborts the run and no package is written.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for backup-source operations
#[derive(Error, Debug)]
pub enum Error {
    /// A discovered dependency manifest could not be read, parsed, or
    /// validated against the manifest schema.
    #[error("Failed to load dependency manifest {path}: {message}")]
    ManifestLoad { path: PathBuf, message: String },

    /// A field failed an explicit validation check (malformed URL, empty
    /// reference, and so on). `context` names the entity being validated.
    #[error("Validation error: {context}: {message}")]
    Validation { context: String, message: String },

    /// The merged, combined manifest document failed schema validation.
    #[error("Merged manifest is invalid: {message}")]
    Merge { message: String },

    /// Cloning a repository failed. `url` is always the declared repository
    /// URL, never the token-carrying clone URL.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// `git archive` failed, typically because the requested reference does
    /// not exist in the cloned repository.
    #[error("Git archive error at {reference}: {message}")]
    GitArchive { reference: String, message: String },

    /// An error occurred while assembling the final package archive.
    #[error("Packaging error: {message}")]
    Packaging { message: String },

    /// The `az` CLI failed while fetching a keyvault secret.
    #[error("Keyvault error: {message}")]
    Keyvault { message: String },

    /// The run was cancelled by an external signal.
    #[error("Operation interrupted")]
    Interrupted,

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
