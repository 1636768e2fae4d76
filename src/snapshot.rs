//! # Snapshot Engine
//!
//! One snapshot clones an application's repository, archives its tree at the
//! resolved git reference, and writes a SHA-256 companion file next to the
//! archive. Snapshots run once per application and are fanned out
//! concurrently by the pipeline; each invocation owns a scoped temporary
//! clone directory that is removed on every exit path.
//!
//! ## Design
//!
//! Git interactions sit behind the [`GitOperations`] trait so tests can
//! replace the system git command with mocks. The default implementation
//! shells out to `git`, which automatically handles credential helpers and
//! any authentication configured in `~/.gitconfig`, in addition to the
//! optional access token embedded in the clone URL.

use std::path::{Path, PathBuf};

use log::info;
use tempfile::TempDir;

use crate::cancel::CancelFlag;
use crate::error::{Error, Result};
use crate::git;
use crate::hash;
use crate::schema::ApplicationDefinition;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone a repository into `target_dir`.
    ///
    /// `clone_url` may carry an embedded access token; `display_url` is the
    /// declared URL and the only one allowed to surface in errors or logs.
    fn clone_repository(&self, clone_url: &str, display_url: &str, target_dir: &Path)
        -> Result<()>;

    /// Archive the tree at `reference` into a gzip-compressed tar at
    /// `output`, with every entry rooted under `prefix`.
    fn archive_tree(
        &self,
        repo_dir: &Path,
        reference: &str,
        prefix: &str,
        output: &Path,
    ) -> Result<()>;
}

/// The default implementation of [`GitOperations`], backed by the system
/// `git` command.
pub struct SystemGitOperations;

impl GitOperations for SystemGitOperations {
    fn clone_repository(
        &self,
        clone_url: &str,
        display_url: &str,
        target_dir: &Path,
    ) -> Result<()> {
        git::clone(clone_url, display_url, target_dir)
    }

    fn archive_tree(
        &self,
        repo_dir: &Path,
        reference: &str,
        prefix: &str,
        output: &Path,
    ) -> Result<()> {
        git::archive(repo_dir, reference, prefix, output)
    }
}

/// Produces per-application snapshot archives.
pub struct SnapshotEngine {
    git_ops: Box<dyn GitOperations>,
}

impl Default for SnapshotEngine {
    fn default() -> Self {
        Self {
            git_ops: Box::new(SystemGitOperations),
        }
    }
}

impl SnapshotEngine {
    /// Create an engine with a custom [`GitOperations`] implementation.
    ///
    /// Primarily used by tests to inject mock git operations.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Take a snapshot of one application's repository.
    ///
    /// Clones the declared repository (with the access token embedded in the
    /// clone URL when supplied) into a scoped temporary directory, archives
    /// the tree at the release reference into
    /// `{name}-{reference}.tar.gz` inside `archive_dir`, and writes the
    /// companion hash file. Returns the archive path; the hash file path is
    /// implied (`.sha256` suffix).
    pub fn take_snapshot(
        &self,
        definition: &ApplicationDefinition,
        archive_dir: &Path,
        token: Option<&str>,
        cancel: &CancelFlag,
    ) -> Result<PathBuf> {
        if cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }

        let name = &definition.name;
        let reference = &definition.configuration.release.r#ref;
        let declared_url = &definition.configuration.backup.repo_url;
        let clone_url = git::authenticated_url(declared_url, token)?;

        let working_dir = TempDir::new()?;
        info!("cloning {}", declared_url);
        self.git_ops
            .clone_repository(&clone_url, declared_url, working_dir.path())?;

        if cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }

        let archive_path = archive_dir.join(format!("{}-{}.tar.gz", name, reference));
        info!("archiving {} at {}", name, reference);
        self.git_ops.archive_tree(
            working_dir.path(),
            reference,
            &format!("{}/", name),
            &archive_path,
        )?;
        hash::write_hash_file(&archive_path)?;

        Ok(archive_path)
    }
}
