//! # Backup Pipeline
//!
//! The coordinating flow for one backup run:
//!
//! 1. Discover and load dependency manifests, merging them into one set of
//!    application definitions.
//! 2. Apply user-supplied git reference overrides.
//! 3. Fan out one snapshot task per application (clone + archive + hash),
//!    all executing concurrently, and join the results.
//! 4. Assemble the final package from the joined results.
//!
//! Snapshot tasks share no mutable state: each owns an independent temporary
//! clone directory and writes only files it created, so the fan-out needs no
//! locking. The first task failure fails the join and the whole run; there
//! is no partial-package output. Snapshot archives are staged in a scoped
//! temporary directory that is removed on every exit path, so only the final
//! package and its hash file outlive the run.

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;
use tempfile::TempDir;

use crate::cancel::CancelFlag;
use crate::error::{Error, Result};
use crate::manifest::{self, GitReferenceOverrides};
use crate::package::{self, PackageArtifact};
use crate::snapshot::SnapshotEngine;

/// Inputs for one backup run.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Project name used as the package file name prefix.
    pub project_name: String,
    /// Directory containing the dependency manifests.
    pub project_directory: PathBuf,
    /// Directory the package and its hash file are written to.
    pub output_directory: PathBuf,
    /// User overrides of application git references.
    pub git_refs: GitReferenceOverrides,
    /// Optional access token for authenticating repository clones.
    pub token: Option<String>,
    /// Suppress progress output.
    pub quiet: bool,
}

fn snapshot_progress(total: usize, quiet: bool) -> ProgressBar {
    if quiet || total == 0 {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} repositories")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

/// Execute one backup run and return the resulting package artifact.
///
/// Fails on the first error anywhere in the pipeline; no package file is
/// written unless every snapshot succeeded.
pub fn run_backup(
    options: &BackupOptions,
    engine: &SnapshotEngine,
    cancel: &CancelFlag,
) -> Result<PackageArtifact> {
    let files = manifest::discover_definitions(&options.project_directory)?;
    let mut definitions = manifest::load_definitions(&files)?;
    manifest::apply_reference_overrides(&mut definitions, &options.git_refs);

    info!(
        "snapshotting {} application(s) for project {}",
        definitions.len(),
        options.project_name
    );

    let staging = TempDir::new()?;
    let progress = snapshot_progress(definitions.len(), options.quiet);

    let joined = definitions
        .par_iter()
        .map(|definition| {
            let snapshot =
                engine.take_snapshot(definition, staging.path(), options.token.as_deref(), cancel);
            if snapshot.is_ok() {
                progress.inc(1);
            }
            snapshot
        })
        .collect::<Result<Vec<PathBuf>>>();
    progress.finish_and_clear();
    let snapshots = joined?;

    if cancel.is_cancelled() {
        return Err(Error::Interrupted);
    }

    package::assemble_package(&options.project_name, &snapshots, &options.output_directory)
}
