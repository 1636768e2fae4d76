//! # Package Assembler
//!
//! Bundles every per-application snapshot archive, plus its companion hash
//! file, into one dated gzip-compressed tar package, then writes a top-level
//! hash file for the package itself.
//!
//! ## Entry naming
//!
//! Entries are added under their base file name only: directory components
//! of the source paths are stripped so the package never reflects the
//! temporary-directory layout of the machine that produced it.
//!
//! ## All-or-nothing output
//!
//! The tar stream is written to a temporary file inside the output directory
//! and renamed to its final name only after the stream completes, so an
//! aborted run leaves no partial package behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::hash;

/// The final package archive and its companion hash file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    /// Path of the package tar file.
    pub package_path: PathBuf,
    /// Path of the package's `.sha256` hash file.
    pub hash_path: PathBuf,
}

/// Current UTC instant as an ISO-8601 string with millisecond precision and
/// a literal `Z` suffix, used in package file names.
fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn packaging_error(message: impl ToString) -> Error {
    Error::Packaging {
        message: message.to_string(),
    }
}

/// Add one file to the tar stream under its base name.
fn append_entry<W: Write>(builder: &mut tar::Builder<W>, path: &Path) -> Result<()> {
    let name = path.file_name().ok_or_else(|| {
        packaging_error(format!("entry has no file name: {}", path.display()))
    })?;
    builder
        .append_path_with_name(path, name)
        .map_err(|e| packaging_error(format!("{}: {}", path.display(), e)))
}

/// Assemble the final package from per-application snapshot archives.
///
/// Every archive in `snapshots` is added together with its implied
/// `.sha256` sibling. The package is written to
/// `{project_name}-{timestamp}.tar.gz` inside `output_dir` and hashed;
/// both resulting paths are returned.
pub fn assemble_package(
    project_name: &str,
    snapshots: &[PathBuf],
    output_dir: &Path,
) -> Result<PackageArtifact> {
    let package_path = output_dir.join(format!("{}-{}.tar.gz", project_name, utc_timestamp()));

    let staging = NamedTempFile::new_in(output_dir).map_err(packaging_error)?;
    let mut builder = tar::Builder::new(GzEncoder::new(staging, Compression::default()));

    for snapshot in snapshots {
        append_entry(&mut builder, snapshot)?;
        append_entry(&mut builder, &hash::hash_sibling(snapshot))?;
    }

    let encoder = builder.into_inner().map_err(packaging_error)?;
    let staging = encoder.finish().map_err(packaging_error)?;
    staging
        .persist(&package_path)
        .map_err(|e| packaging_error(format!("{}: {}", package_path.display(), e)))?;

    info!("saved package, {}", package_path.display());
    let hash_path = hash::write_hash_file(&package_path)?;

    Ok(PackageArtifact {
        package_path,
        hash_path,
    })
}
