//! # Archive Hashing
//!
//! SHA-256 hashing of produced archives, replicating the two-column output
//! of the `sha256sum` command so packages can be verified with standard
//! tooling: `<hexdigest><two spaces><base file name>`.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Suffix appended to an archive path to name its companion hash file.
const HASH_SUFFIX: &str = ".sha256";

/// Compute the SHA-256 digest of a file as a lowercase hex string.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Path of the companion hash file for an archive (`<archive>.sha256`).
pub fn hash_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(HASH_SUFFIX);
    PathBuf::from(name)
}

/// Write the companion hash file for an archive and return its path.
///
/// The file contains exactly `<hexdigest>  <base file name>`, matching the
/// `sha256sum` two-column format.
pub fn write_hash_file(path: &Path) -> Result<PathBuf> {
    let digest = hash_file(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Packaging {
            message: format!("archive path has no file name: {}", path.display()),
        })?;

    let hash_path = hash_sibling(path);
    std::fs::write(&hash_path, format!("{}  {}", digest, file_name))?;
    Ok(hash_path)
}
