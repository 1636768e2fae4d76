use std::path::Path;
use std::process::Command;

use url::Url;

use crate::error::{Error, Result};

/// Derive the URL used for cloning, embedding an access token if supplied.
///
/// With a token, the declared URL gains the token as its credential portion:
/// scheme, host, and path are preserved, the username is left empty, and the
/// password is the token (`https://:tok@host/path`). Without a token the
/// declared URL is returned unmodified.
pub fn authenticated_url(repo_url: &str, token: Option<&str>) -> Result<String> {
    let Some(token) = token else {
        return Ok(repo_url.to_string());
    };

    let mut url = Url::parse(repo_url)?;
    url.set_password(Some(token))
        .map_err(|_| Error::Validation {
            context: format!("repository URL '{}'", repo_url),
            message: "URL cannot carry credentials".to_string(),
        })?;
    Ok(url.into())
}

/// Clone a repository using the system git command.
///
/// `clone_url` may carry an embedded access token; `display_url` is the
/// declared repository URL and is the only URL that appears in errors. Any
/// occurrence of the clone URL in git's stderr is replaced before reporting,
/// so the token never leaves this function.
pub fn clone(clone_url: &str, display_url: &str, target_dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["clone", "--quiet", clone_url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: display_url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let sanitized = stderr.replace(clone_url, display_url);

        // Point at the usual culprit for the common auth failures
        let message = if sanitized.contains("Authentication failed")
            || sanitized.contains("Permission denied")
            || sanitized.contains("could not read Username")
            || sanitized.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure the access token has read \
                access to the repository.\nError: {}",
                sanitized
            )
        } else {
            sanitized
        };

        return Err(Error::GitClone {
            url: display_url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Archive a cloned repository's tree at a git reference.
///
/// Produces a gzip-compressed tar of the tree at `reference` (a branch, tag,
/// or commit, resolved by git itself), with every entry rooted under
/// `prefix`, written to `output`.
pub fn archive(repo_dir: &Path, reference: &str, prefix: &str, output: &Path) -> Result<()> {
    let result = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["archive", "--format=tar.gz"])
        .arg(format!("--prefix={}", prefix))
        .arg("--output")
        .arg(output)
        .arg(reference)
        .output()
        .map_err(|e| Error::GitArchive {
            reference: reference.to_string(),
            message: e.to_string(),
        })?;

    if !result.status.success() {
        return Err(Error::GitArchive {
            reference: reference.to_string(),
            message: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }

    Ok(())
}
