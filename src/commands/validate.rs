//! Validate command implementation
//!
//! Discovers, parses, merges, and validates the dependency manifests in a
//! project directory without cloning anything. Useful as a pre-flight check
//! before a long-running packaging run.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use backup_source::manifest;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory containing dependencies*.yml manifest files
    pub project_directory: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<()> {
    if !args.project_directory.is_dir() {
        bail!(
            "Project directory not found: {}",
            args.project_directory.display()
        );
    }

    let files = manifest::discover_definitions(&args.project_directory)?;
    let definitions = manifest::load_definitions(&files)?;

    if !args.quiet {
        println!(
            "✅ {} manifest file(s), {} application(s)",
            files.len(),
            definitions.len()
        );
        for definition in &definitions {
            println!(
                "   {} {} @ {}",
                definition.name,
                definition.configuration.backup.repo_url,
                definition.configuration.release.r#ref
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_execute_missing_directory() {
        let result = execute(ValidateArgs {
            project_directory: PathBuf::from("/nonexistent/project"),
            quiet: true,
        });

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Project directory not found"));
    }

    #[test]
    fn test_execute_valid_manifests() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("dependencies.yml"),
            r#"
context:
  dependencies:
    r1:
      backup:
        repo_url: "https://this.host/r1"
        branch_name: main
      docker:
        image_name: r1-image
        tag_prefix: p-
      release:
        ref: "1.0"
"#,
        )
        .unwrap();

        let result = execute(ValidateArgs {
            project_directory: temp_dir.path().to_path_buf(),
            quiet: true,
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_execute_invalid_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("dependencies.yml"), "context: [oops").unwrap();

        let result = execute(ValidateArgs {
            project_directory: temp_dir.path().to_path_buf(),
            quiet: true,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_empty_directory_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let result = execute(ValidateArgs {
            project_directory: temp_dir.path().to_path_buf(),
            quiet: true,
        });
        assert!(result.is_ok());
    }
}
