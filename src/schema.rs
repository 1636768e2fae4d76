//! # Manifest Schema
//!
//! This module defines the data structures that represent a dependency
//! manifest (`dependencies*.yml`), along with explicit validation for the
//! fields the snapshot pipeline relies on.
//!
//! ## Manifest Shape
//!
//! ```yaml
//! context:
//!   dependencies:
//!     some-app:
//!       backup:
//!         repo_url: "https://host/path/repo.git"
//!         branch_name: main
//!       docker:
//!         image_name: some-app
//!         tag_prefix: "p-"
//!       release:
//!         ref: "3.1.4"
//! ```
//!
//! ## Validation
//!
//! Deserialization via `serde` enforces structure and types (missing required
//! fields and wrong types fail there). On top of that, `validate` performs
//! explicit field-by-field checks (URL scheme, non-empty reference) so that
//! error messages name the exact application and field at fault. Validation is
//! deliberately plain functions rather than a declarative framework.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// URL schemes accepted for `backup.repo_url`.
const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Git repository backup definition for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoBackupDefinition {
    /// URL of the repository to clone. Must be http or https.
    pub repo_url: String,
    /// Name of the branch the application is developed on.
    pub branch_name: String,
}

impl RepoBackupDefinition {
    fn validate(&self, application: &str) -> Result<()> {
        let url = Url::parse(&self.repo_url).map_err(|e| Error::Validation {
            context: format!("application '{}'", application),
            message: format!("backup.repo_url '{}': {}", self.repo_url, e),
        })?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(Error::Validation {
                context: format!("application '{}'", application),
                message: format!(
                    "backup.repo_url: unsupported scheme '{}' (expected http or https)",
                    url.scheme()
                ),
            });
        }
        Ok(())
    }
}

/// Docker image definition for one application.
///
/// Carried in the manifest schema but not consumed by the snapshot flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImageDefinition {
    /// Docker image name.
    pub image_name: String,
    /// Prefix applied to image tags.
    pub tag_prefix: String,
}

/// Git reference identifying the exact repository state to archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseReference {
    /// A branch name, tag, or commit hash.
    pub r#ref: String,
}

impl ReleaseReference {
    fn validate(&self, application: &str) -> Result<()> {
        if self.r#ref.is_empty() {
            return Err(Error::Validation {
                context: format!("application '{}'", application),
                message: "release.ref must not be empty".to_string(),
            });
        }
        // The reference becomes part of the snapshot archive file name.
        if self.r#ref.contains(['/', '\\']) {
            return Err(Error::Validation {
                context: format!("application '{}'", application),
                message: format!(
                    "release.ref '{}' must not contain path separators",
                    self.r#ref
                ),
            });
        }
        Ok(())
    }
}

/// Git and docker dependency configuration of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDependency {
    /// Repository backup definition.
    pub backup: RepoBackupDefinition,
    /// Docker image definition.
    pub docker: DockerImageDefinition,
    /// Git reference to archive.
    pub release: ReleaseReference,
}

impl ApplicationDependency {
    fn validate(&self, application: &str) -> Result<()> {
        self.backup.validate(application)?;
        self.release.validate(application)?;
        Ok(())
    }
}

/// Application dependency declarations within the manifest context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDeclaration {
    /// Application name to dependency configuration.
    pub dependencies: BTreeMap<String, ApplicationDependency>,
}

/// Root document of a dependency manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// Template context declaration.
    pub context: ContextDeclaration,
}

impl DependencyFile {
    /// Validate every application declared in the document.
    ///
    /// Checks the application name itself (it becomes a file name and tar
    /// prefix) and the per-field invariants of each dependency entry.
    pub fn validate(&self) -> Result<()> {
        for (name, dependency) in &self.context.dependencies {
            if name.is_empty() {
                return Err(Error::Validation {
                    context: "dependencies".to_string(),
                    message: "application name must not be empty".to_string(),
                });
            }
            if name.contains(['/', '\\']) {
                return Err(Error::Validation {
                    context: format!("application '{}'", name),
                    message: "application name must not contain path separators".to_string(),
                });
            }
            dependency.validate(name)?;
        }
        Ok(())
    }
}

/// A named, flattened view of one application's configuration.
///
/// Created once per merged dependency entry; immutable except for reference
/// overrides applied before snapshotting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDefinition {
    /// Unique application name (the key in the dependency map).
    pub name: String,
    /// The application's dependency configuration.
    pub configuration: ApplicationDependency,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_yaml() -> &'static str {
        r#"
context:
  dependencies:
    r1:
      backup:
        repo_url: "https://this.host/path"
        branch_name: master
      docker:
        image_name: r1-image
        tag_prefix: pp-
      release:
        ref: "3.1.4"
"#
    }

    #[test]
    fn test_parse_valid_document() {
        let document: DependencyFile = serde_yaml::from_str(valid_yaml()).unwrap();
        assert!(document.validate().is_ok());

        let dependency = &document.context.dependencies["r1"];
        assert_eq!(dependency.backup.repo_url, "https://this.host/path");
        assert_eq!(dependency.backup.branch_name, "master");
        assert_eq!(dependency.docker.image_name, "r1-image");
        assert_eq!(dependency.release.r#ref, "3.1.4");
    }

    #[test]
    fn test_parse_missing_required_field() {
        let yaml = r#"
context:
  dependencies:
    r1:
      backup:
        repo_url: "https://this.host/path"
      docker:
        image_name: r1-image
        tag_prefix: pp-
      release:
        ref: "3.1.4"
"#;
        let result = serde_yaml::from_str::<DependencyFile>(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("branch_name"));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let yaml = valid_yaml().replace("https://this.host/path", "ftp://this.host/path");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();

        let error = document.validate().unwrap_err();
        let message = error.to_string();
        assert!(message.contains("application 'r1'"));
        assert!(message.contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_validate_rejects_malformed_url() {
        let yaml = valid_yaml().replace("https://this.host/path", "not a url");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();
        assert!(document.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_reference() {
        let yaml = valid_yaml().replace("\"3.1.4\"", "\"\"");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();

        let error = document.validate().unwrap_err();
        assert!(error.to_string().contains("release.ref must not be empty"));
    }

    #[test]
    fn test_validate_rejects_reference_with_path_separator() {
        let yaml = valid_yaml().replace("\"3.1.4\"", "\"feature/x\"");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();

        let error = document.validate().unwrap_err();
        assert!(error.to_string().contains("path separators"));
    }

    #[test]
    fn test_validate_rejects_application_name_with_path_separator() {
        let yaml = valid_yaml().replace("    r1:", "    \"bad/name\":");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();

        let error = document.validate().unwrap_err();
        assert!(error.to_string().contains("application name"));
    }

    #[test]
    fn test_validate_allows_empty_tag_prefix() {
        let yaml = valid_yaml().replace("tag_prefix: pp-", "tag_prefix: \"\"");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();
        assert!(document.validate().is_ok());
    }

    #[test]
    fn test_validate_http_scheme_accepted() {
        let yaml = valid_yaml().replace("https://", "http://");
        let document: DependencyFile = serde_yaml::from_str(&yaml).unwrap();
        assert!(document.validate().is_ok());
    }
}
