//! # Manifest Discovery and Loading
//!
//! This module turns a project directory into the flattened list of
//! application definitions the snapshot engine consumes:
//!
//! 1. **Discovery**: enumerate `dependencies*.yml` / `dependencies*.yaml`
//!    files directly inside the project directory (non-recursive).
//! 2. **Loading**: parse each file into a raw YAML document and validate it
//!    against the manifest schema. A file that parses but carries malformed
//!    leaf fields fails here, before any merging.
//! 3. **Merging**: deep-merge the raw documents with override-wins
//!    semantics, re-validate the combined document, and flatten
//!    `context.dependencies` into [`ApplicationDefinition`] records.
//!
//! Merge order across discovered files follows filesystem enumeration order
//! and is therefore unspecified: if two files declare the same application
//! with conflicting fields, the survivor is whichever file the merge visited
//! last. Callers must not depend on it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::merge::deep_merge;
use crate::schema::{ApplicationDefinition, DependencyFile};

/// File-name prefix that marks a file as a dependency manifest.
const MANIFEST_PREFIX: &str = "dependencies";

/// File-name suffixes accepted for dependency manifests.
const MANIFEST_SUFFIXES: [&str; 2] = ["yml", "yaml"];

/// Mapping from application name to a replacement git reference.
pub type GitReferenceOverrides = HashMap<String, String>;

/// Identify dependency manifest files in the specified directory.
///
/// Only regular files directly inside `directory` whose name starts with
/// `dependencies` and whose suffix is `.yml` or `.yaml` are returned, in
/// filesystem enumeration order.
pub fn discover_definitions(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let name_matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(MANIFEST_PREFIX));
        let suffix_matches = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| MANIFEST_SUFFIXES.contains(&extension));
        if name_matches && suffix_matches {
            files.push(path);
        }
    }

    info!(
        "discovered {} dependency manifest(s) in {}",
        files.len(),
        directory.display()
    );
    Ok(files)
}

/// Load one manifest file into a raw YAML document.
///
/// The content is validated against the full manifest schema as part of the
/// load, but the typed result is discarded: merging happens over the raw
/// documents, and the combined document is validated again afterwards.
fn load_manifest(path: &Path) -> Result<Value> {
    info!("loading application dependencies from {}", path.display());

    let manifest_error = |message: String| Error::ManifestLoad {
        path: path.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| manifest_error(e.to_string()))?;

    let parsed: DependencyFile =
        serde_yaml::from_value(document.clone()).map_err(|e| manifest_error(e.to_string()))?;
    parsed
        .validate()
        .map_err(|e| manifest_error(e.to_string()))?;

    Ok(document)
}

/// Load application definitions from the specified manifest files.
///
/// Merges the dependency declarations from all files into a single document
/// and flattens it into one [`ApplicationDefinition`] per unique application
/// name. An empty file set yields an empty list.
pub fn load_definitions(files: &[PathBuf]) -> Result<Vec<ApplicationDefinition>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let mut merged = Value::Mapping(Default::default());
    for file in files {
        deep_merge(&mut merged, load_manifest(file)?);
    }

    let document: DependencyFile = serde_yaml::from_value(merged).map_err(|e| Error::Merge {
        message: e.to_string(),
    })?;
    document.validate().map_err(|e| Error::Merge {
        message: e.to_string(),
    })?;

    Ok(document
        .context
        .dependencies
        .into_iter()
        .map(|(name, configuration)| ApplicationDefinition {
            name,
            configuration,
        })
        .collect())
}

/// Replace release references with user-supplied overrides.
///
/// Every definition whose name appears in `overrides` gets its reference
/// replaced; all other definitions are untouched. Overrides naming an
/// unknown application are silently ignored.
pub fn apply_reference_overrides(
    definitions: &mut [ApplicationDefinition],
    overrides: &GitReferenceOverrides,
) {
    if overrides.is_empty() {
        return;
    }
    for definition in definitions.iter_mut() {
        if let Some(reference) = overrides.get(&definition.name) {
            info!(
                "applying user git reference, {} -> {}",
                definition.name, reference
            );
            definition.configuration.release.r#ref = reference.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manifest_for(name: &str, reference: &str) -> String {
        format!(
            r#"
context:
  dependencies:
    {name}:
      backup:
        repo_url: "https://this.host/{name}"
        branch_name: main
      docker:
        image_name: {name}-image
        tag_prefix: p-
      release:
        ref: "{reference}"
"#
        )
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    #[test]
    fn test_discover_filters_by_name_and_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        fs::write(dir.join("dependencies_a.yml"), "a: 1").unwrap();
        fs::write(dir.join("dependencies_b.yaml"), "b: 2").unwrap();
        fs::write(dir.join("dependencies.txt"), "not yaml").unwrap();
        fs::write(dir.join("notes.yml"), "wrong name").unwrap();
        fs::create_dir(dir.join("dependencies_sub")).unwrap();

        let mut discovered = discover_definitions(dir).unwrap();
        discovered.sort();

        let names: Vec<_> = discovered
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["dependencies_a.yml", "dependencies_b.yaml"]);
    }

    #[test]
    fn test_discover_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/dependencies.yml"), "a: 1").unwrap();

        let discovered = discover_definitions(dir).unwrap();
        assert!(discovered.is_empty());
    }

    #[test]
    fn test_discover_missing_directory_fails() {
        let result = discover_definitions(Path::new("/nonexistent/project"));
        assert!(result.is_err());
    }

    // ========================================================================
    // Loading and merging
    // ========================================================================

    #[test]
    fn test_load_definitions_empty_set() {
        let definitions = load_definitions(&[]).unwrap();
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_load_definitions_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.yml");
        fs::write(&path, manifest_for("r1", "3.1.4")).unwrap();

        let definitions = load_definitions(&[path]).unwrap();

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "r1");
        assert_eq!(definitions[0].configuration.release.r#ref, "3.1.4");
    }

    #[test]
    fn test_load_definitions_merges_disjoint_files() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("dependencies_a.yml");
        let second = temp_dir.path().join("dependencies_b.yml");
        fs::write(&first, manifest_for("r1", "main")).unwrap();
        fs::write(&second, manifest_for("r2", "v1.0")).unwrap();

        let definitions = load_definitions(&[first, second]).unwrap();

        assert_eq!(definitions.len(), 2);
        let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"r1"));
        assert!(names.contains(&"r2"));
    }

    #[test]
    fn test_load_definitions_later_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("dependencies_a.yml");
        let second = temp_dir.path().join("dependencies_b.yml");
        fs::write(&first, manifest_for("r1", "1.0")).unwrap();
        fs::write(&second, manifest_for("r1", "2.0")).unwrap();

        let definitions = load_definitions(&[first, second]).unwrap();

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].configuration.release.r#ref, "2.0");
    }

    #[test]
    fn test_load_definitions_syntax_error_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.yml");
        fs::write(&path, "context: [unclosed").unwrap();

        let error = load_definitions(&[path]).unwrap_err();
        assert!(matches!(error, Error::ManifestLoad { .. }));
    }

    #[test]
    fn test_load_definitions_schema_violation_fails_at_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.yml");
        let content = manifest_for("r1", "1.0").replace("https://", "ftp://");
        fs::write(&path, content).unwrap();

        let error = load_definitions(&[path]).unwrap_err();
        let message = error.to_string();
        assert!(matches!(error, Error::ManifestLoad { .. }), "{}", message);
        assert!(message.contains("unsupported scheme"));
    }

    #[test]
    fn test_load_definitions_unreadable_file_fails() {
        let error = load_definitions(&[PathBuf::from("/nonexistent/dependencies.yml")]).unwrap_err();
        assert!(matches!(error, Error::ManifestLoad { .. }));
    }

    // ========================================================================
    // Reference overrides
    // ========================================================================

    fn definitions_fixture() -> Vec<ApplicationDefinition> {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("dependencies_a.yml");
        let second = temp_dir.path().join("dependencies_b.yml");
        fs::write(&first, manifest_for("r1", "1.0")).unwrap();
        fs::write(&second, manifest_for("r2", "2.0")).unwrap();
        load_definitions(&[first, second]).unwrap()
    }

    #[test]
    fn test_apply_overrides_replaces_named_reference() {
        let mut definitions = definitions_fixture();
        let overrides =
            GitReferenceOverrides::from([("r1".to_string(), "abc".to_string())]);

        apply_reference_overrides(&mut definitions, &overrides);

        let r1 = definitions.iter().find(|d| d.name == "r1").unwrap();
        let r2 = definitions.iter().find(|d| d.name == "r2").unwrap();
        assert_eq!(r1.configuration.release.r#ref, "abc");
        assert_eq!(r2.configuration.release.r#ref, "2.0");
    }

    #[test]
    fn test_apply_overrides_unknown_name_is_ignored() {
        let mut definitions = definitions_fixture();
        let before = definitions.clone();
        let overrides =
            GitReferenceOverrides::from([("r9".to_string(), "zzz".to_string())]);

        apply_reference_overrides(&mut definitions, &overrides);

        assert_eq!(definitions, before);
    }

    #[test]
    fn test_apply_overrides_empty_map_is_noop() {
        let mut definitions = definitions_fixture();
        let before = definitions.clone();

        apply_reference_overrides(&mut definitions, &GitReferenceOverrides::new());

        assert_eq!(definitions, before);
    }
}
