//! Shared test utilities for the E2E tests.

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Render a minimal valid manifest declaring one application.
pub fn manifest(name: &str, reference: &str) -> String {
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

/// A project directory populated with the given manifest files.
pub fn project_dir(manifests: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (file_name, content) in manifests {
        temp.child(file_name).write_str(content).unwrap();
    }
    temp
}
