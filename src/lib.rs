//! # Backup Source Library
//!
//! Core functionality for packaging git repositories, declared in YAML
//! dependency manifests, into a single dated backup archive. The library is
//! used by the `backup-source` command-line tool but can be embedded in
//! other applications that need the same snapshot pipeline.
//!
//! ## Quick Example
//!
//! ```
//! use backup_source::schema::DependencyFile;
//!
//! let manifest = r#"
//! context:
//!   dependencies:
//!     some-app:
//!       backup:
//!         repo_url: "https://some.host/some-app.git"
//!         branch_name: main
//!       docker:
//!         image_name: some-app
//!         tag_prefix: "p-"
//!       release:
//!         ref: "1.2.3"
//! "#;
//!
//! let document: DependencyFile = serde_yaml::from_str(manifest).unwrap();
//! document.validate().unwrap();
//! assert_eq!(document.context.dependencies.len(), 1);
//! ```
//!
//! ## Execution Flow
//!
//! The main entry point is [`pipeline::run_backup`], which executes the
//! following high-level steps:
//!
//! 1. **Discovery**: find `dependencies*.yml` manifests in the project
//!    directory (`manifest`).
//! 2. **Merge**: deep-merge all manifests into one document with
//!    override-wins semantics and flatten it into application definitions
//!    (`merge`, `manifest`, `schema`).
//! 3. **Overrides**: apply user-supplied git reference overrides.
//! 4. **Snapshots**: concurrently clone and archive every application at
//!    its resolved reference, each with a SHA-256 companion file
//!    (`snapshot`, `git`, `hash`).
//! 5. **Packaging**: bundle all snapshot archives and hash files into one
//!    dated package with its own hash file (`package`).
//!
//! A failure at any step aborts the whole run: the tool's contract is a
//! fully succeeded package or no package at all.

pub mod cancel;
pub mod error;
pub mod git;
pub mod hash;
pub mod keyvault;
pub mod manifest;
pub mod merge;
pub mod package;
pub mod pipeline;
pub mod schema;
pub mod snapshot;
