//! Package command implementation
//!
//! The package command executes the full backup pipeline: discover and merge
//! dependency manifests, apply git reference overrides, snapshot every
//! application concurrently, and assemble the dated package with its SHA-256
//! hash file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use log::warn;

use backup_source::cancel::CancelFlag;
use backup_source::error::Error;
use backup_source::keyvault;
use backup_source::manifest::GitReferenceOverrides;
use backup_source::pipeline::{self, BackupOptions};
use backup_source::snapshot::SnapshotEngine;

/// Arguments for the package command
#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Name of the project, used as the package file name prefix
    pub project_name: String,

    /// Directory containing dependencies*.yml manifest files
    pub project_directory: PathBuf,

    /// Directory to save the output tar file and SHA file
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Git reference override for a named application, as <name>=<gitref>
    /// where the name is an entry in the dependencies YAML files
    #[arg(long = "git-ref", value_name = "NAME=REF")]
    pub git_ref: Vec<String>,

    /// File containing a personal access token for authenticating against
    /// repositories ("-" reads the token from stdin). A single token must
    /// have read access to all the repositories defined in the backup.
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Name of the keyvault secret holding the access token
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "token_file",
        requires = "keyvault_fqdn",
        requires = "keyvault_subscription"
    )]
    pub keyvault_secret: Option<String>,

    /// FQDN of the keyvault to fetch the access token from
    #[arg(long, value_name = "FQDN", requires = "keyvault_secret")]
    pub keyvault_fqdn: Option<String>,

    /// Name or GUID of the subscription the keyvault is deployed in
    #[arg(long, value_name = "SUBSCRIPTION", requires = "keyvault_secret")]
    pub keyvault_subscription: Option<String>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parse `<name>=<gitref>` override options into a mapping.
///
/// Anything without exactly one `=` is rejected here, before the pipeline
/// runs.
fn parse_reference_overrides(raw: &[String]) -> Result<GitReferenceOverrides> {
    let mut overrides = GitReferenceOverrides::new();
    for option in raw {
        let tokens: Vec<&str> = option.split('=').collect();
        if tokens.len() != 2 {
            bail!("Malformed git ref option, {}", option);
        }
        overrides.insert(tokens[0].trim().to_string(), tokens[1].trim().to_string());
    }
    Ok(overrides)
}

/// Resolve the optional access token from the token file or the keyvault.
fn resolve_token(args: &PackageArgs) -> Result<Option<String>> {
    if let Some(token_file) = &args.token_file {
        let raw = if token_file.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read token from stdin")?;
            buffer
        } else {
            fs::read_to_string(token_file)
                .with_context(|| format!("Failed to read token file {}", token_file.display()))?
        };
        let token = raw.trim();
        return Ok((!token.is_empty()).then(|| token.to_string()));
    }

    if let (Some(secret), Some(fqdn), Some(subscription)) = (
        &args.keyvault_secret,
        &args.keyvault_fqdn,
        &args.keyvault_subscription,
    ) {
        return Ok(keyvault::get_keyvault_secret(secret, fqdn, subscription)?);
    }

    Ok(None)
}

/// Execute the package command
pub fn execute(args: PackageArgs) -> Result<()> {
    if !args.project_directory.is_dir() {
        bail!(
            "Project directory not found: {}",
            args.project_directory.display()
        );
    }
    if !args.output_dir.is_dir() {
        bail!("Output directory not found: {}", args.output_dir.display());
    }

    let git_refs = parse_reference_overrides(&args.git_ref)?;
    let token = resolve_token(&args)?;

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        warn!("failed to install interrupt handler, {}", e);
    }

    let options = BackupOptions {
        project_name: args.project_name,
        project_directory: args.project_directory,
        output_directory: args.output_dir,
        git_refs,
        token,
        quiet: args.quiet,
    };
    let engine = SnapshotEngine::default();

    match pipeline::run_backup(&options, &engine, &cancel) {
        Ok(artifact) => {
            if !args.quiet {
                println!("📦 {}", artifact.package_path.display());
                println!("   {}", artifact.hash_path.display());
            }
            Ok(())
        }
        Err(Error::Interrupted) => {
            println!("User aborted execution. Exiting.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
