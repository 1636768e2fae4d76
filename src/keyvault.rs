//! # Azure Keyvault Secret Retrieval
//!
//! Thin wrapper around the `az` CLI for fetching the access token used to
//! authenticate repository clones. The secret value is returned as plain
//! text and is never logged.

use std::process::Command;

use log::info;

use crate::error::{Error, Result};

/// Acquire the value of a secret from the specified keyvault.
///
/// Shells out to `az keyvault secret show`. Returns `None` when the secret
/// exists but its value is empty.
pub fn get_keyvault_secret(
    secret_name: &str,
    keyvault_fqdn: &str,
    subscription: &str,
) -> Result<Option<String>> {
    info!(
        "acquiring keyvault secret, {} (keyvault {}, subscription {})",
        secret_name, keyvault_fqdn, subscription
    );

    let output = Command::new("az")
        .args([
            "keyvault",
            "secret",
            "show",
            "--subscription",
            subscription,
            "--id",
            &format!("https://{}/secrets/{}", keyvault_fqdn, secret_name),
        ])
        .output()
        .map_err(|e| Error::Keyvault {
            message: format!("failed to run the az CLI, {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::Keyvault {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|e| Error::Keyvault {
            message: format!("unexpected az CLI output, {}", e),
        })?;

    Ok(response
        .get("value")
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string))
}
