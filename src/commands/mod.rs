//! # CLI Command Implementations
//!
//! One module per subcommand of the `backup-source` command-line tool. Each
//! module defines an `Args` struct (derived with `clap`) and an `execute`
//! function that performs the command's logic by calling into the
//! `backup_source` library.

pub mod completions;
pub mod package;
pub mod validate;
