// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment lookup helpers.
//!
//! Configuration is read through a lookup function rather than straight from
//! [`std::env`], so tests can hand in a map instead of mutating the process
//! environment.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::SecretString;

/// Errors that can occur when loading a secret via the `VAR` / `VAR_FILE`
/// convention.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Reads a variable from the real process environment.
pub fn process_env(var: &str) -> Option<String> {
	std::env::var(var).ok()
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// `{var}_FILE` takes precedence and names a file whose contents (minus a
/// single trailing newline) are the secret. This is how Kubernetes and Vault
/// Agent usually hand tokens to a pod. Otherwise a non-empty `{var}` is used
/// directly.
pub fn load_secret_env<F>(lookup: &F, var: &str) -> Result<Option<SecretString>, SecretEnvError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path_str) = lookup(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(lookup(var).filter(|v| !v.is_empty()).map(SecretString::new))
}
