// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Vault client.

use std::path::PathBuf;

use thiserror::Error;
use vault_controller_core::EngineError;

/// Errors that can occur when talking to Vault.
#[derive(Debug, Error)]
pub enum VaultError {
	/// Failed to read the service account JWT used for Kubernetes login.
	#[error("failed to read service account token {path}: {source}")]
	ServiceAccountToken {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Kubernetes auth login was refused or could not be sent.
	#[error("login failed: {0}")]
	Login(String),

	/// Login succeeded but carried no client token.
	#[error("no auth info was returned after login")]
	MissingAuth,

	/// A static token was configured but is empty.
	#[error("configured Vault token is empty")]
	EmptyToken,

	/// HTTP error.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Vault answered with a non-success status.
	#[error("Vault returned HTTP {status}: {}", .errors.join("; "))]
	Api { status: u16, errors: Vec<String> },

	/// Configuration error.
	#[error("configuration error: {0}")]
	Configuration(String),
}

/// Result type for Vault client operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl From<VaultError> for EngineError {
	fn from(err: VaultError) -> Self {
		match err {
			VaultError::ServiceAccountToken { .. }
			| VaultError::Login(_)
			| VaultError::MissingAuth
			| VaultError::EmptyToken => EngineError::authentication(err.to_string()),
			VaultError::Http(ref e) if e.is_builder() => EngineError::configuration(err.to_string()),
			VaultError::Http(_) => EngineError::transport(err.to_string()),
			VaultError::Api { status, errors } => EngineError::Rejected { status, errors },
			VaultError::Configuration(message) => EngineError::configuration(message),
		}
	}
}
