// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for secrets engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by a secrets engine connection.
///
/// The variants follow who has to act: `Configuration` needs an operator,
/// `Authentication` and `Transport` are usually transient, and `Rejected`
/// depends on what Vault said.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
	#[error("configuration error: {message}")]
	Configuration { message: String },

	#[error("authentication failed: {message}")]
	Authentication { message: String },

	#[error("transport error: {message}")]
	Transport { message: String },

	#[error("secrets engine rejected request (HTTP {status}): {}", .errors.join("; "))]
	Rejected { status: u16, errors: Vec<String> },
}

impl EngineError {
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration {
			message: message.into(),
		}
	}

	pub fn authentication(message: impl Into<String>) -> Self {
		Self::Authentication {
			message: message.into(),
		}
	}

	pub fn transport(message: impl Into<String>) -> Self {
		Self::Transport {
			message: message.into(),
		}
	}

	/// Whether the same call may succeed later without anyone changing
	/// configuration or input.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Configuration { .. } => false,
			Self::Authentication { .. } | Self::Transport { .. } => true,
			Self::Rejected { status, .. } => *status == 429 || *status >= 500,
		}
	}
}
