// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the vault controller.
//!
//! The controller is configured entirely from the environment, using the same
//! variable names as the official Vault clients. [`ControllerConfig`] is built
//! once at startup and handed to the Vault connector; nothing else reads the
//! environment.
//!
//! - [`VaultConfig`]: engine address, authentication mode and transport settings
//! - [`LogLevel`]: `LOG_LEVEL` verbosity
//! - [`SecretString`]: redacting wrapper for tokens

pub mod env;
mod secret;

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use url::Url;

pub use env::{load_secret_env, process_env, SecretEnvError};
pub use secret::{SecretString, REDACTED};

pub const ENV_ADDR: &str = "VAULT_ADDR";
pub const ENV_KUBERNETES_ROLE: &str = "VAULT_KUBERNETES_ROLE";
pub const ENV_TOKEN: &str = "VAULT_TOKEN";
pub const ENV_KUBERNETES_MOUNT: &str = "VAULT_KUBERNETES_MOUNT";
pub const ENV_KUBERNETES_TOKEN_PATH: &str = "VAULT_KUBERNETES_TOKEN_PATH";
pub const ENV_NAMESPACE: &str = "VAULT_NAMESPACE";
pub const ENV_CLIENT_TIMEOUT: &str = "VAULT_CLIENT_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Mount path of the Kubernetes auth method when none is configured.
pub const DEFAULT_KUBERNETES_MOUNT: &str = "kubernetes";

/// Where the kubelet projects the pod's service account token.
pub const DEFAULT_KUBERNETES_TOKEN_PATH: &str =
	"/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Vault client default for `VAULT_CLIENT_TIMEOUT`.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building configuration. None of these are retryable
/// without operator intervention.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("VAULT_ADDR not defined, cannot connect to Vault")]
	MissingAddress,

	#[error("VAULT_KUBERNETES_ROLE or VAULT_TOKEN not defined, cannot authenticate to Vault")]
	MissingAuth,

	#[error("both VAULT_KUBERNETES_ROLE and VAULT_TOKEN are defined, set exactly one")]
	ConflictingAuth,

	#[error("invalid {var}: {message}")]
	InvalidValue { var: &'static str, message: String },

	#[error(transparent)]
	Secret(#[from] SecretEnvError),
}

/// Top-level configuration for the controller process.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerConfig {
	pub log_level: LogLevel,
	pub vault: VaultConfig,
}

impl ControllerConfig {
	/// Load configuration from the process environment.
	pub fn from_env() -> ConfigResult<Self> {
		Self::from_lookup(process_env)
	}

	/// Load configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let log_level = lookup(ENV_LOG_LEVEL)
			.and_then(|v| LogLevel::parse(&v))
			.unwrap_or_default();

		Ok(Self {
			log_level,
			vault: VaultConfig::from_lookup(&lookup)?,
		})
	}
}

/// How the controller authenticates to Vault.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum VaultAuth {
	/// Log in through the Kubernetes auth method with the pod's service
	/// account JWT.
	Kubernetes { role: String, jwt_path: PathBuf },
	/// Use a pre-issued token as-is.
	Token { token: SecretString },
}

/// Connection settings for the Vault server.
#[derive(Debug, Clone, Serialize)]
pub struct VaultConfig {
	pub address: Url,
	pub auth: VaultAuth,
	/// Mount path of the Kubernetes auth method. Used for login and for the
	/// roles the controller manages.
	pub kubernetes_mount: String,
	pub namespace: Option<String>,
	#[serde(with = "duration_secs")]
	pub timeout: Duration,
}

impl VaultConfig {
	/// Configuration for token auth against `address`, with defaults for
	/// everything else.
	pub fn with_token(address: Url, token: SecretString) -> Self {
		Self {
			address,
			auth: VaultAuth::Token { token },
			kubernetes_mount: DEFAULT_KUBERNETES_MOUNT.to_string(),
			namespace: None,
			timeout: DEFAULT_CLIENT_TIMEOUT,
		}
	}

	pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |var: &str| lookup(var).filter(|v| !v.is_empty());

		let raw_address = non_empty(ENV_ADDR).ok_or(ConfigError::MissingAddress)?;
		let address = parse_address(&raw_address)?;

		let role = non_empty(ENV_KUBERNETES_ROLE);
		let token = load_secret_env(lookup, ENV_TOKEN)?;

		let auth = match (role, token) {
			(Some(_), Some(_)) => return Err(ConfigError::ConflictingAuth),
			(None, None) => return Err(ConfigError::MissingAuth),
			(Some(role), None) => VaultAuth::Kubernetes {
				role,
				jwt_path: non_empty(ENV_KUBERNETES_TOKEN_PATH)
					.unwrap_or_else(|| DEFAULT_KUBERNETES_TOKEN_PATH.to_string())
					.into(),
			},
			(None, Some(token)) => VaultAuth::Token { token },
		};

		let kubernetes_mount = non_empty(ENV_KUBERNETES_MOUNT)
			.map(|m| m.trim_matches('/').to_string())
			.filter(|m| !m.is_empty())
			.unwrap_or_else(|| DEFAULT_KUBERNETES_MOUNT.to_string());

		let timeout = match non_empty(ENV_CLIENT_TIMEOUT) {
			Some(raw) => parse_timeout(&raw)?,
			None => DEFAULT_CLIENT_TIMEOUT,
		};

		Ok(Self {
			address,
			auth,
			kubernetes_mount,
			namespace: non_empty(ENV_NAMESPACE),
			timeout,
		})
	}
}

fn parse_address(raw: &str) -> ConfigResult<Url> {
	let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
		var: ENV_ADDR,
		message: e.to_string(),
	})?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		other => Err(ConfigError::InvalidValue {
			var: ENV_ADDR,
			message: format!("unsupported scheme {other:?}"),
		}),
	}
}

/// Accepts whole seconds, optionally suffixed with `s` (`30`, `30s`).
fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
	let digits = raw.trim().trim_end_matches('s');
	digits
		.parse::<u64>()
		.ok()
		.filter(|secs| *secs > 0)
		.map(Duration::from_secs)
		.ok_or_else(|| ConfigError::InvalidValue {
			var: ENV_CLIENT_TIMEOUT,
			message: format!("expected a positive number of seconds, got {raw:?}"),
		})
}

mod duration_secs {
	use std::time::Duration;

	use serde::Serializer;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(value.as_secs())
	}
}

/// Process log verbosity, from `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Debug,
	#[default]
	Info,
	Warn,
	Error,
}

impl LogLevel {
	/// Parse a `LOG_LEVEL` value. `fatal` has no tracing equivalent and is
	/// treated as `error`. Unknown values yield `None`.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"debug" => Some(Self::Debug),
			"info" => Some(Self::Info),
			"warn" | "warning" => Some(Self::Warn),
			"error" | "fatal" => Some(Self::Error),
			_ => None,
		}
	}

	/// Filter directive understood by `tracing_subscriber::EnvFilter`.
	pub fn as_directive(&self) -> &'static str {
		match self {
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warn => "warn",
			Self::Error => "error",
		}
	}
}
