// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Vault client implementation.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;
use vault_controller_config::{SecretString, VaultAuth, VaultConfig};
use vault_controller_core::{EngineResult, KubernetesRole, Policy, SecretsEngine};

use crate::error::{VaultError, VaultResult};
use crate::http::build_client;

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Longest slice of a non-JSON error body kept in error messages.
const MAX_ERROR_BODY_LEN: usize = 200;

/// Body of `POST /v1/auth/{mount}/login`.
#[derive(Serialize)]
struct LoginRequest<'a> {
	role: &'a str,
	jwt: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
	auth: Option<LoginAuth>,
}

#[derive(Debug, Deserialize)]
struct LoginAuth {
	client_token: String,
}

/// Body of `POST /v1/auth/{mount}/role/{name}`.
#[derive(Serialize)]
struct RoleData<'a> {
	bound_service_account_names: &'a [String],
	bound_service_account_namespaces: &'a [String],
	policies: &'a [String],
	token_ttl: u64,
}

impl<'a> From<&'a KubernetesRole> for RoleData<'a> {
	fn from(role: &'a KubernetesRole) -> Self {
		Self {
			bound_service_account_names: &role.service_account_names,
			bound_service_account_namespaces: &role.service_account_namespaces,
			policies: &role.policies,
			token_ttl: role.token_ttl,
		}
	}
}

/// Body of `PUT /v1/sys/policy/{name}`.
#[derive(Serialize)]
struct PolicyData {
	policy: String,
}

/// Error response from Vault.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
	#[serde(default)]
	errors: Vec<String>,
}

/// An authenticated Vault connection.
pub struct VaultClient {
	http_client: reqwest::Client,
	address: Url,
	token: SecretString,
	namespace: Option<String>,
	kubernetes_mount: String,
}

impl VaultClient {
	/// Connect to Vault and authenticate.
	///
	/// With Kubernetes auth this reads the service account JWT and logs in;
	/// with token auth the configured token is used as-is. Either way the
	/// returned client holds a usable token.
	#[instrument(skip(config), fields(url = %config.address))]
	pub async fn connect(config: &VaultConfig) -> VaultResult<Self> {
		let mut client = Self {
			http_client: build_client(config.timeout)?,
			address: config.address.clone(),
			token: SecretString::new(""),
			namespace: config.namespace.clone(),
			kubernetes_mount: config.kubernetes_mount.clone(),
		};

		client.token = match &config.auth {
			VaultAuth::Token { token } => {
				if token.is_empty() {
					return Err(VaultError::EmptyToken);
				}
				token.clone()
			}
			VaultAuth::Kubernetes { role, jwt_path } => {
				info!(kubernetes_role = %role, "Connecting to HashiCorp Vault");
				let jwt = read_service_account_token(jwt_path).await?;
				client.login_kubernetes(role, &jwt).await?
			}
		};

		Ok(client)
	}

	/// Log in through the Kubernetes auth method and return the client token.
	async fn login_kubernetes(&self, role: &str, jwt: &SecretString) -> VaultResult<SecretString> {
		let url = self.endpoint(self.mount_path(&["login"]))?;
		let request = self.with_namespace(self.http_client.post(url)).json(&LoginRequest {
			role,
			jwt: jwt.expose(),
		});

		let response = request
			.send()
			.await
			.map_err(|e| VaultError::Login(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let err = api_error(response).await;
			warn!(status = %status, "Vault login refused");
			return Err(VaultError::Login(err.to_string()));
		}

		let body: LoginResponse = response
			.json()
			.await
			.map_err(|e| VaultError::Login(format!("invalid login response: {e}")))?;

		let token = body
			.auth
			.map(|auth| auth.client_token)
			.filter(|token| !token.is_empty())
			.ok_or(VaultError::MissingAuth)?;

		debug!("Obtained Vault token via Kubernetes auth");
		Ok(SecretString::new(token))
	}

	/// Create or replace a Kubernetes auth role.
	#[instrument(skip(self, role), fields(role = %role.name))]
	pub async fn write_role(&self, role: &KubernetesRole) -> VaultResult<()> {
		let url = self.endpoint(self.mount_path(&["role", role.name.as_str()]))?;
		let request = self.request(Method::POST, url).json(&RoleData::from(role));
		self.send(request).await.map(drop)
	}

	/// Delete a Kubernetes auth role. Deleting a missing role succeeds.
	#[instrument(skip(self))]
	pub async fn delete_role(&self, name: &str) -> VaultResult<()> {
		let url = self.endpoint(self.mount_path(&["role", name]))?;
		self.delete(url).await
	}

	/// Create or replace an ACL policy with the given HCL document.
	#[instrument(skip(self, rules))]
	pub async fn put_policy(&self, name: &str, rules: String) -> VaultResult<()> {
		let url = self.endpoint(vec!["sys", "policy", name])?;
		let request = self
			.request(Method::PUT, url)
			.json(&PolicyData { policy: rules });
		self.send(request).await.map(drop)
	}

	/// Delete an ACL policy. Deleting a missing policy succeeds.
	#[instrument(skip(self))]
	pub async fn delete_policy(&self, name: &str) -> VaultResult<()> {
		let url = self.endpoint(vec!["sys", "policy", name])?;
		self.delete(url).await
	}

	async fn delete(&self, url: Url) -> VaultResult<()> {
		match self.send(self.request(Method::DELETE, url)).await {
			Ok(_) => Ok(()),
			Err(VaultError::Api { status: 404, .. }) => {
				debug!("Object already absent");
				Ok(())
			}
			Err(e) => Err(e),
		}
	}

	/// `auth/{mount}/...` path segments. The mount may itself be nested.
	fn mount_path<'a>(&'a self, rest: &[&'a str]) -> Vec<&'a str> {
		let mut segments = vec!["auth"];
		segments.extend(self.kubernetes_mount.split('/').filter(|s| !s.is_empty()));
		segments.extend_from_slice(rest);
		segments
	}

	/// `{address}/v1/{segments...}`, each segment percent-encoded.
	fn endpoint(&self, segments: Vec<&str>) -> VaultResult<Url> {
		let mut url = self.address.clone();
		url
			.path_segments_mut()
			.map_err(|_| VaultError::Configuration(format!("{} cannot be a base URL", self.address)))?
			.pop_if_empty()
			.push("v1")
			.extend(segments);
		Ok(url)
	}

	fn with_namespace(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.namespace {
			Some(namespace) => request.header(NAMESPACE_HEADER, namespace),
			None => request,
		}
	}

	fn request(&self, method: Method, url: Url) -> RequestBuilder {
		let request = self
			.http_client
			.request(method, url)
			.header(TOKEN_HEADER, self.token.expose());
		self.with_namespace(request)
	}

	async fn send(&self, request: RequestBuilder) -> VaultResult<Response> {
		let response = request.send().await?;
		if response.status().is_success() {
			Ok(response)
		} else {
			Err(api_error(response).await)
		}
	}
}

#[async_trait]
impl SecretsEngine for VaultClient {
	async fn upsert_role(&self, role: &KubernetesRole) -> EngineResult<()> {
		Ok(self.write_role(role).await?)
	}

	async fn delete_role(&self, name: &str) -> EngineResult<()> {
		Ok(VaultClient::delete_role(self, name).await?)
	}

	async fn upsert_policy(&self, policy: &Policy) -> EngineResult<()> {
		Ok(self.put_policy(&policy.name, policy.to_hcl()).await?)
	}

	async fn delete_policy(&self, name: &str) -> EngineResult<()> {
		Ok(VaultClient::delete_policy(self, name).await?)
	}
}

impl std::fmt::Debug for VaultClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VaultClient")
			.field("address", &self.address.as_str())
			.field("namespace", &self.namespace)
			.field("kubernetes_mount", &self.kubernetes_mount)
			.finish()
	}
}

async fn read_service_account_token(path: &Path) -> VaultResult<SecretString> {
	let raw = tokio::fs::read_to_string(path)
		.await
		.map_err(|source| VaultError::ServiceAccountToken {
			path: path.to_path_buf(),
			source,
		})?;
	Ok(SecretString::new(raw.trim()))
}

/// Turn a non-success response into [`VaultError::Api`].
async fn api_error(response: Response) -> VaultError {
	let status = response.status();
	let body = match response.text().await {
		Ok(body) => body,
		Err(e) => {
			debug!(status = %status, error = %e, "Failed to read Vault error body");
			String::new()
		}
	};

	let errors = match serde_json::from_str::<ErrorResponse>(&body) {
		Ok(parsed) if !parsed.errors.is_empty() => parsed.errors,
		Ok(_) => vec![canonical_reason(status)],
		Err(_) if body.trim().is_empty() => vec![canonical_reason(status)],
		Err(_) => vec![sanitize_body_for_error(&body, MAX_ERROR_BODY_LEN)],
	};

	VaultError::Api {
		status: status.as_u16(),
		errors,
	}
}

fn canonical_reason(status: StatusCode) -> String {
	status
		.canonical_reason()
		.unwrap_or("unknown status")
		.to_string()
}

fn sanitize_body_for_error(body: &str, max_len: usize) -> String {
	let sanitized: String = body
		.chars()
		.filter(|c| !c.is_control() || *c == ' ')
		.take(max_len)
		.collect();
	if body.chars().count() > max_len {
		format!("{sanitized}...")
	} else {
		sanitized
	}
}
