// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Desired-state specs for the resources the controller manages.
//!
//! Field names match the custom resource schemas, so these types are decoded
//! directly from the `spec` of the parent object.

use serde::{Deserialize, Deserializer, Serialize};

/// A role in Vault's Kubernetes auth method.
///
/// Upserting a role replaces every attribute; there is no partial merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesRole {
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub service_account_names: Vec<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub service_account_namespaces: Vec<String>,
	/// Policies attached to tokens issued through this role, in order.
	#[serde(default, deserialize_with = "null_as_default")]
	pub policies: Vec<String>,
	/// Token TTL in seconds. Zero leaves the mount default in place.
	#[serde(default, deserialize_with = "null_as_default")]
	pub token_ttl: u64,
}

/// An ACL policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
	pub name: String,
	/// Rendered in order by [`crate::render_policy`]. The resource schema calls
	/// this list `policies`.
	#[serde(rename = "policies", default, deserialize_with = "null_as_default")]
	pub rules: Vec<PolicyRule>,
}

/// One `path "..." { capabilities = [...] }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
	pub path: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub capabilities: Vec<String>,
}

impl PolicyRule {
	pub fn new<I, S>(path: impl Into<String>, capabilities: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			path: path.into(),
			capabilities: capabilities.into_iter().map(Into::into).collect(),
		}
	}
}

/// Explicit `null` decodes like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
