// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::types::{KubernetesRole, Policy};

/// An authenticated connection to the secrets engine.
///
/// Every operation is idempotent: writes are full replacements and deleting
/// something that is already gone succeeds. Implementations make exactly one
/// engine call per operation, so a failure never leaves a half-applied object.
#[async_trait]
pub trait SecretsEngine: Send + Sync {
	/// Create or fully replace the Kubernetes auth role `role.name`.
	async fn upsert_role(&self, role: &KubernetesRole) -> EngineResult<()>;

	/// Delete the Kubernetes auth role `name`.
	async fn delete_role(&self, name: &str) -> EngineResult<()>;

	/// Render `policy` to HCL and store it, replacing any previous document.
	async fn upsert_policy(&self, policy: &Policy) -> EngineResult<()>;

	/// Delete the ACL policy `name`.
	async fn delete_policy(&self, name: &str) -> EngineResult<()>;
}

/// Opens [`SecretsEngine`] connections.
///
/// The dispatcher asks for a fresh connection per sync request, so a bad
/// credential or dropped connection in one request cannot affect another.
/// Construction performs the authentication handshake eagerly.
#[async_trait]
pub trait EngineConnector: Send + Sync {
	async fn connect(&self) -> EngineResult<Arc<dyn SecretsEngine>>;
}
