// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The sync state machine.
//!
//! A request is either applied (upsert) or torn down (delete), depending only
//! on its `finalizing` flag. The branch logic lives in one generic
//! [`Reconciler`]; each resource kind contributes just its upsert and delete
//! calls through [`ResourceKind`], so the finalization rule cannot drift
//! between kinds.
//!
//! The rule: `finalized` is reported only after the engine confirmed the
//! delete. Reporting it on a failed delete would let the orchestrator drop its
//! record while the Vault object lives on.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use crate::engine::{EngineConnector, SecretsEngine};
use crate::error::{EngineError, EngineResult};
use crate::sync::{SyncRequest, SyncResponse};
use crate::types::{KubernetesRole, Policy};

/// The branch a sync request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
	Upsert,
	Delete,
}

impl SyncAction {
	pub fn for_request(finalizing: bool) -> Self {
		if finalizing {
			Self::Delete
		} else {
			Self::Upsert
		}
	}
}

impl fmt::Display for SyncAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Upsert => f.write_str("create/update"),
			Self::Delete => f.write_str("delete"),
		}
	}
}

/// The upsert/delete pair for one kind of managed resource.
#[async_trait]
pub trait ResourceKind: Send + Sync {
	type Spec: Send + Sync;

	/// Label used in logs and errors, e.g. `"Kubernetes Role"`.
	fn label(&self) -> &'static str;

	fn name<'a>(&self, spec: &'a Self::Spec) -> &'a str;

	async fn upsert(&self, engine: &dyn SecretsEngine, spec: &Self::Spec) -> EngineResult<()>;

	async fn delete(&self, engine: &dyn SecretsEngine, name: &str) -> EngineResult<()>;
}

/// Roles in Vault's Kubernetes auth method.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubernetesRoles;

#[async_trait]
impl ResourceKind for KubernetesRoles {
	type Spec = KubernetesRole;

	fn label(&self) -> &'static str {
		"Kubernetes Role"
	}

	fn name<'a>(&self, spec: &'a KubernetesRole) -> &'a str {
		&spec.name
	}

	async fn upsert(&self, engine: &dyn SecretsEngine, spec: &KubernetesRole) -> EngineResult<()> {
		engine.upsert_role(spec).await
	}

	async fn delete(&self, engine: &dyn SecretsEngine, name: &str) -> EngineResult<()> {
		engine.delete_role(name).await
	}
}

/// Vault ACL policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policies;

#[async_trait]
impl ResourceKind for Policies {
	type Spec = Policy;

	fn label(&self) -> &'static str {
		"Policy"
	}

	fn name<'a>(&self, spec: &'a Policy) -> &'a str {
		&spec.name
	}

	async fn upsert(&self, engine: &dyn SecretsEngine, spec: &Policy) -> EngineResult<()> {
		engine.upsert_policy(spec).await
	}

	async fn delete(&self, engine: &dyn SecretsEngine, name: &str) -> EngineResult<()> {
		engine.delete_policy(name).await
	}
}

/// A sync attempt that did not reach its desired state.
#[derive(Debug, Error)]
#[error("failed to {action} {kind} {name}: {source}")]
pub struct SyncFailure {
	pub kind: &'static str,
	pub name: String,
	pub action: SyncAction,
	#[source]
	pub source: EngineError,
}

impl SyncFailure {
	/// The response owed to the orchestrator. Never finalizes, whichever
	/// branch failed.
	pub fn response(&self) -> SyncResponse {
		SyncResponse::failed()
	}
}

/// Drives one resource kind through the sync state machine.
#[derive(Debug, Clone, Default)]
pub struct Reconciler<K> {
	kind: K,
}

impl<K: ResourceKind> Reconciler<K> {
	pub fn new(kind: K) -> Self {
		Self { kind }
	}

	/// Open a connection and apply or delete the requested resource.
	///
	/// Returns [`SyncResponse::applied`] after a successful upsert and
	/// [`SyncResponse::finalized`] after a successful delete. Any failure,
	/// including failing to connect, comes back as a [`SyncFailure`].
	#[instrument(
		skip_all,
		fields(
			kind = self.kind.label(),
			resource = %self.kind.name(request.spec()),
			finalizing = request.finalizing,
		)
	)]
	pub async fn reconcile(
		&self,
		connector: &dyn EngineConnector,
		request: &SyncRequest<K::Spec>,
	) -> Result<SyncResponse, SyncFailure> {
		let spec = request.spec();
		let name = self.kind.name(spec);
		let action = SyncAction::for_request(request.finalizing);
		let fail = |source: EngineError| SyncFailure {
			kind: self.kind.label(),
			name: name.to_string(),
			action,
			source,
		};

		let engine = connector.connect().await.map_err(&fail)?;

		match action {
			SyncAction::Delete => {
				info!("Deleting {} {}", self.kind.label(), name);
				self
					.kind
					.delete(engine.as_ref(), name)
					.await
					.map_err(&fail)?;
				Ok(SyncResponse::finalized())
			}
			SyncAction::Upsert => {
				info!("Creating/updating {} {}", self.kind.label(), name);
				self
					.kind
					.upsert(engine.as_ref(), spec)
					.await
					.map_err(&fail)?;
				Ok(SyncResponse::applied())
			}
		}
	}
}
