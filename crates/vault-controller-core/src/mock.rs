// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory secrets engine for tests.
//!
//! [`MockSecretsEngine`] keeps roles and rendered policies in maps, records
//! every call it receives, and can be told to fail upcoming calls. Pair it with
//! [`MockConnector`] to drive the reconciler or the HTTP dispatcher without a
//! Vault server.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::engine::{EngineConnector, SecretsEngine};
use crate::error::{EngineError, EngineResult};
use crate::types::{KubernetesRole, Policy};

/// A call received by [`MockSecretsEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
	UpsertRole(KubernetesRole),
	DeleteRole(String),
	UpsertPolicy { name: String, hcl: String },
	DeletePolicy(String),
}

impl EngineCall {
	pub fn is_delete(&self) -> bool {
		matches!(self, Self::DeleteRole(_) | Self::DeletePolicy(_))
	}

	pub fn is_upsert(&self) -> bool {
		!self.is_delete()
	}
}

#[derive(Debug, Default)]
struct MockState {
	roles: BTreeMap<String, KubernetesRole>,
	policies: BTreeMap<String, String>,
	calls: Vec<EngineCall>,
	failures: VecDeque<EngineError>,
}

/// In-memory [`SecretsEngine`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSecretsEngine {
	state: Arc<Mutex<MockState>>,
}

impl MockSecretsEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make the next call fail with `error`. Queued failures are consumed in
	/// FIFO order and leave the stored objects untouched.
	pub async fn fail_next(&self, error: EngineError) {
		self.state.lock().await.failures.push_back(error);
	}

	/// Every call received so far, in order, including failed ones.
	pub async fn calls(&self) -> Vec<EngineCall> {
		self.state.lock().await.calls.clone()
	}

	pub async fn role(&self, name: &str) -> Option<KubernetesRole> {
		self.state.lock().await.roles.get(name).cloned()
	}

	/// The HCL stored for policy `name`.
	pub async fn policy(&self, name: &str) -> Option<String> {
		self.state.lock().await.policies.get(name).cloned()
	}

	async fn record(&self, call: EngineCall) -> EngineResult<()> {
		let mut state = self.state.lock().await;
		state.calls.push(call.clone());
		if let Some(error) = state.failures.pop_front() {
			return Err(error);
		}

		match call {
			EngineCall::UpsertRole(role) => {
				state.roles.insert(role.name.clone(), role);
			}
			EngineCall::DeleteRole(name) => {
				state.roles.remove(&name);
			}
			EngineCall::UpsertPolicy { name, hcl } => {
				state.policies.insert(name, hcl);
			}
			EngineCall::DeletePolicy(name) => {
				state.policies.remove(&name);
			}
		}
		Ok(())
	}
}

#[async_trait]
impl SecretsEngine for MockSecretsEngine {
	async fn upsert_role(&self, role: &KubernetesRole) -> EngineResult<()> {
		self.record(EngineCall::UpsertRole(role.clone())).await
	}

	async fn delete_role(&self, name: &str) -> EngineResult<()> {
		self.record(EngineCall::DeleteRole(name.to_string())).await
	}

	async fn upsert_policy(&self, policy: &Policy) -> EngineResult<()> {
		self
			.record(EngineCall::UpsertPolicy {
				name: policy.name.clone(),
				hcl: policy.to_hcl(),
			})
			.await
	}

	async fn delete_policy(&self, name: &str) -> EngineResult<()> {
		self.record(EngineCall::DeletePolicy(name.to_string())).await
	}
}

/// [`EngineConnector`] handing out a shared [`MockSecretsEngine`].
#[derive(Debug, Default)]
pub struct MockConnector {
	engine: MockSecretsEngine,
	failures: Mutex<VecDeque<EngineError>>,
	connects: AtomicUsize,
}

impl MockConnector {
	pub fn new(engine: MockSecretsEngine) -> Self {
		Self {
			engine,
			failures: Mutex::new(VecDeque::new()),
			connects: AtomicUsize::new(0),
		}
	}

	pub fn engine(&self) -> &MockSecretsEngine {
		&self.engine
	}

	/// Make the next `connect` fail, as a failed login would.
	pub async fn fail_next_connect(&self, error: EngineError) {
		self.failures.lock().await.push_back(error);
	}

	/// Number of connection attempts, successful or not.
	pub fn connect_count(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl EngineConnector for MockConnector {
	async fn connect(&self) -> EngineResult<Arc<dyn SecretsEngine>> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		if let Some(error) = self.failures.lock().await.pop_front() {
			return Err(error);
		}
		Ok(Arc::new(self.engine.clone()))
	}
}
