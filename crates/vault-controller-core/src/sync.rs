// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire envelope exchanged with the orchestrator.
//!
//! The orchestrator posts the parent object it is reconciling together with a
//! `finalizing` flag, and reads back the status it should record plus whether
//! the finalizer may be released.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// A sync request for a resource whose spec is `S`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest<S> {
	pub parent: ParentObject<S>,
	/// Set when the parent is being deleted and the engine object has to go.
	#[serde(default)]
	pub finalizing: bool,
}

/// The custom resource being reconciled. Only `spec` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentObject<S> {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_version: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default)]
	pub metadata: ObjectMeta,
	pub spec: S,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<ControllerStatus>,
}

impl<S> SyncRequest<S> {
	pub fn new(spec: S, finalizing: bool) -> Self {
		Self {
			parent: ParentObject {
				api_version: None,
				kind: None,
				metadata: ObjectMeta::default(),
				spec,
				status: None,
			},
			finalizing,
		}
	}

	pub fn spec(&self) -> &S {
		&self.parent.spec
	}
}

/// Status recorded on the parent object. A status without `succeeded` reads
/// as not yet succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerStatus {
	pub succeeded: bool,
}

/// Outcome reported back to the orchestrator.
///
/// `finalized` is only ever true after a successful delete. A response with
/// `succeeded: false` asks the orchestrator to retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
	pub status: ControllerStatus,
	pub finalized: bool,
}

impl SyncResponse {
	/// The desired state was applied.
	pub fn applied() -> Self {
		Self {
			status: ControllerStatus { succeeded: true },
			finalized: false,
		}
	}

	/// The engine object is gone; the finalizer may be released.
	pub fn finalized() -> Self {
		Self {
			status: ControllerStatus { succeeded: true },
			finalized: true,
		}
	}

	/// Nothing was confirmed. Never finalizes.
	pub fn failed() -> Self {
		Self {
			status: ControllerStatus { succeeded: false },
			finalized: false,
		}
	}

	pub fn succeeded(&self) -> bool {
		self.status.succeeded
	}
}
