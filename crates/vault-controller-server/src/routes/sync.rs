// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Sync HTTP handlers.

use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use vault_controller_core::{Reconciler, ResourceKind, SyncRequest, SyncResponse};

use crate::error::SyncApiError;
use crate::AppState;

/// POST /sync-kubernetes-role, POST /sync-policy - Reconcile one parent object.
///
/// The body is decoded from raw bytes so that any malformed envelope is a 400,
/// whatever its `Content-Type`. Nothing is sent to Vault in that case.
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn sync_resource<K>(
	State(state): State<AppState>,
	uri: Uri,
	body: Bytes,
) -> Result<Json<SyncResponse>, SyncApiError>
where
	K: ResourceKind + Default + 'static,
	K::Spec: DeserializeOwned + 'static,
{
	info!("Request to {}", uri.path());

	let request: SyncRequest<K::Spec> = serde_json::from_slice(&body)?;
	let response = Reconciler::new(K::default())
		.reconcile(state.connector.as_ref(), &request)
		.await?;

	Ok(Json(response))
}
