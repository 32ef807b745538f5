// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vault_controller_core::SyncFailure;

/// Errors returned by the sync handlers. Both are answered in plain text.
#[derive(Debug, thiserror::Error)]
pub enum SyncApiError {
	/// The request envelope could not be decoded.
	#[error("invalid sync request: {0}")]
	Decode(#[from] serde_json::Error),

	/// Reconciliation did not reach the desired state.
	#[error(transparent)]
	Sync(#[from] SyncFailure),
}

impl SyncApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			SyncApiError::Decode(_) => StatusCode::BAD_REQUEST,
			SyncApiError::Sync(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Whether resending the same request may succeed without operator action.
	pub fn is_transient(&self) -> bool {
		match self {
			SyncApiError::Decode(_) => false,
			SyncApiError::Sync(failure) => failure.source.is_transient(),
		}
	}
}

impl IntoResponse for SyncApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = self.to_string();

		match &self {
			SyncApiError::Decode(_) => {
				tracing::warn!(status = status.as_u16(), error = %message, "Rejected sync request")
			}
			SyncApiError::Sync(failure) => tracing::error!(
				status = status.as_u16(),
				error = %message,
				transient = self.is_transient(),
				finalized = failure.response().finalized,
				"Sync failed"
			),
		}

		(status, message).into_response()
	}
}
