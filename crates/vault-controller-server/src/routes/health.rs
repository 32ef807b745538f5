// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Liveness HTTP handler.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
}

/// GET /health - The process is up and serving requests. Vault is not
/// contacted.
pub async fn health_check() -> Json<HealthResponse> {
	Json(HealthResponse { status: "ok" })
}
