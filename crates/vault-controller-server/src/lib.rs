// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Sync webhook for the vault controller.
//!
//! The orchestrator posts a parent object and a `finalizing` flag to one
//! endpoint per resource kind. Each request is decoded, handed to a
//! [`Reconciler`](vault_controller_core::Reconciler) over a freshly opened
//! engine connection, and answered with the status to record on the parent.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use vault_controller_core::{EngineConnector, KubernetesRoles, Policies};

pub use error::SyncApiError;

/// Fixed address the webhook listens on.
pub const LISTEN_ADDR: &str = "0.0.0.0:80";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct AppState {
	pub connector: Arc<dyn EngineConnector>,
}

impl AppState {
	pub fn new(connector: Arc<dyn EngineConnector>) -> Self {
		Self { connector }
	}
}

/// Build the webhook router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route(
			"/sync-kubernetes-role",
			post(routes::sync::sync_resource::<KubernetesRoles>),
		)
		.route("/sync-policy", post(routes::sync::sync_resource::<Policies>))
		.route("/health", get(routes::health::health_check))
		.with_state(state)
}
