// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Integration tests for the sync endpoints.
//!
//! Tests cover:
//! - Role and policy upsert/delete through the HTTP surface
//! - Malformed envelopes are rejected before any engine connection
//! - Engine and connection failures surface as 500 and never finalize
//! - Health endpoint

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header, Request, StatusCode},
	Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use vault_controller_core::mock::{EngineCall, MockConnector};
use vault_controller_core::{EngineError, KubernetesRole};
use vault_controller_server::{create_router, AppState};

fn setup_test_app() -> (Router, Arc<MockConnector>) {
	let connector = Arc::new(MockConnector::default());
	let app = create_router(AppState::new(connector.clone()));
	(app, connector)
}

async fn post(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(uri)
				.header(header::CONTENT_TYPE, "application/json")
				.body(body.into())
				.unwrap(),
		)
		.await
		.unwrap();

	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	(status, bytes.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
	let (status, bytes) = post(app, uri, body.to_string()).await;
	let value = serde_json::from_slice(&bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
	(status, value)
}

fn role_request(finalizing: bool) -> Value {
	json!({
		"parent": {
			"apiVersion": "vault.example.com/v1",
			"kind": "KubernetesRole",
			"metadata": {"name": "app-role", "namespace": "default"},
			"spec": {
				"name": "app-role",
				"serviceAccountNames": ["app"],
				"serviceAccountNamespaces": ["default"],
				"policies": ["app-policy"],
				"tokenTtl": 3600
			}
		},
		"finalizing": finalizing
	})
}

fn policy_request(finalizing: bool) -> Value {
	json!({
		"parent": {
			"metadata": {"name": "app-policy"},
			"spec": {
				"name": "app-policy",
				"policies": [
					{"path": "secret/data/app/*", "capabilities": ["read", "list"]}
				]
			}
		},
		"finalizing": finalizing
	})
}

fn succeeded(finalized: bool) -> Value {
	json!({"status": {"succeeded": true}, "finalized": finalized})
}

// ============================================================================
// Role Endpoint Tests
// ============================================================================

/// Upsert then delete of the same role, checking exactly what reaches the engine.
#[tokio::test]
async fn test_role_lifecycle() {
	let (app, connector) = setup_test_app();

	let (status, body) = post_json(&app, "/sync-kubernetes-role", role_request(false)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(false));

	let expected = KubernetesRole {
		name: "app-role".to_string(),
		service_account_names: vec!["app".to_string()],
		service_account_namespaces: vec!["default".to_string()],
		policies: vec!["app-policy".to_string()],
		token_ttl: 3600,
	};
	assert_eq!(connector.engine().role("app-role").await, Some(expected.clone()));

	let (status, body) = post_json(&app, "/sync-kubernetes-role", role_request(true)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(true));

	assert_eq!(
		connector.engine().calls().await,
		vec![
			EngineCall::UpsertRole(expected),
			EngineCall::DeleteRole("app-role".to_string()),
		]
	);
	assert_eq!(connector.engine().role("app-role").await, None);
	assert_eq!(connector.connect_count(), 2);
}

/// Omitted optional fields default rather than failing the decode.
#[tokio::test]
async fn test_role_with_only_name() {
	let (app, connector) = setup_test_app();

	let request = json!({"parent": {"spec": {"name": "bare"}}});
	let (status, body) = post_json(&app, "/sync-kubernetes-role", request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(false));
	let role = connector.engine().role("bare").await.unwrap();
	assert!(role.policies.is_empty());
	assert_eq!(role.token_ttl, 0);
}

/// A parent whose recorded status lacks `succeeded` is still reconciled, so a
/// deletion can release its finalizer.
#[tokio::test]
async fn test_status_without_succeeded_is_accepted() {
	let (app, connector) = setup_test_app();

	let request = json!({
		"parent": {
			"metadata": {"name": "app-role"},
			"spec": {"name": "app-role"},
			"status": {}
		},
		"finalizing": true
	});
	let (status, body) = post_json(&app, "/sync-kubernetes-role", request).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(true));

	let request = json!({
		"parent": {
			"spec": {"name": "app-policy", "policies": null},
			"status": {"observedGeneration": 2}
		},
		"finalizing": true
	});
	let (status, body) = post_json(&app, "/sync-policy", request).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(true));

	assert_eq!(
		connector.engine().calls().await,
		vec![
			EngineCall::DeleteRole("app-role".to_string()),
			EngineCall::DeletePolicy("app-policy".to_string()),
		]
	);
}

/// Explicit nulls in a role spec decode like omitted fields.
#[tokio::test]
async fn test_role_with_null_attributes() {
	let (app, connector) = setup_test_app();

	let request = json!({
		"parent": {
			"spec": {
				"name": "app-role",
				"serviceAccountNames": null,
				"serviceAccountNamespaces": ["default"],
				"policies": null
			}
		},
		"finalizing": false
	});
	let (status, body) = post_json(&app, "/sync-kubernetes-role", request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(false));
	let role = connector.engine().role("app-role").await.unwrap();
	assert!(role.service_account_names.is_empty());
	assert_eq!(role.service_account_namespaces, vec!["default"]);
	assert!(role.policies.is_empty());
}

// ============================================================================
// Policy Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_policy_upsert_stores_rendered_hcl() {
	let (app, connector) = setup_test_app();

	let (status, body) = post_json(&app, "/sync-policy", policy_request(false)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(false));

	assert_eq!(
		connector.engine().policy("app-policy").await.as_deref(),
		Some("path \"secret/data/app/*\" {\n\tcapabilities = [\"read\", \"list\"]\n}\n")
	);
}

/// Deleting a policy the engine never held still releases the finalizer.
#[tokio::test]
async fn test_policy_delete_of_absent_finalizes() {
	let (app, connector) = setup_test_app();

	let (status, body) = post_json(&app, "/sync-policy", policy_request(true)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(true));
	assert_eq!(
		connector.engine().calls().await,
		vec![EngineCall::DeletePolicy("app-policy".to_string())]
	);
}

#[tokio::test]
async fn test_success_response_is_json() {
	let (app, _connector) = setup_test_app();

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/sync-policy")
				.body(Body::from(policy_request(false).to_string()))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CONTENT_TYPE).unwrap(),
		"application/json"
	);
}

// ============================================================================
// Malformed Envelope Tests
// ============================================================================

/// Bad envelopes are 400s on both endpoints and never open a connection.
#[tokio::test]
async fn test_malformed_envelopes_are_rejected() {
	let (app, connector) = setup_test_app();

	let bad_bodies = [
		"not json".to_string(),
		"".to_string(),
		json!({"finalizing": false}).to_string(),
		json!({"parent": {"metadata": {"name": "x"}}, "finalizing": true}).to_string(),
		json!({"parent": {"spec": {"name": 42}}}).to_string(),
		json!({"parent": {"spec": {"name": "x"}}, "finalizing": "yes"}).to_string(),
	];

	for uri in ["/sync-kubernetes-role", "/sync-policy"] {
		for body in &bad_bodies {
			let (status, _) = post(&app, uri, body.clone()).await;
			assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} accepted {body:?}");
		}
	}

	assert_eq!(connector.connect_count(), 0);
	assert!(connector.engine().calls().await.is_empty());
}

// ============================================================================
// Failure Tests
// ============================================================================

/// A failed delete is a 500 with the detail in plain text, so the finalizer
/// is kept and the orchestrator retries.
#[tokio::test]
async fn test_failed_delete_is_server_error() {
	let (app, connector) = setup_test_app();
	connector
		.engine()
		.fail_next(EngineError::Rejected {
			status: 403,
			errors: vec!["permission denied".to_string()],
		})
		.await;

	let (status, body) = post(&app, "/sync-kubernetes-role", role_request(true).to_string()).await;
	let text = String::from_utf8(body).unwrap();

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(text.contains("app-role"), "unexpected body: {text}");
	assert!(text.contains("permission denied"), "unexpected body: {text}");
	assert!(!text.contains("\"finalized\":true"));
}

#[tokio::test]
async fn test_failed_upsert_is_server_error() {
	let (app, connector) = setup_test_app();
	connector
		.engine()
		.fail_next(EngineError::transport("connection reset by peer"))
		.await;

	let (status, body) = post(&app, "/sync-policy", policy_request(false).to_string()).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(String::from_utf8(body).unwrap().contains("connection reset by peer"));
	assert_eq!(connector.engine().policy("app-policy").await, None);
}

#[tokio::test]
async fn test_connect_failure_is_server_error() {
	let (app, connector) = setup_test_app();
	connector
		.fail_next_connect(EngineError::authentication(
			"no auth info was returned after login",
		))
		.await;

	let (status, body) = post(&app, "/sync-policy", policy_request(true).to_string()).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(String::from_utf8(body)
		.unwrap()
		.contains("no auth info was returned after login"));
	assert!(connector.engine().calls().await.is_empty());
}

/// A failure on one request does not leak into the next.
#[tokio::test]
async fn test_requests_are_independent() {
	let (app, connector) = setup_test_app();
	connector
		.fail_next_connect(EngineError::transport("connection refused"))
		.await;

	let (status, _) = post(&app, "/sync-policy", policy_request(false).to_string()).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

	let (status, body) = post_json(&app, "/sync-policy", policy_request(false)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, succeeded(false));
	assert_eq!(connector.connect_count(), 2);
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
	let (app, connector) = setup_test_app();

	let response = app
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let body: Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(body, json!({"status": "ok"}));
	assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
	let (app, _connector) = setup_test_app();

	let (status, _) = post(&app, "/sync-secret", "{}").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}
