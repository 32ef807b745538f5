// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Vault controller webhook binary.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault_controller_config::{ControllerConfig, VaultAuth};
use vault_controller_server::{create_router, AppState, LISTEN_ADDR};
use vault_controller_vault::VaultConnector;

mod version;

/// Vault controller - reconciles Vault roles and policies from Kubernetes.
#[derive(Parser, Debug)]
#[command(
	name = "vault-controller",
	about = "Sync webhook for Vault Kubernetes auth roles and ACL policies",
	version
)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Configuration errors abort startup before the listener is bound
	let config = ControllerConfig::from_env()?;

	// RUST_LOG takes precedence over LOG_LEVEL
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.log_level.as_directive().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let auth_method = match &config.vault.auth {
		VaultAuth::Kubernetes { .. } => "kubernetes",
		VaultAuth::Token { .. } => "token",
	};
	tracing::info!(
		vault_addr = %config.vault.address,
		auth_method,
		kubernetes_mount = %config.vault.kubernetes_mount,
		"starting vault-controller"
	);

	let connector = Arc::new(VaultConnector::new(config.vault));
	let app = create_router(AppState::new(connector)).layer(TraceLayer::new_for_http());

	tracing::info!("listening on {}", LISTEN_ADDR);
	let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = shutdown_signal() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM from the kubelet.
async fn shutdown_signal() {
	#[cfg(unix)]
	{
		let mut terminate =
			match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
				Ok(signal) => signal,
				Err(e) => {
					tracing::warn!(error = %e, "Unable to listen for SIGTERM");
					let _ = tokio::signal::ctrl_c().await;
					return;
				}
			};
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {}
			_ = terminate.recv() => {}
		}
	}

	#[cfg(not(unix))]
	{
		let _ = tokio::signal::ctrl_c().await;
	}
}
