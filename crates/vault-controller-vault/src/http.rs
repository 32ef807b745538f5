// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction for Vault connections.

use std::time::Duration;

use reqwest::{redirect, Client};

use crate::error::{VaultError, VaultResult};

/// Returns the User-Agent sent to Vault.
///
/// Format: `vault-controller/{version}`
pub fn user_agent() -> String {
	format!("vault-controller/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds the client used for a single Vault connection.
///
/// Redirects are not followed. The token only ever goes to the configured
/// address.
pub fn build_client(timeout: Duration) -> VaultResult<Client> {
	Client::builder()
		.user_agent(user_agent())
		.timeout(timeout)
		.redirect(redirect::Policy::none())
		.build()
		.map_err(|e| VaultError::Configuration(format!("failed to create HTTP client: {e}")))
}
