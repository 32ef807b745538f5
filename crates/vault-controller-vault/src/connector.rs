// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;
use vault_controller_config::VaultConfig;
use vault_controller_core::{EngineConnector, EngineError, EngineResult, SecretsEngine};

use crate::client::VaultClient;

/// Opens a fresh, freshly authenticated [`VaultClient`] for every sync
/// request. Nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct VaultConnector {
	config: Arc<VaultConfig>,
}

impl VaultConnector {
	pub fn new(config: VaultConfig) -> Self {
		Self {
			config: Arc::new(config),
		}
	}
}

#[async_trait]
impl EngineConnector for VaultConnector {
	async fn connect(&self) -> EngineResult<Arc<dyn SecretsEngine>> {
		match VaultClient::connect(&self.config).await {
			Ok(client) => Ok(Arc::new(client)),
			Err(e) => {
				error!(error = %e, "Unable to create Vault client");
				Err(EngineError::from(e))
			}
		}
	}
}
