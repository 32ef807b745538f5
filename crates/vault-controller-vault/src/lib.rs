// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HashiCorp Vault client for the vault controller.
//!
//! [`VaultClient`] speaks the Vault HTTP API directly: Kubernetes auth login,
//! Kubernetes auth role writes and ACL policy writes. It implements
//! [`vault_controller_core::SecretsEngine`], and [`VaultConnector`] hands out a
//! newly authenticated client per sync request.

mod client;
mod connector;
mod error;
mod http;

pub use client::VaultClient;
pub use connector::VaultConnector;
pub use error::{VaultError, VaultResult};
pub use http::user_agent;
