// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Sync protocol for the vault controller.
//!
//! This crate provides:
//! - The resource specs the controller manages ([`KubernetesRole`], [`Policy`])
//! - The HCL policy renderer ([`render_policy`])
//! - The [`SecretsEngine`] capability surface and its [`EngineConnector`]
//! - The generic [`Reconciler`] that turns a [`SyncRequest`] into engine calls
//!   and a [`SyncResponse`]
//! - In-memory mocks for tests ([`mock`])

mod engine;
mod error;
pub mod mock;
mod policy;
mod reconciler;
mod sync;
mod types;

pub use engine::{EngineConnector, SecretsEngine};
pub use error::{EngineError, EngineResult};
pub use policy::render_policy;
pub use reconciler::{
	KubernetesRoles, Policies, Reconciler, ResourceKind, SyncAction, SyncFailure,
};
pub use sync::{ControllerStatus, ParentObject, SyncRequest, SyncResponse};
pub use types::{KubernetesRole, Policy, PolicyRule};
