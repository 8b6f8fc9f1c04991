//! Domain layer: entities, authentication primitives and repository contracts.
//!
//! Nothing in here depends on the infrastructure or HTTP layers.
//!
//! # Modules
//!
//! - [`entities`] - User records and the cached snapshot
//! - [`auth`] - Token payloads, the [`auth::Requester`] capability, the
//!   [`auth::TokenProvider`] contract and [`auth::AuthError`]
//! - [`repositories`] - Data access trait definitions

pub mod auth;
pub mod entities;
pub mod repositories;
