//! # edgegrid-core
//!
//! Core types and utilities for Akamai EdgeGrid management API clients.
//!
//! This crate provides error handling, configuration, request signing and the
//! HTTP transport shared by the per-API client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error type, problem-detail decoding and well-known conditions
//! - [`config`] - Host, credentials and transport configuration
//! - [`auth`] - `EG1-HMAC-SHA256` request signing
//! - [`client`] - Signed JSON transport over a pooled HTTP client
//! - [`query`] - Query parameter builder
//! - [`validation`] - Request validation helpers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod validation;

// Re-export commonly used types
pub use error::{ApiCondition, ApiError, Error, ErrorCondition, Result};
