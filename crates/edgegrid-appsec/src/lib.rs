//! Application Security (AppSec) client and data models.
//!
//! Provides typed structures and an asynchronous client for cloning,
//! reading and removing security configuration versions.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{AppsecClient, AppsecClientBuilder};
pub use models::{
    ConfigurationVersion, CreateConfigurationVersionCloneRequest,
    CreateConfigurationVersionCloneResponse, GetConfigurationVersionCloneRequest,
    GetConfigurationVersionCloneResponse, NetworkActivation, RemoveConfigurationVersionCloneRequest,
};

/// Convenient result alias that reuses the shared EdgeGrid error type.
pub type Result<T> = edgegrid_core::Result<T>;
