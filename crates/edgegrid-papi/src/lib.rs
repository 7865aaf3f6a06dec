//! Property Manager (PAPI) client and data models.
//!
//! Provides typed structures and an asynchronous client for include
//! versions, include activations and property search.
//!
//! ```no_run
//! use edgegrid_core::config::EdgeGridConfig;
//! use edgegrid_papi::{PapiClientBuilder, SearchRequest};
//!
//! # async fn run() -> edgegrid_papi::Result<()> {
//! let config = EdgeGridConfig::from_env("default")?;
//! let client = PapiClientBuilder::from_config(&config)?.build()?;
//! let found = client
//!     .search_properties(&SearchRequest::by_hostname("www.example.com"))
//!     .await?;
//! println!("{} matching versions", found.versions.items.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::{PapiClient, PapiClientBuilder};
pub use errors::PapiCondition;
pub use models::{
    ActivateIncludeRequest, Activation, ActivationIncludeResponse, ActivationNetwork,
    ActivationStatus, ActivationType, CreateIncludeVersionRequest, CreateIncludeVersionResponse,
    DeactivateIncludeRequest, GetIncludeActivationRequest, GetIncludeVersionRequest,
    IncludeActivationResponse, IncludeActivationsResponse, IncludeType, IncludeVersion,
    IncludeVersionResponse, ListIncludeActivationsRequest, ListIncludeVersionsRequest,
    SearchItem, SearchRequest, SearchResponse, VersionStatus,
};

/// Convenient result alias that reuses the shared EdgeGrid error type.
pub type Result<T> = edgegrid_core::Result<T>;
