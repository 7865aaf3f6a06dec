//! Property Manager specific error conditions.

use edgegrid_core::{ApiError, ErrorCondition};

/// Problem type returned when secure-by-default certificates are unavailable.
pub const SBD_NOT_ENABLED_TYPE: &str =
    "https://problems.luna.akamaiapis.net/papi/v0/property-version-hostname/default-cert-provisioning-unavailable";

/// Limit key reported when the default certificate quota is exhausted.
pub const DEFAULT_CERTS_LIMIT_KEY: &str = "DEFAULT_CERTS_PER_CONTRACT";

/// Failures the Property Manager API reports that callers commonly branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PapiCondition {
    /// Secure by Default is not enabled on the contract.
    SbdNotEnabled,
    /// The contract has no default certificates left.
    DefaultCertLimitReached,
}

impl ErrorCondition for PapiCondition {
    fn matches(&self, error: &ApiError) -> bool {
        match self {
            Self::SbdNotEnabled => error.status == 403 && error.error_type == SBD_NOT_ENABLED_TYPE,
            Self::DefaultCertLimitReached => {
                error.status == 429
                    && error.limit_key.as_deref() == Some(DEFAULT_CERTS_LIMIT_KEY)
                    && error.remaining == Some(0)
            }
        }
    }
}
