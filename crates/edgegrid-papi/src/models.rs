//! PAPI request and response models.

use chrono::{DateTime, Utc};
use edgegrid_core::query::QueryParams;
use edgegrid_core::validation::{one_of, required};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Search by edge hostname.
pub const SEARCH_KEY_EDGE_HOSTNAME: &str = "edgeHostname";
/// Search by hostname.
pub const SEARCH_KEY_HOSTNAME: &str = "hostname";
/// Search by property name.
pub const SEARCH_KEY_PROPERTY_NAME: &str = "propertyName";

const SEARCH_KEYS: [&str; 3] = [
    SEARCH_KEY_EDGE_HOSTNAME,
    SEARCH_KEY_HOSTNAME,
    SEARCH_KEY_PROPERTY_NAME,
];

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

/// Activation state of a version on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    /// Active, and therefore read-only.
    Active,
    /// Never activated or superseded.
    Inactive,
    /// Activation in progress.
    Pending,
    /// Deactivated.
    Deactivated,
}

/// Kind of include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncludeType {
    /// Include shared between microservice properties.
    Microservices,
    /// Include holding common settings.
    CommonSettings,
}

/// Network a version is activated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationNetwork {
    /// Staging network.
    Staging,
    /// Production network.
    Production,
}

/// Whether an activation request activates or deactivates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationType {
    /// Activate the version.
    Activate,
    /// Deactivate the version.
    Deactivate,
}

/// Progress of an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    /// Active.
    Active,
    /// Inactive.
    Inactive,
    /// Queued, not yet started.
    New,
    /// In progress.
    Pending,
    /// Propagating to the first zone.
    #[serde(rename = "ZONE_1")]
    Zone1,
    /// Propagating to the second zone.
    #[serde(rename = "ZONE_2")]
    Zone2,
    /// Propagating to the third zone.
    #[serde(rename = "ZONE_3")]
    Zone3,
    /// Aborted.
    Aborted,
    /// Failed.
    Failed,
    /// Deactivation in progress.
    PendingDeactivation,
    /// Deactivated.
    Deactivated,
    /// Cancellation in progress.
    PendingCancellation,
}

// ---------------------------------------------------------------------------
// Include versions
// ---------------------------------------------------------------------------

/// Parameters for creating an include version from a previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncludeVersionRequest {
    /// Include identifier.
    #[serde(skip)]
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Version to copy.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub create_from_version: i64,
    /// Etag of the version to copy, for optimistic locking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_from_version_etag: Option<String>,
}

/// Response of a version creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncludeVersionResponse {
    /// Link to the new version.
    pub version_link: String,
}

impl CreateIncludeVersionResponse {
    /// Version number parsed from the link, if present.
    #[must_use]
    pub fn version(&self) -> Option<i64> {
        last_path_segment(&self.version_link).and_then(|segment| segment.parse().ok())
    }
}

/// Parameters for fetching one include version.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct GetIncludeVersionRequest {
    /// Include identifier.
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Version number.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub version: i64,
    /// Contract identifier.
    #[validate(custom(function = "required"))]
    pub contract_id: String,
    /// Group identifier.
    #[validate(custom(function = "required"))]
    pub group_id: String,
}

impl GetIncludeVersionRequest {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        contract_group_params(&self.contract_id, &self.group_id)
    }
}

/// Parameters for listing include versions.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ListIncludeVersionsRequest {
    /// Include identifier.
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Contract identifier.
    #[validate(custom(function = "required"))]
    pub contract_id: String,
    /// Group identifier.
    #[validate(custom(function = "required"))]
    pub group_id: String,
}

impl ListIncludeVersionsRequest {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        contract_group_params(&self.contract_id, &self.group_id)
    }
}

/// Include with one or more of its versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeVersionResponse {
    /// Include identifier.
    pub include_id: String,
    /// Include name.
    pub include_name: String,
    /// Account identifier.
    pub account_id: String,
    /// Contract identifier.
    pub contract_id: String,
    /// Group identifier.
    pub group_id: String,
    /// Asset identifier.
    pub asset_id: String,
    /// Include type.
    pub include_type: IncludeType,
    /// Versions; at most the 500 most recent when listing.
    #[serde(rename = "versions")]
    pub include_versions: IncludeVersions,
}

/// Wrapper around a list of include versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludeVersions {
    /// Versions.
    #[serde(default)]
    pub items: Vec<IncludeVersion>,
}

/// One version of an include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeVersion {
    /// User who last modified the version.
    pub updated_by_user: String,
    /// Last modification time.
    pub updated_date: DateTime<Utc>,
    /// Production network status.
    pub production_status: VersionStatus,
    /// Etag for optimistic locking.
    pub etag: String,
    /// Product identifier.
    pub product_id: String,
    /// Version note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Rule format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_format: Option<String>,
    /// Version number.
    pub include_version: i64,
    /// Staging network status.
    pub staging_status: VersionStatus,
}

/// Parameters for the available criteria and behaviors of a version.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ListAvailableRequest {
    /// Include identifier.
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Version number.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub version: i64,
}

/// Parameters for listing available criteria.
pub type ListAvailableCriteriaRequest = ListAvailableRequest;

/// Parameters for listing available behaviors.
pub type ListAvailableBehaviorsRequest = ListAvailableRequest;

/// Criteria usable in a version's rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCriteriaResponse {
    /// Contract identifier.
    pub contract_id: String,
    /// Group identifier.
    pub group_id: String,
    /// Product identifier.
    pub product_id: String,
    /// Rule format.
    pub rule_format: String,
    /// Criteria.
    #[serde(rename = "criteria")]
    pub available_criteria: AvailableItems,
}

/// Behaviors usable in a version's rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableBehaviorsResponse {
    /// Contract identifier.
    pub contract_id: String,
    /// Group identifier.
    pub group_id: String,
    /// Product identifier.
    pub product_id: String,
    /// Rule format.
    pub rule_format: String,
    /// Behaviors.
    #[serde(rename = "behaviors")]
    pub available_behaviors: AvailableItems,
}

/// List of criteria or behaviors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableItems {
    /// Items.
    #[serde(default)]
    pub items: Vec<AvailableItem>,
}

/// Name and JSON schema link of a criterion or behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableItem {
    /// Name.
    pub name: String,
    /// Link to the JSON schema.
    pub schema_link: String,
}

// ---------------------------------------------------------------------------
// Include activations
// ---------------------------------------------------------------------------

/// Parameters for activating or deactivating an include version.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivateIncludeRequest {
    /// Include identifier.
    #[serde(skip)]
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Version to (de)activate.
    #[serde(rename = "includeVersion")]
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub version: i64,
    /// Target network.
    pub network: ActivationNetwork,
    /// Activation note.
    pub note: String,
    /// Addresses notified on completion.
    #[validate(length(min = 1, message = "cannot be blank"))]
    pub notify_emails: Vec<String>,
    /// Warning types to acknowledge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub acknowledge_warnings: Vec<String>,
    /// Acknowledge every warning.
    pub acknowledge_all_warnings: bool,
    /// Compliance record required for some production activations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_record: Option<serde_json::Value>,
}

impl ActivateIncludeRequest {
    /// Create a request for the mandatory fields.
    #[must_use]
    pub fn new(
        include_id: impl Into<String>,
        version: i64,
        network: ActivationNetwork,
        notify_emails: Vec<String>,
    ) -> Self {
        Self {
            include_id: include_id.into(),
            version,
            network,
            note: String::new(),
            notify_emails,
            acknowledge_warnings: Vec::new(),
            acknowledge_all_warnings: false,
            compliance_record: None,
        }
    }

    /// Set the activation note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Acknowledge every warning.
    #[must_use]
    pub const fn acknowledge_all_warnings(mut self) -> Self {
        self.acknowledge_all_warnings = true;
        self
    }
}

/// Parameters for deactivating an include version.
pub type DeactivateIncludeRequest = ActivateIncludeRequest;

/// Wire body of an activation request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivationBody<'a> {
    #[serde(flatten)]
    pub request: &'a ActivateIncludeRequest,
    pub activation_type: ActivationType,
    pub ignore_http_errors: bool,
}

/// Link returned when an activation is submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivationLink {
    pub activation_link: String,
}

/// Submitted activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationIncludeResponse {
    /// Activation identifier, taken from the link.
    pub activation_id: String,
    /// Link to the activation.
    pub activation_link: String,
}

impl From<ActivationLink> for ActivationIncludeResponse {
    fn from(link: ActivationLink) -> Self {
        let activation_id = last_path_segment(&link.activation_link)
            .unwrap_or_default()
            .to_string();
        Self {
            activation_id,
            activation_link: link.activation_link,
        }
    }
}

/// Submitted deactivation.
pub type DeactivationIncludeResponse = ActivationIncludeResponse;

/// Parameters for fetching one activation.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct GetIncludeActivationRequest {
    /// Include identifier.
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Activation identifier.
    #[validate(custom(function = "required"))]
    pub activation_id: String,
}

/// Parameters for listing activations of an include.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ListIncludeActivationsRequest {
    /// Include identifier.
    #[validate(custom(function = "required"))]
    pub include_id: String,
    /// Contract identifier.
    #[validate(custom(function = "required"))]
    pub contract_id: String,
    /// Group identifier.
    #[validate(custom(function = "required"))]
    pub group_id: String,
}

impl ListIncludeActivationsRequest {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        contract_group_params(&self.contract_id, &self.group_id)
    }
}

/// Activations of an include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeActivationsResponse {
    /// Account identifier.
    pub account_id: String,
    /// Contract identifier.
    pub contract_id: String,
    /// Group identifier.
    pub group_id: String,
    /// Activations, newest first.
    pub activations: Activations,
}

impl IncludeActivationsResponse {
    /// The first activation, which is the requested one for a single fetch.
    #[must_use]
    pub fn activation(&self) -> Option<&Activation> {
        self.activations.items.first()
    }
}

/// Response to a single activation fetch.
pub type IncludeActivationResponse = IncludeActivationsResponse;

/// Wrapper around a list of activations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activations {
    /// Activations.
    #[serde(default)]
    pub items: Vec<Activation>,
}

/// One activation or deactivation of an include version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    /// Activation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_id: Option<String>,
    /// Alternative identifier used by newer activations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_activation_id: Option<String>,
    /// Target network.
    pub network: ActivationNetwork,
    /// Activation or deactivation.
    pub activation_type: ActivationType,
    /// Current status.
    pub status: ActivationStatus,
    /// Submission time.
    pub submit_date: DateTime<Utc>,
    /// Last status change.
    pub update_date: DateTime<Utc>,
    /// Activation note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Addresses notified on completion.
    #[serde(default)]
    pub notify_emails: Vec<String>,
    /// Fast metadata activation state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fma_activation_state: Option<String>,
    /// Fallback details, present for activations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_info: Option<ActivationFallbackInfo>,
    /// Include identifier.
    pub include_id: String,
    /// Include name.
    pub include_name: String,
    /// Include type.
    pub include_type: IncludeType,
    /// Version the activation applies to.
    pub include_version: i64,
}

impl Activation {
    /// Whichever identifier the API populated.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.activation_id
            .as_deref()
            .or(self.include_activation_id.as_deref())
    }
}

/// Fast fallback details of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationFallbackInfo {
    /// Whether a fast fallback was attempted.
    pub fast_fallback_attempted: bool,
    /// Version restored on fallback.
    pub fallback_version: i64,
    /// Whether a fast fallback is still possible.
    pub can_fast_fallback: bool,
    /// Steady state time (epoch seconds).
    pub steady_state_time: i64,
    /// End of the fast fallback window (epoch seconds).
    pub fast_fallback_expiration_time: i64,
    /// Recovery state of a fast fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_fallback_recovery_state: Option<String>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Property search by one key/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct SearchRequest {
    /// One of `edgeHostname`, `hostname` or `propertyName`.
    #[validate(custom(function = "search_key"))]
    pub key: String,
    /// Value to look for.
    #[validate(custom(function = "required"))]
    pub value: String,
}

fn search_key(value: &str) -> Result<(), ValidationError> {
    one_of(value, &SEARCH_KEYS)
}

impl SearchRequest {
    /// Search by an arbitrary key.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Search properties serving a hostname.
    #[must_use]
    pub fn by_hostname(value: impl Into<String>) -> Self {
        Self::new(SEARCH_KEY_HOSTNAME, value)
    }

    /// Search properties using an edge hostname.
    #[must_use]
    pub fn by_edge_hostname(value: impl Into<String>) -> Self {
        Self::new(SEARCH_KEY_EDGE_HOSTNAME, value)
    }

    /// Search properties by name.
    #[must_use]
    pub fn by_property_name(value: impl Into<String>) -> Self {
        Self::new(SEARCH_KEY_PROPERTY_NAME, value)
    }
}

/// Search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching property versions.
    pub versions: SearchItems,
}

/// Wrapper around search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItems {
    /// Results.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A property version matching a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    /// Account identifier.
    pub account_id: String,
    /// Asset identifier.
    pub asset_id: String,
    /// Contract identifier.
    pub contract_id: String,
    /// Edge hostname.
    #[serde(default)]
    pub edge_hostname: String,
    /// Group identifier.
    pub group_id: String,
    /// Hostname.
    #[serde(default)]
    pub hostname: String,
    /// Production network status.
    pub production_status: VersionStatus,
    /// Property identifier.
    pub property_id: String,
    /// Property name.
    pub property_name: String,
    /// Property version.
    pub property_version: i64,
    /// Staging network status.
    pub staging_status: VersionStatus,
    /// User who last modified the version.
    pub updated_by_user: String,
    /// Last modification time.
    pub updated_date: DateTime<Utc>,
}

fn contract_group_params(contract_id: &str, group_id: &str) -> Vec<(&'static str, String)> {
    QueryParams::new()
        .with("contractId", contract_id)
        .with("groupId", group_id)
        .into_pairs()
}

fn last_path_segment(link: &str) -> Option<&str> {
    let path = link.split('?').next().unwrap_or(link);
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}
