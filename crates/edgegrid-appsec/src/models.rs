//! Application Security data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identifies an existing configuration version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Validate)]
pub struct GetConfigurationVersionCloneRequest {
    /// Configuration identifier.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub config_id: i64,
    /// Version number.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub version: i64,
}

/// Clones an existing configuration version into a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigurationVersionCloneRequest {
    /// Configuration identifier.
    #[serde(skip)]
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub config_id: i64,
    /// Version to clone.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub create_from_version: i64,
    /// Upgrade the KRS rule set of the clone to the latest.
    pub rule_update: bool,
}

/// Identifies a configuration version to delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Validate)]
pub struct RemoveConfigurationVersionCloneRequest {
    /// Configuration identifier.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub config_id: i64,
    /// Version number.
    #[validate(range(min = 1, message = "cannot be blank"))]
    pub version: i64,
}

/// A security configuration version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationVersion {
    /// Configuration identifier.
    pub config_id: i64,
    /// Configuration name.
    pub config_name: String,
    /// Version number.
    pub version: i64,
    /// Version notes.
    #[serde(default)]
    pub version_notes: String,
    /// Creation time.
    pub create_date: DateTime<Utc>,
    /// User who created the version.
    pub created_by: String,
    /// Version this one was cloned from; absent for the first version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<i64>,
    /// Production network state.
    #[serde(default)]
    pub production: NetworkActivation,
    /// Staging network state.
    #[serde(default)]
    pub staging: NetworkActivation,
}

/// Activation state of a version on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkActivation {
    /// Status such as `Active` or `Inactive`.
    #[serde(default)]
    pub status: String,
    /// Time of the last status change, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl NetworkActivation {
    /// Whether the version is live on the network.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// Response to fetching a configuration version.
pub type GetConfigurationVersionCloneResponse = ConfigurationVersion;

/// Response to cloning a configuration version.
pub type CreateConfigurationVersionCloneResponse = ConfigurationVersion;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_body_skips_config_id() {
        let request = CreateConfigurationVersionCloneRequest {
            config_id: 43253,
            create_from_version: 15,
            rule_update: true,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"createFromVersion": 15, "ruleUpdate": true})
        );
    }

    #[test]
    fn zero_ids_are_blank() {
        let err = GetConfigurationVersionCloneRequest::default()
            .validate()
            .unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("config_id"));
        assert!(fields.contains_key("version"));
    }

    #[test]
    fn first_version_has_no_parent() {
        let version: ConfigurationVersion = serde_json::from_value(json!({
            "configId": 43253,
            "configName": "WAF Security File",
            "version": 1,
            "createDate": "2013-10-07T17:58:52Z",
            "createdBy": "user1",
            "production": {"status": "Inactive"},
            "staging": {"status": "Active", "time": "2013-10-08T09:10:11Z"}
        }))
        .unwrap();
        assert!(version.based_on.is_none());
        assert!(version.version_notes.is_empty());
        assert!(!version.production.is_active());
        assert!(version.staging.is_active());
        assert!(version.staging.time.is_some());
    }
}
