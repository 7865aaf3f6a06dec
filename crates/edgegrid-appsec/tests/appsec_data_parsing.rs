//! Integration tests for parsing Application Security data.

use edgegrid_appsec::models::ConfigurationVersion;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_versions() -> Vec<ConfigurationVersion> {
    let fixture_path = fixtures_dir().join("configuration_versions.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize configuration versions: {e}"))
}

#[test]
fn test_deserialize_configuration_versions() {
    let versions = load_versions();
    assert_eq!(versions.len(), 2, "Expected 2 versions in test data");
    assert!(versions.iter().all(|v| v.config_id == 43253));
}

#[test]
fn test_first_version_is_not_based_on_another() {
    let versions = load_versions();
    let first = &versions[0];

    assert_eq!(first.version, 1);
    assert!(first.based_on.is_none());
    assert!(!first.production.is_active());
    assert!(first.production.time.is_none());
}

#[test]
fn test_active_version_round_trips_activation_time() {
    let versions = load_versions();
    let active = versions
        .iter()
        .find(|v| v.production.is_active())
        .expect("Should have a production version");

    assert_eq!(active.based_on, Some(14));
    assert!(active.production.time.is_some());

    let encoded = serde_json::to_value(active).unwrap();
    assert_eq!(encoded["production"]["time"], "2014-07-08T07:40:00Z");
    assert_eq!(encoded["basedOn"], 14);
}
