// tests/config_loading.rs

use std::error::Error;
use std::fs;

use fieldsched::config::{load_and_validate, load_from_path, ConfigFile};
use fieldsched::errors::FieldschedError;
use fieldsched::model::StopStatus;
use fieldsched::route::load_stops_file;
use fieldsched::types::Granularity;
use fieldsched_test_utils::builders::ConfigFileBuilder;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn full_config_file_is_loaded_and_normalized() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Fieldsched.toml");
    fs::write(
        &path,
        r#"
[backend]
base_url = "http://ops.internal:8000/api"
timeout_ms = 2500

[routing]
base_url = "http://osrm.local:5000"
profile = "cycling"

[depot]
name = "North Yard"
latitude = 47.7
longitude = -122.3

[sync]
debounce_ms = 250

[calendar]
default_view = "month"
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.backend.base_url.as_str(), "http://ops.internal:8000/api/");
    assert_eq!(cfg.backend.timeout().as_millis(), 2500);
    assert_eq!(cfg.routing.profile, "cycling");
    assert_eq!(cfg.depot.name, "North Yard");
    assert_eq!(cfg.depot.coordinate.latitude, 47.7);
    assert_eq!(cfg.sync.debounce().as_millis(), 250);
    assert_eq!(cfg.default_view, Granularity::Month);
    Ok(())
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("empty.toml");
    fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.depot.name, "Operations Yard");
    assert_eq!(cfg.default_view, Granularity::Week);
    assert_eq!(cfg.sync.debounce_ms, 100);
    assert_eq!(cfg.routing.profile, "driving");
    Ok(())
}

#[test]
fn unknown_sections_are_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[metrics]\nenabled = true\n")?;

    assert!(matches!(
        load_from_path(&path),
        Err(FieldschedError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn explicit_missing_path_is_an_io_error() -> TestResult {
    let dir = tempdir()?;
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, FieldschedError::IoError(_)));
    Ok(())
}

#[test]
fn invalid_values_fail_validation() {
    let bad_depot = ConfigFileBuilder::new().depot("Yard", 123.0, 0.0).raw();
    assert!(matches!(
        ConfigFile::try_from(bad_depot),
        Err(FieldschedError::ConfigError(_))
    ));

    let bad_scheme = ConfigFileBuilder::new().backend_url("ftp://ops").raw();
    assert!(ConfigFile::try_from(bad_scheme).is_err());

    let not_a_url = ConfigFileBuilder::new().backend_url("not a url").raw();
    assert!(ConfigFile::try_from(not_a_url).is_err());

    let mut zero_timeout = ConfigFileBuilder::new().raw();
    zero_timeout.routing.timeout_ms = 0;
    assert!(ConfigFile::try_from(zero_timeout).is_err());

    let mut nested_profile = ConfigFileBuilder::new().raw();
    nested_profile.routing.profile = "driving/fast".to_string();
    assert!(ConfigFile::try_from(nested_profile).is_err());
}

#[test]
fn stops_file_is_read_in_order() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("stops.toml");
    fs::write(
        &path,
        r#"
[[stop]]
name = "Pinecrest HOA"
address = "1023 Cedar Ave"
latitude = 47.6151
longitude = -122.3446

[[stop]]
name = "Lakeview Apartments"
address = "55 Shore Dr"
latitude = 47.6205
longitude = -122.3493
status = "blocked"
"#,
    )?;

    let file = load_stops_file(&path)?;
    assert_eq!(file.stop.len(), 2);
    assert_eq!(file.stop[0].name, "Pinecrest HOA");
    assert_eq!(file.stop[0].status, StopStatus::Scheduled);
    assert_eq!(file.stop[1].status, StopStatus::Blocked);
    Ok(())
}
