// src/config/validate.rs

use reqwest::Url;

use crate::config::model::{
    BackendConfig, ConfigFile, RawConfigFile, RoutingConfig, SyncConfig,
};
use crate::errors::{FieldschedError, Result};
use crate::model::{Coordinate, Depot};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FieldschedError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let backend = BackendConfig {
            base_url: parse_base_url("[backend].base_url", &raw.backend.base_url)?,
            timeout_ms: positive("[backend].timeout_ms", raw.backend.timeout_ms)?,
        };

        let profile = raw.routing.profile.trim();
        if profile.is_empty() || profile.contains('/') {
            return Err(FieldschedError::ConfigError(format!(
                "[routing].profile must be a single path segment (got {:?})",
                raw.routing.profile
            )));
        }
        let routing = RoutingConfig {
            base_url: parse_base_url("[routing].base_url", &raw.routing.base_url)?,
            profile: profile.to_string(),
            timeout_ms: positive("[routing].timeout_ms", raw.routing.timeout_ms)?,
        };

        let coordinate = Coordinate::new(raw.depot.latitude, raw.depot.longitude)
            .map_err(|e| FieldschedError::ConfigError(format!("[depot]: {e}")))?;
        let depot = Depot::new(raw.depot.name.trim(), coordinate);

        let sync = SyncConfig {
            debounce_ms: raw.sync.debounce_ms,
        };

        Ok(ConfigFile::new_unchecked(
            backend,
            routing,
            depot,
            sync,
            raw.calendar.default_view,
        ))
    }
}

fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash).map_err(|e| {
        FieldschedError::ConfigError(format!("{field} is not a valid URL ({raw:?}): {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FieldschedError::ConfigError(format!(
            "{field} must use http or https (got {other})"
        ))),
    }
}

fn positive(field: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(FieldschedError::ConfigError(format!(
            "{field} must be >= 1 (got 0)"
        )));
    }
    Ok(value)
}
