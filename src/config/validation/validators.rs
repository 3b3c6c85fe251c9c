//! Validators for every configuration section

use super::trait_def::Validate;
use crate::config::models::*;
use crate::monitoring::health::ProbeKind;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

impl Validate for EngineConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating engine configuration");

        self.server.validate()?;
        self.backend.validate()?;
        self.probes.validate()?;
        self.aggregation.validate()?;
        self.cache.validate()?;
        self.testing.validate()?;

        debug!("Engine configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.workers == Some(0) {
            return Err("Server workers must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.api_url, "backend.api_url")?;
        validate_http_url(&self.cdn_url, "backend.cdn_url")?;
        validate_http_url(&self.asset_url, "backend.asset_url")?;

        if self.dataset.is_empty() {
            return Err("backend.dataset cannot be empty".to_string());
        }
        if !self
            .dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "backend.dataset contains invalid characters: {}",
                self.dataset
            ));
        }
        if self.api_version.is_empty() {
            return Err("backend.api_version cannot be empty".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("backend.request_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for LatencyThresholds {
    fn validate(&self) -> Result<(), String> {
        if self.warning_ms <= 0.0 || self.critical_ms <= 0.0 {
            return Err("Latency thresholds must be positive".to_string());
        }
        if self.warning_ms > self.critical_ms {
            return Err(format!(
                "Latency warning threshold ({}ms) exceeds critical threshold ({}ms)",
                self.warning_ms, self.critical_ms
            ));
        }
        Ok(())
    }
}

impl Validate for ProbesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_ms == 0 {
            return Err("probes.probe_timeout_ms must be greater than 0".to_string());
        }

        self.connection
            .latency
            .validate()
            .map_err(|e| format!("probes.connection: {}", e))?;

        let cache = &self.cache;
        if cache.query.trim().is_empty() {
            return Err("probes.cache.query cannot be empty".to_string());
        }
        if cache.samples == 0 {
            return Err("probes.cache.samples must be greater than 0".to_string());
        }
        validate_unit_interval(cache.hit_rate_warning, "probes.cache.hit_rate_warning")?;
        validate_unit_interval(cache.hit_rate_critical, "probes.cache.hit_rate_critical")?;
        if cache.hit_rate_critical > cache.hit_rate_warning {
            return Err(
                "probes.cache.hit_rate_critical cannot exceed probes.cache.hit_rate_warning"
                    .to_string(),
            );
        }
        if cache.latency_warning_ms <= 0.0 {
            return Err("probes.cache.latency_warning_ms must be positive".to_string());
        }

        if !self.assets.path.starts_with('/') {
            return Err(format!(
                "probes.assets.path must start with '/': {}",
                self.assets.path
            ));
        }
        self.assets
            .latency
            .validate()
            .map_err(|e| format!("probes.assets: {}", e))?;

        if self.queries.queries.is_empty() {
            return Err("probes.queries.queries must contain at least one query".to_string());
        }
        if self.queries.queries.iter().any(|q| q.trim().is_empty()) {
            return Err("probes.queries.queries cannot contain empty queries".to_string());
        }
        validate_unit_interval(
            self.queries.error_rate_critical,
            "probes.queries.error_rate_critical",
        )?;
        self.queries
            .latency
            .validate()
            .map_err(|e| format!("probes.queries: {}", e))?;

        Ok(())
    }
}

impl Validate for AggregationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("aggregation.max_concurrency must be greater than 0".to_string());
        }
        if self.quick_timeout_ms == 0 || self.full_timeout_ms == 0 {
            return Err("aggregation timeouts must be greater than 0".to_string());
        }

        let mut seen = HashSet::new();
        for name in &self.quick_components {
            if ProbeKind::from_component_name(name).is_none() {
                return Err(format!(
                    "aggregation.quick_components contains unknown component: {}",
                    name
                ));
            }
            if !seen.insert(name) {
                return Err(format!(
                    "aggregation.quick_components lists {} twice",
                    name
                ));
            }
        }
        Ok(())
    }
}

impl Validate for SnapshotCacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.quick_ttl_secs == 0 || self.full_ttl_secs == 0 {
            return Err("cache TTLs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for TestingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.test_timeout_ms == 0 {
            return Err("testing.test_timeout_ms must be greater than 0".to_string());
        }
        if self.connectivity_timeout_ms == 0 {
            return Err("testing.connectivity_timeout_ms must be greater than 0".to_string());
        }
        if self.performance_iterations == 0 {
            return Err("testing.performance_iterations must be greater than 0".to_string());
        }
        if self.performance_threshold_ms == 0 {
            return Err("testing.performance_threshold_ms must be greater than 0".to_string());
        }
        if self.custom_query.max_length == 0 {
            return Err("testing.custom_query.max_length must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn validate_http_url(value: &str, context: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("{} has invalid URL format: {}", context, e))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "{} must use http:// or https:// scheme, got: {}",
                context, scheme
            ));
        }
    }
    if url.host_str().is_none() {
        return Err(format!("{} URL must have a valid host", context));
    }
    Ok(())
}

fn validate_unit_interval(value: f64, context: &str) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} must be within [0, 1], got {}", context, value));
    }
    Ok(())
}
