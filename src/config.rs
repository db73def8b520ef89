use crate::browser::check_presign_ttl;
use crate::preview::{PageSizeLimits, PreviewSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Optional configuration file. A `preview` section replaces the preview
/// settings given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presign_ttl_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    S3(S3BackendConfig),
    Memory(MemoryBackendConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3BackendConfig {
    pub name: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBackendConfig {
    pub name: String,
    /// Buckets created empty at start-up
    #[serde(default)]
    pub buckets: Vec<String>,
}

impl Config {
    /// Load a JSON file, or YAML when the extension is `.yaml` or `.yml`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Config = if is_yaml {
            serde_yml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        if let Some(preview) = &config.preview {
            preview.validate()?;
        }
        Ok(config)
    }
}

/// Parse a page size range written as `min-max` or `min,max`
pub fn parse_page_size_range(value: &str) -> Result<PageSizeLimits, String> {
    let (min, max) = value
        .split_once(['-', ','])
        .ok_or_else(|| format!("expected MIN-MAX, got '{}'", value))?;

    let min: u64 = min
        .trim()
        .parse()
        .map_err(|e| format!("invalid minimum page size '{}': {}", min.trim(), e))?;
    let max: u64 = max
        .trim()
        .parse()
        .map_err(|e| format!("invalid maximum page size '{}': {}", max.trim(), e))?;

    if min == 0 || min > max {
        return Err(format!("page size range {}-{} is empty or starts at zero", min, max));
    }
    Ok(PageSizeLimits { min, max })
}

/// Start-up check of the default link lifetime and the store call deadline
pub fn validate_timings(presign_ttl: Duration, request_timeout: Duration) -> Result<(), String> {
    check_presign_ttl(presign_ttl).map_err(|e| format!("presign ttl: {}", e))?;
    if request_timeout.is_zero() {
        return Err("request timeout must be at least 1 second".to_string());
    }
    Ok(())
}
