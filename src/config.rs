use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for codecontext
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeContextConfig {
    /// Path to the repository to analyze
    pub path: PathBuf,
    /// Directory globs excluded from discovery (on top of gitignore)
    pub exclude_patterns: Vec<String>,
    /// If false, the pipeline runs with the no-op cache
    pub enable_cache: bool,
    /// Directory holding serialized parse records, created lazily
    pub cache_dir: PathBuf,
    /// Number of top-ranked files to report
    pub hotspot_count: usize,
    /// Print progress events to stdout
    pub verbose: bool,
    /// Optional path for the JSON analysis dump
    pub output: Option<PathBuf>,
    /// Admission quotas for server mode
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
            requests_per_hour: 1000,
        }
    }
}

impl Default for CodeContextConfig {
    fn default() -> Self {
        let excludes = vec![
            ".git",
            ".idea",
            ".gradle",
            ".vscode",
            "build",
            "target",
            "out",
            "dist",
            "node_modules",
            ".next",
        ];

        Self {
            path: PathBuf::from("."),
            exclude_patterns: excludes.into_iter().map(String::from).collect(),
            enable_cache: true,
            cache_dir: PathBuf::from(".codecontext/cache"),
            hotspot_count: 15,
            verbose: false,
            output: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl CodeContextConfig {
    /// Validates the configuration, ensuring the path exists.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.path.is_dir() {
            return Err(crate::error::Error::InvalidRoot(self.path.clone()));
        }
        Ok(())
    }

    /// Attempts to load configuration from `codecontext.toml` in the
    /// current directory.
    pub fn load_from_file() -> Option<Self> {
        std::fs::read_to_string("codecontext.toml")
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejects_missing_path() {
        let config = CodeContextConfig {
            path: PathBuf::from("non_existent_path_xyz_123"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: CodeContextConfig = toml::from_str("hotspot_count = 5\n").unwrap();
        assert_eq!(config.hotspot_count, 5);
        assert!(config.enable_cache);
        assert_eq!(config.rate_limit.requests_per_minute, 60);
    }
}
