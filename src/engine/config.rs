//! Engine configuration types

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::constants::{FIELD_LEMMA, FIELD_POS, FIELD_WORD};

/// What to do when a bucket grows past `max_bucket_hits`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Abort the query with `SpanError::BucketTooLarge`
    #[default]
    Reject,
    /// Keep the first `max_bucket_hits` hits of the bucket and drop the rest
    Truncate,
}

/// Caps on per-bucket buffering. No caps by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanLimits {
    /// Maximum number of hits gathered into one bucket (one document when sorting)
    pub max_bucket_hits: Option<usize>,
    /// Maximum length of a consecutive run considered for repetitions.
    /// Falls back to `max_bucket_hits` when unset.
    pub max_repetition_run: Option<usize>,
    pub overflow: OverflowPolicy,
}

impl SpanLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_bucket_hits(mut self, limit: usize, overflow: OverflowPolicy) -> Self {
        self.max_bucket_hits = Some(limit);
        self.overflow = overflow;
        self
    }

    /// Limits that apply to consecutive-run buckets
    pub fn for_runs(&self) -> Self {
        Self {
            max_bucket_hits: self.max_repetition_run.or(self.max_bucket_hits),
            ..*self
        }
    }
}

/// Index and search configuration, usually read from `configs/engine.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token annotations to index, one field each (word, lemma, pos, ...)
    pub annotations: Vec<String>,
    /// Annotation used to render matched text
    #[serde(default = "default_annotation")]
    pub default_annotation: String,
    /// Heap budget for the index writer, in bytes
    #[serde(default = "default_writer_heap")]
    pub writer_heap_bytes: usize,
    #[serde(default)]
    pub limits: SpanLimits,
}

fn default_annotation() -> String {
    FIELD_WORD.to_string()
}

fn default_writer_heap() -> usize {
    50_000_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annotations: vec![FIELD_WORD.to_string(), FIELD_LEMMA.to_string(), FIELD_POS.to_string()],
            default_annotation: default_annotation(),
            writer_heap_bytes: default_writer_heap(),
            limits: SpanLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        let yaml_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: EngineConfig = serde_yaml::from_str(&yaml_str)
            .map_err(|e| anyhow!("Invalid YAML config in {}: {}", path.display(), e))?;
        config.validate()?;
        log::debug!("Loaded engine config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.annotations.is_empty() {
            return Err(anyhow!("Config must list at least one annotation"));
        }
        if !self.annotations.contains(&self.default_annotation) {
            return Err(anyhow!(
                "Default annotation '{}' is not among the indexed annotations {:?}",
                self.default_annotation,
                self.annotations
            ));
        }
        if self.limits.max_bucket_hits == Some(0) || self.limits.max_repetition_run == Some(0) {
            return Err(anyhow!("Bucket limits must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits, SpanLimits::unlimited());
    }

    #[test]
    fn test_load_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "annotations: [word, lemma, pos]\nlimits:\n  max_bucket_hits: 1000\n  overflow: truncate\n"
        )
        .unwrap();
        let config = EngineConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.default_annotation, "word");
        assert_eq!(config.limits.max_bucket_hits, Some(1000));
        assert_eq!(config.limits.max_repetition_run, None);
        assert_eq!(config.limits.overflow, OverflowPolicy::Truncate);
        assert_eq!(config.limits.for_runs().max_bucket_hits, Some(1000));
    }

    #[test]
    fn test_rejects_unknown_default_annotation() {
        let config = EngineConfig {
            default_annotation: "form".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/engine.yaml");
        let config = EngineConfig::from_yaml(&path).unwrap();
        assert_eq!(config.default_annotation, FIELD_WORD);
        assert!(config.annotations.iter().any(|a| a == FIELD_LEMMA));
        assert_eq!(config.limits.overflow, OverflowPolicy::Reject);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(EngineConfig::from_yaml("/nonexistent/spans.yaml").is_err());
    }
}
