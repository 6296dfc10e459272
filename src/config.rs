//! Variant configuration loading and the hot-reloadable registry.
//!
//! Variants arrive from TOML files (or the built-in set), are validated
//! once at load time and become immutable [`Arc`]s in the registry. The
//! engine snapshots the `Arc` at spin start, so an admin replacing a
//! variant never affects a spin already in flight.

use crate::errors::{ConfigError, EngineResult};
use crate::variant::GameVariant;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// On-disk shape of a variant configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    #[serde(rename = "variant")]
    pub variants: Vec<GameVariant>,
}

/// Loads variant definitions from file and environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path.
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Build a registry: built-in variants first, then any configured file
    /// on top (file definitions replace built-ins with the same id).
    ///
    /// `REELCORE_VARIANTS_FILE` supplies the path when none was given
    /// explicitly.
    pub fn load(&self) -> EngineResult<VariantRegistry> {
        let registry = VariantRegistry::with_builtins()?;

        let path = self
            .config_path
            .clone()
            .or_else(|| env::var("REELCORE_VARIANTS_FILE").ok());

        if let Some(path) = path {
            let config = self.load_from_file(&path)?;
            for variant in config.variants {
                info!(variant = %variant.id, file = %path, "loading variant");
                registry.insert(variant)?;
            }
        }

        Ok(registry)
    }

    fn load_from_file(&self, path: &str) -> Result<VariantConfig, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to read {path}: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to parse {path}: {e}")))
    }

    /// Write a configuration file for the given variants.
    pub fn save(&self, variants: &[GameVariant], path: &str) -> EngineResult<()> {
        let config = VariantConfig {
            variants: variants.to_vec(),
        };
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to write {path}: {e}")))?;
        Ok(())
    }
}

/// Registry of validated variants. Read-only to the engine; an external
/// admin surface may insert replacements at any time.
#[derive(Debug, Default)]
pub struct VariantRegistry {
    variants: DashMap<String, Arc<GameVariant>>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in variants.
    pub fn with_builtins() -> EngineResult<Self> {
        let registry = Self::new();
        for variant in GameVariant::builtins() {
            registry.insert(variant)?;
        }
        Ok(registry)
    }

    /// Validate and insert a variant, replacing any previous definition
    /// with the same id. In-flight spins keep the snapshot they took.
    pub fn insert(&self, variant: GameVariant) -> EngineResult<()> {
        variant.validate()?;
        self.variants
            .insert(variant.id.clone(), Arc::new(variant));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<GameVariant>> {
        self.variants.get(id).map(|entry| entry.clone())
    }

    pub fn ids(&self) -> Vec<String> {
        self.variants.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{OutcomeTier, TierRule};
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_registry() {
        let registry = VariantRegistry::with_builtins().unwrap();
        assert!(registry.get("classic").is_some());
        assert!(registry.get("enhanced").is_some());
        assert!(registry.get("golden_lion").is_some());
        assert!(registry.get("single_line").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_invalid_variant_rejected_on_insert() {
        let registry = VariantRegistry::new();
        let mut variant = GameVariant::classic();
        variant.tiers = vec![TierRule::new(OutcomeTier::Jackpot, 1.5)];
        assert!(registry.insert(variant).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let loader = ConfigLoader::new();
        loader
            .save(&[GameVariant::golden_lion()], path)
            .expect("save failed");

        let registry = ConfigLoader::new().with_path(path).load().expect("load failed");
        let loaded = registry.get("golden_lion").unwrap();
        let original = GameVariant::golden_lion();
        assert_eq!(loaded.reels, original.reels);
        assert_eq!(loaded.symbols.len(), original.symbols.len());
        assert_eq!(
            loaded.paytable.multiplier(&"🦁".into(), 5),
            original.paytable.multiplier(&"🦁".into(), 5)
        );
        assert_eq!(loaded.rtp_target, original.rtp_target);
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid toml [").unwrap();
        let result = ConfigLoader::new()
            .with_path(temp_file.path())
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_file_variant_replaces_builtin() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut tuned = GameVariant::classic();
        tuned.rtp_target = 0.85;
        ConfigLoader::new().save(&[tuned], path).unwrap();

        let registry = ConfigLoader::new().with_path(path).load().unwrap();
        assert_eq!(registry.get("classic").unwrap().rtp_target, 0.85);
    }

    #[test]
    fn test_hot_reload_does_not_disturb_snapshots() {
        let registry = VariantRegistry::with_builtins().unwrap();
        let snapshot = registry.get("classic").unwrap();

        let mut tuned = GameVariant::classic();
        tuned.rtp_target = 0.5;
        registry.insert(tuned).unwrap();

        // The earlier snapshot is unchanged; new lookups see the update.
        assert_eq!(snapshot.rtp_target, 0.90);
        assert_eq!(registry.get("classic").unwrap().rtp_target, 0.5);
    }
}
