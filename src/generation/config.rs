//! Top-level generation configuration, loaded from JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::biome::BiomeResolverConfig;
use crate::city::CityConfig;
use crate::core::{Error, Result};
use crate::structure::StructureRule;
use crate::tree::BranchingParams;

/// Which biome resolution strategy a context builds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Climate distance weighting over candidate categories
    #[default]
    MultiParameter,
    /// Temperature/rainfall/elevation rule table with replacement chains
    RuleTable,
}

/// Configuration for one generation context.
///
/// Every section has defaults, so a partial file only needs the values it
/// changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// World seed; keys biome selection, structures and cities
    pub seed: u64,
    pub resolver: ResolverKind,
    pub biome: BiomeResolverConfig,
    /// Overrides the per-archetype branching presets when set
    pub branching: Option<BranchingParams>,
    pub city: CityConfig,
    /// JSON biome palette; the built-in palette is used when absent
    pub palette_path: Option<PathBuf>,
    /// JSON structure template library
    pub templates_path: Option<PathBuf>,
    pub structures: Vec<StructureRule>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            resolver: ResolverKind::default(),
            biome: BiomeResolverConfig::default(),
            branching: None,
            city: CityConfig::default(),
            palette_path: None,
            templates_path: None,
            structures: Vec::new(),
        }
    }
}

impl GenerationConfig {
    /// Default configuration with a different seed
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Default::default() }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GenerationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    ///
    /// Relative palette and template paths are resolved against the
    /// directory containing the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&json)?;
        if let Some(dir) = path.parent() {
            for p in [&mut config.palette_path, &mut config.templates_path].into_iter().flatten() {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        log::info!("Loaded generation config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section, reporting the first authoring mistake
    pub fn validate(&self) -> Result<()> {
        self.biome.validate()?;
        if let Some(branching) = &self.branching {
            branching.validate()?;
        }
        self.city.validate()?;

        let mut seen = std::collections::BTreeSet::new();
        for rule in &self.structures {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(Error::config(format!("structure rule `{}` listed twice", rule.id)));
            }
        }
        Ok(())
    }
}
