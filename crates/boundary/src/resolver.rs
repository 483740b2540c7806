//! Region lookup by name.
//!
//! Attribute keys are tried in priority order; for each key every record is
//! checked before falling through to the next key. Comparison trims
//! surrounding whitespace and ignores case (Unicode lowercase).

use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_common::{BoundingBox, Geometry, ReliefError, ReliefResult};

use crate::record::BoundarySource;

/// Attribute columns consulted when none are configured.
pub const DEFAULT_NAME_KEYS: [&str; 5] = ["NAME", "ADMIN", "NAME_LONG", "NAME_EN", "FORMAL_EN"];

/// Which parts of a multi-part region are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSelection {
    /// Keep every part (islands, exclaves)
    #[default]
    All,
    /// Keep only the part with the greatest area
    LargestOnly,
}

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Attribute names tried in order.
    pub name_keys: Vec<String>,
    pub part_selection: PartSelection,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            name_keys: DEFAULT_NAME_KEYS.iter().map(|k| k.to_string()).collect(),
            part_selection: PartSelection::All,
        }
    }
}

impl ResolverConfig {
    /// Load resolver configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RELIEF_NAME_KEYS") {
            let keys: Vec<String> = val
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !keys.is_empty() {
                config.name_keys = keys;
            }
        }

        if let Ok(val) = std::env::var("RELIEF_LARGEST_PART_ONLY") {
            if val.to_lowercase() == "true" || val == "1" {
                config.part_selection = PartSelection::LargestOnly;
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name_keys.is_empty() {
            return Err("at least one name attribute is required".to_string());
        }
        if self.name_keys.iter().any(|k| k.trim().is_empty()) {
            return Err("name attributes must not be blank".to_string());
        }
        Ok(())
    }
}

/// A region matched by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRegion {
    /// Attribute value that matched, as stored in the dataset
    pub name: String,
    /// Attribute key the match was found under
    pub matched_key: String,
    pub geometry: Geometry,
    /// Extent in the geometry's native CRS
    pub extent: BoundingBox,
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryResolver {
    config: ResolverConfig,
}

impl BoundaryResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Find the region called `name`.
    pub fn resolve<S>(&self, source: &S, name: &str) -> ReliefResult<ResolvedRegion>
    where
        S: BoundarySource + ?Sized,
    {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return Err(ReliefError::region_not_found(name));
        }

        for key in &self.config.name_keys {
            for record in source.records() {
                let Some(value) = record.attribute(key) else {
                    continue;
                };
                let value_norm = normalize(value);
                if value_norm.is_empty() || value_norm != wanted {
                    continue;
                }

                let geometry = match self.config.part_selection {
                    PartSelection::All => record.geometry().clone(),
                    PartSelection::LargestOnly => record.geometry().largest_part(),
                };
                let extent = geometry.bbox();
                debug!(
                    name = %value,
                    key = %key,
                    parts = geometry.parts().len(),
                    vertices = geometry.vertex_count(),
                    "Resolved region"
                );
                return Ok(ResolvedRegion {
                    name: value.to_string(),
                    matched_key: key.clone(),
                    geometry,
                    extent,
                });
            }
        }

        Err(ReliefError::region_not_found(name))
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
