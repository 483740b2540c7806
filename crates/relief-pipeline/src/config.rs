//! Aggregated pipeline configuration.

use boundary::ResolverConfig;
use grid_processor::{ClipConfig, LoaderConfig};
use projection::{PlanarTarget, WarpOptions};
use relief_common::{ReliefError, ReliefResult};
use renderer::{ClassifierConfig, Render2DConfig, Render3DConfig};
use serde::{Deserialize, Serialize};

/// Every setting of a render, passed explicitly to [`crate::Pipeline::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub resolver: ResolverConfig,
    pub planar_target: PlanarTarget,
    pub loader: LoaderConfig,
    pub warp: WarpOptions,
    pub clip: ClipConfig,
    pub classifier: ClassifierConfig,
    pub render_2d: Render2DConfig,
    pub render_3d: Render3DConfig,
}

impl PipelineConfig {
    /// Defaults overridden by `RELIEF_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            resolver: ResolverConfig::from_env(),
            loader: LoaderConfig::from_env(),
            clip: ClipConfig::from_env(),
            classifier: ClassifierConfig::from_env(),
            render_3d: Render3DConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("RELIEF_PLANAR_TARGET") {
            if let Some(target) = PlanarTarget::parse(&val) {
                config.planar_target = target;
            }
        }

        config
    }

    /// Parse a JSON document; missing sections keep their defaults.
    pub fn from_json(json: &str) -> ReliefResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section, naming the first invalid one.
    pub fn validate(&self) -> ReliefResult<()> {
        let checks = [
            ("resolver", self.resolver.validate()),
            ("loader", self.loader.validate()),
            ("clip", self.clip.validate()),
            ("classifier", self.classifier.validate()),
            ("render_2d", self.render_2d.validate()),
            ("render_3d", self.render_3d.validate()),
        ];
        for (section, result) in checks {
            result.map_err(|msg| ReliefError::InvalidConfig(format!("{}: {}", section, msg)))?;
        }
        if self.warp.edge_samples < 2 {
            return Err(ReliefError::InvalidConfig(
                "warp: edge_samples must be >= 2".to_string(),
            ));
        }
        Ok(())
    }
}
