//! Layered visualization defaults
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `PERCEPT_DEFAULT_PARENT`, `PERCEPT_FRAME_SCALE`
//! 2. Project-local: `.percept/config.toml`
//! 3. Global: `~/.percept/config.toml`

use percept_core::{PerceptError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_DEFAULT_PARENT: &str = "PERCEPT_DEFAULT_PARENT";
const ENV_FRAME_SCALE: &str = "PERCEPT_FRAME_SCALE";

/// Defaults for `show_poly_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub default_parent: String,
    pub alpha: f64,
    pub point_size: f64,
    pub visible: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_parent: "segmentation".to_string(),
            alpha: 1.0,
            point_size: 1.0,
            visible: true,
        }
    }
}

/// Defaults for `show_frame`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub scale: f64,
    pub default_parent: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            scale: 0.35,
            default_parent: "segmentation".to_string(),
        }
    }
}

/// Resolved configuration with all layers applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    pub display: DisplayConfig,
    pub frames: FrameConfig,
}

/// One config file. Unset keys leave lower layers alone.
#[derive(Debug, Clone, Default, Deserialize)]
struct VizConfigFile {
    #[serde(default)]
    display: DisplayOverlay,
    #[serde(default)]
    frames: FrameOverlay,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DisplayOverlay {
    default_parent: Option<String>,
    alpha: Option<f64>,
    point_size: Option<f64>,
    visible: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FrameOverlay {
    scale: Option<f64>,
    default_parent: Option<String>,
}

impl VizConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = VizConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".percept/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        log::debug!("visualization config: {:?}", config);
        Ok(config)
    }

    /// Load defaults overlaid with a single file (no environment lookup)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = VizConfig::default();
        config.merge(Self::load_file(path)?);
        config.validate()?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".percept").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<VizConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            PerceptError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: VizConfigFile) {
        let display = overlay.display;
        if let Some(parent) = display.default_parent {
            self.display.default_parent = parent;
        }
        if let Some(alpha) = display.alpha {
            self.display.alpha = alpha;
        }
        if let Some(point_size) = display.point_size {
            self.display.point_size = point_size;
        }
        if let Some(visible) = display.visible {
            self.display.visible = visible;
        }

        if let Some(scale) = overlay.frames.scale {
            self.frames.scale = scale;
        }
        if let Some(parent) = overlay.frames.default_parent {
            self.frames.default_parent = parent;
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(parent) = lookup(ENV_DEFAULT_PARENT) {
            self.display.default_parent = parent.clone();
            self.frames.default_parent = parent;
        }
        if let Some(scale) = lookup(ENV_FRAME_SCALE) {
            self.frames.scale = scale.trim().parse().map_err(|_| {
                PerceptError::ConfigError(format!("{} is not a number: {}", ENV_FRAME_SCALE, scale))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let check = |key: &str, value: f64, min: f64, max: f64| {
            if (min..=max).contains(&value) {
                Ok(())
            } else {
                Err(PerceptError::ConfigError(format!(
                    "{} must be between {} and {}, got {}",
                    key, min, max, value
                )))
            }
        };
        check("display.alpha", self.display.alpha, 0.0, 1.0)?;
        check("display.point_size", self.display.point_size, 1.0, 20.0)?;
        check("frames.scale", self.frames.scale, 0.01, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("percept_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_defaults() {
        let config = VizConfig::default();
        assert_eq!(config.display.default_parent, "segmentation");
        assert_eq!(config.display.alpha, 1.0);
        assert_eq!(config.frames.scale, 0.35);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_config(
            r#"
[display]
default_parent = "planning"
alpha = 0.5

[frames]
scale = 0.2
"#,
        );
        let config = VizConfig::load_from_file(&path).unwrap();

        assert_eq!(config.display.default_parent, "planning");
        assert_eq!(config.display.alpha, 0.5);
        // unset keys keep their defaults
        assert_eq!(config.display.point_size, 1.0);
        assert_eq!(config.frames.default_parent, "segmentation");
        assert_eq!(config.frames.scale, 0.2);

        cleanup(&path);
    }

    #[test]
    fn test_later_layers_win() {
        let global = temp_config("[display]\nalpha = 0.5\npoint_size = 3.0\n");
        let project = temp_config("[display]\nalpha = 0.8\n");

        let mut config = VizConfig::default();
        config.merge(VizConfig::load_file(&global).unwrap());
        config.merge(VizConfig::load_file(&project).unwrap());

        assert_eq!(config.display.alpha, 0.8);
        assert_eq!(config.display.point_size, 3.0);

        cleanup(&global);
        cleanup(&project);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DEFAULT_PARENT, "debug"), (ENV_FRAME_SCALE, " 0.5 ")]);
        let mut config = VizConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.display.default_parent, "debug");
        assert_eq!(config.frames.default_parent, "debug");
        assert_eq!(config.frames.scale, 0.5);

        let mut config = VizConfig::default();
        let bad = config.apply_env_overrides(|key| {
            (key == ENV_FRAME_SCALE).then(|| "large".to_string())
        });
        assert!(matches!(bad, Err(PerceptError::ConfigError(_))));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let path = temp_config("[frames]\nscale = 500.0\n");
        assert!(matches!(
            VizConfig::load_from_file(&path),
            Err(PerceptError::ConfigError(_))
        ));
        cleanup(&path);
    }

    #[test]
    fn test_parse_error() {
        let path = temp_config("[display\nalpha = ");
        assert!(matches!(
            VizConfig::load_from_file(&path),
            Err(PerceptError::ConfigError(_))
        ));
        cleanup(&path);
    }
}
