//! Import settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};

/// Where the game lives and how its coordinates map to the host scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Root of the game installation.
    pub game_dir: PathBuf,
    /// Object descriptors, relative to `game_dir`.
    pub descriptor_dir: PathBuf,
    /// Geometry (.ldo) files, relative to `game_dir`.
    pub geometry_dir: PathBuf,
    /// Level files, relative to `game_dir`.
    pub level_dir: PathBuf,
    /// Uniform scale from game units to host units.
    pub scale: f64,
    /// Hand trackpart sequences to the host. Sequences are always parsed.
    pub load_trackparts: bool,
    /// Mesh used for descriptors that do not reference one.
    pub fallback_mesh: String,
    /// Optional TOML file extending the built-in trackpart catalog.
    pub catalog_file: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            game_dir: PathBuf::from("."),
            descriptor_dir: PathBuf::from("Bin/Descriptors"),
            geometry_dir: PathBuf::from("Gfx/models/Geometry"),
            level_dir: PathBuf::from("Bin/Levels"),
            scale: 1.0,
            load_trackparts: true,
            fallback_mesh: "node.ldo".to_string(),
            catalog_file: None,
        }
    }
}

impl ImportSettings {
    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| LevelError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(LevelError::InvalidSettings(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.fallback_mesh.is_empty() {
            return Err(LevelError::InvalidSettings(
                "fallback_mesh must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding the object descriptors.
    pub fn descriptor_root(&self) -> PathBuf {
        self.game_dir.join(&self.descriptor_dir)
    }

    /// Path of a geometry file.
    pub fn geometry_path(&self, mesh: &str) -> PathBuf {
        self.game_dir.join(&self.geometry_dir).join(mesh)
    }

    /// Path of a level file inside the level directory.
    pub fn level_path(&self, level: &Path) -> PathBuf {
        self.game_dir.join(&self.level_dir).join(level)
    }
}
