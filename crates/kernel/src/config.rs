use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use worldscene_assets::RgbeLoader;
use worldscene_common::Color;
use worldscene_render::RenderSettings;

/// Errors from loading or validating a [`WorldConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 35.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 4.0, 12.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 7.0,
            depth: 7.0,
            height: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalConfig {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub helper_size: f32,
}

impl Default for DirectionalConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 0.0),
            color: Color::from_hex(0xff0000),
            intensity: 0.5,
            helper_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Skip the background load entirely when false.
    pub enabled: bool,
    pub directory: PathBuf,
    pub file: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./src/World/assets/textures/backgrounds/"),
            file: "HDR_029_Sky_Cloudy_Ref.hdr".into(),
        }
    }
}

impl BackgroundConfig {
    /// Override directory and file from a single path.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.enabled = true;
    }

    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.file)
    }

    /// A radiance loader rooted at `directory`.
    pub fn loader(&self) -> RgbeLoader {
        RgbeLoader::new().set_path(&self.directory)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub listen_to_keys: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            listen_to_keys: true,
            enable_damping: false,
            damping_factor: 0.05,
        }
    }
}

/// Everything the world assembles from. `Default` is the stock scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub camera: CameraConfig,
    pub render: RenderSettings,
    pub floor: FloorConfig,
    pub ambient: AmbientConfig,
    pub directional: DirectionalConfig,
    pub background: BackgroundConfig,
    pub controls: ControlsConfig,
}

impl WorldConfig {
    /// Load and validate a JSON config. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        if !(c.fov > 0.0 && c.fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be in (0, 180), got {}",
                c.fov
            )));
        }
        if !(c.near > 0.0 && c.near < c.far) {
            return Err(ConfigError::Invalid(format!(
                "camera near/far must satisfy 0 < near < far, got {} / {}",
                c.near, c.far
            )));
        }
        let f = &self.floor;
        if f.width <= 0.0 || f.depth <= 0.0 || f.height <= 0.0 {
            return Err(ConfigError::Invalid("floor dimensions must be positive".into()));
        }
        if self.ambient.intensity < 0.0 || self.directional.intensity < 0.0 {
            return Err(ConfigError::Invalid("light intensity must not be negative".into()));
        }
        if self.directional.helper_size <= 0.0 {
            return Err(ConfigError::Invalid("directional.helper_size must be positive".into()));
        }
        if self.background.enabled && self.background.file.is_empty() {
            return Err(ConfigError::Invalid("background.file is empty".into()));
        }
        Ok(())
    }
}
