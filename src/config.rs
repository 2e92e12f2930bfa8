use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::calibration::{CalibrationError, CalibrationRegistry, FisheyeModel};
use crate::mapper::{MapperOptions, DEFAULT_TOLERANCE_DEG};
use crate::station::{StationCatalog, StationError, StationInfo};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("station error: {0}")]
    Station(#[from] StationError),
    #[error("calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stations: Vec<StationInfo>,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalibrationConfig {
    /// Directory of YAML/JSON calibration documents.
    pub dir: Option<PathBuf>,
    /// Lens model used for catalog stations with no calibration document.
    pub synthesize: Option<FisheyeModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance_deg: f64,
    #[serde(default = "default_box")]
    pub default_box_km: [f64; 2],
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_DEG
}

fn default_box() -> [f64; 2] {
    [20.0, 20.0]
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: default_tolerance(),
            default_box_km: default_box(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn catalog(&self) -> Result<StationCatalog, ConfigError> {
        Ok(StationCatalog::new(self.stations.clone())?)
    }

    pub fn mapper_options(&self) -> MapperOptions {
        MapperOptions {
            tolerance_deg: self.mapping.tolerance_deg,
        }
    }

    /// Loads the calibration directory, then synthesizes a fisheye
    /// calibration for every catalog station still without one.
    pub fn load_calibrations(&self, catalog: &StationCatalog) -> Result<CalibrationRegistry, ConfigError> {
        let mut registry = CalibrationRegistry::new();

        if let Some(dir) = &self.calibration.dir {
            let loaded = registry.load_dir(dir)?;
            log::info!("Loaded {} calibrations from {}", loaded, dir.display());
        }

        if let Some(model) = &self.calibration.synthesize {
            for station in catalog.all() {
                if registry.contains(&station.code) {
                    continue;
                }
                let record = model.build(&station.code, station.ground_station())?;
                log::debug!("Synthesized fisheye calibration for {}", station.code);
                registry.insert(record);
            }
        }

        if registry.is_empty() {
            log::warn!("No calibrations loaded, every station lookup will fail");
        }

        Ok(registry)
    }
}
