use std::path::PathBuf;

use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use sonarmap_hal::HardwareConfig;
use sonarmap_mapping::MapperConfig;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "SONARMAP";

/// One motion command of the survey: turn, then drive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Move {
    pub distance_cm: f64,
    #[serde(default)]
    pub turn_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Map to start from instead of an empty grid.
    pub load_map: Option<PathBuf>,
    /// Where to write the map once the survey ends.
    pub save_map: Option<PathBuf>,
    /// Moves performed after the initial scan, each followed by a rescan.
    pub moves: Vec<Move>,
    pub status_interval_ms: u64,
    pub print_map: bool,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            load_map: None,
            save_map: None,
            moves: Vec::new(),
            status_interval_ms: 500,
            print_map: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mapper: MapperConfig,
    pub hardware: HardwareConfig,
    pub survey: SurveyConfig,
}

/// Loads `path` (if present) overlaid with `SONARMAP__SECTION__KEY`
/// environment variables.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|loaded| loaded.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonarmap_hal::RangeSensorConfig;
    use sonarmap_mapping::DropZonePolicy;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config("config/does-not-exist.toml").unwrap();
        assert_eq!(config.mapper, MapperConfig::default());
        assert!(config.survey.moves.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
            [mapper]
            grid_size = 60
            drop_zone = "free_space"

            [mapper.sweep]
            step_deg = 10

            [hardware.ranging]
            kind = "mock"
            base_distance_cm = 30.0
            noise_cm = 0
            seed = 4

            [survey]
            moves = [{ distance_cm = 20.0 }, { distance_cm = 10.0, turn_deg = 90.0 }]
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.mapper.grid_size, 60);
        assert_eq!(config.mapper.drop_zone, DropZonePolicy::FreeSpace);
        assert_eq!(config.mapper.sweep.step_deg, 10);
        assert_eq!(config.mapper.sweep.min_deg, -90);
        assert_eq!(config.mapper.obstacle_threshold_cm, 80.0);
        assert!(matches!(
            config.hardware.ranging,
            RangeSensorConfig::Mock { seed: Some(4), .. }
        ));
        assert_eq!(config.survey.moves.len(), 2);
        assert_eq!(config.survey.moves[0].turn_deg, 0.0);
        assert_eq!(config.survey.status_interval_ms, 500);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml")).unwrap();
        assert!(config.mapper.validate().is_ok());
        assert!(!config.survey.moves.is_empty());
    }
}
