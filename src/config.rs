use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/interactio.toml";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Headless runner settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for every craft roll in the simulated world.
    pub world_seed: u64,
    /// Number of ticks to simulate.
    pub ticks: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Optional JSONL file receiving one line per committed craft.
    pub event_log: Option<PathBuf>,
    /// Optional recipe pack (JSON); the built-in demo pack is used otherwise.
    pub recipe_pack: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_seed: 0x1A7E_C0DE,
            ticks: 40,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            event_log: None,
            recipe_pack: None,
        }
    }
}

/// Why a config file could not be used.
#[derive(Debug)]
pub enum LoadFailure {
    Read(io::Error),
    Parse(toml::de::Error),
}

impl SimConfig {
    /// Read and parse `path` without falling back.
    pub fn try_load_from_path(path: &Path) -> Result<Self, LoadFailure> {
        let contents = fs::read_to_string(path).map_err(LoadFailure::Read)?;
        toml::from_str(&contents).map_err(LoadFailure::Parse)
    }

    /// Resolve a load attempt, logging and falling back to defaults on errors.
    ///
    /// A missing file at the default location is expected and only noted.
    pub fn or_defaults(loaded: Result<Self, LoadFailure>, path: &Path) -> Self {
        match loaded {
            Ok(cfg) => cfg,
            Err(LoadFailure::Parse(err)) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                SimConfig::default()
            }
            Err(LoadFailure::Read(err)) => {
                if path != Path::new(DEFAULT_CONFIG_PATH) || err.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                SimConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("interactio-{name}-{nanos}.toml"))
    }

    fn load(path: &Path) -> SimConfig {
        SimConfig::or_defaults(SimConfig::try_load_from_path(path), path)
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let path = temp_path("partial");
        fs::write(&path, "ticks = 7\nevent_log = \"out/events.jsonl\"\n").unwrap();

        let cfg = load(&path);
        assert_eq!(cfg.ticks, 7);
        assert_eq!(cfg.event_log, Some(PathBuf::from("out/events.jsonl")));
        assert_eq!(cfg.world_seed, SimConfig::default().world_seed);
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_path("broken");
        fs::write(&path, "ticks = \"many\"").unwrap();

        assert!(matches!(
            SimConfig::try_load_from_path(&path),
            Err(LoadFailure::Parse(_))
        ));
        assert_eq!(load(&path), SimConfig::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_path("absent");
        assert_eq!(load(&path), SimConfig::default());
    }
}
