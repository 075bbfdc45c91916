use serde::Deserialize;
use thiserror::Error;

use crate::schedule::{IntervalSchedule, Period};

const CONFIG_FILE: &str = "racesow.toml";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be > 0")]
    Zero(&'static str),
    #[error("snapshot.path must not be empty")]
    EmptySnapshotPath,
    #[error("unknown log_format {0:?}, expected \"text\" or \"json\"")]
    LogFormat(String),
}

/// Top-level ranker configuration, loaded from `racesow.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// "text" or "json".
    pub log_format: String,
    pub snapshot: SnapshotConfig,
    pub schedule: ScheduleConfig,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            snapshot: SnapshotConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: String,
    /// Write a snapshot after every recompute pass that changed something.
    pub save_after_pass: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "data/racesow.snapshot".to_string(),
            save_after_pass: true,
        }
    }
}

/// Periodic recompute of updated maps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub intervals: Vec<IntervalSchedule>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            intervals: vec![IntervalSchedule {
                every: 5,
                period: Period::Minutes,
            }],
        }
    }
}

impl RankerConfig {
    /// Check the configuration, logging each problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot.path.trim().is_empty() {
            tracing::error!("snapshot.path is empty");
            return Err(ConfigError::EmptySnapshotPath);
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            tracing::error!(format = %self.log_format, "Unknown log_format");
            return Err(ConfigError::LogFormat(self.log_format.clone()));
        }
        if self.schedule.intervals.is_empty() {
            tracing::warn!("No schedule intervals configured, maps are only recomputed on demand");
        }
        if self.schedule.intervals.iter().any(|i| i.every == 0) {
            tracing::error!("schedule.intervals[].every must be > 0");
            return Err(ConfigError::Zero("schedule.intervals[].every"));
        }
        Ok(())
    }

    /// Load config from `racesow.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match toml::from_str::<RankerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {CONFIG_FILE}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {CONFIG_FILE}: {e}, using defaults");
                    RankerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                RankerConfig::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("RACESOW_SNAPSHOT_PATH")
            && !path.is_empty()
        {
            self.snapshot.path = path;
        }
        if let Some(format) = var("RACESOW_LOG_FORMAT")
            && !format.is_empty()
        {
            self.log_format = format;
        }
        if let Some(val) = var("RACESOW_RECOMPUTE_INTERVAL_SECS")
            && let Ok(every) = val.parse::<u64>()
        {
            self.schedule.intervals = vec![IntervalSchedule {
                every,
                period: Period::Seconds,
            }];
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RankerConfig::default();
        assert_eq!(cfg.log_format, "text");
        assert_eq!(cfg.snapshot.path, "data/racesow.snapshot");
        assert!(cfg.snapshot.save_after_pass);
        assert_eq!(cfg.schedule.intervals.len(), 1);
        assert_eq!(cfg.schedule.intervals[0].period, Period::Minutes);
    }

    #[test]
    fn validate_accepts_default_config() {
        assert_eq!(RankerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
log_format = "json"

[snapshot]
path = "/var/lib/racesow/state.bin"
save_after_pass = false

[[schedule.intervals]]
every = 30
period = "seconds"

[[schedule.intervals]]
every = 1
period = "hours"
"#;
        let cfg: RankerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.snapshot.path, "/var/lib/racesow/state.bin");
        assert!(!cfg.snapshot.save_after_pass);
        assert_eq!(
            cfg.schedule.intervals,
            vec![
                IntervalSchedule {
                    every: 30,
                    period: Period::Seconds
                },
                IntervalSchedule {
                    every: 1,
                    period: Period::Hours
                },
            ]
        );
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: RankerConfig = toml::from_str("log_format = \"json\"\n").unwrap();
        assert_eq!(cfg.snapshot.path, "data/racesow.snapshot");
        assert_eq!(cfg.schedule.intervals[0].every, 5);
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let cfg = RankerConfig {
            schedule: ScheduleConfig {
                intervals: vec![IntervalSchedule {
                    every: 0,
                    period: Period::Days,
                }],
            },
            ..RankerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Zero(_))));
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let cfg = RankerConfig {
            log_format: "xml".to_string(),
            ..RankerConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::LogFormat("xml".to_string()))
        );
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("RACESOW_SNAPSHOT_PATH", "/tmp/snap"),
            ("RACESOW_RECOMPUTE_INTERVAL_SECS", "45"),
            ("RACESOW_LOG_FORMAT", ""),
        ]);
        let mut cfg = RankerConfig::default();
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.snapshot.path, "/tmp/snap");
        assert_eq!(cfg.log_format, "text");
        assert_eq!(
            cfg.schedule.intervals,
            vec![IntervalSchedule {
                every: 45,
                period: Period::Seconds
            }]
        );
    }

    #[test]
    fn env_interval_ignores_garbage() {
        let mut cfg = RankerConfig::default();
        cfg.apply_env(|key| (key == "RACESOW_RECOMPUTE_INTERVAL_SECS").then(|| "soon".to_string()));
        assert_eq!(cfg.schedule.intervals[0].period, Period::Minutes);
    }
}
