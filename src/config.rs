use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::ForestConfig;

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub frontend_dir: PathBuf,
    pub port: u16,
    pub model_seed: u64,
    pub n_estimators: usize,
    pub test_fraction: f64,
    /// Substitute a synthetic history when the data file is missing or malformed.
    pub sample_fallback: bool,
    pub recent_matches: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/sample_data.csv"),
            frontend_dir: PathBuf::from("frontend"),
            port: 5000,
            model_seed: 42,
            n_estimators: 100,
            test_fraction: 0.2,
            sample_fallback: false,
            recent_matches: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_path: lookup("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            frontend_dir: lookup("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frontend_dir),
            port: parse_or(&lookup, "PORT", defaults.port),
            model_seed: parse_or(&lookup, "MODEL_SEED", defaults.model_seed),
            n_estimators: parse_or(&lookup, "N_ESTIMATORS", defaults.n_estimators).max(1),
            test_fraction: parse_or(&lookup, "TEST_FRACTION", defaults.test_fraction),
            sample_fallback: parse_or(&lookup, "SAMPLE_FALLBACK", defaults.sample_fallback),
            recent_matches: parse_or(&lookup, "RECENT_MATCHES", defaults.recent_matches),
        }
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_estimators: self.n_estimators,
            seed: self.model_seed,
            ..ForestConfig::default()
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("MODEL_SEED", "7"),
            ("N_ESTIMATORS", "not-a-number"),
            ("SAMPLE_FALLBACK", "true"),
            ("DATA_PATH", "/tmp/matches.csv"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_seed, 7);
        assert_eq!(config.n_estimators, 100);
        assert!(config.sample_fallback);
        assert_eq!(config.data_path, PathBuf::from("/tmp/matches.csv"));

        let forest = config.forest_config();
        assert_eq!(forest.seed, 7);
        assert_eq!(forest.n_estimators, 100);
    }
}
