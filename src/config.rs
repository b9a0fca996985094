use crate::tracker::DEFAULT_GOAL_ML;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub default_goal_ml: f64,
    pub allow_day_skip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            default_goal_ml: DEFAULT_GOAL_ML,
            allow_day_skip: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; unset or invalid values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_path = lookup("APP_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let default_goal_ml = match lookup("APP_DEFAULT_GOAL_ML") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(goal) if goal.is_finite() && goal > 0.0 => goal,
                _ => {
                    warn!("ignoring APP_DEFAULT_GOAL_ML={raw:?}, using {DEFAULT_GOAL_ML}");
                    defaults.default_goal_ml
                }
            },
            None => defaults.default_goal_ml,
        };

        let allow_day_skip = lookup("APP_ALLOW_DAY_SKIP")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.allow_day_skip);

        Self {
            data_path,
            port,
            default_goal_ml,
            allow_day_skip,
        }
    }
}
