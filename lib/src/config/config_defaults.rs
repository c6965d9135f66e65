// lib/src/config/config_defaults.rs

pub const DEFAULT_CONFIG_PATH_RELATIVE: &str = "./carepath_config.yaml";
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 365;
pub const DEFAULT_MIN_DECAY: f64 = 0.5;

pub fn default_max_window_days() -> i64 {
    DEFAULT_MAX_WINDOW_DAYS
}

pub fn default_min_decay() -> f64 {
    DEFAULT_MIN_DECAY
}
