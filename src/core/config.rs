//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.tickr/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::clock::ClockMode;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TickrConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timers: TimersConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub tick_ms: Option<u64>,
    pub clock: Option<ClockMode>,
    pub log_level: Option<String>,
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimersConfig {
    pub default_count: Option<usize>,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub default_duration: Option<f64>,
    pub step: Option<f64>,
    pub max_duration: Option<f64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_SLOT_COUNT: usize = 3;
pub const DEFAULT_MIN_SLOTS: usize = 3;
pub const DEFAULT_MAX_SLOTS: usize = 5;
pub const DEFAULT_DURATION_SECS: f64 = 5.0;
pub const DEFAULT_STEP_SECS: f64 = 1.0;
pub const DEFAULT_MAX_DURATION_SECS: f64 = 100_000.0;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLimits {
    pub default_count: usize,
    pub min_count: usize,
    pub max_count: usize,
    pub default_duration: f64,
    pub step: f64,
    pub max_duration: f64,
}

impl Default for SlotLimits {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_SLOT_COUNT,
            min_count: DEFAULT_MIN_SLOTS,
            max_count: DEFAULT_MAX_SLOTS,
            default_duration: DEFAULT_DURATION_SECS,
            step: DEFAULT_STEP_SECS,
            max_duration: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub tick_ms: u64,
    pub clock: ClockMode,
    pub log_level: LevelFilter,
    pub data_dir: PathBuf,
    pub limits: SlotLimits,
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tick_ms: Option<u64>,
    pub clock: Option<ClockMode>,
    pub log_level: Option<String>,
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.tickr`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tickr"))
}

/// Returns the path to `~/.tickr/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join("config.toml"))
}

/// Load config from `~/.tickr/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TickrConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TickrConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TickrConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TickrConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(TickrConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TickrConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# tickr configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# tick_ms = 100                  # UI tick interval, or set TICKR_TICK_MS
# clock = "logical"              # "logical" pauses while unfocused, "real" never does (TICKR_CLOCK)
# log_level = "debug"            # "off", "error", "warn", "info", "debug", "trace"
# data_dir = "/path/to/saves"    # Defaults to ~/.tickr

# [timers]
# default_count = 3              # Slots created on first run
# min_count = 3
# max_count = 5
# default_duration = 5.0         # Seconds
# step = 1.0                     # Seconds added/removed per key press
# max_duration = 100000.0
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TickrConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Tick: CLI → env → config → default
    let tick_ms = cli
        .tick_ms
        .or_else(|| env_parse("TICKR_TICK_MS"))
        .or(config.general.tick_ms)
        .unwrap_or(DEFAULT_TICK_MS)
        .max(1);

    // Clock: CLI → env → config → default
    let clock = cli
        .clock
        .or_else(|| std::env::var("TICKR_CLOCK").ok().and_then(|s| parse_clock(&s)))
        .or(config.general.clock)
        .unwrap_or_default();

    let log_level = cli
        .log_level
        .as_deref()
        .or(config.general.log_level.as_deref())
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Debug);

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .or_else(home_dir)
        .unwrap_or_else(|| PathBuf::from(".tickr"));

    ResolvedConfig {
        tick_ms,
        clock,
        log_level,
        data_dir,
        limits: resolve_limits(&config.timers),
    }
}

/// Fills in defaults and repairs inconsistent bounds so that
/// `min_count <= default_count <= max_count` and `step > 0`.
fn resolve_limits(timers: &TimersConfig) -> SlotLimits {
    let min_count = timers.min_count.unwrap_or(DEFAULT_MIN_SLOTS);
    let max_count = timers.max_count.unwrap_or(DEFAULT_MAX_SLOTS).max(min_count);
    let default_count = timers
        .default_count
        .unwrap_or(DEFAULT_SLOT_COUNT)
        .clamp(min_count, max_count);

    let max_duration = timers
        .max_duration
        .filter(|d| *d > 0.0)
        .unwrap_or(DEFAULT_MAX_DURATION_SECS);
    let default_duration = timers
        .default_duration
        .unwrap_or(DEFAULT_DURATION_SECS)
        .clamp(0.0, max_duration);
    let step = timers
        .step
        .filter(|s| *s > 0.0)
        .unwrap_or(DEFAULT_STEP_SECS);

    if timers.max_count.is_some_and(|m| m < min_count) {
        warn!("timers.max_count is below min_count, using {}", max_count);
    }

    SlotLimits {
        default_count,
        min_count,
        max_count,
        default_duration,
        step,
        max_duration,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_clock(s: &str) -> Option<ClockMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "logical" => Some(ClockMode::Logical),
        "real" => Some(ClockMode::Real),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = TickrConfig::default();
        assert!(config.general.tick_ms.is_none());
        assert!(config.timers.max_count.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = TickrConfig::default();
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.limits, SlotLimits::default());
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = TickrConfig {
            general: GeneralConfig {
                log_level: Some("warn".to_string()),
                data_dir: Some("/tmp/tickr-test".to_string()),
                ..Default::default()
            },
            timers: TimersConfig {
                default_count: Some(4),
                min_count: Some(2),
                max_count: Some(8),
                default_duration: Some(30.0),
                step: Some(5.0),
                max_duration: Some(600.0),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.data_dir, PathBuf::from("/tmp/tickr-test"));
        assert_eq!(
            resolved.limits,
            SlotLimits {
                default_count: 4,
                min_count: 2,
                max_count: 8,
                default_duration: 30.0,
                step: 5.0,
                max_duration: 600.0,
            }
        );
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = TickrConfig {
            general: GeneralConfig {
                tick_ms: Some(250),
                clock: Some(ClockMode::Logical),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            tick_ms: Some(40),
            clock: Some(ClockMode::Real),
            data_dir: Some(PathBuf::from("/tmp/cli")),
            ..Default::default()
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.tick_ms, 40);
        assert_eq!(resolved.clock, ClockMode::Real);
        assert_eq!(resolved.data_dir, PathBuf::from("/tmp/cli"));
    }

    #[test]
    fn test_inconsistent_limits_are_repaired() {
        let timers = TimersConfig {
            default_count: Some(10),
            min_count: Some(4),
            max_count: Some(2),
            default_duration: Some(-1.0),
            step: Some(0.0),
            max_duration: Some(-5.0),
        };
        let limits = resolve_limits(&timers);
        assert_eq!(limits.min_count, 4);
        assert_eq!(limits.max_count, 4);
        assert_eq!(limits.default_count, 4);
        assert_eq!(limits.default_duration, 0.0);
        assert_eq!(limits.step, DEFAULT_STEP_SECS);
        assert_eq!(limits.max_duration, DEFAULT_MAX_DURATION_SECS);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
tick_ms = 50
clock = "real"
log_level = "info"

[timers]
default_count = 4
max_count = 6
default_duration = 12.5
"#;
        let config: TickrConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.tick_ms, Some(50));
        assert_eq!(config.general.clock, Some(ClockMode::Real));
        assert_eq!(config.timers.default_count, Some(4));
        assert_eq!(config.timers.default_duration, Some(12.5));
        assert!(config.timers.min_count.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[timers]
step = 10.0
"#;
        let config: TickrConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timers.step, Some(10.0));
        assert!(config.general.clock.is_none());
        assert!(config.timers.max_duration.is_none());
    }

    #[test]
    fn test_unknown_clock_is_a_parse_error() {
        let toml_str = r#"
[general]
clock = "sundial"
"#;
        assert!(toml::from_str::<TickrConfig>(toml_str).is_err());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("tickr-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.general.tick_ms.is_none());
        assert!(path.exists());

        // The generated file is all comments, so it loads as the default.
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.timers.default_count.is_none());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("tickr-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\ntick_ms = ").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_clock_is_case_insensitive() {
        assert_eq!(parse_clock(" REAL "), Some(ClockMode::Real));
        assert_eq!(parse_clock("Logical"), Some(ClockMode::Logical));
        assert_eq!(parse_clock("wall"), None);
    }
}
