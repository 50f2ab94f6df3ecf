/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from an
/// explicit path given on the command line.
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub fog: FogConfig,
    pub map: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub enemy_step_ms: u64,
    pub coin_drift_ms: u64,   // one full sweep over every coin
    pub freeze_ms: u64,
    pub win_pause_ms: u64,
    pub input_poll_ms: u64,
}

impl TimingConfig {
    pub fn enemy_step(&self) -> Duration { Duration::from_millis(self.enemy_step_ms) }
    pub fn coin_drift(&self) -> Duration { Duration::from_millis(self.coin_drift_ms) }
    pub fn freeze(&self) -> Duration { Duration::from_millis(self.freeze_ms) }
    pub fn win_pause(&self) -> Duration { Duration::from_millis(self.win_pause_ms) }
    pub fn input_poll(&self) -> Duration { Duration::from_millis(self.input_poll_ms) }
}

impl Default for TimingConfig {
    fn default() -> Self {
        let t = TomlTiming::default();
        TimingConfig {
            enemy_step_ms: t.enemy_step_ms,
            coin_drift_ms: t.coin_drift_ms,
            freeze_ms: t.freeze_ms,
            win_pause_ms: t.win_pause_ms,
            input_poll_ms: t.input_poll_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FogConfig {
    pub enabled: bool,
    /// Reveal half-width in columns; rows use half of this.
    pub radius: usize,
}

impl Default for FogConfig {
    fn default() -> Self {
        FogConfig { enabled: default_fog_enabled(), radius: default_fog_radius() }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    fog: TomlFog,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_enemy_step")]
    enemy_step_ms: u64,
    #[serde(default = "default_coin_drift")]
    coin_drift_ms: u64,
    #[serde(default = "default_freeze")]
    freeze_ms: u64,
    #[serde(default = "default_win_pause")]
    win_pause_ms: u64,
    #[serde(default = "default_input_poll")]
    input_poll_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlFog {
    #[serde(default = "default_fog_enabled")]
    enabled: bool,
    #[serde(default = "default_fog_radius")]
    radius: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map")]
    map: String,
}

// ── Defaults ──

fn default_enemy_step() -> u64 { 200 }
fn default_coin_drift() -> u64 { 100 }
fn default_freeze() -> u64 { 3000 }
fn default_win_pause() -> u64 { 1000 }
fn default_input_poll() -> u64 { 50 }
fn default_fog_enabled() -> bool { false }
fn default_fog_radius() -> usize { 3 }
fn default_map() -> String { "mapa.txt".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            enemy_step_ms: default_enemy_step(),
            coin_drift_ms: default_coin_drift(),
            freeze_ms: default_freeze(),
            win_pause_ms: default_win_pause(),
            input_poll_ms: default_input_poll(),
        }
    }
}

impl Default for TomlFog {
    fn default() -> Self {
        TomlFog { enabled: default_fog_enabled(), radius: default_fog_radius() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { map: default_map() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `explicit` if given, else the first `config.toml`
    /// found in (1) the exe directory, (2) the current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let found = match explicit {
            Some(path) => read_toml(path),
            None => candidate_dirs()
                .iter()
                .map(|d| d.join("config.toml"))
                .find(|p| p.exists())
                .and_then(|p| read_toml(&p)),
        };
        found.unwrap_or_default()
    }

    /// Parse config text. Keys that are absent take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Self::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                enemy_step_ms: cfg.timing.enemy_step_ms,
                coin_drift_ms: cfg.timing.coin_drift_ms,
                freeze_ms: cfg.timing.freeze_ms,
                win_pause_ms: cfg.timing.win_pause_ms,
                input_poll_ms: cfg.timing.input_poll_ms,
            },
            fog: FogConfig { enabled: cfg.fog.enabled, radius: cfg.fog.radius },
            map: PathBuf::from(cfg.general.map),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Read and parse one config file. Problems are warnings, never fatal.
fn read_toml(path: &Path) -> Option<GameConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match GameConfig::from_toml_str(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!("{}: parse error, using default settings: {e}", path.display());
                None
            }
        },
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            None
        }
    }
}
