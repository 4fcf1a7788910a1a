//! Training preferences
//!
//! Persisted separately from trial history in LocalStorage.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{REPS_OPTIONS, TIME_OPTIONS_SECS};
use crate::sim::{DEFAULT_LEVEL, SessionMode, difficulty::is_valid_level};

/// Which limit ends a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExerciseMode {
    #[default]
    Time,
    Reps,
}

impl ExerciseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseMode::Time => "time",
            ExerciseMode::Reps => "reps",
        }
    }
}

impl FromStr for ExerciseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" | "tiempo" => Ok(ExerciseMode::Time),
            "reps" | "repeticiones" => Ok(ExerciseMode::Reps),
            other => Err(format!("unknown exercise mode: {other}")),
        }
    }
}

/// Training settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: ExerciseMode,
    /// Session length for time mode (seconds)
    pub time_secs: u32,
    /// Trial count for reps mode
    pub reps: u32,
    /// Difficulty level 1-5
    pub difficulty: u8,
    /// Owner of the stored trial history
    pub user_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ExerciseMode::Time,
            time_secs: 60,
            reps: 10,
            difficulty: DEFAULT_LEVEL,
            user_id: "local".to_string(),
        }
    }
}

impl Settings {
    /// Session mode for the current selection
    pub fn session_mode(&self) -> SessionMode {
        match self.mode {
            ExerciseMode::Time => SessionMode::ByTime {
                seconds: self.time_secs,
            },
            ExerciseMode::Reps => SessionMode::ByReps { target: self.reps },
        }
    }

    /// Replace out-of-range values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !TIME_OPTIONS_SECS.contains(&self.time_secs) {
            log::warn!("Ignoring unsupported duration {}s", self.time_secs);
            self.time_secs = defaults.time_secs;
        }
        if !REPS_OPTIONS.contains(&self.reps) {
            log::warn!("Ignoring unsupported repetition count {}", self.reps);
            self.reps = defaults.reps;
        }
        if !is_valid_level(self.difficulty) {
            log::warn!("Ignoring unsupported difficulty {}", self.difficulty);
            self.difficulty = defaults.difficulty;
        }
        if self.user_id.trim().is_empty() {
            self.user_id = defaults.user_id;
        }
        self
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "trajectory_trainer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
