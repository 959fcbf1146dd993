// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// name = "pokemon"
///
/// [demo]
/// delay = "750ms"
/// triggers = 5
/// trigger_interval = "50ms"
/// rounds = 2
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub demo: DemoSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Label attached to every log line emitted for this runner.
    #[serde(default = "default_runner_name")]
    pub name: String,
}

fn default_runner_name() -> String {
    "command".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name: default_runner_name(),
        }
    }
}

impl RunnerConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// `[demo]` section, as written in the file.
///
/// Durations are strings such as `"500ms"` or `"2s"`; they are parsed during
/// validation into [`DemoConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct DemoSection {
    /// How long the simulated action takes.
    #[serde(default = "default_delay")]
    pub delay: String,

    /// If set, the simulated action fails with this message.
    #[serde(default)]
    pub fail_with: Option<String>,

    /// How many `try_run` calls to fire per round.
    #[serde(default = "default_triggers")]
    pub triggers: usize,

    /// Pause between those calls.
    #[serde(default = "default_trigger_interval")]
    pub trigger_interval: String,

    /// Number of rounds; the runner is reset between rounds.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

fn default_delay() -> String {
    "500ms".to_string()
}

fn default_triggers() -> usize {
    3
}

fn default_trigger_interval() -> String {
    "100ms".to_string()
}

fn default_rounds() -> usize {
    2
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            fail_with: None,
            triggers: default_triggers(),
            trigger_interval: default_trigger_interval(),
            rounds: default_rounds(),
        }
    }
}

/// Validated `[demo]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub delay: std::time::Duration,
    pub fail_with: Option<String>,
    pub triggers: usize,
    pub trigger_interval: std::time::Duration,
    pub rounds: usize,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerConfig,
    pub demo: DemoConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(runner: RunnerConfig, demo: DemoConfig) -> Self {
        Self { runner, demo }
    }
}
