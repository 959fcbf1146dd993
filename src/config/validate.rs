// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, DemoConfig, DemoSection, RawConfigFile, RunnerConfig};
use crate::errors::{Result, RunnerError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_runner(&raw.runner)?;
        let demo = validate_demo(&raw.demo)?;
        Ok(ConfigFile::new_unchecked(raw.runner, demo))
    }
}

/// Validate a raw config without consuming it.
pub fn validate_config(raw: &RawConfigFile) -> Result<()> {
    validate_runner(&raw.runner)?;
    validate_demo(&raw.demo)?;
    Ok(())
}

fn validate_runner(cfg: &RunnerConfig) -> Result<()> {
    if cfg.name.trim().is_empty() {
        return Err(RunnerError::Config(
            "[runner].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_demo(cfg: &DemoSection) -> Result<DemoConfig> {
    if cfg.triggers == 0 {
        return Err(RunnerError::Config(
            "[demo].triggers must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.rounds == 0 {
        return Err(RunnerError::Config(
            "[demo].rounds must be >= 1 (got 0)".to_string(),
        ));
    }

    let delay = parse_duration(&cfg.delay)
        .map_err(|e| RunnerError::Config(format!("[demo].delay: {e}")))?;
    let trigger_interval = parse_duration(&cfg.trigger_interval)
        .map_err(|e| RunnerError::Config(format!("[demo].trigger_interval: {e}")))?;

    Ok(DemoConfig {
        delay,
        fail_with: cfg.fail_with.clone(),
        triggers: cfg.triggers,
        trigger_interval,
        rounds: cfg.rounds,
    })
}

/// Parse a duration string like `"250ms"`, `"3s"`, `"1m"` or `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration too large: '{}'", s))
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
