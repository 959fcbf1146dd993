#![allow(dead_code)]

use command_runner::config::{DemoSection, RawConfigFile, RunnerConfig};

/// Builder for `RawConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                runner: RunnerConfig::default(),
                demo: DemoSection::default(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.runner.name = name.to_string();
        self
    }

    pub fn delay(mut self, delay: &str) -> Self {
        self.config.demo.delay = delay.to_string();
        self
    }

    pub fn fail_with(mut self, msg: &str) -> Self {
        self.config.demo.fail_with = Some(msg.to_string());
        self
    }

    pub fn triggers(mut self, n: usize) -> Self {
        self.config.demo.triggers = n;
        self
    }

    pub fn trigger_interval(mut self, interval: &str) -> Self {
        self.config.demo.trigger_interval = interval.to_string();
        self
    }

    pub fn rounds(mut self, n: usize) -> Self {
        self.config.demo.rounds = n;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
