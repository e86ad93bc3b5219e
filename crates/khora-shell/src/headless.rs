// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! In-process subsystems used when the shell runs without a window or an
//! audio device. They keep their state in memory and log every change.

use khora_config::builtins::{
    AudioBackend, AudioChannel, DisplayBackend, DisplayMode, LocalizationBackend,
};
use khora_settings::{ConfigError, ConfigResult, Resolution};
use std::collections::HashMap;

/// A display with two virtual monitors.
#[derive(Debug)]
pub struct HeadlessDisplay {
    mode: DisplayMode,
    monitors: Vec<Vec<Resolution>>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self {
            mode: DisplayMode::default(),
            monitors: vec![
                vec![
                    Resolution::new(1280, 720, 60),
                    Resolution::new(1920, 1080, 60),
                    Resolution::new(1920, 1080, 144),
                ],
                vec![
                    Resolution::new(1280, 720, 60),
                    Resolution::new(2560, 1440, 60),
                ],
            ],
        }
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> ConfigResult<()> {
        if !self.supported_resolutions(mode.monitor).contains(&mode.resolution) {
            return Err(ConfigError::Subsystem(format!(
                "monitor {} does not support {}",
                mode.monitor,
                mode.resolution.caption()
            )));
        }
        log::info!(
            "HeadlessDisplay: {} {} on monitor {}",
            mode.window_mode,
            mode.resolution.caption(),
            mode.monitor
        );
        self.mode = mode;
        Ok(())
    }

    fn monitor_count(&self) -> u32 {
        self.monitors.len() as u32
    }

    fn supported_resolutions(&self, monitor: u32) -> Vec<Resolution> {
        self.monitors
            .get(monitor as usize)
            .cloned()
            .unwrap_or_default()
    }
}

/// A mixer without an output device.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    gains: HashMap<AudioChannel, f32>,
}

impl AudioBackend for HeadlessAudio {
    fn gain(&self, channel: AudioChannel) -> f32 {
        self.gains.get(&channel).copied().unwrap_or(1.0)
    }

    fn set_gain(&mut self, channel: AudioChannel, gain: f32) {
        log::debug!("HeadlessAudio: {:?} gain {:.2}", channel, gain);
        self.gains.insert(channel, gain);
    }
}

/// A string catalog with a fixed set of languages.
#[derive(Debug)]
pub struct HeadlessLocalization {
    language: String,
    installed: Vec<(String, String)>,
}

impl HeadlessLocalization {
    pub fn new() -> Self {
        Self {
            language: "en".to_string(),
            installed: [("en", "English"), ("fr", "Français"), ("de", "Deutsch")]
                .into_iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl Default for HeadlessLocalization {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalizationBackend for HeadlessLocalization {
    fn language(&self) -> String {
        self.language.clone()
    }

    fn set_language(&mut self, code: &str) -> ConfigResult<()> {
        if !self.installed.iter().any(|(installed, _)| installed == code) {
            return Err(ConfigError::InvalidValue(format!(
                "language '{code}' is not installed"
            )));
        }
        log::info!("HeadlessLocalization: language set to '{}'", code);
        self.language = code.to_string();
        Ok(())
    }

    fn available_languages(&self) -> Vec<(String, String)> {
        self.installed.clone()
    }
}
