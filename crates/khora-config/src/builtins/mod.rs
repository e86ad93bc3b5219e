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

//! Standard settings for the engine subsystems the shell configures.
//!
//! Each subsystem is reached through a small backend trait of plain getters
//! and setters. The registration helpers wire those backends into a [`Config`]
//! and the matching `unregister_*` helpers take them out again; call them
//! before the backend is dropped.
//!
//! [`Config`]: crate::Config

pub mod audio;
pub mod language;
pub mod video;

pub use audio::{register_audio_settings, unregister_audio_settings, AudioBackend, AudioChannel};
pub use language::{
    register_language_settings, unregister_language_settings, LocalizationBackend,
};
pub use video::{
    register_video_settings, unregister_video_settings, DisplayBackend, DisplayMode, WindowMode,
};

use crate::registry::Config;
use khora_settings::{ConfigError, ConfigResult};

/// Fails if any of `names` or `category` is already registered.
fn check_available(config: &Config, names: &[&str], category: Option<&str>) -> ConfigResult<()> {
    let error = if let Some(name) = names.iter().find(|name| config.contains(name)) {
        ConfigError::DuplicateParameter(name.to_string())
    } else if let Some(category) = category.filter(|category| has_storage(config, category)) {
        ConfigError::DuplicateStorage(category.to_string())
    } else {
        return Ok(());
    };
    log::warn!("Config: {}", error);
    Err(error)
}

fn has_storage(config: &Config, category: &str) -> bool {
    config
        .complex_storages()
        .any(|(registered, _)| registered == category)
}

/// Registers `tab` unless it already exists. Returns `true` if it was created.
fn ensure_tab(config: &mut Config, tab: &str) -> ConfigResult<bool> {
    if config.has_settings_tab(tab) {
        Ok(false)
    } else {
        config.register_settings_tab(tab).map(|()| true)
    }
}

/// Removes whichever of `names` and `category` are registered.
fn remove_members(config: &mut Config, names: &[&str], category: Option<&str>) -> ConfigResult<()> {
    for name in names {
        if config.contains(name) {
            config.remove_parameter(name)?;
        }
    }
    match category {
        Some(category) if has_storage(config, category) => config.remove_complex_storage(category),
        _ => Ok(()),
    }
}

/// Undoes a registration that failed part-way.
fn roll_back(config: &mut Config, tab: &str, created_tab: bool, names: &[&str], category: Option<&str>) {
    let mut result = remove_members(config, names, category);
    if created_tab && result.is_ok() {
        result = config.remove_settings_tab(tab);
    }
    if let Err(e) = result {
        log::error!("Config: could not roll back '{}': {}", tab, e);
    }
}

/// Removes `tab` if nothing else still lives in it.
fn release_tab(config: &mut Config, tab: &str) -> ConfigResult<()> {
    if config.has_settings_tab(tab) && config.settings(tab).is_empty() {
        config.remove_settings_tab(tab)
    } else {
        Ok(())
    }
}
