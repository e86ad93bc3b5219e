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

//! Mixer volumes. Each volume is written straight to the audio backend.

use khora_settings::{ConfigResult, ParamType, ParamValue};
use std::cell::RefCell;
use std::rc::Rc;

use crate::parameter::Parameter;
use crate::registry::Config;

/// The settings tab holding the audio parameters.
pub const AUDIO_TAB: &str = "Audio";

/// A mixer channel with its own gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    /// The gain applied to everything.
    Master,
    /// Background music.
    Music,
    /// Sound effects.
    Effects,
}

impl AudioChannel {
    /// Every channel, in display order.
    pub const ALL: [AudioChannel; 3] = [AudioChannel::Master, AudioChannel::Music, AudioChannel::Effects];

    /// The name of the parameter controlling the channel.
    pub fn parameter_name(self) -> &'static str {
        match self {
            AudioChannel::Master => "MasterVolume",
            AudioChannel::Music => "MusicVolume",
            AudioChannel::Effects => "EffectsVolume",
        }
    }
}

/// The audio subsystem, as seen by the settings registry.
pub trait AudioBackend {
    /// The current gain of `channel`, in `0.0..=1.0`.
    fn gain(&self, channel: AudioChannel) -> f32;

    /// Sets the gain of `channel`.
    fn set_gain(&mut self, channel: AudioChannel, gain: f32);
}

/// Registers one float volume per [`AudioChannel`] in the `Audio` tab.
///
/// Written volumes are clamped to `0.0..=1.0`. Either every volume is
/// registered or, on error, none is.
pub fn register_audio_settings<A>(config: &mut Config, audio: Rc<RefCell<A>>) -> ConfigResult<()>
where
    A: AudioBackend + 'static,
{
    let names = AudioChannel::ALL.map(AudioChannel::parameter_name);
    super::check_available(config, &names, None)?;
    let created_tab = super::ensure_tab(config, AUDIO_TAB)?;
    if let Err(e) = install_audio_settings(config, audio) {
        super::roll_back(config, AUDIO_TAB, created_tab, &names, None);
        return Err(e);
    }
    log::info!("Config: audio settings registered");
    Ok(())
}

fn install_audio_settings<A>(config: &mut Config, audio: Rc<RefCell<A>>) -> ConfigResult<()>
where
    A: AudioBackend + 'static,
{
    for channel in AudioChannel::ALL {
        let source = audio.clone();
        let target = audio.clone();
        config.register_parameter(
            channel.parameter_name(),
            AUDIO_TAB,
            Parameter::direct(
                ParamType::Float,
                move || Ok(ParamValue::from(source.borrow().gain(channel))),
                move |value: &ParamValue| -> ConfigResult<()> {
                    let gain = value.as_float().unwrap_or_default().clamp(0.0, 1.0) as f32;
                    target.borrow_mut().set_gain(channel, gain);
                    Ok(())
                },
            ),
        )?;
    }
    Ok(())
}

/// Removes everything [`register_audio_settings`] added.
pub fn unregister_audio_settings(config: &mut Config) -> ConfigResult<()> {
    let names = AudioChannel::ALL.map(AudioChannel::parameter_name);
    super::remove_members(config, &names, None)?;
    super::release_tab(config, AUDIO_TAB)
}
