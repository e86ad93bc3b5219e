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

//! Display mode settings, committed to the display in a single call.

use khora_settings::{
    ConfigError, ConfigResult, EnumVariant, EnumVector, ParamType, ParamValue, Resolution,
    ValueMap,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::complex::ComplexParameter;
use crate::enumeration::EnumConstructor;
use crate::parameter::Parameter;
use crate::registry::Config;

/// The settings tab holding the video parameters.
pub const VIDEO_TAB: &str = "Video";
/// The aggregator every display-mode field is staged into.
pub const VIDEO_MODE_CATEGORY: &str = "VideoMode";
/// Resolution and refresh rate, encoded as `"<width>x<height>:<refresh>"`.
pub const RESOLUTION: &str = "Resolution";
/// Windowed, fullscreen, or borderless.
pub const WINDOW_MODE: &str = "WindowMode";
/// Vertical synchronisation.
pub const VSYNC: &str = "Vsync";
/// Index of the monitor the window is placed on.
pub const MONITOR: &str = "Monitor";

const PARAMETERS: [&str; 4] = [RESOLUTION, WINDOW_MODE, VSYNC, MONITOR];

/// How the main window occupies its monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowMode {
    /// A decorated window.
    #[default]
    Windowed,
    /// Exclusive fullscreen; the monitor switches to the requested mode.
    Fullscreen,
    /// An undecorated window covering the monitor at its desktop mode.
    Borderless,
}

impl WindowMode {
    /// Every window mode, in display order.
    pub const ALL: [WindowMode; 3] = [
        WindowMode::Windowed,
        WindowMode::Fullscreen,
        WindowMode::Borderless,
    ];

    /// The persisted name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            WindowMode::Windowed => "Windowed",
            WindowMode::Fullscreen => "Fullscreen",
            WindowMode::Borderless => "Borderless",
        }
    }

    /// The translation key of the mode's caption.
    pub fn translation_key(self) -> &'static str {
        match self {
            WindowMode::Windowed => "settings.video.window_mode.windowed",
            WindowMode::Fullscreen => "settings.video.window_mode.fullscreen",
            WindowMode::Borderless => "settings.video.window_mode.borderless",
        }
    }
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidValue(format!("unknown window mode '{s}'")))
    }
}

/// Everything the display needs to (re)configure itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayMode {
    /// The requested resolution and refresh rate.
    pub resolution: Resolution,
    /// The window mode.
    pub window_mode: WindowMode,
    /// Whether presentation waits for vertical blank.
    pub vsync: bool,
    /// The monitor index.
    pub monitor: u32,
}

impl DisplayMode {
    /// Builds a mode from a complete set of flushed video values.
    pub fn from_values(values: &ValueMap) -> ConfigResult<Self> {
        fn field<'a>(values: &'a ValueMap, name: &str) -> ConfigResult<&'a ParamValue> {
            values
                .get(name)
                .ok_or_else(|| ConfigError::InvalidValue(format!("display mode is missing '{name}'")))
        }
        fn wrong(name: &str, value: &ParamValue) -> ConfigError {
            ConfigError::InvalidValue(format!("'{value}' is not a valid {name}"))
        }

        let resolution = field(values, RESOLUTION)?;
        let resolution = resolution
            .as_str()
            .ok_or_else(|| wrong(RESOLUTION, resolution))?
            .parse::<Resolution>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let window_mode = field(values, WINDOW_MODE)?;
        let window_mode = window_mode
            .as_str()
            .ok_or_else(|| wrong(WINDOW_MODE, window_mode))?
            .parse::<WindowMode>()?;

        let vsync = field(values, VSYNC)?;
        let vsync = vsync.as_bool().ok_or_else(|| wrong(VSYNC, vsync))?;

        let monitor = field(values, MONITOR)?;
        let monitor = monitor
            .as_int()
            .and_then(|index| u32::try_from(index).ok())
            .ok_or_else(|| wrong(MONITOR, monitor))?;

        Ok(Self {
            resolution,
            window_mode,
            vsync,
            monitor,
        })
    }
}

/// The display subsystem, as seen by the settings registry.
pub trait DisplayBackend {
    /// The mode currently in effect.
    fn display_mode(&self) -> DisplayMode;

    /// Reconfigures the display. This is the expensive call that the video
    /// aggregator makes at most once per applied changeset.
    fn set_display_mode(&mut self, mode: DisplayMode) -> ConfigResult<()>;

    /// The number of connected monitors.
    fn monitor_count(&self) -> u32;

    /// The modes supported by `monitor`, queried live.
    fn supported_resolutions(&self, monitor: u32) -> Vec<Resolution>;
}

/// Registers `Resolution`, `WindowMode`, `Vsync` and `Monitor` in the `Video`
/// tab, all staged into the `VideoMode` aggregator.
///
/// Either everything is registered or, on error, nothing is.
pub fn register_video_settings<D>(config: &mut Config, display: Rc<RefCell<D>>) -> ConfigResult<()>
where
    D: DisplayBackend + 'static,
{
    super::check_available(config, &PARAMETERS, Some(VIDEO_MODE_CATEGORY))?;
    let created_tab = super::ensure_tab(config, VIDEO_TAB)?;
    if let Err(e) = install_video_settings(config, display) {
        super::roll_back(config, VIDEO_TAB, created_tab, &PARAMETERS, Some(VIDEO_MODE_CATEGORY));
        return Err(e);
    }
    log::info!("Config: video settings registered");
    Ok(())
}

fn install_video_settings<D>(config: &mut Config, display: Rc<RefCell<D>>) -> ConfigResult<()>
where
    D: DisplayBackend + 'static,
{
    let target = display.clone();
    config.register_complex_storage(
        VIDEO_MODE_CATEGORY,
        ComplexParameter::new(move |values: &ValueMap| -> ConfigResult<()> {
            let mode = DisplayMode::from_values(values)?;
            log::info!(
                "Display: switching to {} ({}, vsync {}, monitor {})",
                mode.resolution,
                mode.window_mode,
                mode.vsync,
                mode.monitor
            );
            target.borrow_mut().set_display_mode(mode)
        }),
    )?;

    let source = display.clone();
    config.register_parameter(
        RESOLUTION,
        VIDEO_TAB,
        Parameter::complex(
            ParamType::String,
            move || Ok(ParamValue::String(source.borrow().display_mode().resolution.to_string())),
            VIDEO_MODE_CATEGORY,
        )
        .with_engine(true),
    )?;

    let source = display.clone();
    config.register_parameter(
        WINDOW_MODE,
        VIDEO_TAB,
        Parameter::complex(
            ParamType::String,
            move || Ok(ParamValue::from(source.borrow().display_mode().window_mode.as_str())),
            VIDEO_MODE_CATEGORY,
        )
        .with_engine(true)
        .with_localized(true),
    )?;

    let source = display.clone();
    config.register_parameter(
        VSYNC,
        VIDEO_TAB,
        Parameter::complex(
            ParamType::Bool,
            move || Ok(ParamValue::Bool(source.borrow().display_mode().vsync)),
            VIDEO_MODE_CATEGORY,
        ),
    )?;

    let source = display.clone();
    config.register_parameter(
        MONITOR,
        VIDEO_TAB,
        Parameter::complex(
            ParamType::Int,
            move || Ok(ParamValue::Int(i64::from(source.borrow().display_mode().monitor))),
            VIDEO_MODE_CATEGORY,
        )
        .with_engine(true),
    )?;

    // Re-queried on every call: the list follows the monitor currently in use.
    let source = display.clone();
    config.register_enum(
        RESOLUTION,
        EnumConstructor::new(move || {
            let display = source.borrow();
            let monitor = display.display_mode().monitor;
            display
                .supported_resolutions(monitor)
                .into_iter()
                .map(|resolution| EnumVariant::new(resolution.caption(), resolution.to_string()))
                .collect::<EnumVector>()
        }),
    )?;

    config.register_enum(
        WINDOW_MODE,
        EnumConstructor::localized(|| {
            WindowMode::ALL
                .into_iter()
                .map(|mode| EnumVariant::new(mode.translation_key(), mode.as_str()))
                .collect::<EnumVector>()
        }),
    )?;

    let source = display;
    config.register_enum(
        MONITOR,
        EnumConstructor::new(move || {
            (0..source.borrow().monitor_count())
                .map(|index| EnumVariant::new(format!("Monitor {}", index + 1), i64::from(index)))
                .collect::<EnumVector>()
        }),
    )?;
    Ok(())
}

/// Removes everything [`register_video_settings`] added.
pub fn unregister_video_settings(config: &mut Config) -> ConfigResult<()> {
    super::remove_members(config, &PARAMETERS, Some(VIDEO_MODE_CATEGORY))?;
    super::release_tab(config, VIDEO_TAB)
}
