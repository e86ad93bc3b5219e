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


//! Gameplay settings owned by game scripts.

use khora_config::{Config, ConfigResult, ParamType, ParamValue, ScriptFunctionTable};
use std::cell::Cell;
use std::rc::Rc;

/// The settings tab holding the script-owned parameters.
pub const GAMEPLAY_TAB: &str = "Gameplay";
/// The camera's vertical field of view, in degrees.
pub const FIELD_OF_VIEW: &str = "FieldOfView";

const FOV_RANGE: std::ops::RangeInclusive<f64> = 60.0..=120.0;

/// Exposes the camera functions a game script would define.
pub fn script_host(fov: Rc<Cell<f64>>) -> ScriptFunctionTable {
    let (get, set) = (fov.clone(), fov);
    let mut table = ScriptFunctionTable::new();
    table.define("camera_get_fov", move |_: &[ParamValue]| {
        Ok(Some(ParamValue::Float(get.get())))
    });
    table.define(
        "camera_set_fov",
        move |args: &[ParamValue]| -> Result<Option<ParamValue>, String> {
            let degrees = args
                .first()
                .and_then(ParamValue::as_float)
                .ok_or_else(|| "camera_set_fov expects a number".to_string())?;
            if !FOV_RANGE.contains(&degrees) {
                return Err(format!("field of view {degrees} is out of range"));
            }
            set.set(degrees);
            Ok(None)
        },
    );
    table
}

/// Registers the script-bound gameplay parameters.
pub fn register_gameplay_settings(config: &mut Config, scripts: &ScriptFunctionTable) -> ConfigResult<()> {
    if !config.has_settings_tab(GAMEPLAY_TAB) {
        config.register_settings_tab(GAMEPLAY_TAB)?;
    }
    config.register_script_parameter(
        FIELD_OF_VIEW,
        GAMEPLAY_TAB,
        ParamType::Float,
        scripts,
        "camera_get_fov",
        "camera_set_fov",
    )
}
