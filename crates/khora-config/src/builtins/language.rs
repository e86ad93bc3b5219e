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

//! The interface language.

use khora_settings::{ConfigError, ConfigResult, EnumVariant, EnumVector, ParamType, ParamValue};
use std::cell::RefCell;
use std::rc::Rc;

use crate::enumeration::EnumConstructor;
use crate::parameter::Parameter;
use crate::registry::Config;

/// The settings tab holding the language parameter.
pub const GENERAL_TAB: &str = "General";
/// The language code parameter, e.g. `"en"`.
pub const LANGUAGE: &str = "Language";

/// The localization subsystem, as seen by the settings registry.
pub trait LocalizationBackend {
    /// The code of the active language.
    fn language(&self) -> String;

    /// Switches the active language. Unknown codes are rejected.
    fn set_language(&mut self, code: &str) -> ConfigResult<()>;

    /// The installed languages as `(code, native name)` pairs.
    fn available_languages(&self) -> Vec<(String, String)>;
}

/// Registers the engine parameter `Language` in the `General` tab, enumerated
/// over the installed languages. Nothing is registered on error.
pub fn register_language_settings<L>(
    config: &mut Config,
    localization: Rc<RefCell<L>>,
) -> ConfigResult<()>
where
    L: LocalizationBackend + 'static,
{
    super::check_available(config, &[LANGUAGE], None)?;
    let created_tab = super::ensure_tab(config, GENERAL_TAB)?;
    if let Err(e) = install_language_settings(config, localization) {
        super::roll_back(config, GENERAL_TAB, created_tab, &[LANGUAGE], None);
        return Err(e);
    }
    log::info!("Config: language settings registered");
    Ok(())
}

fn install_language_settings<L>(config: &mut Config, localization: Rc<RefCell<L>>) -> ConfigResult<()>
where
    L: LocalizationBackend + 'static,
{
    let source = localization.clone();
    let target = localization.clone();
    config.register_parameter(
        LANGUAGE,
        GENERAL_TAB,
        Parameter::direct(
            ParamType::String,
            move || Ok(ParamValue::String(source.borrow().language())),
            move |value: &ParamValue| -> ConfigResult<()> {
                let code = value
                    .as_str()
                    .ok_or_else(|| ConfigError::InvalidValue(format!("'{value}' is not a language code")))?;
                target.borrow_mut().set_language(code)
            },
        )
        .with_engine(true),
    )?;

    let source = localization;
    config.register_enum(
        LANGUAGE,
        EnumConstructor::new(move || {
            source
                .borrow()
                .available_languages()
                .into_iter()
                .map(|(code, name)| EnumVariant::new(name, code))
                .collect::<EnumVector>()
        }),
    )?;
    Ok(())
}

/// Removes everything [`register_language_settings`] added.
pub fn unregister_language_settings(config: &mut Config) -> ConfigResult<()> {
    super::remove_members(config, &[LANGUAGE], None)?;
    super::release_tab(config, GENERAL_TAB)
}
