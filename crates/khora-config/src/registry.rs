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

//! The configuration registry.
//!
//! [`Config`] is an explicitly owned object: the shell constructs it during
//! startup, hands references to whoever needs settings, and drops it at
//! teardown. All of its methods run on the owning thread; capabilities may
//! call into subsystems that are not thread-safe.

use indexmap::IndexMap;
use khora_settings::{
    Changeset, ConfigError, ConfigResult, EnumVector, NameHash, ParamValue,
};
use std::collections::HashMap;

use crate::complex::ComplexParameter;
use crate::enumeration::EnumConstructor;
use crate::parameter::{Parameter, ParameterInfo, WriteRoute};

/// A registered parameter together with its identity and tab.
#[derive(Debug)]
pub(crate) struct ParameterEntry {
    pub(crate) name: String,
    pub(crate) tab: NameHash,
    pub(crate) parameter: Parameter,
}

/// An entry that was not applied, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    /// The parameter name, or a positional description when the name is unusable.
    pub entry: String,
    /// Why the entry was skipped.
    pub reason: ConfigError,
}

/// The outcome of applying a changeset or loading a settings document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Parameters whose value was dispatched, in dispatch order.
    pub written: Vec<String>,
    /// Entries that were reported and ignored.
    pub skipped: Vec<SkippedEntry>,
    /// How many aggregate commits fired during the flush phase.
    pub commits: usize,
    /// Aggregators whose commit failed, by category.
    pub failed_commits: Vec<(String, ConfigError)>,
}

impl ApplyReport {
    /// Returns `true` if nothing was skipped and no commit failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed_commits.is_empty()
    }

    pub(crate) fn skip(&mut self, entry: impl Into<String>, reason: ConfigError) {
        let entry = entry.into();
        log::warn!("Config: skipping '{}': {}", entry, reason);
        self.skipped.push(SkippedEntry { entry, reason });
    }
}

/// Logs a rejected registry operation and returns it as an error.
fn reject<T>(error: ConfigError) -> ConfigResult<T> {
    log::warn!("Config: {}", error);
    Err(error)
}

/// Completes a dirty aggregator with the current value of every member that
/// was not staged, then flushes it.
fn complete_and_apply(
    parameters: &IndexMap<NameHash, ParameterEntry>,
    category: &str,
    storage: &mut ComplexParameter,
) -> ConfigResult<bool> {
    if !storage.is_dirty() {
        return Ok(false);
    }
    for entry in parameters.values() {
        if entry.parameter.category() != Some(category) || storage.is_staged(&entry.name) {
            continue;
        }
        match Config::read_entry(entry) {
            Ok(current) => storage.fill(&entry.name, current),
            Err(e) => log::warn!(
                "Config: could not read current value of '{}' for '{}': {}",
                entry.name,
                category,
                e
            ),
        }
    }
    log::debug!(
        "Config: committing '{}' with {} value(s)",
        category,
        storage.pending().len()
    );
    storage.apply()
}

/// The registry of every setting the shell exposes.
///
/// # Example
///
/// ```rust
/// use khora_config::{Changeset, ComplexParameter, Config, Parameter, ParamType, ParamValue, ValueMap};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let commits = Rc::new(RefCell::new(Vec::new()));
/// let sink = commits.clone();
///
/// let mut config = Config::new();
/// config.register_settings_tab("Video").unwrap();
/// config
///     .register_complex_storage(
///         "VideoMode",
///         ComplexParameter::new(move |values: &ValueMap| {
///             sink.borrow_mut().push(values.clone());
///             Ok(())
///         }),
///     )
///     .unwrap();
/// config
///     .register_parameter(
///         "Vsync",
///         "Video",
///         Parameter::complex(ParamType::Bool, || Ok(ParamValue::Bool(false)), "VideoMode"),
///     )
///     .unwrap();
///
/// let mut changes = Changeset::new();
/// changes.insert("Vsync".to_string(), ParamValue::Bool(true));
/// let report = config.apply(&changes);
///
/// assert_eq!(report.commits, 1);
/// assert_eq!(commits.borrow()[0]["Vsync"], ParamValue::Bool(true));
/// ```
#[derive(Debug, Default)]
pub struct Config {
    pub(crate) parameters: IndexMap<NameHash, ParameterEntry>,
    enums: HashMap<NameHash, EnumConstructor>,
    storages: IndexMap<String, ComplexParameter>,
    tabs: IndexMap<NameHash, Vec<NameHash>>,
    display_names: HashMap<NameHash, String>,
}

impl Config {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Settings tabs ---

    /// Registers an empty settings tab.
    pub fn register_settings_tab(&mut self, name: &str) -> ConfigResult<()> {
        let id = NameHash::of(name);
        if self.tabs.contains_key(&id) {
            return reject(ConfigError::DuplicateTab(name.to_string()));
        }
        self.tabs.insert(id, Vec::new());
        self.display_names.insert(id, name.to_string());
        log::info!("Config: registered settings tab '{}'", name);
        Ok(())
    }

    /// Removes a settings tab.
    ///
    /// Only empty tabs can be removed; remove their parameters first.
    pub fn remove_settings_tab(&mut self, name: &str) -> ConfigResult<()> {
        let id = NameHash::of(name);
        let Some(members) = self.tabs.get(&id) else {
            return reject(ConfigError::UnknownTab(name.to_string()));
        };
        if !members.is_empty() {
            return reject(ConfigError::TabNotEmpty {
                tab: name.to_string(),
                count: members.len(),
            });
        }
        self.tabs.shift_remove(&id);
        if !self.parameters.contains_key(&id) {
            self.display_names.remove(&id);
        }
        log::info!("Config: removed settings tab '{}'", name);
        Ok(())
    }

    /// Returns `true` if a tab with this name is registered.
    pub fn has_settings_tab(&self, name: &str) -> bool {
        self.tabs.contains_key(&NameHash::of(name))
    }

    /// The display names of every tab, in registration order.
    pub fn settings_tabs(&self) -> Vec<String> {
        self.tabs
            .keys()
            .filter_map(|id| self.display_names.get(id).cloned())
            .collect()
    }

    /// The names of the parameters in `tab`, in registration order.
    ///
    /// Returns an empty list (and logs a warning) for an unknown tab.
    pub fn settings(&self, tab: &str) -> Vec<String> {
        let Some(members) = self.tabs.get(&NameHash::of(tab)) else {
            log::warn!("Config: {}", ConfigError::UnknownTab(tab.to_string()));
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| self.display_names.get(id).cloned())
            .collect()
    }

    // --- Parameters ---

    /// Registers `parameter` under `name` in `tab`.
    ///
    /// Fails if the name is taken or the tab is unknown; the registry is left
    /// unchanged in both cases.
    pub fn register_parameter(
        &mut self,
        name: &str,
        tab: &str,
        parameter: Parameter,
    ) -> ConfigResult<()> {
        if name.is_empty() {
            return reject(ConfigError::InvalidValue(
                "parameter name must not be empty".to_string(),
            ));
        }
        let id = NameHash::of(name);
        if self.parameters.contains_key(&id) {
            return reject(ConfigError::DuplicateParameter(name.to_string()));
        }
        let tab_id = NameHash::of(tab);
        let Some(members) = self.tabs.get_mut(&tab_id) else {
            return reject(ConfigError::UnknownTab(tab.to_string()));
        };

        members.push(id);
        log::debug!(
            "Config: registered parameter '{}' ({}, {:?}) in '{}'",
            name,
            parameter.value_type(),
            parameter.route(),
            tab
        );
        self.parameters.insert(
            id,
            ParameterEntry {
                name: name.to_string(),
                tab: tab_id,
                parameter,
            },
        );
        self.display_names.insert(id, name.to_string());
        Ok(())
    }

    /// Unregisters a parameter, together with its enum constructor and any
    /// value it still has staged in an aggregator.
    pub fn remove_parameter(&mut self, name: &str) -> ConfigResult<()> {
        let id = NameHash::of(name);
        let Some(entry) = self.parameters.shift_remove(&id) else {
            return reject(ConfigError::UnknownParameter(name.to_string()));
        };

        self.enums.remove(&id);
        if let Some(members) = self.tabs.get_mut(&entry.tab) {
            members.retain(|member| *member != id);
        }
        if let Some(storage) = entry
            .parameter
            .category()
            .and_then(|category| self.storages.get_mut(category))
        {
            storage.discard(&entry.name);
        }
        if !self.tabs.contains_key(&id) {
            self.display_names.remove(&id);
        }
        log::debug!("Config: removed parameter '{}'", name);
        Ok(())
    }

    /// Returns `true` if a parameter with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(&NameHash::of(name))
    }

    /// The number of registered parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if no parameter is registered.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The registered name behind a hash, if any.
    pub fn parameter_name(&self, id: NameHash) -> Option<&str> {
        self.parameters.get(&id).map(|entry| entry.name.as_str())
    }

    /// Describes a registered parameter.
    pub fn parameter_info(&self, name: &str) -> Option<ParameterInfo> {
        let id = NameHash::of(name);
        let entry = self.parameters.get(&id)?;
        Some(ParameterInfo {
            name: entry.name.clone(),
            value_type: entry.parameter.value_type(),
            tab: self.display_names.get(&entry.tab).cloned().unwrap_or_default(),
            is_engine: entry.parameter.is_engine(),
            is_localized: self.is_localized(name),
            is_enum: self.enums.contains_key(&id),
            category: entry.parameter.category().map(str::to_string),
        })
    }

    /// Whether `name` is an engine parameter; `None` if it is not registered.
    pub fn is_engine_parameter(&self, name: &str) -> Option<bool> {
        self.parameters
            .get(&NameHash::of(name))
            .map(|entry| entry.parameter.is_engine())
    }

    // --- Enum constructors ---

    /// Attaches an enum constructor to an existing parameter.
    pub fn register_enum(&mut self, name: &str, constructor: EnumConstructor) -> ConfigResult<()> {
        let id = NameHash::of(name);
        if !self.parameters.contains_key(&id) {
            return reject(ConfigError::UnknownParameter(name.to_string()));
        }
        if self.enums.contains_key(&id) {
            return reject(ConfigError::DuplicateEnum(name.to_string()));
        }
        self.enums.insert(id, constructor);
        Ok(())
    }

    /// Detaches the enum constructor of an existing parameter.
    pub fn remove_enum(&mut self, name: &str) -> ConfigResult<()> {
        let id = NameHash::of(name);
        if !self.parameters.contains_key(&id) {
            return reject(ConfigError::UnknownParameter(name.to_string()));
        }
        if self.enums.remove(&id).is_none() {
            return reject(ConfigError::UnknownEnum(name.to_string()));
        }
        Ok(())
    }

    /// Returns `true` if an enum constructor is registered for `name`.
    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(&NameHash::of(name))
    }

    /// Builds the current choices for `name`.
    ///
    /// The constructor runs on every call. Returns an empty list when no
    /// constructor is registered.
    pub fn construct_enum(&self, name: &str) -> EnumVector {
        match self.enums.get(&NameHash::of(name)) {
            Some(constructor) => constructor.create(),
            None => {
                log::debug!("Config: '{}' has no enum constructor", name);
                EnumVector::new()
            }
        }
    }

    /// Whether the captions for `name` are translation keys.
    ///
    /// The enum constructor's flag wins when one is registered; otherwise the
    /// parameter's own flag is used.
    pub fn is_localized(&self, name: &str) -> bool {
        let id = NameHash::of(name);
        if let Some(constructor) = self.enums.get(&id) {
            return constructor.is_localized();
        }
        self.parameters
            .get(&id)
            .is_some_and(|entry| entry.parameter.is_localized())
    }

    // --- Complex storages ---

    /// Registers an aggregator under `category`.
    pub fn register_complex_storage(
        &mut self,
        category: &str,
        storage: ComplexParameter,
    ) -> ConfigResult<()> {
        if self.storages.contains_key(category) {
            return reject(ConfigError::DuplicateStorage(category.to_string()));
        }
        self.storages.insert(category.to_string(), storage);
        log::info!("Config: registered complex storage '{}'", category);
        Ok(())
    }

    /// Removes the aggregator registered under `category`.
    ///
    /// Anything still staged in it is dropped without a commit.
    pub fn remove_complex_storage(&mut self, category: &str) -> ConfigResult<()> {
        match self.storages.shift_remove(category) {
            Some(storage) => {
                if storage.is_dirty() {
                    log::warn!(
                        "Config: dropping {} uncommitted value(s) of '{}'",
                        storage.pending().len(),
                        category
                    );
                }
                Ok(())
            }
            None => reject(ConfigError::UnknownStorage(category.to_string())),
        }
    }

    /// The registered aggregators, in registration order.
    pub fn complex_storages(&self) -> impl Iterator<Item = (&str, &ComplexParameter)> {
        self.storages
            .iter()
            .map(|(category, storage)| (category.as_str(), storage))
    }

    // --- Values ---

    /// Reads the current value of one parameter.
    ///
    /// A reader that returns a value of another type than the declared one is
    /// reported as a type mismatch.
    pub fn read_value(&self, name: &str) -> ConfigResult<ParamValue> {
        let Some(entry) = self.parameters.get(&NameHash::of(name)) else {
            return reject(ConfigError::UnknownParameter(name.to_string()));
        };
        Self::read_entry(entry).or_else(reject)
    }

    fn read_entry(entry: &ParameterEntry) -> ConfigResult<ParamValue> {
        let value = entry.parameter.read()?;
        entry.parameter.check_type(&entry.name, &value)?;
        Ok(entry.parameter.coerce(&value))
    }

    /// Writes one parameter outside of a changeset.
    ///
    /// Direct parameters are written immediately. A complex-routed parameter
    /// is staged and its aggregator is flushed right away, on its own; use
    /// [`apply`](Self::apply) to coalesce several fields into one commit.
    pub fn write_value(&mut self, name: &str, value: ParamValue) -> ConfigResult<()> {
        if let Err(e) = self.dispatch(name, &value) {
            return reject(e);
        }

        let id = NameHash::of(name);
        let Some(category) = self
            .parameters
            .get(&id)
            .and_then(|entry| entry.parameter.category())
            .map(str::to_string)
        else {
            return Ok(());
        };
        let Some(storage) = self.storages.get_mut(&category) else {
            return reject(ConfigError::UnknownStorage(category));
        };
        complete_and_apply(&self.parameters, &category, storage)
            .map(|_| ())
            .or_else(reject)
    }

    /// Every registered parameter's current value, in registry order.
    ///
    /// Parameters whose reader fails are logged and left out.
    pub fn snapshot(&self) -> Changeset {
        let mut values = Changeset::with_capacity(self.parameters.len());
        for entry in self.parameters.values() {
            match Self::read_entry(entry) {
                Ok(value) => {
                    values.insert(entry.name.clone(), value);
                }
                Err(e) => log::warn!("Config: cannot read '{}': {}", entry.name, e),
            }
        }
        values
    }

    // --- Apply protocol ---

    /// Routes one value through the parameter's write route.
    fn dispatch(&mut self, name: &str, value: &ParamValue) -> ConfigResult<()> {
        let Some(entry) = self.parameters.get(&NameHash::of(name)) else {
            return Err(ConfigError::UnknownParameter(name.to_string()));
        };
        entry.parameter.check_type(name, value)?;
        let value = entry.parameter.coerce(value);

        match entry.parameter.route() {
            WriteRoute::Direct(writer) => {
                log::trace!("Config: writing '{}' = {}", name, value);
                writer.write(&value)
            }
            WriteRoute::Complex(category) => {
                let Some(storage) = self.storages.get_mut(category) else {
                    return Err(ConfigError::UnknownStorage(category.clone()));
                };
                log::trace!("Config: staging '{}' = {} into '{}'", name, value, category);
                storage.set(entry.name.clone(), value);
                Ok(())
            }
        }
    }

    /// Applies a changeset.
    ///
    /// Phase one dispatches every entry exactly once, in changeset order:
    /// direct parameters are written, complex ones are staged. Phase two then
    /// flushes every aggregator once, in registration order, so each dirty
    /// aggregator commits exactly once with its complete value set. Unknown
    /// names, type mismatches, and writer failures are reported and skipped;
    /// they never stop the rest of the changeset.
    pub fn apply(&mut self, changeset: &Changeset) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (name, value) in changeset {
            match self.dispatch(name, value) {
                Ok(()) => report.written.push(name.clone()),
                Err(e) => report.skip(name.clone(), e),
            }
        }

        self.flush(&mut report);
        report
    }

    /// Flushes every registered aggregator once, in registration order.
    pub(crate) fn flush(&mut self, report: &mut ApplyReport) {
        for (category, storage) in self.storages.iter_mut() {
            match complete_and_apply(&self.parameters, category, storage) {
                Ok(true) => report.commits += 1,
                Ok(false) => {}
                Err(e) => {
                    log::error!("Config: commit of '{}' failed: {}", category, e);
                    report.failed_commits.push((category.clone(), e));
                }
            }
        }
    }
}
