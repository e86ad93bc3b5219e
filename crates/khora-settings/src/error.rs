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

//! Defines the error taxonomy of the configuration registry.
//!
//! None of these errors is fatal. A failed registration leaves the registry
//! untouched, and a failed write leaves the previous value in place.

use crate::value::ParamType;
use thiserror::Error;

/// A convenience alias for results produced by the registry and its capabilities.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// An error reported by the configuration registry or one of its capabilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A settings tab with this name is already registered.
    #[error("settings tab '{0}' is already registered")]
    DuplicateTab(String),

    /// A parameter with this name is already registered.
    #[error("parameter '{0}' is already registered")]
    DuplicateParameter(String),

    /// An enum constructor is already registered for this parameter.
    #[error("enum constructor for '{0}' is already registered")]
    DuplicateEnum(String),

    /// A complex storage is already registered under this category.
    #[error("complex storage '{0}' is already registered")]
    DuplicateStorage(String),

    /// The settings tab does not exist.
    #[error("unknown settings tab '{0}'")]
    UnknownTab(String),

    /// The parameter does not exist.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// No enum constructor is registered for this parameter.
    #[error("no enum constructor registered for '{0}'")]
    UnknownEnum(String),

    /// No complex storage is registered under this category.
    #[error("unknown complex storage '{0}'")]
    UnknownStorage(String),

    /// A settings tab cannot be removed while parameters still belong to it.
    #[error("settings tab '{tab}' still holds {count} parameter(s)")]
    TabNotEmpty {
        /// The tab that was asked to be removed.
        tab: String,
        /// How many parameters are still registered under it.
        count: usize,
    },

    /// The supplied value does not match the parameter's declared type.
    #[error("type mismatch for '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The parameter being written.
        name: String,
        /// The parameter's declared type.
        expected: ParamType,
        /// The type of the supplied value.
        found: ParamType,
    },

    /// A value could not be parsed or is outside its legal domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A persisted entry was unusable (empty name, absent or unparsable value).
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// A script function could not be found when binding a script capability.
    #[error("script function '{0}' could not be resolved")]
    UnresolvedScriptFunction(String),

    /// A bound script function failed or returned nothing when a value was expected.
    #[error("script function '{function}' failed: {message}")]
    ScriptCall {
        /// The name of the bound script function.
        function: String,
        /// What the script host reported.
        message: String,
    },

    /// The engine subsystem behind a capability refused the value.
    #[error("subsystem rejected the value: {0}")]
    Subsystem(String),
}
