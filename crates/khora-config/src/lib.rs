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

//! # Khora Config
//!
//! The configuration parameter registry used by the shell and its settings UI.
//!
//! A [`Config`] owns every registered [`Parameter`], the optional
//! [`EnumConstructor`] attached to a parameter, and the [`ComplexParameter`]
//! aggregators that coalesce related writes into one expensive call. Changes
//! arrive as a [`Changeset`](khora_settings::Changeset) and are applied in two
//! phases: every value is dispatched first, then each dirty aggregator commits
//! exactly once.

#![warn(missing_docs)]

pub mod builtins;
pub mod complex;
pub mod enumeration;
pub mod parameter;
pub mod persistence;
pub mod registry;
pub mod script;
pub mod startup;

pub use complex::ComplexParameter;
pub use enumeration::EnumConstructor;
pub use parameter::{Parameter, ParameterInfo, WriteRoute};
pub use persistence::{DecodedSettings, PersistError, PersistFormat};
pub use registry::{ApplyReport, Config, SkippedEntry};
pub use script::{ScriptFunctionTable, ScriptReader, ScriptWriter};
pub use startup::StartupSettings;

pub use khora_settings::{
    Changeset, ConfigError, ConfigResult, EnumVariant, EnumVector, NameHash, ParamType,
    ParamValue, Resolution, ValueMap,
};
