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

//! # Khora Settings
//!
//! Foundational types for the configuration registry: typed setting values,
//! the capability traits a parameter is built from, and the error taxonomy
//! shared by every layer that reads or writes settings.

#![warn(missing_docs)]

pub mod capability;
pub mod enums;
pub mod error;
pub mod hash;
pub mod resolution;
pub mod value;

pub use capability::{ComplexCommit, Reader, ScriptFunction, ScriptResolver, Writer};
pub use enums::{EnumSource, EnumVariant, EnumVector};
pub use error::{ConfigError, ConfigResult};
pub use hash::NameHash;
pub use resolution::{Resolution, ResolutionParseError};
pub use value::{Changeset, ParamType, ParamValue, ValueMap};
