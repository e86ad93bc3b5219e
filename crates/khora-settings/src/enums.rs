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

//! Legal choices for enumerated parameters.

use crate::value::ParamValue;

/// A single legal choice: what the UI shows and what gets written.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// The caption shown to the user, or a translation key when the owning
    /// enum is localized.
    pub label: String,
    /// The value written to the parameter when this choice is picked.
    pub value: ParamValue,
}

impl EnumVariant {
    /// Creates a new variant.
    pub fn new(label: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The ordered set of legal choices at a point in time.
pub type EnumVector = Vec<EnumVariant>;

/// Produces a fresh [`EnumVector`] on demand.
///
/// Implementations query live state (connected monitors, installed
/// languages), so the result may differ between calls.
pub trait EnumSource {
    /// Builds the current list of choices.
    fn create(&self) -> EnumVector;
}

impl<F> EnumSource for F
where
    F: Fn() -> EnumVector,
{
    fn create(&self) -> EnumVector {
        self()
    }
}
