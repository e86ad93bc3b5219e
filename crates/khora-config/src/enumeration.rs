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

//! On-demand choice lists attached to parameters.

use khora_settings::{EnumSource, EnumVector};
use std::fmt;

/// Builds the current legal choices of one parameter.
///
/// The source is invoked on every [`create`](Self::create); results are never
/// cached, so they always reflect live runtime state.
pub struct EnumConstructor {
    source: Box<dyn EnumSource>,
    is_localized: bool,
}

impl EnumConstructor {
    /// A constructor whose captions are literal display text.
    pub fn new(source: impl EnumSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            is_localized: false,
        }
    }

    /// A constructor whose captions are translation keys.
    pub fn localized(source: impl EnumSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            is_localized: true,
        }
    }

    /// Whether captions are translation keys.
    pub fn is_localized(&self) -> bool {
        self.is_localized
    }

    /// Produces a fresh list of choices.
    pub fn create(&self) -> EnumVector {
        self.source.create()
    }
}

impl fmt::Debug for EnumConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumConstructor")
            .field("is_localized", &self.is_localized)
            .finish_non_exhaustive()
    }
}
