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

//! Splitting persisted settings around engine initialization.
//!
//! Engine parameters (display resolution, window mode, ...) must be applied
//! before the engine initializes; everything else is applied once it is up.
//! [`StartupSettings`] routes each pair of a loaded changeset into the right
//! half without touching the parameters themselves. Both halves still go
//! through [`Config::apply`].

use khora_settings::Changeset;

use crate::registry::{ApplyReport, Config};

/// A changeset split into its engine and runtime halves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupSettings {
    /// Values of engine parameters, applied before engine init.
    pub engine: Changeset,
    /// Every other value, applied after engine init.
    pub runtime: Changeset,
}

impl StartupSettings {
    /// Routes every entry of `changeset` by its parameter's engine flag.
    ///
    /// Unknown names go to the runtime half, where applying them reports them.
    pub fn split(config: &Config, changeset: Changeset) -> Self {
        let mut settings = Self::default();
        for (name, value) in changeset {
            if config.is_engine_parameter(&name) == Some(true) {
                settings.engine.insert(name, value);
            } else {
                settings.runtime.insert(name, value);
            }
        }
        log::debug!(
            "Config: startup split into {} engine and {} runtime value(s)",
            settings.engine.len(),
            settings.runtime.len()
        );
        settings
    }

    /// Applies the engine half. Call before the engine initializes.
    pub fn apply_engine(&mut self, config: &mut Config) -> ApplyReport {
        let engine = std::mem::take(&mut self.engine);
        config.apply(&engine)
    }

    /// Applies the runtime half. Call once the engine is running.
    pub fn apply_runtime(&mut self, config: &mut Config) -> ApplyReport {
        let runtime = std::mem::take(&mut self.runtime);
        config.apply(&runtime)
    }

    /// Returns `true` when both halves have been applied or were empty.
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty() && self.runtime.is_empty()
    }
}
