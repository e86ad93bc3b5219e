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

//! Aggregators that coalesce related writes into one commit.

use khora_settings::{ComplexCommit, ConfigResult, ParamValue, ValueMap};
use std::fmt;

/// A staging bucket that turns several field updates into one effectful call.
///
/// Parameters routed to an aggregator only [`set`](Self::set) their values.
/// Nothing reaches the subsystem until [`apply`](Self::apply), which invokes
/// the commit at most once with everything staged since the previous flush.
///
/// # Example
///
/// ```rust
/// use khora_config::{ComplexParameter, ParamValue, ValueMap};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let commits = Rc::new(Cell::new(0));
/// let counter = commits.clone();
/// let mut video = ComplexParameter::new(move |_: &ValueMap| {
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// video.set("Resolution", ParamValue::from("1920x1080:60"));
/// video.set("Vsync", ParamValue::Bool(true));
/// assert!(video.apply().unwrap());
/// assert!(!video.apply().unwrap());
/// assert_eq!(commits.get(), 1);
/// ```
pub struct ComplexParameter {
    commit: Box<dyn ComplexCommit>,
    pending: ValueMap,
    dirty: bool,
}

impl ComplexParameter {
    /// Creates a clean aggregator around `commit`.
    pub fn new(commit: impl ComplexCommit + 'static) -> Self {
        Self {
            commit: Box::new(commit),
            pending: ValueMap::new(),
            dirty: false,
        }
    }

    /// Whether something was staged since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The values staged since the last flush.
    pub fn pending(&self) -> &ValueMap {
        &self.pending
    }

    /// Whether `name` was staged since the last flush.
    pub fn is_staged(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    /// Stages `value` under `name` and marks the aggregator dirty.
    ///
    /// Staging the same name twice keeps the latest value.
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.pending.insert(name.into(), value);
        self.dirty = true;
    }

    /// Adds a current value for a member that was not staged.
    ///
    /// Never overrides a staged value and never marks the aggregator dirty.
    pub(crate) fn fill(&mut self, name: &str, value: ParamValue) {
        if !self.pending.contains_key(name) {
            self.pending.insert(name.to_string(), value);
        }
    }

    /// Drops a staged value, e.g. when its parameter is unregistered.
    pub(crate) fn discard(&mut self, name: &str) {
        self.pending.remove(name);
        if self.pending.is_empty() {
            self.dirty = false;
        }
    }

    /// Flushes the aggregator.
    ///
    /// When dirty, invokes the commit once with the whole pending mapping, then
    /// clears both the mapping and the dirty flag, whether or not the commit
    /// succeeded. Returns `Ok(true)` when a commit happened.
    pub fn apply(&mut self) -> ConfigResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let values = std::mem::take(&mut self.pending);
        self.dirty = false;
        self.commit.commit(&values)?;
        Ok(true)
    }
}

impl fmt::Debug for ComplexParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexParameter")
            .field("pending", &self.pending)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
