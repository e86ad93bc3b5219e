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

//! Capability traits a parameter is assembled from.
//!
//! A parameter never talks to an engine subsystem directly. It holds a
//! [`Reader`] and either a [`Writer`] or a route into an aggregator. Closures
//! implement these traits, so most call sites pass a `move ||` over a
//! subsystem handle; test doubles implement them the same way.

use std::rc::Rc;

use crate::error::ConfigResult;
use crate::value::{ParamValue, ValueMap};

/// Reads the current value of a parameter from its owning subsystem.
pub trait Reader {
    /// Returns the current value.
    fn read(&self) -> ConfigResult<ParamValue>;
}

impl<F> Reader for F
where
    F: Fn() -> ConfigResult<ParamValue>,
{
    fn read(&self) -> ConfigResult<ParamValue> {
        self()
    }
}

/// Applies a new value to a parameter's owning subsystem.
pub trait Writer {
    /// Applies `value`. The registry has already checked its type.
    fn write(&self, value: &ParamValue) -> ConfigResult<()>;
}

impl<F> Writer for F
where
    F: Fn(&ParamValue) -> ConfigResult<()>,
{
    fn write(&self, value: &ParamValue) -> ConfigResult<()> {
        self(value)
    }
}

/// The single effectful call behind an aggregator.
///
/// Receives every value staged since the last flush, completed with the
/// current value of each member parameter that was not staged.
pub trait ComplexCommit {
    /// Applies the aggregated values in one go.
    fn commit(&self, values: &ValueMap) -> ConfigResult<()>;
}

impl<F> ComplexCommit for F
where
    F: Fn(&ValueMap) -> ConfigResult<()>,
{
    fn commit(&self, values: &ValueMap) -> ConfigResult<()> {
        self(values)
    }
}

/// A function exposed by a scripting host.
pub trait ScriptFunction {
    /// Calls the function. Getters return `Some(value)`; setters usually `None`.
    fn call(&self, args: &[ParamValue]) -> Result<Option<ParamValue>, String>;
}

impl<F> ScriptFunction for F
where
    F: Fn(&[ParamValue]) -> Result<Option<ParamValue>, String>,
{
    fn call(&self, args: &[ParamValue]) -> Result<Option<ParamValue>, String> {
        self(args)
    }
}

/// Looks up script functions by name.
pub trait ScriptResolver {
    /// Returns the function registered under `name`, if any.
    fn resolve(&self, name: &str) -> Option<Rc<dyn ScriptFunction>>;
}
