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

//! Parameters backed by functions of a scripting host.
//!
//! A script-bound capability resolves its function once, when it is built.
//! If the function does not exist the binding fails immediately; later reads
//! and writes call the bound function without another lookup.

use khora_settings::{
    ConfigError, ConfigResult, ParamType, ParamValue, Reader, ScriptFunction, ScriptResolver,
    Writer,
};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::parameter::Parameter;
use crate::registry::Config;

fn bind(resolver: &dyn ScriptResolver, function: &str) -> ConfigResult<Rc<dyn ScriptFunction>> {
    resolver.resolve(function).ok_or_else(|| {
        log::warn!("Config: script function '{}' is not defined", function);
        ConfigError::UnresolvedScriptFunction(function.to_string())
    })
}

/// A [`Reader`] that calls a script getter.
pub struct ScriptReader {
    name: String,
    function: Rc<dyn ScriptFunction>,
}

impl ScriptReader {
    /// Resolves `function` through `resolver`.
    pub fn bind(resolver: &dyn ScriptResolver, function: &str) -> ConfigResult<Self> {
        Ok(Self {
            name: function.to_string(),
            function: bind(resolver, function)?,
        })
    }

    /// The bound function's name.
    pub fn function_name(&self) -> &str {
        &self.name
    }
}

impl Reader for ScriptReader {
    fn read(&self) -> ConfigResult<ParamValue> {
        match self.function.call(&[]) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ConfigError::ScriptCall {
                function: self.name.clone(),
                message: "returned no value".to_string(),
            }),
            Err(message) => Err(ConfigError::ScriptCall {
                function: self.name.clone(),
                message,
            }),
        }
    }
}

impl fmt::Debug for ScriptReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptReader").field("name", &self.name).finish()
    }
}

/// A [`Writer`] that calls a script setter with the new value as its only argument.
pub struct ScriptWriter {
    name: String,
    function: Rc<dyn ScriptFunction>,
}

impl ScriptWriter {
    /// Resolves `function` through `resolver`.
    pub fn bind(resolver: &dyn ScriptResolver, function: &str) -> ConfigResult<Self> {
        Ok(Self {
            name: function.to_string(),
            function: bind(resolver, function)?,
        })
    }

    /// The bound function's name.
    pub fn function_name(&self) -> &str {
        &self.name
    }
}

impl Writer for ScriptWriter {
    fn write(&self, value: &ParamValue) -> ConfigResult<()> {
        self.function
            .call(std::slice::from_ref(value))
            .map(|_| ())
            .map_err(|message| ConfigError::ScriptCall {
                function: self.name.clone(),
                message,
            })
    }
}

impl fmt::Debug for ScriptWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptWriter").field("name", &self.name).finish()
    }
}

/// An in-memory table of script functions, keyed by name.
#[derive(Default)]
pub struct ScriptFunctionTable {
    functions: HashMap<String, Rc<dyn ScriptFunction>>,
}

impl ScriptFunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) `name`.
    pub fn define(&mut self, name: impl Into<String>, function: impl ScriptFunction + 'static) {
        self.functions.insert(name.into(), Rc::new(function));
    }

    /// Removes `name`. Capabilities already bound to it keep working.
    pub fn undefine(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    /// The number of defined functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no function is defined.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl ScriptResolver for ScriptFunctionTable {
    fn resolve(&self, name: &str) -> Option<Rc<dyn ScriptFunction>> {
        self.functions.get(name).cloned()
    }
}

impl fmt::Debug for ScriptFunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ScriptFunctionTable")
            .field("functions", &names)
            .finish()
    }
}

impl Config {
    /// Registers a direct parameter whose reader and writer are script functions.
    ///
    /// Both functions are resolved before anything is registered; if either is
    /// missing the registry is left unchanged.
    pub fn register_script_parameter(
        &mut self,
        name: &str,
        tab: &str,
        value_type: ParamType,
        resolver: &dyn ScriptResolver,
        read_function: &str,
        write_function: &str,
    ) -> ConfigResult<()> {
        let reader = ScriptReader::bind(resolver, read_function)?;
        let writer = ScriptWriter::bind(resolver, write_function)?;
        self.register_parameter(name, tab, Parameter::direct(value_type, reader, writer))
    }
}
