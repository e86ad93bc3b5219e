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

//! A single typed, named setting and how it is written.

use khora_settings::{ConfigError, ConfigResult, ParamType, ParamValue, Reader, Writer};
use std::fmt;

/// Where a parameter's writes go.
///
/// The route is fixed when the parameter is built; the registry dispatches on
/// it and the parameter itself never needs to know which one it has.
pub enum WriteRoute {
    /// Apply the value straight away through the writer.
    Direct(Box<dyn Writer>),
    /// Stage the value into the aggregator registered under this category.
    Complex(String),
}

impl fmt::Debug for WriteRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteRoute::Direct(_) => f.write_str("Direct"),
            WriteRoute::Complex(category) => f.debug_tuple("Complex").field(category).finish(),
        }
    }
}

/// A typed, capability-based accessor to one setting of an engine subsystem.
///
/// # Example
///
/// ```rust
/// use khora_config::{Parameter, ParamType, ParamValue};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let gain = Rc::new(Cell::new(1.0));
/// let (read_gain, write_gain) = (gain.clone(), gain.clone());
///
/// let parameter = Parameter::direct(
///     ParamType::Float,
///     move || Ok(ParamValue::Float(read_gain.get())),
///     move |value: &ParamValue| {
///         write_gain.set(value.as_float().unwrap_or(1.0));
///         Ok(())
///     },
/// );
/// assert_eq!(parameter.read().unwrap(), ParamValue::Float(1.0));
/// ```
pub struct Parameter {
    value_type: ParamType,
    reader: Box<dyn Reader>,
    route: WriteRoute,
    is_engine: bool,
    is_localized: bool,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("value_type", &self.value_type)
            .field("route", &self.route)
            .field("is_engine", &self.is_engine)
            .field("is_localized", &self.is_localized)
            .finish_non_exhaustive()
    }
}

impl Parameter {
    /// Builds a parameter whose writes are applied immediately by `writer`.
    pub fn direct(
        value_type: ParamType,
        reader: impl Reader + 'static,
        writer: impl Writer + 'static,
    ) -> Self {
        Self {
            value_type,
            reader: Box::new(reader),
            route: WriteRoute::Direct(Box::new(writer)),
            is_engine: false,
            is_localized: false,
        }
    }

    /// Builds a parameter whose writes are staged into the aggregator
    /// registered under `category` and committed during the flush phase.
    pub fn complex(
        value_type: ParamType,
        reader: impl Reader + 'static,
        category: impl Into<String>,
    ) -> Self {
        Self {
            value_type,
            reader: Box::new(reader),
            route: WriteRoute::Complex(category.into()),
            is_engine: false,
            is_localized: false,
        }
    }

    /// Marks the parameter as an engine parameter, whose value must be known
    /// before the engine initializes.
    pub fn with_engine(mut self, is_engine: bool) -> Self {
        self.is_engine = is_engine;
        self
    }

    /// Marks the parameter's captions as translation keys.
    pub fn with_localized(mut self, is_localized: bool) -> Self {
        self.is_localized = is_localized;
        self
    }

    /// The declared value type.
    pub fn value_type(&self) -> ParamType {
        self.value_type
    }

    /// Whether this is an engine parameter.
    pub fn is_engine(&self) -> bool {
        self.is_engine
    }

    /// Whether the parameter's captions are translation keys.
    pub fn is_localized(&self) -> bool {
        self.is_localized
    }

    /// The write route chosen at construction.
    pub fn route(&self) -> &WriteRoute {
        &self.route
    }

    /// The aggregator category, for complex-routed parameters.
    pub fn category(&self) -> Option<&str> {
        match &self.route {
            WriteRoute::Complex(category) => Some(category),
            WriteRoute::Direct(_) => None,
        }
    }

    /// Reads the current value from the owning subsystem.
    pub fn read(&self) -> ConfigResult<ParamValue> {
        self.reader.read()
    }

    /// Checks `value` against the declared type.
    ///
    /// An integer is accepted for a float parameter and widened by the caller.
    pub(crate) fn check_type(&self, name: &str, value: &ParamValue) -> ConfigResult<()> {
        let found = value.param_type();
        let widening = self.value_type == ParamType::Float && found == ParamType::Int;
        if found == self.value_type || widening {
            Ok(())
        } else {
            Err(ConfigError::TypeMismatch {
                name: name.to_string(),
                expected: self.value_type,
                found,
            })
        }
    }

    /// Returns `value` converted to the declared type, after [`check_type`](Self::check_type).
    pub(crate) fn coerce(&self, value: &ParamValue) -> ParamValue {
        match (self.value_type, value) {
            (ParamType::Float, ParamValue::Int(v)) => ParamValue::Float(*v as f64),
            _ => value.clone(),
        }
    }
}

/// A read-only summary of a registered parameter, for settings UIs and scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// The parameter's name.
    pub name: String,
    /// The declared value type.
    pub value_type: ParamType,
    /// The display name of the owning settings tab.
    pub tab: String,
    /// Whether this is an engine parameter.
    pub is_engine: bool,
    /// Whether captions are translation keys.
    pub is_localized: bool,
    /// Whether an enum constructor is registered for it.
    pub is_enum: bool,
    /// The aggregator category, for complex-routed parameters.
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: ParamValue) -> impl Reader {
        move || Ok(value.clone())
    }

    #[test]
    fn test_direct_parameter_defaults() {
        let parameter = Parameter::direct(
            ParamType::Bool,
            constant(ParamValue::Bool(true)),
            |_: &ParamValue| Ok(()),
        );
        assert_eq!(parameter.value_type(), ParamType::Bool);
        assert!(!parameter.is_engine());
        assert!(!parameter.is_localized());
        assert!(parameter.category().is_none());
        assert_eq!(parameter.read().unwrap(), ParamValue::Bool(true));
    }

    #[test]
    fn test_complex_parameter_keeps_category() {
        let parameter = Parameter::complex(
            ParamType::String,
            constant(ParamValue::from("1280x720:60")),
            "VideoMode",
        )
        .with_engine(true);
        assert_eq!(parameter.category(), Some("VideoMode"));
        assert!(parameter.is_engine());
        assert!(matches!(parameter.route(), WriteRoute::Complex(c) if c == "VideoMode"));
    }

    #[test]
    fn test_type_check() {
        let parameter = Parameter::direct(
            ParamType::Float,
            constant(ParamValue::Float(0.0)),
            |_: &ParamValue| Ok(()),
        );
        assert!(parameter.check_type("Gain", &ParamValue::Float(0.5)).is_ok());
        assert!(parameter.check_type("Gain", &ParamValue::Int(1)).is_ok());
        assert_eq!(parameter.coerce(&ParamValue::Int(1)), ParamValue::Float(1.0));

        let err = parameter
            .check_type("Gain", &ParamValue::from("loud"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                name: "Gain".to_string(),
                expected: ParamType::Float,
                found: ParamType::String,
            }
        );
    }
}
