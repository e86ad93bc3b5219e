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

//! Dynamically-typed setting values.
//!
//! Every parameter declares a [`ParamType`] when it is registered. Values travel
//! through the registry as [`ParamValue`]s and are checked against that declared
//! type before they ever reach a writer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A batch of pending parameter updates, keyed by parameter name.
///
/// Iteration follows insertion order, which is also the dispatch order used
/// by the registry's direct phase.
pub type Changeset = IndexMap<String, ParamValue>;

/// The named values handed to an aggregate commit.
pub type ValueMap = BTreeMap<String, ParamValue>;

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// `true` / `false`.
    Bool,
    /// A signed 64-bit integer.
    Int,
    /// A 64-bit float.
    Float,
    /// A UTF-8 string.
    String,
}

impl ParamType {
    /// The tag used in persisted documents (`"bool"`, `"int"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::String => "string",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ParamType::Bool),
            "int" | "integer" => Ok(ParamType::Int),
            "float" | "double" => Ok(ParamType::Float),
            "string" | "str" => Ok(ParamType::String),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown value type '{other}'"
            ))),
        }
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
}

impl ParamValue {
    /// Returns the [`ParamType`] this value carries.
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::String(_) => ParamType::String,
        }
    }

    /// Returns the value as a `bool` if it is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a `Float` or an `Int`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Parses `text` as a value of type `ty`.
    ///
    /// Used for command-line overrides and script strings, where the caller
    /// only has text and the parameter's declared type.
    pub fn parse_as(ty: ParamType, text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        let invalid = || ConfigError::InvalidValue(format!("'{trimmed}' is not a valid {ty}"));
        match ty {
            ParamType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(ParamValue::Bool(false)),
                _ => Err(invalid()),
            },
            ParamType::Int => trimmed.parse().map(ParamValue::Int).map_err(|_| invalid()),
            ParamType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Float)
                .ok_or_else(invalid),
            ParamType::String => Ok(ParamValue::String(text.to_string())),
        }
    }

    /// Converts a JSON scalar into a value of type `ty`.
    ///
    /// Integers are accepted where a float is declared; every other mismatch
    /// is rejected.
    pub fn from_json(ty: ParamType, json: &serde_json::Value) -> Result<Self, ConfigError> {
        let value = match (ty, json) {
            (ParamType::Bool, serde_json::Value::Bool(b)) => Some(ParamValue::Bool(*b)),
            (ParamType::Int, serde_json::Value::Number(n)) => n.as_i64().map(ParamValue::Int),
            (ParamType::Float, serde_json::Value::Number(n)) => n.as_f64().map(ParamValue::Float),
            (ParamType::String, serde_json::Value::String(s)) => {
                Some(ParamValue::String(s.clone()))
            }
            _ => None,
        };
        value.ok_or_else(|| ConfigError::InvalidValue(format!("{json} is not a valid {ty}")))
    }

    /// Converts this value into a JSON scalar.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Bool(v) => serde_json::Value::Bool(*v),
            ParamValue::Int(v) => serde_json::Value::from(*v),
            ParamValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ParamValue::String(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(f64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_tags() {
        assert_eq!("bool".parse::<ParamType>().unwrap(), ParamType::Bool);
        assert_eq!("Integer".parse::<ParamType>().unwrap(), ParamType::Int);
        assert_eq!(" float ".parse::<ParamType>().unwrap(), ParamType::Float);
        assert_eq!("string".parse::<ParamType>().unwrap(), ParamType::String);
        assert!("vector3".parse::<ParamType>().is_err());
        assert_eq!(ParamType::Float.to_string(), "float");
    }

    #[test]
    fn test_parse_as_declared_type() {
        assert_eq!(
            ParamValue::parse_as(ParamType::Bool, "on").unwrap(),
            ParamValue::Bool(true)
        );
        assert_eq!(
            ParamValue::parse_as(ParamType::Int, " 42 ").unwrap(),
            ParamValue::Int(42)
        );
        assert_eq!(
            ParamValue::parse_as(ParamType::Float, "0.5").unwrap(),
            ParamValue::Float(0.5)
        );
        assert_eq!(
            ParamValue::parse_as(ParamType::String, "1920x1080:60").unwrap(),
            ParamValue::String("1920x1080:60".to_string())
        );

        assert!(ParamValue::parse_as(ParamType::Bool, "maybe").is_err());
        assert!(ParamValue::parse_as(ParamType::Int, "4.2").is_err());
        assert!(ParamValue::parse_as(ParamType::Float, "NaN").is_err());
    }

    #[test]
    fn test_json_conversion_is_type_strict() {
        let json = serde_json::json!(true);
        assert_eq!(
            ParamValue::from_json(ParamType::Bool, &json).unwrap(),
            ParamValue::Bool(true)
        );
        assert!(ParamValue::from_json(ParamType::String, &json).is_err());

        // Integers widen to floats, never the other way around.
        let json = serde_json::json!(3);
        assert_eq!(
            ParamValue::from_json(ParamType::Float, &json).unwrap(),
            ParamValue::Float(3.0)
        );
        let json = serde_json::json!(3.5);
        assert!(ParamValue::from_json(ParamType::Int, &json).is_err());
    }

    #[test]
    fn test_accessors() {
        let value = ParamValue::from(7);
        assert_eq!(value.param_type(), ParamType::Int);
        assert_eq!(value.as_int(), Some(7));
        assert_eq!(value.as_float(), Some(7.0));
        assert_eq!(value.as_bool(), None);
        assert_eq!(ParamValue::from("fr").as_str(), Some("fr"));
    }
}
