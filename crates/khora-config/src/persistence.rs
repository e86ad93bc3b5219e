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

//! Bulk load and save of registered settings.
//!
//! Two forms are supported:
//!
//! - **JSON**: `{ "parameters": [ { "name", "type", "value" } ] }`. Every record
//!   is decoded on its own, so a malformed record is reported and skipped while
//!   the rest of the document still loads.
//! - **Binary**: the [`SETTINGS_MAGIC_BYTES`] header and a format version byte,
//!   followed by a count-prefixed sequence of `(name-hash, value-bytes)` records
//!   encoded with `bincode`. Records are looked up by hash on read, so their
//!   order does not matter; they are written in registry order.
//!
//! Loading parses the document into a changeset and hands it to
//! [`Config::apply`], so aggregators flush once at the end of the load.

use khora_settings::{Changeset, ConfigError, NameHash, ParamType, ParamValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::registry::{ApplyReport, Config, SkippedEntry};

/// A unique byte sequence identifying binary Khora settings files ("KHORACFG").
pub const SETTINGS_MAGIC_BYTES: [u8; 8] = *b"KHORACFG";
/// The current version of the binary settings layout.
pub const SETTINGS_FORMAT_VERSION: u8 = 1;
const HEADER_SIZE: usize = SETTINGS_MAGIC_BYTES.len() + 1;

/// An error that prevents a whole settings document from being read or written.
///
/// Problems with individual entries are never reported here; they end up in
/// the [`ApplyReport`] instead.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Reading or writing the settings file failed.
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON.
    #[error("settings document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Encoding the binary form failed.
    #[error("failed to encode binary settings: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// The binary form could not be decoded.
    #[error("failed to decode binary settings: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// The document decoded but does not have the expected layout.
    #[error("invalid settings document: {0}")]
    InvalidDocument(String),
}

/// The on-disk form of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistFormat {
    /// The JSON document.
    Json,
    /// The compact binary form.
    Binary,
}

impl PersistFormat {
    /// Picks a format from a file extension (`.json`, `.bin`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(PersistFormat::Json),
            "bin" | "cfg" => Some(PersistFormat::Binary),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    value_type: ParamType,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    parameters: Vec<JsonRecord<'a>>,
}

#[derive(Serialize, Deserialize)]
struct BinaryRecord {
    id: u64,
    value: Vec<u8>,
}

/// The changeset decoded from a document, plus the entries that were unusable.
#[derive(Debug, Default)]
pub struct DecodedSettings {
    /// Well-formed entries, in document order.
    pub changeset: Changeset,
    /// Entries that were reported and skipped while decoding.
    pub skipped: Vec<SkippedEntry>,
}

impl DecodedSettings {
    fn skip(&mut self, entry: impl Into<String>, reason: ConfigError) {
        let entry = entry.into();
        log::warn!("Config: skipping persisted entry '{}': {}", entry, reason);
        self.skipped.push(SkippedEntry { entry, reason });
    }
}

impl Config {
    // --- JSON ---

    /// Serializes every registered parameter's current value as JSON.
    pub fn save_json(&self) -> Result<String, PersistError> {
        let snapshot = self.snapshot();
        let parameters = snapshot
            .iter()
            .map(|(name, value)| JsonRecord {
                name,
                value_type: value.param_type(),
                value: value.to_json(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&JsonDocument { parameters })?)
    }

    /// Decodes a JSON document into a changeset without applying it.
    pub fn decode_json(&self, text: &str) -> Result<DecodedSettings, PersistError> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        let records = document
            .get("parameters")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| {
                PersistError::InvalidDocument("expected a \"parameters\" array".to_string())
            })?;

        let mut decoded = DecodedSettings::default();
        for (index, record) in records.iter().enumerate() {
            let position = format!("#{index}");
            let Some(record) = record.as_object() else {
                decoded.skip(
                    position,
                    ConfigError::MalformedEntry("record is not an object".to_string()),
                );
                continue;
            };
            let name = match record.get("name").and_then(serde_json::Value::as_str) {
                Some(name) if !name.is_empty() => name,
                _ => {
                    decoded.skip(
                        position,
                        ConfigError::MalformedEntry("record has no name".to_string()),
                    );
                    continue;
                }
            };
            let Some(declared) = self.parameter_info(name).map(|info| info.value_type) else {
                decoded.skip(name, ConfigError::UnknownParameter(name.to_string()));
                continue;
            };
            let value = match record.get("value") {
                Some(value) if !value.is_null() => value,
                _ => {
                    decoded.skip(
                        name,
                        ConfigError::MalformedEntry(format!("'{name}' has no value")),
                    );
                    continue;
                }
            };
            if let Some(tag) = record.get("type") {
                let stored = tag
                    .as_str()
                    .ok_or_else(|| ConfigError::MalformedEntry(format!("bad type tag {tag}")))
                    .and_then(str::parse::<ParamType>);
                match stored {
                    Ok(stored)
                        if stored == declared
                            || (stored == ParamType::Int && declared == ParamType::Float) => {}
                    Ok(stored) => {
                        decoded.skip(
                            name,
                            ConfigError::TypeMismatch {
                                name: name.to_string(),
                                expected: declared,
                                found: stored,
                            },
                        );
                        continue;
                    }
                    Err(e) => {
                        decoded.skip(name, e);
                        continue;
                    }
                }
            }
            match ParamValue::from_json(declared, value) {
                Ok(value) => {
                    decoded.changeset.insert(name.to_string(), value);
                }
                Err(e) => decoded.skip(name, ConfigError::MalformedEntry(e.to_string())),
            }
        }
        Ok(decoded)
    }

    /// Loads a JSON document and applies it.
    pub fn load_json(&mut self, text: &str) -> Result<ApplyReport, PersistError> {
        let decoded = self.decode_json(text)?;
        Ok(self.apply_decoded(decoded))
    }

    // --- Binary ---

    /// Serializes every registered parameter's current value in binary form.
    pub fn save_binary(&self) -> Result<Vec<u8>, PersistError> {
        let config = bincode::config::standard();
        let mut records = Vec::with_capacity(self.len());
        for (name, value) in &self.snapshot() {
            records.push(BinaryRecord {
                id: NameHash::of(name).value(),
                value: bincode::serde::encode_to_vec(value, config)?,
            });
        }

        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(&SETTINGS_MAGIC_BYTES);
        bytes.push(SETTINGS_FORMAT_VERSION);
        bytes.extend(bincode::serde::encode_to_vec(&records, config)?);
        Ok(bytes)
    }

    /// Decodes the binary form into a changeset without applying it.
    pub fn decode_binary(&self, bytes: &[u8]) -> Result<DecodedSettings, PersistError> {
        if bytes.len() < HEADER_SIZE || bytes[..SETTINGS_MAGIC_BYTES.len()] != SETTINGS_MAGIC_BYTES
        {
            return Err(PersistError::InvalidDocument(
                "not a Khora settings file".to_string(),
            ));
        }
        let version = bytes[SETTINGS_MAGIC_BYTES.len()];
        if version != SETTINGS_FORMAT_VERSION {
            return Err(PersistError::InvalidDocument(format!(
                "unsupported settings format version {version}"
            )));
        }

        let config = bincode::config::standard();
        let (records, _): (Vec<BinaryRecord>, _) =
            bincode::serde::decode_from_slice(&bytes[HEADER_SIZE..], config)?;

        let mut decoded = DecodedSettings::default();
        for record in records {
            let id = NameHash(record.id);
            let Some(name) = self.parameter_name(id).map(str::to_string) else {
                decoded.skip(id.to_string(), ConfigError::UnknownParameter(id.to_string()));
                continue;
            };
            match bincode::serde::decode_from_slice::<ParamValue, _>(&record.value, config) {
                Ok((value, _)) => {
                    decoded.changeset.insert(name, value);
                }
                Err(e) => decoded.skip(name, ConfigError::MalformedEntry(e.to_string())),
            }
        }
        Ok(decoded)
    }

    /// Loads the binary form and applies it.
    pub fn load_binary(&mut self, bytes: &[u8]) -> Result<ApplyReport, PersistError> {
        let decoded = self.decode_binary(bytes)?;
        Ok(self.apply_decoded(decoded))
    }

    // --- Files ---

    /// Decodes a document in either form.
    pub fn decode(&self, bytes: &[u8], format: PersistFormat) -> Result<DecodedSettings, PersistError> {
        match format {
            PersistFormat::Json => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    PersistError::InvalidDocument(format!("document is not UTF-8: {e}"))
                })?;
                self.decode_json(text)
            }
            PersistFormat::Binary => self.decode_binary(bytes),
        }
    }

    /// Writes every registered parameter's current value to `path`.
    pub fn save_to_file(&self, path: &Path, format: PersistFormat) -> Result<(), PersistError> {
        let bytes = match format {
            PersistFormat::Json => self.save_json()?.into_bytes(),
            PersistFormat::Binary => self.save_binary()?,
        };
        std::fs::write(path, bytes)?;
        log::info!("Config: saved {} parameter(s) to {}", self.len(), path.display());
        Ok(())
    }

    /// Loads and applies the settings stored at `path`.
    pub fn load_from_file(
        &mut self,
        path: &Path,
        format: PersistFormat,
    ) -> Result<ApplyReport, PersistError> {
        let bytes = std::fs::read(path)?;
        let decoded = self.decode(&bytes, format)?;
        let report = self.apply_decoded(decoded);
        log::info!(
            "Config: loaded {} parameter(s) from {} ({} skipped)",
            report.written.len(),
            path.display(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn apply_decoded(&mut self, decoded: DecodedSettings) -> ApplyReport {
        let mut report = self.apply(&decoded.changeset);
        let mut skipped = decoded.skipped;
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config_with_string(name: &str, initial: &str) -> (Config, Rc<RefCell<String>>) {
        let cell = Rc::new(RefCell::new(initial.to_string()));
        let (read, write) = (cell.clone(), cell.clone());
        let mut config = Config::new();
        config.register_settings_tab("General").unwrap();
        config
            .register_parameter(
                name,
                "General",
                Parameter::direct(
                    ParamType::String,
                    move || Ok(ParamValue::String(read.borrow().clone())),
                    move |value: &ParamValue| {
                        *write.borrow_mut() = value.to_string();
                        Ok(())
                    },
                ),
            )
            .unwrap();
        (config, cell)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            PersistFormat::from_path(Path::new("settings.json")),
            Some(PersistFormat::Json)
        );
        assert_eq!(
            PersistFormat::from_path(Path::new("settings.BIN")),
            Some(PersistFormat::Binary)
        );
        assert_eq!(PersistFormat::from_path(Path::new("settings.xml")), None);
        assert_eq!(PersistFormat::from_path(Path::new("settings")), None);
    }

    #[test]
    fn test_json_layout() {
        let (config, _cell) = config_with_string("Language", "en");
        let json = config.save_json().unwrap();
        let document: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            document,
            serde_json::json!({
                "parameters": [
                    { "name": "Language", "type": "string", "value": "en" }
                ]
            })
        );
    }

    #[test]
    fn test_json_rejects_unusable_container() {
        let (mut config, _cell) = config_with_string("Language", "en");
        assert!(matches!(
            config.load_json("not json"),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(
            config.load_json(r#"{ "settings": [] }"#),
            Err(PersistError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_json_type_tag_is_checked() {
        let (mut config, cell) = config_with_string("Language", "en");
        let report = config
            .load_json(r#"{ "parameters": [ { "name": "Language", "type": "int", "value": 3 } ] }"#)
            .unwrap();
        assert!(report.written.is_empty());
        assert!(matches!(
            report.skipped[0].reason,
            ConfigError::TypeMismatch { .. }
        ));
        assert_eq!(*cell.borrow(), "en");
    }

    #[test]
    fn test_json_int_tag_widens_to_float() {
        let cell = Rc::new(RefCell::new(0.5));
        let (read, write) = (cell.clone(), cell.clone());
        let mut config = Config::new();
        config.register_settings_tab("General").unwrap();
        config
            .register_parameter(
                "Brightness",
                "General",
                Parameter::direct(
                    ParamType::Float,
                    move || Ok(ParamValue::Float(*read.borrow())),
                    move |value: &ParamValue| {
                        *write.borrow_mut() = value.as_float().unwrap_or_default();
                        Ok(())
                    },
                ),
            )
            .unwrap();

        let report = config
            .load_json(r#"{ "parameters": [ { "name": "Brightness", "type": "int", "value": 1 } ] }"#)
            .unwrap();
        assert!(report.is_clean(), "Unexpected skips: {:?}", report.skipped);
        assert_eq!(*cell.borrow(), 1.0);
    }

    #[test]
    fn test_json_type_tag_is_optional() {
        let (mut config, cell) = config_with_string("Language", "en");
        let report = config
            .load_json(r#"{ "parameters": [ { "name": "Language", "value": "de" } ] }"#)
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(*cell.borrow(), "de");
    }

    #[test]
    fn test_binary_header_is_checked() {
        let (mut config, _cell) = config_with_string("Language", "en");
        assert!(matches!(
            config.load_binary(b"KHORA"),
            Err(PersistError::InvalidDocument(_))
        ));

        let mut bytes = config.save_binary().unwrap();
        assert_eq!(&bytes[..8], &SETTINGS_MAGIC_BYTES);
        bytes[8] = SETTINGS_FORMAT_VERSION + 1;
        assert!(matches!(
            config.load_binary(&bytes),
            Err(PersistError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_binary_skips_unknown_hash_and_bad_value() {
        let (mut config, cell) = config_with_string("Language", "en");
        let standard = bincode::config::standard();
        let records = vec![
            BinaryRecord {
                id: NameHash::of("Removed").value(),
                value: bincode::serde::encode_to_vec(ParamValue::Bool(true), standard).unwrap(),
            },
            BinaryRecord {
                id: NameHash::of("Language").value(),
                value: vec![0xff, 0xff, 0xff],
            },
        ];
        let mut bytes = SETTINGS_MAGIC_BYTES.to_vec();
        bytes.push(SETTINGS_FORMAT_VERSION);
        bytes.extend(bincode::serde::encode_to_vec(&records, standard).unwrap());

        let report = config.load_binary(&bytes).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(
            report.skipped[0].reason,
            ConfigError::UnknownParameter(_)
        ));
        assert!(matches!(
            report.skipped[1].reason,
            ConfigError::MalformedEntry(_)
        ));
        assert_eq!(*cell.borrow(), "en");
    }
}
