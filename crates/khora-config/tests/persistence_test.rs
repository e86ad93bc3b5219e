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


use khora_config::{
    Config, ConfigError, ConfigResult, ParamType, ParamValue, Parameter, PersistError,
    PersistFormat, ValueMap,
};
use std::cell::RefCell;
use std::rc::Rc;

type Store = Rc<RefCell<ValueMap>>;

const PARAMETERS: [(&str, ParamType); 5] = [
    ("Resolution", ParamType::String),
    ("Brightness", ParamType::Float),
    ("FrameLimit", ParamType::Int),
    ("Subtitles", ParamType::Bool),
    ("Language", ParamType::String),
];

fn defaults() -> ValueMap {
    [
        ("Resolution", ParamValue::from("1280x720:60")),
        ("Brightness", ParamValue::Float(0.5)),
        ("FrameLimit", ParamValue::Int(60)),
        ("Subtitles", ParamValue::Bool(false)),
        ("Language", ParamValue::from("en")),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

/// A registry of direct parameters stored in `store`.
fn store_config(store: &Store) -> Config {
    let mut config = Config::new();
    config.register_settings_tab("General").unwrap();
    for (name, ty) in PARAMETERS {
        let (source, target) = (store.clone(), store.clone());
        config
            .register_parameter(
                name,
                "General",
                Parameter::direct(
                    ty,
                    move || Ok(source.borrow()[name].clone()),
                    move |value: &ParamValue| -> ConfigResult<()> {
                        target.borrow_mut().insert(name.to_string(), value.clone());
                        Ok(())
                    },
                ),
            )
            .unwrap();
    }
    config
}

fn customized() -> (Config, Store) {
    let store: Store = Rc::new(RefCell::new(defaults()));
    store.borrow_mut().extend([
        ("Resolution".to_string(), ParamValue::from("1920x1080:144")),
        ("Brightness".to_string(), ParamValue::Float(0.75)),
        ("FrameLimit".to_string(), ParamValue::Int(240)),
        ("Subtitles".to_string(), ParamValue::Bool(true)),
        ("Language".to_string(), ParamValue::from("fr")),
    ]);
    (store_config(&store), store)
}

#[test]
fn test_json_file_round_trip() {
    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let (saved, saved_store) = customized();

    let loaded_store: Store = Rc::new(RefCell::new(defaults()));
    let mut loaded = store_config(&loaded_store);

    // --- 2. ACT ---
    saved.save_to_file(&path, PersistFormat::Json).unwrap();
    let report = loaded.load_from_file(&path, PersistFormat::Json).unwrap();

    // --- 3. ASSERT ---
    assert!(report.is_clean(), "Unexpected skips: {:?}", report.skipped);
    assert_eq!(report.written.len(), PARAMETERS.len());
    assert_eq!(*loaded_store.borrow(), *saved_store.borrow());
}

#[test]
fn test_binary_file_round_trip_keeps_resolution_text() {
    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.bin");
    let (saved, _) = customized();

    let loaded_store: Store = Rc::new(RefCell::new(defaults()));
    let mut loaded = store_config(&loaded_store);

    // --- 2. ACT ---
    let format = PersistFormat::from_path(&path).unwrap();
    saved.save_to_file(&path, format).unwrap();
    let report = loaded.load_from_file(&path, format).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(format, PersistFormat::Binary);
    assert!(report.is_clean());
    assert_eq!(
        loaded.read_value("Resolution").unwrap().as_str(),
        Some("1920x1080:144"),
        "The encoded resolution must survive unchanged"
    );
    assert_eq!(loaded.read_value("Brightness").unwrap(), ParamValue::Float(0.75));
}

#[test]
fn test_partial_json_load_applies_the_good_entries() {
    // --- 1. ARRANGE ---
    let store: Store = Rc::new(RefCell::new(defaults()));
    let mut config = store_config(&store);
    let document = r#"{
        "parameters": [
            { "name": "Resolution", "type": "string", "value": "2560x1440:60" },
            { "name": "Brightness", "type": "float", "value": 1 },
            { "name": "FrameLimit", "type": "int", "value": "unlimited" },
            { "name": "Subtitles", "value": true },
            { "name": "Language", "type": "string", "value": "de" }
        ]
    }"#;

    // --- 2. ACT ---
    let report = config.load_json(document).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(report.written.len(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].entry, "FrameLimit");

    let store = store.borrow();
    assert_eq!(store["FrameLimit"], ParamValue::Int(60), "The bad entry is left alone");
    assert_eq!(store["Resolution"], ParamValue::from("2560x1440:60"));
    assert_eq!(store["Brightness"], ParamValue::Float(1.0));
    assert_eq!(store["Subtitles"], ParamValue::Bool(true));
    assert_eq!(store["Language"], ParamValue::from("de"));
}

#[test]
fn test_removed_parameter_is_neither_saved_nor_loaded() {
    // --- 1. ARRANGE ---
    let (mut config, store) = customized();
    let before = config.save_json().unwrap();

    // --- 2. ACT ---
    config.remove_parameter("Subtitles").unwrap();
    let after = config.save_json().unwrap();
    store.borrow_mut().insert("Subtitles".to_string(), ParamValue::Bool(false));
    let report = config.load_json(&before).unwrap();

    // --- 3. ASSERT ---
    assert!(before.contains("Subtitles"));
    assert!(!after.contains("Subtitles"));
    assert_eq!(report.written.len(), PARAMETERS.len() - 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].reason,
        ConfigError::UnknownParameter("Subtitles".to_string())
    );
    assert_eq!(store.borrow()["Subtitles"], ParamValue::Bool(false));
}

#[test]
fn test_binary_rejects_foreign_and_future_files() {
    let (config, _) = customized();

    let foreign = config.decode_binary(b"NOTKHORA\x01\x00");
    assert!(matches!(foreign, Err(PersistError::InvalidDocument(_))));

    let mut future = config.save_binary().unwrap();
    future[8] = 99;
    assert!(matches!(
        config.decode_binary(&future),
        Err(PersistError::InvalidDocument(_))
    ));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut config, _) = customized();
    let result = config.load_from_file(&dir.path().join("absent.json"), PersistFormat::Json);
    assert!(matches!(result, Err(PersistError::Io(_))));
}
