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
    Changeset, ComplexParameter, Config, ConfigError, ConfigResult, ParamType, ParamValue,
    Parameter, ValueMap,
};
use std::cell::RefCell;
use std::rc::Rc;

// --- TEST FIXTURE ---
// A "device" whose state is only changed through its aggregator commit.
struct Device {
    state: Rc<RefCell<ValueMap>>,
    commits: Rc<RefCell<Vec<ValueMap>>>,
}

impl Device {
    fn new(initial: &[(&str, ParamValue)]) -> Self {
        let state = initial
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        Self {
            state: Rc::new(RefCell::new(state)),
            commits: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn storage(&self) -> ComplexParameter {
        let state = self.state.clone();
        let commits = self.commits.clone();
        ComplexParameter::new(move |values: &ValueMap| -> ConfigResult<()> {
            state.borrow_mut().extend(values.clone());
            commits.borrow_mut().push(values.clone());
            Ok(())
        })
    }

    fn member(&self, name: &'static str, value_type: ParamType, category: &str) -> Parameter {
        let state = self.state.clone();
        Parameter::complex(value_type, move || Ok(state.borrow()[name].clone()), category)
    }

    fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }
}

fn video_config() -> (Config, Device) {
    let device = Device::new(&[
        ("Resolution", ParamValue::from("1280x720:60")),
        ("Vsync", ParamValue::Bool(false)),
        ("FullScreen", ParamValue::Bool(false)),
    ]);
    let mut config = Config::new();
    config.register_settings_tab("Video").unwrap();
    config
        .register_complex_storage("VideoMode", device.storage())
        .unwrap();
    for (name, ty) in [
        ("Resolution", ParamType::String),
        ("Vsync", ParamType::Bool),
        ("FullScreen", ParamType::Bool),
    ] {
        config
            .register_parameter(name, "Video", device.member(name, ty, "VideoMode"))
            .unwrap();
    }
    (config, device)
}

fn changeset(entries: &[(&str, ParamValue)]) -> Changeset {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[test]
fn test_related_changes_commit_once() {
    // --- 1. ARRANGE ---
    let (mut config, device) = video_config();
    let changes = changeset(&[
        ("Resolution", ParamValue::from("1920x1080:60")),
        ("Vsync", ParamValue::Bool(true)),
    ]);

    // --- 2. ACT ---
    let report = config.apply(&changes);

    // --- 3. ASSERT ---
    assert!(report.is_clean());
    assert_eq!(report.commits, 1);
    assert_eq!(device.commit_count(), 1, "The display must be reconfigured once");

    let commit = &device.commits.borrow()[0];
    assert_eq!(commit["Resolution"], ParamValue::from("1920x1080:60"));
    assert_eq!(commit["Vsync"], ParamValue::Bool(true));
    assert_eq!(
        commit["FullScreen"],
        ParamValue::Bool(false),
        "Members that were not changed are completed from their current value"
    );
}

#[test]
fn test_later_partial_change_reads_earlier_commit() {
    // --- 1. ARRANGE ---
    let (mut config, device) = video_config();
    config.apply(&changeset(&[
        ("Resolution", ParamValue::from("1920x1080:60")),
        ("Vsync", ParamValue::Bool(true)),
    ]));

    // --- 2. ACT ---
    let report = config.apply(&changeset(&[("Vsync", ParamValue::Bool(false))]));

    // --- 3. ASSERT ---
    assert_eq!(report.commits, 1);
    assert_eq!(device.commit_count(), 2);
    let commit = &device.commits.borrow()[1];
    assert_eq!(commit["Vsync"], ParamValue::Bool(false));
    assert_eq!(
        commit["Resolution"],
        ParamValue::from("1920x1080:60"),
        "The resolution committed earlier must be read back, not reset"
    );
    assert!(
        config.complex_storages().all(|(_, storage)| !storage.is_dirty()),
        "Every aggregator is clean after a flush"
    );
}

#[test]
fn test_untouched_aggregator_does_not_commit() {
    // --- 1. ARRANGE ---
    let (mut config, video) = video_config();
    let audio = Device::new(&[("SampleRate", ParamValue::Int(44_100))]);
    config.register_settings_tab("Audio").unwrap();
    config
        .register_complex_storage("AudioDevice", audio.storage())
        .unwrap();
    config
        .register_parameter(
            "SampleRate",
            "Audio",
            audio.member("SampleRate", ParamType::Int, "AudioDevice"),
        )
        .unwrap();

    // --- 2. ACT ---
    let report = config.apply(&changeset(&[("SampleRate", ParamValue::Int(48_000))]));

    // --- 3. ASSERT ---
    assert_eq!(report.commits, 1);
    assert_eq!(audio.commit_count(), 1);
    assert_eq!(video.commit_count(), 0, "The video aggregator was never staged");
}

#[test]
fn test_bad_entries_are_skipped_without_stopping_the_rest() {
    // --- 1. ARRANGE ---
    let (mut config, device) = video_config();
    let changes = changeset(&[
        ("Gamma", ParamValue::Float(2.2)),
        ("Vsync", ParamValue::from("yes")),
        ("FullScreen", ParamValue::Bool(true)),
    ]);

    // --- 2. ACT ---
    let report = config.apply(&changes);

    // --- 3. ASSERT ---
    assert_eq!(report.written, vec!["FullScreen"]);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].entry, "Gamma");
    assert_eq!(
        report.skipped[0].reason,
        ConfigError::UnknownParameter("Gamma".to_string())
    );
    assert_eq!(report.skipped[1].entry, "Vsync");
    assert!(matches!(
        report.skipped[1].reason,
        ConfigError::TypeMismatch { .. }
    ));

    assert_eq!(device.commit_count(), 1);
    assert_eq!(device.commits.borrow()[0]["Vsync"], ParamValue::Bool(false));
    assert_eq!(device.commits.borrow()[0]["FullScreen"], ParamValue::Bool(true));
}

#[test]
fn test_write_value_commits_immediately() {
    // --- 1. ARRANGE ---
    let (mut config, device) = video_config();

    // --- 2. ACT ---
    config
        .write_value("Resolution", ParamValue::from("2560x1440:144"))
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(device.commit_count(), 1);
    assert_eq!(
        config.read_value("Resolution").unwrap(),
        ParamValue::from("2560x1440:144")
    );
}

#[test]
fn test_failed_commit_is_reported_and_storage_cleared() {
    // --- 1. ARRANGE ---
    let mut config = Config::new();
    config.register_settings_tab("Video").unwrap();
    config
        .register_complex_storage(
            "VideoMode",
            ComplexParameter::new(|_: &ValueMap| -> ConfigResult<()> {
                Err(ConfigError::Subsystem("mode not supported".to_string()))
            }),
        )
        .unwrap();
    config
        .register_parameter(
            "Vsync",
            "Video",
            Parameter::complex(ParamType::Bool, || Ok(ParamValue::Bool(false)), "VideoMode"),
        )
        .unwrap();

    // --- 2. ACT ---
    let report = config.apply(&changeset(&[("Vsync", ParamValue::Bool(true))]));

    // --- 3. ASSERT ---
    assert_eq!(report.commits, 0);
    assert_eq!(report.failed_commits.len(), 1);
    assert_eq!(report.failed_commits[0].0, "VideoMode");
    assert!(!report.is_clean());
    assert!(
        config.complex_storages().all(|(_, storage)| !storage.is_dirty()),
        "A failed commit must not leave values staged for the next apply"
    );
}
