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


//! Khora Shell: registers the standard settings, restores them from disk and
//! applies them in two passes around engine initialization.

mod gameplay;
mod headless;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use khora_config::builtins;
use khora_config::builtins::DisplayBackend;
use khora_config::{ApplyReport, Changeset, Config, ParamValue, PersistFormat, StartupSettings};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use headless::{HeadlessAudio, HeadlessDisplay, HeadlessLocalization};

#[derive(Parser, Debug)]
#[command(name = "khora-shell")]
#[command(about = "Loads, applies and saves the engine settings")]
#[command(version)]
struct Args {
    /// Settings file; `.json` for the document form, `.bin` or `.cfg` for the binary form
    #[arg(long, default_value = "settings.json")]
    config: PathBuf,

    /// Override a setting after loading, e.g. `--set Vsync=true`
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Write the resulting settings back to the settings file
    #[arg(long)]
    save: bool,

    /// Print every tab with its parameters and current values
    #[arg(long)]
    list: bool,
}

fn parse_override(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{arg}'")),
    }
}

fn log_report(stage: &str, report: &ApplyReport) {
    log::info!(
        "Shell: {} applied {} value(s), {} commit(s)",
        stage,
        report.written.len(),
        report.commits
    );
    for (category, error) in &report.failed_commits {
        log::error!("Shell: {} could not commit '{}': {}", stage, category, error);
    }
}

/// Reads the stored settings, if any, and splits them around engine init.
fn load_startup_settings(config: &Config, path: &Path) -> Result<StartupSettings> {
    if !path.exists() {
        log::info!("Shell: no settings at {}, using defaults", path.display());
        return Ok(StartupSettings::default());
    }
    let format = PersistFormat::from_path(path)
        .ok_or_else(|| anyhow!("cannot tell the settings format of {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let decoded = config
        .decode(&bytes, format)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    if !decoded.skipped.is_empty() {
        log::warn!(
            "Shell: {} stored entr(ies) ignored in {}",
            decoded.skipped.len(),
            path.display()
        );
    }
    Ok(StartupSettings::split(config, decoded.changeset))
}

/// Parses `--set` overrides against each parameter's declared type.
fn parse_overrides(config: &Config, overrides: &[(String, String)]) -> Result<Changeset> {
    let mut changes = Changeset::new();
    for (name, text) in overrides {
        let info = config
            .parameter_info(name)
            .ok_or_else(|| anyhow!("unknown setting '{name}'"))?;
        let value = ParamValue::parse_as(info.value_type, text)
            .with_context(|| format!("invalid value for '{name}'"))?;
        changes.insert(name.clone(), value);
    }
    Ok(changes)
}

fn print_settings(config: &Config) {
    for tab in config.settings_tabs() {
        println!("[{tab}]");
        for name in config.settings(&tab) {
            let value = config
                .read_value(&name)
                .map(|value| value.to_string())
                .unwrap_or_else(|e| format!("<{e}>"));
            let mut flags = Vec::new();
            if let Some(info) = config.parameter_info(&name) {
                flags.push(info.value_type.to_string());
                if info.is_engine {
                    flags.push("engine".to_string());
                }
                if let Some(category) = info.category {
                    flags.push(format!("via {category}"));
                }
            }
            println!("  {name} = {value} ({})", flags.join(", "));
            if config.is_enum(&name) {
                let choices: Vec<String> = config
                    .construct_enum(&name)
                    .into_iter()
                    .map(|variant| format!("{} [{}]", variant.value, variant.label))
                    .collect();
                println!("    choices: {}", choices.join(" | "));
            }
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let display = Rc::new(RefCell::new(HeadlessDisplay::new()));
    let audio = Rc::new(RefCell::new(HeadlessAudio::default()));
    let localization = Rc::new(RefCell::new(HeadlessLocalization::new()));
    let field_of_view = Rc::new(Cell::new(90.0));

    let mut config = Config::new();
    builtins::register_video_settings(&mut config, display.clone())?;
    builtins::register_audio_settings(&mut config, audio)?;
    builtins::register_language_settings(&mut config, localization)?;
    let scripts = gameplay::script_host(field_of_view);
    gameplay::register_gameplay_settings(&mut config, &scripts)?;
    log::info!(
        "Shell: {} setting(s) registered in {} tab(s)",
        config.len(),
        config.settings_tabs().len()
    );

    let mut startup = load_startup_settings(&config, &args.config)?;
    log_report("engine pass", &startup.apply_engine(&mut config));
    log::info!(
        "Shell: engine initialized at {}",
        display.borrow().display_mode().resolution.caption()
    );
    log_report("runtime pass", &startup.apply_runtime(&mut config));

    if !args.overrides.is_empty() {
        let changes = parse_overrides(&config, &args.overrides)?;
        let report = config.apply(&changes);
        log_report("overrides", &report);
        if !report.is_clean() {
            let rejected = report.skipped.len() + report.failed_commits.len();
            return Err(anyhow!("{rejected} override(s) were rejected"));
        }
    }

    if args.list {
        print_settings(&config);
    }

    if args.save {
        let format = PersistFormat::from_path(&args.config).ok_or_else(|| {
            anyhow!("cannot tell the settings format of {}", args.config.display())
        })?;
        config
            .save_to_file(&args.config, format)
            .with_context(|| format!("failed to save {}", args.config.display()))?;
    }

    builtins::unregister_language_settings(&mut config)?;
    builtins::unregister_audio_settings(&mut config)?;
    builtins::unregister_video_settings(&mut config)?;
    Ok(())
}
