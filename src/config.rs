/*
 *  config.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered under command line overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::LcdKind;
use crate::meter::MeterLayout;
use crate::midimonitor::{EnvelopeTimings, CHANNEL_COUNT};
use crate::ui::UiTimings;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// envelope and peak meter timing
    pub monitor: Option<MonitorConfig>,
    /// overlay timing
    pub ui: Option<UiConfig>,
    /// panel geometry & meter layout
    pub display: Option<DisplayConfig>,
    /// replay script for the desktop runner
    pub script: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MonitorConfig {
    pub decay_release_ms: Option<f32>,
    pub peak_hold_ms: Option<f32>,
    pub peak_falloff_ms: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiConfig {
    pub message_display_ms: Option<u32>,
    pub spinner_frame_ms: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub kind: Option<LcdKind>,
    pub width: Option<u32>,         // pixels, or columns for character panels
    pub height: Option<u32>,        // pixels, or rows for character panels
    pub channels: Option<usize>,    // meters to draw, 1-16
    pub bar_spacing: Option<u32>,
    pub bar_x_offset: Option<u32>,
    pub draw_bar_bases: Option<bool>,
    pub fps: Option<u32>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "midimon", version, about = "MIDI channel level meter and status overlay")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// character | graphical
    #[arg(long, value_parser = parse_kind)]
    pub display_kind: Option<LcdKind>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub channels: Option<usize>,
    /// YAML script of timed MIDI messages and overlay triggers
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    pub script: Option<PathBuf>,
    /// Save the final frame as a PBM image (graphical panels)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub pbm: Option<PathBuf>,
    /// Pace frames in real time instead of running flat out
    #[arg(long, action = ArgAction::SetTrue)]
    pub realtime: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_kind(s: &str) -> Result<LcdKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "character" | "char" | "text" => Ok(LcdKind::Character),
        "graphical" | "graphic" | "pixel" => Ok(LcdKind::Graphical),
        other => Err(format!("unknown display kind '{other}' (character|graphical)")),
    }
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        log::info!("Using config file {}", p.display());
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/midimon/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/midimon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/midimon.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["midimon.yaml", "config/midimon.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.script.is_some()    { dst.script = src.script; }
    // sections
    match (&mut dst.monitor, src.monitor) {
        (None, Some(c)) => dst.monitor = Some(c),
        (Some(d), Some(s)) => merge_monitor(d, s),
        _ => {}
    }
    match (&mut dst.ui, src.ui) {
        (None, Some(c)) => dst.ui = Some(c),
        (Some(d), Some(s)) => merge_ui(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_monitor(dst: &mut MonitorConfig, src: MonitorConfig) {
    if src.decay_release_ms.is_some() { dst.decay_release_ms = src.decay_release_ms; }
    if src.peak_hold_ms.is_some()     { dst.peak_hold_ms = src.peak_hold_ms; }
    if src.peak_falloff_ms.is_some()  { dst.peak_falloff_ms = src.peak_falloff_ms; }
}

fn merge_ui(dst: &mut UiConfig, src: UiConfig) {
    if src.message_display_ms.is_some() { dst.message_display_ms = src.message_display_ms; }
    if src.spinner_frame_ms.is_some()   { dst.spinner_frame_ms = src.spinner_frame_ms; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.kind.is_some()           { dst.kind = src.kind; }
    if src.width.is_some()          { dst.width = src.width; }
    if src.height.is_some()         { dst.height = src.height; }
    if src.channels.is_some()       { dst.channels = src.channels; }
    if src.bar_spacing.is_some()    { dst.bar_spacing = src.bar_spacing; }
    if src.bar_x_offset.is_some()   { dst.bar_x_offset = src.bar_x_offset; }
    if src.draw_bar_bases.is_some() { dst.draw_bar_bases = src.draw_bar_bases; }
    if src.fps.is_some()            { dst.fps = src.fps; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.script.is_some()    { cfg.script = cli.script.clone(); }

    let any_display = cli.display_kind.is_some()
        || cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.channels.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_kind.is_some()   { display.kind = cli.display_kind; }
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.channels.is_some()       { display.channels = cli.channels; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(channels) = display.channels {
            if channels == 0 || channels > CHANNEL_COUNT {
                return Err(ConfigError::Validation(format!(
                    "display channels must be 1..={CHANNEL_COUNT}"
                )));
            }
        }
        if display.fps == Some(0) {
            return Err(ConfigError::Validation("display fps must be > 0".into()));
        }
    }
    if let Some(monitor) = cfg.monitor.as_ref() {
        for (name, value) in [
            ("decay_release_ms", monitor.decay_release_ms),
            ("peak_hold_ms", monitor.peak_hold_ms),
            ("peak_falloff_ms", monitor.peak_falloff_ms),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(ConfigError::Validation(format!("monitor {name} must be > 0")));
                }
            }
        }
    }
    if let Some(ui) = cfg.ui.as_ref() {
        if ui.message_display_ms == Some(0) || ui.spinner_frame_ms == Some(0) {
            return Err(ConfigError::Validation("ui timings must be > 0".into()));
        }
    }
    Ok(())
}

impl Config {
    pub fn envelope_timings(&self) -> EnvelopeTimings {
        let mut timings = EnvelopeTimings::default();
        if let Some(m) = self.monitor.as_ref() {
            if let Some(v) = m.decay_release_ms { timings.decay_release_ms = v; }
            if let Some(v) = m.peak_hold_ms     { timings.peak_hold_ms = v; }
            if let Some(v) = m.peak_falloff_ms  { timings.peak_falloff_ms = v; }
        }
        timings
    }

    pub fn ui_timings(&self) -> UiTimings {
        let mut timings = UiTimings::default();
        if let Some(u) = self.ui.as_ref() {
            if let Some(v) = u.message_display_ms { timings.message_display_ms = v; }
            if let Some(v) = u.spinner_frame_ms   { timings.spinner_frame_ms = v; }
        }
        timings
    }

    pub fn display(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }
}

impl DisplayConfig {
    pub fn kind(&self) -> LcdKind {
        self.kind.unwrap_or(LcdKind::Graphical)
    }

    /// Panel size, defaulting to a 128x32 OLED or a 20x2 character module.
    pub fn size(&self) -> (u32, u32) {
        let (w, h) = match self.kind() {
            LcdKind::Graphical => (128, 32),
            LcdKind::Character => (20, 2),
        };
        (self.width.unwrap_or(w), self.height.unwrap_or(h))
    }

    pub fn channels(&self) -> usize {
        self.channels.unwrap_or(CHANNEL_COUNT)
    }

    pub fn fps(&self) -> u32 {
        self.fps.unwrap_or(30)
    }

    /// Apply configured bar geometry over a surface-derived layout.
    pub fn meter_layout(&self, base: MeterLayout) -> MeterLayout {
        MeterLayout {
            x_offset: self.bar_x_offset.unwrap_or(base.x_offset),
            bar_spacing: self.bar_spacing.unwrap_or(base.bar_spacing),
            draw_bar_bases: self.draw_bar_bases.unwrap_or(base.draw_bar_bases),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_sections() {
        let cfg = parse_yaml(
            "log_level: debug\n\
             monitor:\n  decay_release_ms: 500\n\
             ui:\n  spinner_frame_ms: 40\n\
             display:\n  kind: character\n  width: 20\n  height: 4\n",
        )
        .unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.envelope_timings().decay_release_ms, 500.0);
        assert_eq!(cfg.envelope_timings().peak_hold_ms, EnvelopeTimings::default().peak_hold_ms);
        assert_eq!(cfg.ui_timings().spinner_frame_ms, 40);
        assert_eq!(cfg.ui_timings().message_display_ms, 3000);
        assert_eq!(cfg.display().kind(), LcdKind::Character);
        assert_eq!(cfg.display().size(), (20, 4));
    }

    #[test]
    fn test_display_defaults_by_kind() {
        let graphical = DisplayConfig::default();
        assert_eq!(graphical.size(), (128, 32));
        assert_eq!(graphical.channels(), 16);

        let character = DisplayConfig { kind: Some(LcdKind::Character), ..Default::default() };
        assert_eq!(character.size(), (20, 2));
    }

    #[test]
    fn test_meter_layout_overrides() {
        let base = MeterLayout {
            x_offset: 2,
            y_offset: 0,
            bar_spacing: 2,
            bar_height: 32,
            draw_bar_bases: true,
        };
        let display = DisplayConfig { bar_spacing: Some(1), draw_bar_bases: Some(false), ..Default::default() };
        let layout = display.meter_layout(base);
        assert_eq!(layout.bar_spacing, 1);
        assert!(!layout.draw_bar_bases);
        assert_eq!(layout.x_offset, 2);
        assert_eq!(layout.bar_height, 32);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = parse_yaml("display:\n  width: 256\n  height: 64\n").unwrap();
        let src = parse_yaml("display:\n  height: 32\nscript: demo.yaml\n").unwrap();
        merge(&mut dst, src);
        let display = dst.display();
        assert_eq!(display.width, Some(256));
        assert_eq!(display.height, Some(32));
        assert_eq!(dst.script, Some(PathBuf::from("demo.yaml")));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cfg = parse_yaml("display:\n  kind: graphical\n  channels: 9\n").unwrap();
        let cli = Cli {
            display_kind: Some(LcdKind::Character),
            channels: Some(16),
            log_level: Some("trace".into()),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.display().kind(), LcdKind::Character);
        assert_eq!(cfg.display().channels(), 16);
        assert_eq!(cfg.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_cli_creates_display_section() {
        let mut cfg = Config::default();
        let cli = Cli { display_height: Some(64), ..Default::default() };
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.display().size(), (128, 64));
    }

    #[test]
    fn test_validation() {
        assert!(validate(&parse_yaml("display:\n  width: 0\n").unwrap()).is_err());
        assert!(validate(&parse_yaml("display:\n  channels: 17\n").unwrap()).is_err());
        assert!(validate(&parse_yaml("display:\n  fps: 0\n").unwrap()).is_err());
        assert!(validate(&parse_yaml("monitor:\n  peak_falloff_ms: 0\n").unwrap()).is_err());
        assert!(validate(&parse_yaml("ui:\n  spinner_frame_ms: 0\n").unwrap()).is_err());
        assert!(validate(&parse_yaml("display:\n  channels: 9\n").unwrap()).is_ok());
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Character"), Ok(LcdKind::Character));
        assert_eq!(parse_kind("graphical"), Ok(LcdKind::Graphical));
        assert!(parse_kind("vfd").is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli { config: Some(PathBuf::from("/nonexistent/midimon.yaml")), ..Default::default() };
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }
}
