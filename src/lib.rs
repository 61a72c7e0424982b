/*
 *  lib.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  MIDI channel level meter and status overlay for small LCD panels
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

pub mod ticks;
pub mod midi;
pub mod midimonitor;
pub mod barchars;
pub mod display;
pub mod ui;
pub mod meter;
pub mod panel;
pub mod script;
pub mod pacer;
pub mod config;

pub use midimonitor::{ChannelLevels, EnvelopeTimings, MidiMonitor};
pub use panel::FrontPanel;
pub use ui::{ImageId, UiState, UiTimings, UserInterface};
