/*
 *  script.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Timed replay scripts: MIDI messages and overlay triggers
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

//! A script is a YAML document of events, each stamped with `at_ms` from the
//! start of playback:
//!
//! ```yaml
//! hold_ms: 1500
//! events:
//!   - at_ms: 0
//!     midi: [0x90, 60, 100]
//!   - at_ms: 250
//!     message: { text: "Loading SoundFont", spinner: true }
//!   - at_ms: 900
//!     clear_spinner: true
//!   - at_ms: 1000
//!     image: 1
//!   - at_ms: 4000
//!     power_saving: enter
//! ```
//!
//! An event may carry more than one action; they run in the order
//! midi, message, clear_spinner, image, power_saving.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

use crate::display::{DisplayError, LcdSurface};
use crate::midi::ShortMessage;
use crate::panel::FrontPanel;
use crate::ticks::Tick;
use crate::ui::ImageId;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("event {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSaving {
    Enter,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub text: String,
    #[serde(default)]
    pub spinner: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageEvent>,
    #[serde(default)]
    pub clear_spinner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_saving: Option<PowerSaving>,
}

impl ScriptEvent {
    fn is_empty(&self) -> bool {
        self.midi.is_none()
            && self.message.is_none()
            && !self.clear_spinner
            && self.image.is_none()
            && self.power_saving.is_none()
    }

    pub fn apply<L: LcdSurface + ?Sized>(
        &self,
        panel: &mut FrontPanel,
        lcd: &mut L,
        now: Tick,
    ) -> Result<(), DisplayError> {
        if let Some(bytes) = self.midi {
            let msg = ShortMessage::from(bytes);
            debug!("script @{}ms: midi {:02X} {:02X} {:02X}", self.at_ms, bytes[0], bytes[1], bytes[2]);
            panel.monitor.on_message(msg, now);
        }
        if let Some(m) = self.message.as_ref() {
            debug!("script @{}ms: message '{}' spinner={}", self.at_ms, m.text, m.spinner);
            panel.ui.show_system_message(&m.text, m.spinner, now);
        }
        if self.clear_spinner {
            panel.ui.clear_spinner_message();
        }
        if let Some(id) = self.image {
            panel.ui.display_image(ImageId(id), now);
        }
        match self.power_saving {
            Some(PowerSaving::Enter) => panel.ui.enter_power_saving_mode(now),
            Some(PowerSaving::Exit) => panel.ui.exit_power_saving_mode(lcd)?,
            None => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Extra time to keep running after the last event
    #[serde(default)]
    pub hold_ms: u32,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let s = fs::read_to_string(path)?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_yaml::from_str(s)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let mut last = 0;
        for (index, event) in self.events.iter().enumerate() {
            if event.at_ms < last {
                return Err(ScriptError::Invalid {
                    index,
                    reason: format!("at_ms {} is earlier than the previous event ({last})", event.at_ms),
                });
            }
            last = event.at_ms;
            if event.is_empty() {
                return Err(ScriptError::Invalid { index, reason: "no action".into() });
            }
            if let Some([status, ..]) = event.midi {
                if status < 0x80 {
                    return Err(ScriptError::Invalid {
                        index,
                        reason: format!("status byte {status:#04X} lacks the high bit"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Playback length including the trailing hold.
    pub fn duration_ms(&self) -> u32 {
        self.events.last().map_or(0, |e| e.at_ms).saturating_add(self.hold_ms)
    }

    pub fn player(&self) -> ScriptPlayer<'_> {
        ScriptPlayer { events: &self.events, cursor: 0 }
    }
}

/// Walks a script forward in time.
pub struct ScriptPlayer<'a> {
    events: &'a [ScriptEvent],
    cursor: usize,
}

impl ScriptPlayer<'_> {
    /// Apply every event stamped at or before `elapsed_ms`. Returns how many ran.
    pub fn advance<L: LcdSurface + ?Sized>(
        &mut self,
        elapsed_ms: u32,
        panel: &mut FrontPanel,
        lcd: &mut L,
        now: Tick,
    ) -> Result<usize, DisplayError> {
        let start = self.cursor;
        while let Some(event) = self.events.get(self.cursor) {
            if event.at_ms > elapsed_ms {
                break;
            }
            event.apply(panel, lcd, now)?;
            self.cursor += 1;
        }
        Ok(self.cursor - start)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::MockLcd;
    use crate::ui::UiState;

    const DEMO: &str = "
hold_ms: 500
events:
  - at_ms: 0
    midi: [0x90, 60, 100]
  - at_ms: 100
    message: { text: Loading, spinner: true }
  - at_ms: 200
    clear_spinner: true
  - at_ms: 300
    power_saving: enter
";

    #[test]
    fn test_parse_demo() {
        let script = Script::parse(DEMO).unwrap();
        assert_eq!(script.events.len(), 4);
        assert_eq!(script.events[0].midi, Some([0x90, 60, 100]));
        assert_eq!(
            script.events[1].message,
            Some(MessageEvent { text: "Loading".into(), spinner: true })
        );
        assert!(script.events[2].clear_spinner);
        assert_eq!(script.events[3].power_saving, Some(PowerSaving::Enter));
        assert_eq!(script.duration_ms(), 800);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let err = Script::parse("events:\n  - at_ms: 10\n    image: 1\n  - at_ms: 5\n    image: 1\n").unwrap_err();
        assert!(matches!(err, ScriptError::Invalid { index: 1, .. }));
    }

    #[test]
    fn test_rejects_empty_and_bad_status() {
        assert!(matches!(
            Script::parse("events:\n  - at_ms: 0\n").unwrap_err(),
            ScriptError::Invalid { index: 0, .. }
        ));
        assert!(matches!(
            Script::parse("events:\n  - at_ms: 0\n    midi: [0x40, 1, 2]\n").unwrap_err(),
            ScriptError::Invalid { index: 0, .. }
        ));
        assert!(matches!(Script::parse("events: 3").unwrap_err(), ScriptError::Yaml(_)));
    }

    #[test]
    fn test_player_applies_due_events() {
        let script = Script::parse(DEMO).unwrap();
        let mut lcd = MockLcd::graphical(128, 32);
        let mut panel = FrontPanel::for_surface(&lcd);
        let mut player = script.player();

        assert_eq!(player.advance(0, &mut panel, &mut lcd, 0).unwrap(), 1);
        assert!(panel.monitor.channel(0).notes[60].on_time.is_some());

        assert_eq!(player.advance(150, &mut panel, &mut lcd, 150_000).unwrap(), 1);
        assert_eq!(panel.ui.state(), UiState::SpinnerMessage);

        assert_eq!(player.advance(250, &mut panel, &mut lcd, 250_000).unwrap(), 1);
        assert_eq!(panel.ui.state(), UiState::None);
        assert!(!player.is_finished());

        assert_eq!(player.advance(10_000, &mut panel, &mut lcd, 10_000_000).unwrap(), 1);
        assert_eq!(panel.ui.state(), UiState::EnteringPowerSaving);
        assert!(player.is_finished());
        assert_eq!(player.advance(20_000, &mut panel, &mut lcd, 20_000_000).unwrap(), 0);
    }

    #[test]
    fn test_exit_power_saving_restores_backlight() {
        let script = Script::parse("events:\n  - at_ms: 0\n    power_saving: exit\n").unwrap();
        let mut lcd = MockLcd::graphical(128, 32);
        let mut panel = FrontPanel::for_surface(&lcd);
        panel.ui.enter_power_saving_mode(0);
        script.player().advance(0, &mut panel, &mut lcd, 0).unwrap();
        assert_eq!(panel.ui.state(), UiState::None);
    }
}
