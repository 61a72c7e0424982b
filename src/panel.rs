/*
 *  panel.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Front panel: owns the level engine and overlay state and
 *  composes one display frame per refresh tick
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

use crate::display::{DisplayError, LcdSurface};
use crate::meter::{self, MeterLayout};
use crate::midimonitor::{EnvelopeTimings, MidiMonitor, CHANNEL_COUNT};
use crate::ticks::Tick;
use crate::ui::{UiState, UiTimings, UserInterface};

/// Level engine, overlays and meter geometry for one panel.
///
/// Feed MIDI with `on_short_message` and call `refresh` once per display
/// tick, both from the same thread of control.
#[derive(Debug, Clone)]
pub struct FrontPanel {
    pub monitor: MidiMonitor,
    pub ui: UserInterface,
    layout: MeterLayout,
    channels: usize,
}

impl FrontPanel {
    pub fn new(envelope: EnvelopeTimings, overlay: UiTimings, layout: MeterLayout, channels: usize) -> Self {
        Self {
            monitor: MidiMonitor::new(envelope),
            ui: UserInterface::new(overlay),
            layout,
            channels: channels.clamp(1, CHANNEL_COUNT),
        }
    }

    /// Defaults sized to fill the given surface with all 16 channels.
    pub fn for_surface<L: LcdSurface + ?Sized>(lcd: &L) -> Self {
        Self::new(
            EnvelopeTimings::default(),
            UiTimings::default(),
            MeterLayout::for_surface(lcd),
            CHANNEL_COUNT,
        )
    }

    pub fn layout(&self) -> &MeterLayout {
        &self.layout
    }

    pub fn on_short_message(&mut self, packed: u32, now: Tick) {
        self.monitor.on_short_message(packed, now);
    }

    /// Compose one frame: overlays first, the meter when no overlay is up.
    pub fn refresh<L: LcdSurface + ?Sized>(&mut self, lcd: &mut L, now: Tick) -> Result<(), DisplayError> {
        lcd.clear()?;
        self.ui.update(lcd, now)?;

        if self.ui.state() == UiState::None {
            meter::draw_channel_levels(lcd, &mut self.monitor, &self.layout, now, self.channels)?;
        }

        lcd.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::{LcdCall, MockLcd};
    use crate::midi::ShortMessage;
    use crate::ticks::millis_to_ticks;

    #[test]
    fn test_meter_when_idle() {
        let mut lcd = MockLcd::graphical(128, 32);
        let mut panel = FrontPanel::for_surface(&lcd);
        panel.on_short_message(ShortMessage::note_on(0, 60, 127).pack(), 0);

        panel.refresh(&mut lcd, 0).unwrap();
        let calls = lcd.take_calls();
        assert_eq!(calls.first(), Some(&LcdCall::Clear));
        assert_eq!(calls.last(), Some(&LcdCall::Flush));
        assert!(calls.iter().any(|c| matches!(c, LcdCall::FilledRect { .. })));
        assert!(!calls.iter().any(|c| matches!(c, LcdCall::Print { .. })));
    }

    #[test]
    fn test_overlay_replaces_meter() {
        let mut lcd = MockLcd::graphical(128, 32);
        let mut panel = FrontPanel::for_surface(&lcd);

        panel.ui.show_system_message("Hello", false, 0);
        panel.refresh(&mut lcd, millis_to_ticks(10)).unwrap();
        let calls = lcd.take_calls();
        assert!(!calls.iter().any(|c| matches!(c, LcdCall::FilledRect { .. })));
        assert!(calls.contains(&LcdCall::Print {
            text: "Hello".to_string(),
            column: 0,
            row: 0,
            clear_rest_of_line: true
        }));

        // meter comes back on the frame the message times out
        panel.refresh(&mut lcd, millis_to_ticks(3000)).unwrap();
        assert_eq!(panel.ui.state(), UiState::None);
        assert!(!lcd.rects().is_empty());
    }

    #[test]
    fn test_channel_count_limits_bars() {
        let mut lcd = MockLcd::graphical(128, 32);
        let layout = MeterLayout::for_surface(&lcd);
        let mut panel = FrontPanel::new(EnvelopeTimings::default(), UiTimings::default(), layout, 9);
        panel.refresh(&mut lcd, 0).unwrap();
        // bases only: one rect per channel
        assert_eq!(lcd.rects().len(), 9);
        assert_eq!(lcd.rects()[0], (2, 31, 13, 31));
    }
}
