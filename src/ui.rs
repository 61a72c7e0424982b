/*
 *  ui.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  System overlays shown in place of the level meter: messages,
 *  busy spinner, images and the power saving hand-off
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

use arrayvec::ArrayVec;
use log::debug;

use crate::display::{DisplayError, LcdKind, LcdSurface};
use crate::ticks::{elapsed, millis_to_ticks, Tick};

/// Visible characters in a system message
pub const MESSAGE_CAPACITY: usize = 20;

/// Text kept in front of the spinner: capacity less the gap, glyph and terminator of the panel buffer
pub const SPINNER_TEXT_LEN: usize = MESSAGE_CAPACITY - 2;

/// Buffer cell overwritten by each spinner frame
const SPINNER_CELL: usize = MESSAGE_CAPACITY - 1;

pub const SPINNER_CHARS: [u8; 14] = *b"___-''^^``-___";

const POWER_SAVING_MESSAGE: &str = "Power saving mode";

/// Identifier of a full-screen image known to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    None,
    Message,
    SpinnerMessage,
    Image,
    EnteringPowerSaving,
    InPowerSaving,
}

/// Overlay timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTimings {
    pub message_display_ms: u32,
    pub spinner_frame_ms: u32,
}

impl Default for UiTimings {
    fn default() -> Self {
        Self {
            message_display_ms: 3000,
            spinner_frame_ms: 32,
        }
    }
}

/// Fixed-capacity ASCII text shown by the message overlays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBuffer(ArrayVec<u8, MESSAGE_CAPACITY>);

impl MessageBuffer {
    /// Keep the first 20 characters; anything longer is silently dropped.
    pub fn set_text(&mut self, text: &str) {
        self.0.clear();
        for c in text.chars().take(MESSAGE_CAPACITY) {
            self.0.push(ascii_or_placeholder(c));
        }
    }

    /// Left-justified text padded to a fixed width, a gap, then the spinner glyph.
    pub fn set_spinner_text(&mut self, text: &str, glyph: u8) {
        self.0.clear();
        for c in text.chars().take(SPINNER_TEXT_LEN) {
            self.0.push(ascii_or_placeholder(c));
        }
        while self.0.len() < SPINNER_TEXT_LEN {
            self.0.push(b' ');
        }
        self.0.push(b' ');
        self.0.push(glyph);
    }

    fn set_spinner_glyph(&mut self, glyph: u8) {
        if let Some(cell) = self.0.get_mut(SPINNER_CELL) {
            *cell = glyph;
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

fn ascii_or_placeholder(c: char) -> u8 {
    if c.is_ascii() { c as u8 } else { b'?' }
}

/// Active overlay plus whatever that overlay needs to know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlay {
    None,
    Message,
    SpinnerMessage { frame: usize, frame_tick: Tick },
    Image(ImageId),
    EnteringPowerSaving,
    InPowerSaving,
}

impl Overlay {
    fn state(&self) -> UiState {
        match self {
            Overlay::None => UiState::None,
            Overlay::Message => UiState::Message,
            Overlay::SpinnerMessage { .. } => UiState::SpinnerMessage,
            Overlay::Image(_) => UiState::Image,
            Overlay::EnteringPowerSaving => UiState::EnteringPowerSaving,
            Overlay::InPowerSaving => UiState::InPowerSaving,
        }
    }
}

/// Arbitrates what is drawn instead of the level meter.
#[derive(Debug, Clone)]
pub struct UserInterface {
    overlay: Overlay,
    state_tick: Tick,
    message: MessageBuffer,
    message_display_ticks: Tick,
    spinner_frame_ticks: Tick,
}

impl Default for UserInterface {
    fn default() -> Self {
        Self::new(UiTimings::default())
    }
}

impl UserInterface {
    pub fn new(timings: UiTimings) -> Self {
        Self {
            overlay: Overlay::None,
            state_tick: 0,
            message: MessageBuffer::default(),
            message_display_ticks: millis_to_ticks(timings.message_display_ms),
            spinner_frame_ticks: millis_to_ticks(timings.spinner_frame_ms),
        }
    }

    pub fn state(&self) -> UiState {
        self.overlay.state()
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn spinner_frame(&self) -> Option<usize> {
        match self.overlay {
            Overlay::SpinnerMessage { frame, .. } => Some(frame),
            _ => None,
        }
    }

    pub fn current_image(&self) -> Option<ImageId> {
        match self.overlay {
            Overlay::Image(id) => Some(id),
            _ => None,
        }
    }

    pub fn show_system_message(&mut self, text: &str, spinner: bool, now: Tick) {
        if spinner {
            self.message.set_spinner_text(text, SPINNER_CHARS[0]);
            self.enter(Overlay::SpinnerMessage { frame: 0, frame_tick: now }, now);
        } else {
            self.message.set_text(text);
            self.enter(Overlay::Message, now);
        }
    }

    /// Drop whatever overlay is up, e.g. when the busy work behind a spinner finishes.
    pub fn clear_spinner_message(&mut self) {
        if self.overlay != Overlay::None {
            debug!("UI state: {:?} -> {:?}", self.state(), UiState::None);
        }
        self.overlay = Overlay::None;
    }

    pub fn display_image(&mut self, image: ImageId, now: Tick) {
        self.enter(Overlay::Image(image), now);
    }

    pub fn enter_power_saving_mode(&mut self, now: Tick) {
        self.message.set_text(POWER_SAVING_MESSAGE);
        self.enter(Overlay::EnteringPowerSaving, now);
    }

    pub fn exit_power_saving_mode<L: LcdSurface + ?Sized>(&mut self, lcd: &mut L) -> Result<(), DisplayError> {
        lcd.set_backlight_enabled(true)?;
        debug!("UI state: {:?} -> {:?}", self.state(), UiState::None);
        self.overlay = Overlay::None;
        Ok(())
    }

    /// Advance timeouts, then draw the active overlay.
    ///
    /// Nothing is drawn in `UiState::None`; the caller draws the meter then.
    pub fn update<L: LcdSurface + ?Sized>(&mut self, lcd: &mut L, now: Tick) -> Result<(), DisplayError> {
        self.check_timeouts(lcd, now)?;

        if self.overlay != Overlay::None {
            self.draw_system_state(lcd)?;
        }
        Ok(())
    }

    fn enter(&mut self, overlay: Overlay, now: Tick) {
        if overlay.state() != self.state() {
            debug!("UI state: {:?} -> {:?}", self.state(), overlay.state());
        }
        self.overlay = overlay;
        self.state_tick = now;
    }

    fn timed_out(&self, now: Tick) -> bool {
        elapsed(now, self.state_tick) >= self.message_display_ticks
    }

    /// One check per state, tried in fixed priority order:
    /// message, spinner message, image, entering power saving.
    /// At most one transition fires per update.
    fn check_timeouts<L: LcdSurface + ?Sized>(&mut self, lcd: &mut L, now: Tick) -> Result<(), DisplayError> {
        match self.overlay {
            Overlay::Message => self.check_message(now),
            Overlay::SpinnerMessage { frame, frame_tick } => self.check_spinner(frame, frame_tick, now),
            Overlay::Image(_) => self.check_image(now),
            Overlay::EnteringPowerSaving => self.check_power_saving(lcd, now)?,
            Overlay::None | Overlay::InPowerSaving => {}
        }
        Ok(())
    }

    fn check_message(&mut self, now: Tick) {
        if self.timed_out(now) {
            self.enter(Overlay::None, now);
        }
    }

    fn check_spinner(&mut self, frame: usize, frame_tick: Tick, now: Tick) {
        if self.timed_out(now) {
            self.enter(Overlay::None, now);
        } else if elapsed(now, frame_tick) >= self.spinner_frame_ticks {
            // frame steps only restart the frame timer, never the overlay timeout
            let frame = (frame + 1) % SPINNER_CHARS.len();
            self.message.set_spinner_glyph(SPINNER_CHARS[frame]);
            self.overlay = Overlay::SpinnerMessage { frame, frame_tick: now };
        }
    }

    fn check_image(&mut self, now: Tick) {
        if self.timed_out(now) {
            self.enter(Overlay::None, now);
        }
    }

    fn check_power_saving<L: LcdSurface + ?Sized>(&mut self, lcd: &mut L, now: Tick) -> Result<(), DisplayError> {
        if self.timed_out(now) {
            lcd.set_backlight_enabled(false)?;
            self.enter(Overlay::InPowerSaving, now);
        }
        Ok(())
    }

    fn draw_system_state<L: LcdSurface + ?Sized>(&self, lcd: &mut L) -> Result<(), DisplayError> {
        let (_, height) = lcd.dimensions();
        let text = self.message.as_str();

        match lcd.kind() {
            LcdKind::Graphical => {
                if let Overlay::Image(image) = self.overlay {
                    lcd.draw_image(image)?;
                } else {
                    let row = if height == 32 { 0 } else { 1 };
                    lcd.print(text, 0, row, true)?;
                }
            }
            LcdKind::Character => {
                if let Overlay::Image(_) = self.overlay {
                    return Ok(());
                }
                match height {
                    2 => {
                        lcd.print(text, 0, 0, true)?;
                        lcd.print("", 0, 1, true)?;
                    }
                    4 => {
                        lcd.print("", 0, 0, true)?;
                        lcd.print(text, 0, 1, true)?;
                        lcd.print("", 0, 2, true)?;
                        lcd.print("", 0, 3, true)?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
