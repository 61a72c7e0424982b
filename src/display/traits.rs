/*
 *  display/traits.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  The drawing contract the meter and overlay render against
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

use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;
use crate::ui::ImageId;

/// Character module (HD44780 and friends) or pixel-addressable panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LcdKind {
    /// Dimensions are columns x rows of characters
    Character,

    /// Dimensions are width x height in pixels
    Graphical,
}

/// Minimal panel abstraction - everything the meter and overlays draw with
///
/// Text positions are always in character cells, even on graphical panels.
/// Rectangle corners are inclusive pixel coordinates.
pub trait LcdSurface {
    /// Returns (columns, rows) for character panels, (width, height) for graphical ones
    fn dimensions(&self) -> (u32, u32);

    fn kind(&self) -> LcdKind;

    /// Print text at a character cell, optionally blanking the rest of the line
    fn print(&mut self, text: &str, column: u32, row: u32, clear_rest_of_line: bool) -> Result<(), DisplayError>;

    fn draw_filled_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<(), DisplayError>;

    fn draw_image(&mut self, image: ImageId) -> Result<(), DisplayError>;

    fn set_backlight_enabled(&mut self, enabled: bool) -> Result<(), DisplayError>;

    /// Blank the frame before redrawing
    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Push the frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

impl<T: LcdSurface + ?Sized> LcdSurface for Box<T> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn kind(&self) -> LcdKind {
        (**self).kind()
    }

    fn print(&mut self, text: &str, column: u32, row: u32, clear_rest_of_line: bool) -> Result<(), DisplayError> {
        (**self).print(text, column, row, clear_rest_of_line)
    }

    fn draw_filled_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<(), DisplayError> {
        (**self).draw_filled_rect(x1, y1, x2, y2)
    }

    fn draw_image(&mut self, image: ImageId) -> Result<(), DisplayError> {
        (**self).draw_image(image)
    }

    fn set_backlight_enabled(&mut self, enabled: bool) -> Result<(), DisplayError> {
        (**self).set_backlight_enabled(enabled)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }
}
