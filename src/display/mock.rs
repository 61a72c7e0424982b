/*
 *  display/mock.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording display surface for testing without hardware
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

use crate::display::error::DisplayError;
use crate::display::traits::{LcdKind, LcdSurface};
use crate::ui::ImageId;

/// Every surface call, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LcdCall {
    Print { text: String, column: u32, row: u32, clear_rest_of_line: bool },
    FilledRect { x1: u32, y1: u32, x2: u32, y2: u32 },
    Image(ImageId),
    Backlight(bool),
    Clear,
    Flush,
}

/// Mock surface that records operations for verification in tests
#[derive(Debug, Clone)]
pub struct MockLcd {
    kind: LcdKind,
    dimensions: (u32, u32),
    pub calls: Vec<LcdCall>,
}

impl MockLcd {
    pub fn new(kind: LcdKind, width: u32, height: u32) -> Self {
        Self { kind, dimensions: (width, height), calls: Vec::new() }
    }

    pub fn graphical(width: u32, height: u32) -> Self {
        Self::new(LcdKind::Graphical, width, height)
    }

    pub fn character(columns: u32, rows: u32) -> Self {
        Self::new(LcdKind::Character, columns, rows)
    }

    pub fn take_calls(&mut self) -> Vec<LcdCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn rects(&self) -> Vec<(u32, u32, u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                LcdCall::FilledRect { x1, y1, x2, y2 } => Some((x1, y1, x2, y2)),
                _ => None,
            })
            .collect()
    }

    pub fn prints(&self) -> Vec<(String, u32, u32, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                LcdCall::Print { text, column, row, clear_rest_of_line } => {
                    Some((text.clone(), *column, *row, *clear_rest_of_line))
                }
                _ => None,
            })
            .collect()
    }
}

impl LcdSurface for MockLcd {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn kind(&self) -> LcdKind {
        self.kind
    }

    fn print(&mut self, text: &str, column: u32, row: u32, clear_rest_of_line: bool) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::Print { text: text.to_string(), column, row, clear_rest_of_line });
        Ok(())
    }

    fn draw_filled_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::FilledRect { x1, y1, x2, y2 });
        Ok(())
    }

    fn draw_image(&mut self, image: ImageId) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::Image(image));
        Ok(())
    }

    fn set_backlight_enabled(&mut self, enabled: bool) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::Backlight(enabled));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::Clear);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.calls.push(LcdCall::Flush);
        Ok(())
    }
}
