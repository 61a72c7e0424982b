/*
 *  display/character.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory character module (HD44780 class, 20x2 / 20x4)
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

use log::debug;

use crate::barchars;
use crate::display::error::DisplayError;
use crate::display::traits::{LcdKind, LcdSurface};
use crate::ui::ImageId;

/// Character grid holding raw panel codes (ASCII plus CGRAM bar glyphs).
#[derive(Debug, Clone)]
pub struct CharacterLcd {
    columns: u32,
    rows: u32,
    cells: Vec<u8>,
    backlight: bool,
}

impl CharacterLcd {
    pub fn new(columns: u32, rows: u32) -> Result<Self, DisplayError> {
        if columns == 0 || rows == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "character panel must be at least 1x1, got {}x{}",
                columns, rows
            )));
        }
        Ok(Self {
            columns,
            rows,
            cells: vec![b' '; (columns * rows) as usize],
            backlight: true,
        })
    }

    /// Raw panel codes of one row
    pub fn row(&self, row: u32) -> &[u8] {
        let start = (row.min(self.rows - 1) * self.columns) as usize;
        &self.cells[start..start + self.columns as usize]
    }

    /// One row as text, bar glyphs shown as block elements
    pub fn row_text(&self, row: u32) -> String {
        self.row(row).iter().map(|&c| barchars::to_display_char(c)).collect()
    }

    pub fn to_text(&self) -> String {
        (0..self.rows)
            .map(|r| format!("{}\n", self.row_text(r)))
            .collect()
    }

    pub fn backlight_enabled(&self) -> bool {
        self.backlight
    }
}

impl LcdSurface for CharacterLcd {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn kind(&self) -> LcdKind {
        LcdKind::Character
    }

    fn print(&mut self, text: &str, column: u32, row: u32, clear_rest_of_line: bool) -> Result<(), DisplayError> {
        if row >= self.rows || column >= self.columns {
            return Err(DisplayError::OutOfBounds { x: column, y: row });
        }

        let start = (row * self.columns) as usize;
        let line = &mut self.cells[start..start + self.columns as usize];
        let mut cursor = column as usize;

        for byte in text.bytes().take(line.len() - cursor) {
            line[cursor] = if byte.is_ascii() { byte } else { b'?' };
            cursor += 1;
        }

        if clear_rest_of_line {
            line[cursor..].fill(b' ');
        }
        Ok(())
    }

    fn draw_filled_rect(&mut self, _x1: u32, _y1: u32, _x2: u32, _y2: u32) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    fn draw_image(&mut self, _image: ImageId) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    fn set_backlight_enabled(&mut self, enabled: bool) -> Result<(), DisplayError> {
        if self.backlight != enabled {
            debug!("backlight {}", if enabled { "on" } else { "off" });
        }
        self.backlight = enabled;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.cells.fill(b' ');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_print() {
        let mut lcd = CharacterLcd::new(20, 2).unwrap();
        assert_eq!(lcd.dimensions(), (20, 2));
        assert_eq!(lcd.kind(), LcdKind::Character);

        lcd.print("Hello", 2, 1, false).unwrap();
        assert_eq!(lcd.row_text(1), "  Hello             ");
        assert_eq!(lcd.row_text(0), " ".repeat(20));
    }

    #[test]
    fn test_print_truncates_at_edge() {
        let mut lcd = CharacterLcd::new(8, 1).unwrap();
        lcd.print("0123456789", 4, 0, false).unwrap();
        assert_eq!(lcd.row(0), b"    0123");
    }

    #[test]
    fn test_clear_rest_of_line() {
        let mut lcd = CharacterLcd::new(10, 2).unwrap();
        lcd.print("XXXXXXXXXX", 0, 0, false).unwrap();
        lcd.print("ab", 3, 0, true).unwrap();
        assert_eq!(lcd.row(0), b"XXXab     ");
        lcd.print("", 0, 0, true).unwrap();
        assert_eq!(lcd.row(0), b"          ");
    }

    #[test]
    fn test_out_of_bounds_and_unsupported() {
        let mut lcd = CharacterLcd::new(20, 4).unwrap();
        assert!(lcd.print("x", 0, 4, false).is_err());
        assert_eq!(lcd.draw_filled_rect(0, 0, 1, 1), Err(DisplayError::UnsupportedOperation));
        assert_eq!(lcd.draw_image(ImageId(1)), Err(DisplayError::UnsupportedOperation));
    }

    #[test]
    fn test_bar_glyphs_in_text_dump() {
        let mut lcd = CharacterLcd::new(3, 1).unwrap();
        let codes = [barchars::FULL, barchars::BAR_CHARS[4], barchars::EMPTY];
        lcd.print(std::str::from_utf8(&codes).unwrap(), 0, 0, false).unwrap();
        assert_eq!(lcd.to_text(), "█▄ \n");
    }
}
