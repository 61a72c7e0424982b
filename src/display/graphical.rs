/*
 *  display/graphical.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory monochrome pixel panel (SSD1306 class geometry)
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

use std::collections::HashMap;
use std::path::Path;

use embedded_graphics::{
    image::{Image, ImageRaw},
    mono_font::{ascii::FONT_6X10, MonoTextStyleBuilder},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use log::debug;

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{LcdKind, LcdSurface};
use crate::ui::ImageId;

/// Character cell used by `print` on pixel panels
pub const CELL_WIDTH: u32 = 6;
pub const CELL_HEIGHT: u32 = 16;

#[derive(Debug, Clone)]
struct Bitmap {
    width: u32,
    data: Vec<u8>,
}

/// Pixel panel rendered into a framebuffer, for desktop runs and tests.
#[derive(Debug, Clone)]
pub struct GraphicalLcd {
    framebuffer: FrameBuffer<BinaryColor>,
    images: HashMap<ImageId, Bitmap>,
    backlight: bool,
    flush_count: usize,
}

impl GraphicalLcd {
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "graphical panel must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            framebuffer: FrameBuffer::new(width, height, BinaryColor::Off),
            images: HashMap::new(),
            backlight: true,
            flush_count: 0,
        })
    }

    /// Register a 1-bpp bitmap (rows MSB first, padded to whole bytes).
    pub fn register_image(&mut self, id: ImageId, width: u32, data: Vec<u8>) -> Result<(), DisplayError> {
        let bytes_per_row = width.div_ceil(8) as usize;
        if bytes_per_row == 0 || data.is_empty() || data.len() % bytes_per_row != 0 {
            let rows = if bytes_per_row == 0 { 0 } else { data.len().div_ceil(bytes_per_row) };
            return Err(DisplayError::ImageSizeMismatch {
                expected: rows.max(1) * bytes_per_row.max(1),
                actual: data.len(),
            });
        }
        debug!("registered image {} ({}x{})", id.0, width, data.len() / bytes_per_row);
        self.images.insert(id, Bitmap { width, data });
        Ok(())
    }

    pub fn framebuffer(&self) -> &FrameBuffer<BinaryColor> {
        &self.framebuffer
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.framebuffer.pixel(x, y)
    }

    pub fn backlight_enabled(&self) -> bool {
        self.backlight
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// One text line per pixel row, `#` for lit pixels
    pub fn to_ascii(&self) -> String {
        let w = self.framebuffer.width().max(1);
        let mut out = String::with_capacity((w + 1) * self.framebuffer.height());
        for row in self.framebuffer.as_slice().chunks(w) {
            out.extend(row.iter().map(|p| if p.is_on() { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    /// Save framebuffer to PBM file (for visual debugging)
    pub fn save_to_pbm(&self, path: &Path) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::Write;

        let mut file = File::create(path)?;

        // PBM header
        writeln!(file, "P1")?;
        writeln!(file, "{} {}", self.framebuffer.width(), self.framebuffer.height())?;

        // Pixel data
        for row in self.framebuffer.as_slice().chunks(self.framebuffer.width().max(1)) {
            let line: Vec<&str> = row.iter().map(|p| if p.is_on() { "1" } else { "0" }).collect();
            writeln!(file, "{}", line.join(" "))?;
        }

        Ok(())
    }
}

impl LcdSurface for GraphicalLcd {
    fn dimensions(&self) -> (u32, u32) {
        let size = self.framebuffer.size();
        (size.width, size.height)
    }

    fn kind(&self) -> LcdKind {
        LcdKind::Graphical
    }

    fn print(&mut self, text: &str, column: u32, row: u32, clear_rest_of_line: bool) -> Result<(), DisplayError> {
        let (width, _) = self.dimensions();
        let origin = Point::new((column * CELL_WIDTH) as i32, (row * CELL_HEIGHT) as i32);

        if clear_rest_of_line {
            let rest = width.saturating_sub(column * CELL_WIDTH);
            Rectangle::new(origin, Size::new(rest, CELL_HEIGHT))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                .draw(&mut self.framebuffer)?;
        }

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build();
        Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.framebuffer)?;
        Ok(())
    }

    fn draw_filled_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<(), DisplayError> {
        let (width, height) = self.dimensions();
        if x1.max(x2) >= width || y1.max(y2) >= height {
            return Err(DisplayError::OutOfBounds { x: x1.max(x2), y: y1.max(y2) });
        }
        let top_left = Point::new(x1.min(x2) as i32, y1.min(y2) as i32);
        let bottom_right = Point::new(x1.max(x2) as i32, y1.max(y2) as i32);
        Rectangle::with_corners(top_left, bottom_right)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.framebuffer)?;
        Ok(())
    }

    fn draw_image(&mut self, image: ImageId) -> Result<(), DisplayError> {
        let bitmap = self.images.get(&image).ok_or(DisplayError::UnknownImage(image))?;
        let raw = ImageRaw::<BinaryColor>::new(&bitmap.data, bitmap.width);
        Image::new(&raw, Point::zero()).draw(&mut self.framebuffer)?;
        Ok(())
    }

    fn set_backlight_enabled(&mut self, enabled: bool) -> Result<(), DisplayError> {
        if self.backlight != enabled {
            debug!("backlight {}", if enabled { "on" } else { "off" });
        }
        self.backlight = enabled;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.clear_color(BinaryColor::Off);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flush_count += 1;
        Ok(())
    }
}
