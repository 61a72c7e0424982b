/*
 *  display/framebuffer.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized framebuffer for embedded-graphics
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

use core::convert::Infallible;
use embedded_graphics::pixelcolor::{BinaryColor, PixelColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct FrameBuffer<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> FrameBuffer<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl FrameBuffer<BinaryColor> {
    /// Pack rows MSB first, each row padded to a whole byte (`ImageRaw` layout)
    pub fn to_image_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.w.div_ceil(8) * self.h);
        for row in self.buf.chunks(self.w.max(1)) {
            for chunk in row.chunks(8) {
                let byte = chunk
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_on())
                    .fold(0u8, |byte, (bit, _)| byte | 0x80 >> bit);
                bytes.push(byte);
            }
        }
        bytes
    }

    pub fn count_on_pixels(&self) -> usize {
        self.buf.iter().filter(|&&p| p == BinaryColor::On).count()
    }
}

impl<C: PixelColor> OriginDimensions for FrameBuffer<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for FrameBuffer<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // fast path for the filled rectangles the meter draws
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let (x0, y0) = (area.top_left.x as usize, area.top_left.y as usize);
        let (x1, y1) = (bottom_right.x as usize, bottom_right.y as usize);
        for y in y0..=y1 {
            let row = y * self.w;
            self.buf[row + x0..=row + x1].fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_solid_clips_to_bounds() {
        let mut fb = FrameBuffer::new(8, 4, BinaryColor::Off);
        fb.fill_solid(&Rectangle::new(Point::new(6, 2), Size::new(10, 10)), BinaryColor::On)
            .unwrap();
        assert_eq!(fb.count_on_pixels(), 4);
        assert_eq!(fb.pixel(7, 3), Some(BinaryColor::On));
        assert_eq!(fb.pixel(5, 3), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(8, 0), None);
    }

    #[test]
    fn test_image_bytes_msb_first_padded_rows() {
        let mut fb = FrameBuffer::new(10, 2, BinaryColor::Off);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(9, 1), BinaryColor::On).draw(&mut fb).unwrap();
        assert_eq!(fb.to_image_bytes(), vec![0x80, 0x00, 0x00, 0x40]);
    }
}
