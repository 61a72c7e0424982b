/*
 *  meter.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  16 channel level meter, pixel bars with peak caps or
 *  character cell bars built from the CGRAM ramp
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

use crate::barchars::{BAR_CHARS, EMPTY, FULL, LEVELS_PER_CELL};
use crate::display::{DisplayError, LcdKind, LcdSurface};
use crate::midimonitor::{MidiMonitor, CHANNEL_COUNT};
use crate::ticks::Tick;

pub const BAR_SPACING: u32 = 2;
pub const BAR_X_OFFSET: u32 = 2;

/// Where the bars go. `bar_height` is pixels on graphical panels, rows on character panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterLayout {
    pub x_offset: u32,
    pub y_offset: u32,
    pub bar_spacing: u32,
    pub bar_height: u32,
    /// Keep a minimal bar visible for silent channels
    pub draw_bar_bases: bool,
}

impl MeterLayout {
    /// Full-panel meter for the given surface.
    pub fn for_surface<L: LcdSurface + ?Sized>(lcd: &L) -> Self {
        let (_, height) = lcd.dimensions();
        match lcd.kind() {
            LcdKind::Graphical => Self {
                x_offset: BAR_X_OFFSET,
                y_offset: 0,
                bar_spacing: BAR_SPACING,
                bar_height: height,
                draw_bar_bases: true,
            },
            LcdKind::Character => Self {
                x_offset: 0,
                y_offset: 0,
                bar_spacing: 0,
                bar_height: height,
                draw_bar_bases: true,
            },
        }
    }
}

/// Width of each bar when `channels` bars and their gaps share the panel.
pub fn bar_width(surface_width: u32, channels: usize, bar_spacing: u32) -> u32 {
    if channels == 0 {
        return 0;
    }
    let channels = channels as u32;
    surface_width.saturating_sub(channels * bar_spacing) / channels
}

/// Query the monitor at `now` and draw the first `channels` meters.
pub fn draw_channel_levels<L: LcdSurface + ?Sized>(
    lcd: &mut L,
    monitor: &mut MidiMonitor,
    layout: &MeterLayout,
    now: Tick,
    channels: usize,
) -> Result<(), DisplayError> {
    let readings = monitor.channel_levels(now);
    let channels = channels.min(CHANNEL_COUNT);

    match lcd.kind() {
        LcdKind::Graphical => {
            let (width, _) = lcd.dimensions();
            let width = bar_width(width, channels, layout.bar_spacing);
            draw_channel_levels_graphical(lcd, layout, width, &readings.levels, Some(&readings.peaks), channels)
        }
        LcdKind::Character => draw_channel_levels_character(lcd, layout, &readings.levels, channels),
    }
}

/// Filled bars growing up from the bottom, with a one pixel peak cap.
pub fn draw_channel_levels_graphical<L: LcdSurface + ?Sized>(
    lcd: &mut L,
    layout: &MeterLayout,
    bar_width: u32,
    levels: &[f32],
    peaks: Option<&[f32]>,
    channels: usize,
) -> Result<(), DisplayError> {
    if bar_width == 0 || layout.bar_height == 0 {
        return Ok(());
    }
    let (surface_width, _) = lcd.dimensions();
    let bar_max_y = layout.bar_height - 1;

    for (channel, &level) in levels.iter().enumerate().take(channels) {
        let level_pixels = to_pixels(level, bar_max_y);
        let x1 = layout.x_offset + channel as u32 * (bar_width + layout.bar_spacing);
        let x2 = x1 + bar_width - 1;
        if x2 >= surface_width {
            break;
        }

        if level_pixels > 0 || layout.draw_bar_bases {
            let y1 = layout.y_offset + (bar_max_y - level_pixels);
            let y2 = y1 + level_pixels;
            lcd.draw_filled_rect(x1, y1, x2, y2)?;
        }

        if let Some(&peak) = peaks.and_then(|p| p.get(channel)) {
            let peak_pixels = to_pixels(peak, bar_max_y);
            if peak_pixels > 0 {
                let y = layout.y_offset + (bar_max_y - peak_pixels);
                lcd.draw_filled_rect(x1, y, x2, y)?;
            }
        }
    }
    Ok(())
}

#[inline]
fn to_pixels(level: f32, bar_max_y: u32) -> u32 {
    (level.clamp(0.0, 1.0) * bar_max_y as f32).round() as u32
}

/// One character column per channel, eight sub-levels per cell.
///
/// Rows `y_offset..y_offset + bar_height` are rewritten in full; columns that
/// would fall past the right edge are dropped.
pub fn draw_channel_levels_character<L: LcdSurface + ?Sized>(
    lcd: &mut L,
    layout: &MeterLayout,
    levels: &[f32],
    channels: usize,
) -> Result<(), DisplayError> {
    let (columns, _) = lcd.dimensions();
    let rows = layout.bar_height as usize;
    if rows == 0 {
        return Ok(());
    }
    let bar_levels = layout.bar_height * LEVELS_PER_CELL;

    let mut lines = vec![vec![b' '; columns as usize]; rows];

    for (channel, &level) in levels.iter().enumerate().take(channels) {
        let column = (layout.x_offset + channel as u32 * (1 + layout.bar_spacing)) as usize;
        if column >= columns as usize {
            break;
        }

        let mut level_cells = (level.clamp(0.0, 1.0) * bar_levels as f32) as u32;
        if layout.draw_bar_bases && level_cells == 0 {
            level_cells = 1;
        }

        let full_rows = (level_cells / LEVELS_PER_CELL) as usize;
        let remainder = (level_cells % LEVELS_PER_CELL) as usize;

        for j in 0..rows {
            lines[rows - j - 1][column] = if j < full_rows { FULL } else { EMPTY };
        }
        if remainder > 0 {
            lines[rows - full_rows - 1][column] = BAR_CHARS[remainder];
        }
    }

    for (row, line) in lines.iter().enumerate() {
        let text = std::str::from_utf8(line).map_err(|e| DisplayError::DrawingError(e.to_string()))?;
        lcd.print(text, 0, layout.y_offset + row as u32, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::MockLcd;
    use crate::midi::{cc, ShortMessage};

    fn graphical_layout(bar_height: u32) -> MeterLayout {
        MeterLayout {
            x_offset: BAR_X_OFFSET,
            y_offset: 0,
            bar_spacing: BAR_SPACING,
            bar_height,
            draw_bar_bases: true,
        }
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(128, 16, 2), 6);
        assert_eq!(bar_width(128, 9, 2), 12);
        assert_eq!(bar_width(10, 16, 2), 0);
        assert_eq!(bar_width(128, 0, 2), 0);
    }

    #[test]
    fn test_graphical_bars_and_bases() {
        let mut lcd = MockLcd::graphical(128, 32);
        let mut levels = [0.0f32; 16];
        levels[0] = 1.0;
        levels[1] = 0.5;

        draw_channel_levels_graphical(&mut lcd, &graphical_layout(32), 6, &levels, None, 3).unwrap();

        assert_eq!(
            lcd.rects(),
            vec![
                (2, 0, 7, 31),    // full bar
                (10, 15, 15, 31), // round(0.5 * 31) = 16 pixels above the base row
                (18, 31, 23, 31), // idle channel base
            ]
        );
    }

    #[test]
    fn test_graphical_without_bases_skips_idle() {
        let mut lcd = MockLcd::graphical(128, 32);
        let mut layout = graphical_layout(32);
        layout.draw_bar_bases = false;
        let levels = [0.0f32; 16];
        draw_channel_levels_graphical(&mut lcd, &layout, 6, &levels, None, 16).unwrap();
        assert!(lcd.rects().is_empty());
    }

    #[test]
    fn test_graphical_peak_caps() {
        let mut lcd = MockLcd::graphical(128, 64);
        let levels = [0.0f32; 16];
        let mut peaks = [0.0f32; 16];
        peaks[0] = 1.0;
        peaks[1] = 0.0;

        draw_channel_levels_graphical(&mut lcd, &graphical_layout(64), 6, &levels, Some(&peaks), 2).unwrap();

        assert_eq!(
            lcd.rects(),
            vec![
                (2, 63, 7, 63), // base
                (2, 0, 7, 0),   // peak at the top
                (10, 63, 15, 63),
            ]
        );
    }

    #[test]
    fn test_graphical_y_offset() {
        let mut lcd = MockLcd::graphical(128, 64);
        let mut layout = graphical_layout(32);
        layout.y_offset = 32;
        let levels = [1.0f32; 16];
        draw_channel_levels_graphical(&mut lcd, &layout, 6, &levels, None, 1).unwrap();
        assert_eq!(lcd.rects(), vec![(2, 32, 7, 63)]);
    }

    #[test]
    fn test_graphical_drops_bars_past_the_edge() {
        let mut lcd = MockLcd::graphical(128, 32);
        let mut layout = graphical_layout(32);
        layout.x_offset = 10;
        let levels = [1.0f32; 16];
        draw_channel_levels_graphical(&mut lcd, &layout, 6, &levels, None, 16).unwrap();

        let rects = lcd.rects();
        assert_eq!(rects.len(), 15);
        assert_eq!(rects[14], (122, 0, 127, 31));
    }

    #[test]
    fn test_character_zero_height_draws_nothing() {
        let mut lcd = MockLcd::character(20, 2);
        let layout = MeterLayout {
            x_offset: 0,
            y_offset: 0,
            bar_spacing: 0,
            bar_height: 0,
            draw_bar_bases: true,
        };
        draw_channel_levels_character(&mut lcd, &layout, &[0.0; 16], 16).unwrap();
        assert!(lcd.prints().is_empty());
    }

    #[test]
    fn test_character_bars() {
        let mut lcd = MockLcd::character(20, 2);
        let layout = MeterLayout::for_surface(&lcd);
        let mut levels = [0.0f32; 16];
        levels[0] = 1.0; // 16 sub-levels: two full cells
        levels[1] = 0.5; // 8: one full cell
        levels[2] = 0.25; // 4: half cell
        levels[3] = 0.6875; // 11: full + 3
        // channel 4 silent, bar base shows the lowest glyph

        draw_channel_levels_character(&mut lcd, &layout, &levels, 5).unwrap();

        let prints = lcd.prints();
        assert_eq!(prints.len(), 2);
        let top = prints[0].0.as_bytes();
        let bottom = prints[1].0.as_bytes();
        assert_eq!((prints[0].1, prints[0].2, prints[0].3), (0, 0, false));
        assert_eq!((prints[1].1, prints[1].2), (0, 1));
        assert_eq!(top.len(), 20);

        assert_eq!(&top[..5], &[FULL, EMPTY, EMPTY, BAR_CHARS[3], EMPTY]);
        assert_eq!(&bottom[..5], &[FULL, FULL, BAR_CHARS[4], FULL, BAR_CHARS[1]]);
        assert!(top[5..].iter().all(|&c| c == b' '));
    }

    #[test]
    fn test_character_spacing_and_clipping() {
        let mut lcd = MockLcd::character(8, 1);
        let layout = MeterLayout {
            x_offset: 1,
            y_offset: 0,
            bar_spacing: 2,
            bar_height: 1,
            draw_bar_bases: false,
        };
        let levels = [1.0f32; 16];
        draw_channel_levels_character(&mut lcd, &layout, &levels, 16).unwrap();

        let line = lcd.prints()[0].0.clone().into_bytes();
        assert_eq!(line, vec![b' ', FULL, b' ', b' ', FULL, b' ', b' ', FULL]);
    }

    #[test]
    fn test_character_first_row_offset() {
        let mut lcd = MockLcd::character(20, 4);
        let layout = MeterLayout {
            x_offset: 0,
            y_offset: 2,
            bar_spacing: 0,
            bar_height: 2,
            draw_bar_bases: true,
        };
        draw_channel_levels_character(&mut lcd, &layout, &[0.0; 16], 16).unwrap();
        let rows: Vec<u32> = lcd.prints().iter().map(|p| p.2).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_draw_channel_levels_dispatch() {
        let mut monitor = MidiMonitor::default();
        monitor.on_message(ShortMessage::control_change(0, cc::VOLUME, 127), 0);
        monitor.on_message(ShortMessage::note_on(0, 60, 127), 0);

        let mut lcd = MockLcd::graphical(128, 32);
        let layout = MeterLayout::for_surface(&lcd);
        draw_channel_levels(&mut lcd, &mut monitor, &layout, 0, 16).unwrap();
        let rects = lcd.rects();
        // bar and peak for channel 0, bases for the other fifteen
        assert_eq!(rects.len(), 17);
        assert_eq!(rects[0], (2, 0, 7, 31));
        assert_eq!(rects[1], (2, 0, 7, 0));
        assert_eq!(rects[16], (122, 31, 127, 31));

        let mut lcd = MockLcd::character(20, 2);
        let layout = MeterLayout::for_surface(&lcd);
        draw_channel_levels(&mut lcd, &mut monitor, &layout, 0, 16).unwrap();
        assert_eq!(lcd.prints().len(), 2);
        assert_eq!(lcd.prints()[0].0.as_bytes()[0], FULL);
    }
}
