/*
 *  barchars.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Custom character glyphs for bar graphs on HD44780-style panels
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

/// Sub-row levels resolvable within one character cell
pub const LEVELS_PER_CELL: u32 = 8;

/// Bar ramp indexed by fill level: 0 = empty, 8 = full cell.
///
/// Levels 1..=8 live in CGRAM, addressed through the 0x08..=0x0F mirror so a
/// row buffer never contains a NUL.
pub const BAR_CHARS: [u8; 9] = [b' ', 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F];

pub const EMPTY: u8 = BAR_CHARS[0];
pub const FULL: u8 = BAR_CHARS[LEVELS_PER_CELL as usize];

/// 5x8 CGRAM bitmaps for levels 1..=8, top row first, bottom `n` rows lit.
pub const BAR_GLYPHS: [[u8; 8]; 8] = {
    let mut glyphs = [[0u8; 8]; 8];
    let mut level = 0;
    while level < 8 {
        let mut row = 0;
        while row < 8 {
            if row >= 7 - level {
                glyphs[level][row] = 0b11111;
            }
            row += 1;
        }
        level += 1;
    }
    glyphs
};

/// Terminal stand-in for a panel character, bar glyphs as block elements.
pub fn to_display_char(code: u8) -> char {
    const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    match code {
        0x08..=0x0F => BLOCKS[(code - 0x08) as usize],
        0x20..=0x7E => code as char,
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_fill_from_bottom() {
        assert_eq!(BAR_GLYPHS[0], [0, 0, 0, 0, 0, 0, 0, 0b11111]);
        assert_eq!(BAR_GLYPHS[3][3], 0);
        assert_eq!(BAR_GLYPHS[3][4], 0b11111);
        assert!(BAR_GLYPHS[7].iter().all(|&r| r == 0b11111));
    }

    #[test]
    fn test_ramp_ends() {
        assert_eq!(EMPTY, b' ');
        assert_eq!(FULL, 0x0F);
        assert_eq!(to_display_char(FULL), '█');
        assert_eq!(to_display_char(BAR_CHARS[1]), '▁');
        assert_eq!(to_display_char(b'A'), 'A');
    }
}
