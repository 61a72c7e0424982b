/*
 *  ticks.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Device clock ticks and millisecond conversions
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

/// Free-running device clock value. Wraps after roughly 71 minutes.
pub type Tick = u32;

/// Clock resolution of the tick source (1 MHz, one tick per microsecond).
pub const CLOCK_HZ: u32 = 1_000_000;

const TICKS_PER_MILLI: u32 = CLOCK_HZ / 1000;

#[inline]
pub const fn millis_to_ticks(millis: u32) -> Tick {
    millis.wrapping_mul(TICKS_PER_MILLI)
}

#[inline]
pub fn ticks_to_millis(ticks: Tick) -> f32 {
    ticks as f32 / TICKS_PER_MILLI as f32
}

/// Ticks elapsed from `since` to `now`, tolerant of counter wrap.
#[inline]
pub const fn elapsed(now: Tick, since: Tick) -> Tick {
    now.wrapping_sub(since)
}

/// True when `tick` falls before `reference`, judged within half the counter range.
#[inline]
pub const fn is_before(tick: Tick, reference: Tick) -> bool {
    (tick.wrapping_sub(reference) as i32) < 0
}
