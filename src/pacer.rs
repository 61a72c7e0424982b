/*
 *  pacer.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame pacing for the realtime runner
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
use std::time::{Duration, Instant};

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

// I²C character modules are happy at 30fps, SPI OLEDs manage 60fps
impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: frame_for(target_fps) }
    }

    #[inline]
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Block until the next frame is due, then schedule the one after.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
        }
        // fall behind gracefully rather than bursting to catch up
        self.next_deadline = self.next_deadline.max(now) + self.frame;
    }
}

fn frame_for(fps: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / fps.max(1)) as u64)
}
