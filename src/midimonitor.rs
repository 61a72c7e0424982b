/*
 *  midimonitor.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-channel note tracking and level/peak derivation for the meter
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

use crate::midi::{cc, MidiEvent, ShortMessage};
use crate::ticks::{elapsed, is_before, ticks_to_millis, Tick};

pub const CHANNEL_COUNT: usize = 16;
pub const NOTE_COUNT: usize = 128;

// TODO: follow the synth's drum channel map once it can be remapped
pub const PERCUSSION_CHANNEL: usize = 9;

pub const DEFAULT_VOLUME: u8 = 100;
pub const DEFAULT_PAN: u8 = 64;
pub const DEFAULT_EXPRESSION: u8 = 127;

/// Envelope and peak meter timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTimings {
    pub decay_release_ms: f32,
    pub peak_hold_ms: f32,
    pub peak_falloff_ms: f32,
}

impl Default for EnvelopeTimings {
    fn default() -> Self {
        Self {
            decay_release_ms: 1000.0,
            peak_hold_ms: 1000.0,
            peak_falloff_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteState {
    /// Tick of the latest Note-On; `None` until the note sounds.
    pub on_time: Option<Tick>,
    /// Tick of the latest Note-Off; `None` while the key is held.
    pub off_time: Option<Tick>,
    pub velocity: u8,
}

#[derive(Debug, Clone)]
pub struct ChannelState {
    pub notes: [NoteState; NOTE_COUNT],
    pub volume: u8,
    pub pan: u8,
    pub expression: u8,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            notes: [NoteState::default(); NOTE_COUNT],
            volume: DEFAULT_VOLUME,
            pan: DEFAULT_PAN,
            expression: DEFAULT_EXPRESSION,
        }
    }
}

impl ChannelState {
    fn notes_off(&mut self) {
        self.notes.fill(NoteState::default());
    }

    /// Reset All Controllers leaves volume and pan alone (MIDI 1.0 RP-015).
    fn reset_controllers(&mut self, is_reset_all_controllers: bool) {
        self.expression = DEFAULT_EXPRESSION;
        if !is_reset_all_controllers {
            self.volume = DEFAULT_VOLUME;
            self.pan = DEFAULT_PAN;
        }
    }
}

/// One meter reading: instantaneous loudness and held peak per channel, 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLevels {
    pub levels: [f32; CHANNEL_COUNT],
    pub peaks: [f32; CHANNEL_COUNT],
}

/// Quadratic ease-out: 0 -> 0, 1 -> 1, concave in between.
#[inline]
pub fn ease(x: f32) -> f32 {
    -((x - 1.0) * (x - 1.0)) + 1.0
}

/// Tracks note activity for all 16 channels and turns it into meter levels.
///
/// Single owner, no interior locking: MIDI ingestion and level queries must
/// be serialized by the caller.
#[derive(Debug, Clone)]
pub struct MidiMonitor {
    channels: [ChannelState; CHANNEL_COUNT],
    peak_levels: [f32; CHANNEL_COUNT],
    peak_times: [Tick; CHANNEL_COUNT],
    timings: EnvelopeTimings,
}

impl Default for MidiMonitor {
    fn default() -> Self {
        Self::new(EnvelopeTimings::default())
    }
}

impl MidiMonitor {
    pub fn new(timings: EnvelopeTimings) -> Self {
        Self {
            channels: std::array::from_fn(|_| ChannelState::default()),
            peak_levels: [0.0; CHANNEL_COUNT],
            peak_times: [0; CHANNEL_COUNT],
            timings,
        }
    }

    pub fn timings(&self) -> &EnvelopeTimings {
        &self.timings
    }

    pub fn channel(&self, channel: usize) -> &ChannelState {
        &self.channels[channel & 0x0F]
    }

    /// Feed one packed short message received at tick `now`.
    pub fn on_short_message(&mut self, packed: u32, now: Tick) {
        self.on_message(ShortMessage::unpack(packed), now);
    }

    pub fn on_message(&mut self, msg: ShortMessage, now: Tick) {
        match msg.decode() {
            MidiEvent::NoteOff { channel, note } => {
                self.channels[channel as usize].notes[note as usize].off_time = Some(now);
            }
            MidiEvent::NoteOn { channel, note, velocity } => {
                let state = &mut self.channels[channel as usize].notes[note as usize];
                state.on_time = Some(now);
                state.off_time = None;
                state.velocity = velocity;
            }
            MidiEvent::ControlChange { channel, controller, value } => {
                self.process_cc(channel as usize, controller, value);
            }
            MidiEvent::SystemReset => {
                debug!("System reset, clearing all channels");
                for channel in self.channels.iter_mut() {
                    channel.notes_off();
                    channel.reset_controllers(false);
                }
            }
            MidiEvent::Unhandled => {}
        }
    }

    fn process_cc(&mut self, channel: usize, controller: u8, value: u8) {
        let state = &mut self.channels[channel];

        match controller {
            cc::VOLUME => state.volume = value,
            cc::PAN => state.pan = value,
            cc::EXPRESSION => state.expression = value,

            // Every channel mode message implies All Notes Off
            cc::ALL_SOUND_OFF
            | cc::ALL_NOTES_OFF
            | cc::OMNI_OFF
            | cc::OMNI_ON
            | cc::MONO_ON
            | cc::MONO_OFF => state.notes_off(),

            cc::RESET_ALL_CONTROLLERS => state.reset_controllers(true),

            _ => {}
        }
    }

    /// Loudness and peak for every channel at tick `now`.
    ///
    /// Querying advances the peak meters: a peak older than the hold time
    /// falls linearly, and any level at or above the (fallen) peak becomes
    /// the new peak and restarts its hold timer.
    pub fn channel_levels(&mut self, now: Tick) -> ChannelLevels {
        let mut out = ChannelLevels {
            levels: [0.0; CHANNEL_COUNT],
            peaks: [0.0; CHANNEL_COUNT],
        };

        for index in 0..CHANNEL_COUNT {
            let level = self.channel_loudness(index, now);

            let mut peak = self.peak_levels[index];
            let held_ms = ticks_to_millis(elapsed(now, self.peak_times[index]));

            if held_ms >= self.timings.peak_hold_ms {
                let fall_ms = (held_ms - self.timings.peak_hold_ms).max(0.0);
                peak = (peak - fall_ms / self.timings.peak_falloff_ms).clamp(0.0, 1.0);
            }

            if level >= peak {
                peak = level;
                self.peak_levels[index] = level;
                self.peak_times[index] = now;
            }

            out.levels[index] = level;
            out.peaks[index] = peak;
        }

        out
    }

    /// Loudest voice on a channel, not the sum of voices.
    fn channel_loudness(&self, index: usize, now: Tick) -> f32 {
        let channel = &self.channels[index];
        let is_percussion = index == PERCUSSION_CHANNEL;
        let gain = (channel.volume as f32 / 127.0) * (channel.expression as f32 / 127.0);

        channel
            .notes
            .iter()
            .map(|note| {
                let envelope = if is_percussion {
                    self.percussion_envelope(note, now)
                } else {
                    self.envelope(note, now)
                };
                envelope * (note.velocity as f32 / 127.0) * gain
            })
            .fold(0.0_f32, f32::max)
            .clamp(0.0, 1.0)
    }

    /// Instant-on plateau while gated, eased release after Note-Off.
    pub fn envelope(&self, note: &NoteState, now: Tick) -> f32 {
        let Some(on_time) = note.on_time else {
            return 0.0;
        };
        let now = clamp_to_onset(now, on_time);

        match note.off_time {
            None => 1.0,
            Some(off_time) => self.release(elapsed(now, off_time)),
        }
    }

    /// Drums have no gate: the release starts at the onset.
    pub fn percussion_envelope(&self, note: &NoteState, now: Tick) -> f32 {
        let Some(on_time) = note.on_time else {
            return 0.0;
        };
        let now = clamp_to_onset(now, on_time);
        self.release(elapsed(now, on_time))
    }

    fn release(&self, since: Tick) -> f32 {
        let decay = self.timings.decay_release_ms;
        let elapsed_ms = ticks_to_millis(since).min(decay);
        ease((1.0 - elapsed_ms / decay).max(0.0))
    }
}

/// A query from before the onset reads as the onset itself.
#[inline]
fn clamp_to_onset(now: Tick, on_time: Tick) -> Tick {
    if is_before(now, on_time) { on_time } else { now }
}
