/*
 *  midi.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Packed MIDI short message decoding
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

pub const STATUS_NOTE_OFF: u8 = 0x80;
pub const STATUS_NOTE_ON: u8 = 0x90;
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
pub const STATUS_SYSTEM_RESET: u8 = 0xFF;

/// Controller numbers the level engine reacts to
pub mod cc {
    pub const VOLUME: u8 = 7;
    pub const PAN: u8 = 10;
    pub const EXPRESSION: u8 = 11;
    pub const ALL_SOUND_OFF: u8 = 120;
    pub const RESET_ALL_CONTROLLERS: u8 = 121;
    pub const ALL_NOTES_OFF: u8 = 123;
    pub const OMNI_OFF: u8 = 124;
    pub const OMNI_ON: u8 = 125;
    pub const MONO_ON: u8 = 126;
    pub const MONO_OFF: u8 = 127;
}

/// A 3-byte MIDI message packed as `status | data1 << 8 | data2 << 16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShortMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

/// What the level engine cares about in a short message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOff { channel: u8, note: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    SystemReset,
    Unhandled,
}

impl ShortMessage {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self { status, data1, data2 }
    }

    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(STATUS_NOTE_ON | (channel & 0x0F), note, velocity)
    }

    pub const fn note_off(channel: u8, note: u8) -> Self {
        Self::new(STATUS_NOTE_OFF | (channel & 0x0F), note, 0)
    }

    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(STATUS_CONTROL_CHANGE | (channel & 0x0F), controller, value)
    }

    pub const fn system_reset() -> Self {
        Self::new(STATUS_SYSTEM_RESET, 0, 0)
    }

    pub const fn unpack(packed: u32) -> Self {
        Self {
            status: (packed & 0xFF) as u8,
            data1: ((packed >> 8) & 0xFF) as u8,
            data2: ((packed >> 16) & 0xFF) as u8,
        }
    }

    pub const fn pack(self) -> u32 {
        self.status as u32 | (self.data1 as u32) << 8 | (self.data2 as u32) << 16
    }

    #[inline]
    pub const fn channel(self) -> u8 {
        self.status & 0x0F
    }

    /// Classify the message. Data bytes are masked to 7 bits so a malformed
    /// message can never address a note or controller outside 0..=127.
    pub fn decode(self) -> MidiEvent {
        // System Reset shares the 0xF0 high nibble with every other system
        // message, so it has to be matched on the whole status byte.
        if self.status == STATUS_SYSTEM_RESET {
            return MidiEvent::SystemReset;
        }

        let channel = self.channel();
        let data1 = self.data1 & 0x7F;
        let data2 = self.data2 & 0x7F;

        match self.status & 0xF0 {
            STATUS_NOTE_OFF => MidiEvent::NoteOff { channel, note: data1 },
            STATUS_NOTE_ON if data2 == 0 => MidiEvent::NoteOff { channel, note: data1 },
            STATUS_NOTE_ON => MidiEvent::NoteOn { channel, note: data1, velocity: data2 },
            STATUS_CONTROL_CHANGE => MidiEvent::ControlChange { channel, controller: data1, value: data2 },
            _ => MidiEvent::Unhandled,
        }
    }
}

impl From<u32> for ShortMessage {
    fn from(packed: u32) -> Self {
        Self::unpack(packed)
    }
}

impl From<[u8; 3]> for ShortMessage {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}
