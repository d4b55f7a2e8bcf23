// Copyright (c) 2024 Mike Tsao

use crate::{
    error::DeviceError,
    traits::MidiDevice,
    types::{checked_u7, MidiChannel},
};
use bit_vec::BitVec;

/// One call that a [RecordingDevice] accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DeviceCall {
    NoteOn {
        channel: MidiChannel,
        key: u8,
        velocity: u8,
    },
    NoteOff {
        channel: MidiChannel,
        key: u8,
    },
    ProgramSelect {
        channel: MidiChannel,
        bank: u16,
        program: u8,
    },
    ControlChange {
        channel: MidiChannel,
        controller: u8,
        value: u8,
    },
}
impl DeviceCall {
    /// Whether this is a note-on.
    pub fn is_note_on(&self) -> bool {
        matches!(self, Self::NoteOn { .. })
    }

    /// Whether this is a note-off.
    pub fn is_note_off(&self) -> bool {
        matches!(self, Self::NoteOff { .. })
    }
}

/// A [MidiDevice] that makes no sound. It remembers every call it accepted,
/// and which notes should be sounding as a result.
///
/// It checks arguments the way a real device would: channels 1..=16, and
/// keys, velocities, programs, controllers, and values 0..=127. Rejected calls
/// aren't recorded.
///
/// Sounding notes are tracked per channel. A note-on with velocity zero counts
/// as a note-off, and repeated note-ons or stray note-offs are harmless.
#[derive(Debug)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    active_notes: Vec<BitVec>,
    note_on_attempts: usize,
    fail_note_on_at: Option<usize>,
    is_disconnected: bool,
}
impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            calls: Vec::default(),
            active_notes: vec![BitVec::from_elem(128, false); MidiChannel::COUNT],
            note_on_attempts: 0,
            fail_note_on_at: None,
            is_disconnected: false,
        }
    }
}
impl RecordingDevice {
    /// Makes the `n`th note-on from now (zero-based) fail with
    /// [DeviceError::Io].
    pub fn fail_nth_note_on(&mut self, n: usize) {
        self.fail_note_on_at = Some(self.note_on_attempts + n);
    }

    /// Makes every subsequent call fail with [DeviceError::Disconnected], or
    /// succeed again.
    pub fn set_disconnected(&mut self, is_disconnected: bool) {
        self.is_disconnected = is_disconnected;
    }

    /// Every accepted call, in order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forgets the recorded calls. Sounding notes are unaffected.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The accepted note-ons, in order.
    pub fn note_ons(&self) -> Vec<DeviceCall> {
        self.calls.iter().copied().filter(DeviceCall::is_note_on).collect()
    }

    /// The accepted note-offs, in order.
    pub fn note_offs(&self) -> Vec<DeviceCall> {
        self.calls
            .iter()
            .copied()
            .filter(DeviceCall::is_note_off)
            .collect()
    }

    /// Whether `key` is sounding on `channel`.
    pub fn is_sounding(&self, channel: MidiChannel, key: u8) -> bool {
        channel.is_valid()
            && self.active_notes[(channel.0 - 1) as usize]
                .get(key as usize)
                .unwrap_or_default()
    }

    /// Every sounding note as (channel, key), ordered by channel and then key.
    pub fn sounding_notes(&self) -> Vec<(MidiChannel, u8)> {
        MidiChannel::all()
            .zip(self.active_notes.iter())
            .flat_map(|(channel, keys)| {
                keys.iter()
                    .enumerate()
                    .filter(|(_, is_active)| *is_active)
                    .map(move |(key, _)| (channel, key as u8))
            })
            .collect()
    }

    /// Whether nothing is sounding anywhere.
    pub fn is_silent(&self) -> bool {
        self.active_notes.iter().all(BitVec::none)
    }

    fn check_connected(&self) -> Result<(), DeviceError> {
        if self.is_disconnected {
            Err(DeviceError::Disconnected)
        } else {
            Ok(())
        }
    }

    fn set_active(&mut self, channel: MidiChannel, key: u8, is_active: bool) {
        self.active_notes[(channel.0 - 1) as usize].set(key as usize, is_active);
    }
}
impl MidiDevice for RecordingDevice {
    fn note_on(
        &mut self,
        channel: MidiChannel,
        key: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        self.check_connected()?;
        channel.wire()?;
        checked_u7("key", key as u16)?;
        checked_u7("velocity", velocity as u16)?;

        let attempt = self.note_on_attempts;
        self.note_on_attempts += 1;
        if self.fail_note_on_at == Some(attempt) {
            return Err(DeviceError::Io(format!("note-on #{attempt} was set to fail")));
        }

        self.set_active(channel, key, velocity != 0);
        self.calls.push(DeviceCall::NoteOn {
            channel,
            key,
            velocity,
        });
        Ok(())
    }

    fn note_off(&mut self, channel: MidiChannel, key: u8) -> Result<(), DeviceError> {
        self.check_connected()?;
        channel.wire()?;
        checked_u7("key", key as u16)?;

        self.set_active(channel, key, false);
        self.calls.push(DeviceCall::NoteOff { channel, key });
        Ok(())
    }

    fn program_select(
        &mut self,
        channel: MidiChannel,
        bank: u16,
        program: u8,
    ) -> Result<(), DeviceError> {
        self.check_connected()?;
        channel.wire()?;
        if bank > 0x3fff {
            return Err(DeviceError::OutOfRange {
                what: "bank",
                value: bank,
            });
        }
        checked_u7("program", program as u16)?;

        self.calls.push(DeviceCall::ProgramSelect {
            channel,
            bank,
            program,
        });
        Ok(())
    }

    fn control_change(
        &mut self,
        channel: MidiChannel,
        controller: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        self.check_connected()?;
        channel.wire()?;
        checked_u7("controller", controller as u16)?;
        checked_u7("value", value as u16)?;

        self.calls.push(DeviceCall::ControlChange {
            channel,
            controller,
            value,
        });
        Ok(())
    }
}
