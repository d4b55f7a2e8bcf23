// Copyright (c) 2024 Mike Tsao

//! The traits that define the capabilities playback depends on but doesn't
//! implement.

use crate::{error::DeviceError, types::MidiChannel};
use core::time::Duration;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{Clock, MidiDevice};
}

/// A [MidiDevice] is something that makes sound from MIDI messages, such as a
/// software synthesizer or an external MIDI port.
///
/// Every method is a direct, synchronous dispatch. Implementations report
/// values they can't handle (a channel outside 1..=16, a key above 127, and so
/// on) by returning an error rather than panicking.
pub trait MidiDevice {
    /// Starts sounding `key` on `channel`.
    fn note_on(&mut self, channel: MidiChannel, key: u8, velocity: u8)
        -> Result<(), DeviceError>;

    /// Stops sounding `key` on `channel`. Stopping a key that isn't sounding
    /// is harmless.
    fn note_off(&mut self, channel: MidiChannel, key: u8) -> Result<(), DeviceError>;

    /// Selects the sound that `channel` plays.
    fn program_select(
        &mut self,
        channel: MidiChannel,
        bank: u16,
        program: u8,
    ) -> Result<(), DeviceError>;

    /// Sends a controller change, such as modulation or volume.
    fn control_change(
        &mut self,
        channel: MidiChannel,
        controller: u8,
        value: u8,
    ) -> Result<(), DeviceError>;
}
impl<D: MidiDevice + ?Sized> MidiDevice for Box<D> {
    fn note_on(
        &mut self,
        channel: MidiChannel,
        key: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        (**self).note_on(channel, key, velocity)
    }

    fn note_off(&mut self, channel: MidiChannel, key: u8) -> Result<(), DeviceError> {
        (**self).note_off(channel, key)
    }

    fn program_select(
        &mut self,
        channel: MidiChannel,
        bank: u16,
        program: u8,
    ) -> Result<(), DeviceError> {
        (**self).program_select(channel, bank, program)
    }

    fn control_change(
        &mut self,
        channel: MidiChannel,
        controller: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        (**self).control_change(channel, controller, value)
    }
}

/// A monotonic time source.
///
/// The multi-voice scheduler reads [Clock::now()] over and over to find out
/// where it is in the bar; the single-voice scheduler calls [Clock::sleep()]
/// to wait out each note. Tests substitute a clock whose time they control.
pub trait Clock {
    /// The time elapsed since some fixed origin. Never decreases.
    fn now(&self) -> Duration;

    /// Blocks for `duration`.
    fn sleep(&self, duration: Duration);

    /// Gives other threads a chance to run. Called once per pass of a polling
    /// loop.
    fn yield_now(&self) {}
}
