// Copyright (c) 2024 Mike Tsao

use crate::error::DeviceError;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

pub use midly::{
    num::{u4, u7},
    MidiMessage,
};

/// Newtype for MIDI channel. Channels are numbered the way musicians number
/// them, 1 through 16. The wire format's 0-15 nibble is available through
/// [MidiChannel::wire()].
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default))]
pub struct MidiChannel(#[derivative(Default(value = "1"))] pub u8);
#[allow(missing_docs)]
impl MidiChannel {
    pub const MIN_VALUE: u8 = 1;
    pub const MAX_VALUE: u8 = 16; // inclusive
    pub const DRUM_VALUE: u8 = 10;
    pub const DRUM: Self = Self(Self::DRUM_VALUE);
    pub const COUNT: usize = 16;

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Whether this channel number is one a device can address.
    pub const fn is_valid(&self) -> bool {
        self.0 >= Self::MIN_VALUE && self.0 <= Self::MAX_VALUE
    }

    /// Converts to the four-bit channel field of a MIDI status byte.
    pub fn wire(&self) -> Result<u4, DeviceError> {
        if self.is_valid() {
            Ok(u4::from_int_lossy(self.0 - 1))
        } else {
            Err(DeviceError::ChannelOutOfRange(self.0))
        }
    }

    /// Every addressable channel, in order.
    pub fn all() -> impl Iterator<Item = MidiChannel> {
        (Self::MIN_VALUE..=Self::MAX_VALUE).map(MidiChannel)
    }
}
impl From<u4> for MidiChannel {
    fn from(value: u4) -> Self {
        Self(value.as_int() + 1)
    }
}

/// Range-checks a MIDI data byte. `what` names the value in the error.
pub fn checked_u7(what: &'static str, value: u16) -> Result<u7, DeviceError> {
    u8::try_from(value)
        .ok()
        .and_then(u7::try_from)
        .ok_or(DeviceError::OutOfRange { what, value })
}

/// Provides user-friendly strings for displaying available MIDI ports.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MidiPortDescriptor {
    /// The port descriptor's index.
    pub index: usize,
    /// The port descriptor's human-readable name.
    pub name: String,
}
impl std::fmt::Display for MidiPortDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
