// Copyright (c) 2024 Mike Tsao

//! Errors reported by devices and by playback.

use thiserror::Error;

/// The most commonly used imports.
pub mod prelude {
    pub use super::{DeviceError, SequencerError};
}

/// A [MidiDevice](crate::traits::MidiDevice) couldn't carry out a request.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DeviceError {
    /// Channels run from 1 through 16.
    #[error("MIDI channel {0} is outside 1..=16")]
    ChannelOutOfRange(u8),

    /// A key, velocity, program, controller, or value didn't fit in its field.
    #[error("{what} {value} is out of range")]
    OutOfRange {
        /// Which argument was out of range.
        what: &'static str,
        /// The rejected value.
        value: u16,
    },

    /// Nothing is listening yet. For example, no output port has been chosen.
    #[error("no MIDI output is connected")]
    NotConnected,

    /// The device went away.
    #[error("the MIDI device has disconnected")]
    Disconnected,

    /// The underlying transport failed.
    #[error("MIDI output failed: {0}")]
    Io(String),
}

/// Why a playback operation stopped early.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SequencerError {
    /// The device refused a call. Notes that were already sent are not rolled
    /// back.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Control changes accept controllers and values from 0 through 128.
    #[error("control change {controller} = {value} is outside 0..=128")]
    ControlOutOfRange {
        #[allow(missing_docs)]
        controller: u8,
        #[allow(missing_docs)]
        value: u8,
    },

    /// The note's key was too high to be shifted into MIDI numbering.
    #[error("note key {0} can't be converted to a MIDI key")]
    KeyOutOfRange(u8),

    /// Multi-voice playback needs exactly one channel per voice.
    #[error("{voices} voices were given {channels} channels")]
    VoiceCountMismatch {
        #[allow(missing_docs)]
        voices: usize,
        #[allow(missing_docs)]
        channels: usize,
    },

    /// The tempo was zero, negative, or not a number.
    #[error("{0} BPM is not a playable tempo")]
    InvalidTempo(f64),

    /// A note's duration denominator was zero, negative, or not a number.
    #[error("duration denominator {0} is not playable")]
    InvalidDuration(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_convert() {
        let e: SequencerError = DeviceError::NotConnected.into();
        assert_eq!(e, SequencerError::Device(DeviceError::NotConnected));
        assert_eq!(e.to_string(), "no MIDI output is connected");
    }

    #[test]
    fn messages_name_the_bad_value() {
        assert_eq!(
            SequencerError::ControlOutOfRange {
                controller: 200,
                value: 10
            }
            .to_string(),
            "control change 200 = 10 is outside 0..=128"
        );
        assert_eq!(
            DeviceError::OutOfRange {
                what: "velocity",
                value: 128
            }
            .to_string(),
            "velocity 128 is out of range"
        );
    }
}
