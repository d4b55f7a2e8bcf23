// Copyright (c) 2024 Mike Tsao

//! Turns notes, bars, tracks, and compositions into timed device calls.
//!
//! Everything here runs on the caller's thread. [Sequencer::play_bar()]
//! sleeps between notes, so a bar takes as long to play as it takes to hear.
//! [Sequencer::play_bars()] plays several voices at once by polling the clock
//! and deciding, on each pass, which groups need to start and which need to
//! stop.

use crate::{error::SequencerError, types::MidiChannel};
use core::time::Duration;
use strum_macros::{Display, EnumIter, FromRepr, IntoStaticStr};

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Controller, PlaybackStatus, Sequencer, SequencerEvent};
}

pub use sequencer::Sequencer;

mod bar;
mod scheduler;
mod sequencer;
mod voice;
mod walkers;

/// Added to a [Note](crate::Note)'s key to get its MIDI key.
pub const PITCH_OFFSET: u8 = 12;

/// The result of every playback operation.
pub type Result<T> = core::result::Result<T, SequencerError>;

/// How a track or composition finished playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Every bar played.
    Completed,
    /// The caller asked to stop before the bar at this index.
    Halted {
        #[allow(missing_docs)]
        bar: usize,
    },
}

/// The controllers that have their own shortcut methods on [Sequencer].
#[derive(Clone, Copy, Debug, Display, EnumIter, FromRepr, IntoStaticStr, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Controller {
    Modulation = 1,
    MainVolume = 7,
    Pan = 10,
}
impl Controller {
    /// The controller number.
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Something a [Sequencer] did, published to subscribers as it happens.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum SequencerEvent {
    /// `key` is the MIDI key, after [PITCH_OFFSET] has been added.
    NoteOn {
        channel: MidiChannel,
        key: u8,
        velocity: u8,
    },
    NoteOff {
        channel: MidiChannel,
        key: u8,
    },
    ProgramChange {
        channel: MidiChannel,
        bank: u16,
        program: u8,
    },
    ControlChange {
        channel: MidiChannel,
        controller: u8,
        value: u8,
    },
    /// The single-voice player waited this long between starting and
    /// stopping a group.
    Sleep(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn controller_numbers() {
        assert_eq!(Controller::Modulation.number(), 1);
        assert_eq!(Controller::MainVolume.number(), 7);
        assert_eq!(Controller::Pan.number(), 10);
        assert_eq!(Controller::from_repr(7), Some(Controller::MainVolume));
        assert_eq!(Controller::from_repr(8), None);
        assert_eq!(Controller::iter().count(), 3);

        let name: &'static str = Controller::MainVolume.into();
        assert_eq!(name, "MainVolume");
    }
}
