// Copyright (c) 2024 Mike Tsao

//! Connects cadenza to the system's MIDI outputs.
//!
//! [MidiService] owns a [midir](https://crates.io/crates/midir) output
//! connection on its own thread and takes commands over a crossbeam channel.
//! [MidiServiceDevice] is the [MidiDevice](cadenza::MidiDevice) that a
//! [Sequencer](cadenza::Sequencer) plays through to reach it.

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    pub use super::ProvidesService;
    #[cfg(feature = "midi")]
    pub use super::{
        MidiService, MidiServiceDevice, MidiServiceEvent, MidiServiceInput, MidiSettings,
    };
}

#[cfg(feature = "midi")]
pub use midi::{MidiService, MidiServiceDevice, MidiServiceEvent, MidiServiceInput, MidiSettings};
pub use traits::ProvidesService;

#[cfg(feature = "midi")]
mod midi;
mod traits;
