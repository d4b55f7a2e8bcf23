// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{MidiChannel, MidiMessage, Seconds, Tempo};
}

pub use {
    midi::{checked_u7, u4, u7, MidiChannel, MidiMessage, MidiPortDescriptor},
    time::{Seconds, Tempo},
};

mod midi;
mod time;
