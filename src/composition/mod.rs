// Copyright (c) 2024 Mike Tsao

//! Representation of music: notes, bars, tracks, and compositions.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Bar, BarEntry, Composition, CompositionBuilder, MidiInstrument, Note, NoteGroup, Track,
        TrackBuilder,
    };
}

pub use bar::*;
pub use instrument::*;
pub use note::*;
pub use track::*;

mod bar;
mod instrument;
mod note;
mod track;
