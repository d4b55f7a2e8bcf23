// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Cadenza plays music on a MIDI synthesizer in real time.
//!
//! Build your music out of [Note]s, [NoteGroup]s, [Bar]s, [Track]s, and
//! [Composition]s, then hand it to a [Sequencer], which turns it into note-on,
//! note-off, program, and controller messages for a [MidiDevice].
//!
//! * *One voice*: [Sequencer::play_bar()] walks a bar one note group at a
//! time, sleeping between each note's start and stop.
//! * *Many voices*: [Sequencer::play_bars()] polls a shared clock and starts
//! and stops every voice's notes as the clock passes through them, so no
//! voice ever waits on another.
//! * *Whole songs*: [Sequencer::play_tracks()] and
//! [Sequencer::play_composition()] select each track's instrument and then
//! feed the tracks to the multi-voice scheduler one bar at a time.
//!
//! The crate doesn't talk to hardware itself. Implement [MidiDevice] for your
//! synthesizer, or use the `cadenza-services` crate, which wraps
//! [midir](https://crates.io/crates/midir).

/// A collection of imports that are useful to users of this crate. `use
/// cadenza::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        composition::prelude::*, error::prelude::*, playback::prelude::*, traits::prelude::*,
        types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    composition::{Bar, BarEntry, Composition, MidiInstrument, Note, NoteGroup, Track},
    playback::Sequencer,
    traits::{Clock, MidiDevice},
};

pub mod composition;
pub mod error;
pub mod playback;
pub mod traits;
pub mod types;
pub mod util;
