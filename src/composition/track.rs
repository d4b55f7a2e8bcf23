// Copyright (c) 2024 Mike Tsao

use super::{Bar, MidiInstrument};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// The program a track plays with when it has no instrument, or when its
/// instrument's name isn't a General MIDI name.
pub const DEFAULT_PROGRAM: u8 = 1;

/// A [Track] is one musical line: a sequence of [Bar]s played by one
/// instrument.
#[derive(Clone, Debug, Default, Builder, PartialEq, Serialize, Deserialize)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    /// A label for humans.
    #[builder(setter(into))]
    pub name: String,

    /// The bars, in playing order.
    pub bars: Vec<Bar>,

    /// Who plays the bars.
    #[builder(setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<MidiInstrument>,
}
impl Track {
    /// Appends a bar.
    pub fn push_bar(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// The bar at `index`.
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// The number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the track has no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Iterates the bars in playing order.
    pub fn iter(&self) -> core::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// The program to select before playing this track. Falls back to
    /// [DEFAULT_PROGRAM].
    pub fn program(&self) -> u8 {
        self.instrument
            .as_ref()
            .and_then(MidiInstrument::program)
            .unwrap_or(DEFAULT_PROGRAM)
    }
}

/// A [Composition] is a set of [Track]s that play together.
#[derive(Clone, Debug, Default, Builder, PartialEq, Serialize, Deserialize)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Composition {
    #[allow(missing_docs)]
    #[builder(setter(into))]
    pub title: String,

    #[allow(missing_docs)]
    #[builder(setter(into))]
    pub author: String,

    /// The tracks. Track 0 decides how many bars the composition lasts.
    pub tracks: Vec<Track>,
}
impl Composition {
    /// Appends a track.
    pub fn push_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// The number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the composition has no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
