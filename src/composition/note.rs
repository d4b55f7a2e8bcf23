// Copyright (c) 2024 Mike Tsao

use crate::types::MidiChannel;
use serde::{Deserialize, Serialize};

/// A [Note] is a single pitch, optionally carrying its own velocity and
/// channel. When present, those take precedence over whatever the
/// [Sequencer](crate::Sequencer) is asked to use.
///
/// `key` is the internal pitch number, which sits one octave below MIDI
/// numbering: key 0 is MIDI note 12, and key 48 (C in octave 4) is MIDI note
/// 60.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Note {
    /// The internal pitch number.
    pub key: u8,
    /// Overrides the velocity that the note is played with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
    /// Overrides the channel that the note is played on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<MidiChannel>,
}
impl Note {
    /// The number of pitch classes in an octave.
    pub const KEYS_IN_OCTAVE: u8 = 12;

    /// Creates a [Note] without overrides.
    pub const fn new(key: u8) -> Self {
        Self {
            key,
            velocity: None,
            channel: None,
        }
    }

    /// Creates a [Note] from a pitch class (0 = C, 11 = B) and an octave.
    pub const fn new_with_octave(pitch_class: u8, octave: u8) -> Self {
        Self::new(octave * Self::KEYS_IN_OCTAVE + pitch_class)
    }

    /// Sets the velocity override.
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Sets the channel override.
    pub fn with_channel(mut self, channel: MidiChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// The octave this note falls in.
    pub const fn octave(&self) -> u8 {
        self.key / Self::KEYS_IN_OCTAVE
    }
}
impl From<u8> for Note {
    fn from(key: u8) -> Self {
        Self::new(key)
    }
}

/// A [NoteGroup] is a set of notes that start together and stop together,
/// such as a chord. An empty group is a rest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteGroup(pub Vec<Note>);
impl NoteGroup {
    /// Creates an empty group, which plays as a rest.
    pub fn rest() -> Self {
        Self::default()
    }

    /// Adds a note to the group.
    pub fn push(&mut self, note: Note) {
        self.0.push(note);
    }

    /// Whether the group has no notes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of notes in the group.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the notes.
    pub fn iter(&self) -> core::slice::Iter<'_, Note> {
        self.0.iter()
    }
}
impl From<Note> for NoteGroup {
    fn from(note: Note) -> Self {
        Self(vec![note])
    }
}
impl From<Vec<Note>> for NoteGroup {
    fn from(notes: Vec<Note>) -> Self {
        Self(notes)
    }
}
impl From<&[u8]> for NoteGroup {
    fn from(keys: &[u8]) -> Self {
        Self(keys.iter().copied().map(Note::new).collect())
    }
}
impl FromIterator<Note> for NoteGroup {
    fn from_iter<T: IntoIterator<Item = Note>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl<'a> IntoIterator for &'a NoteGroup {
    type Item = &'a Note;
    type IntoIter = core::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
