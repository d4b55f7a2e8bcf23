// Copyright (c) 2024 Mike Tsao

use serde::{Deserialize, Serialize};

/// The General MIDI instrument names, indexed by program number.
/// <https://en.wikipedia.org/wiki/General_MIDI#Program_change_events>
pub const GENERAL_MIDI_NAMES: [&str; 128] = [
    // Piano
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavi",
    // Chromatic percussion
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    // Organ
    "Drawbar Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion",
    "Harmonica",
    "Tango Accordion",
    // Guitar
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar harmonics",
    // Bass
    "Acoustic Bass",
    "Electric Bass (finger)",
    "Electric Bass (pick)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    // Strings
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    // Ensemble
    "String Ensemble 1",
    "String Ensemble 2",
    "SynthStrings 1",
    "SynthStrings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    // Brass
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "SynthBrass 1",
    "SynthBrass 2",
    // Reed
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    // Pipe
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    // Synth lead
    "Lead1 (square)",
    "Lead2 (sawtooth)",
    "Lead3 (calliope)",
    "Lead4 (chiff)",
    "Lead5 (charang)",
    "Lead6 (voice)",
    "Lead7 (fifths)",
    "Lead8 (bass + lead)",
    // Synth pad
    "Pad1 (new age)",
    "Pad2 (warm)",
    "Pad3 (polysynth)",
    "Pad4 (choir)",
    "Pad5 (bowed)",
    "Pad6 (metallic)",
    "Pad7 (halo)",
    "Pad8 (sweep)",
    // Synth effects
    "FX1 (rain)",
    "FX2 (soundtrack)",
    "FX3 (crystal)",
    "FX4 (atmosphere)",
    "FX5 (brightness)",
    "FX6 (goblins)",
    "FX7 (echoes)",
    "FX8 (sci-fi)",
    // Ethnic
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bag pipe",
    "Fiddle",
    "Shanai",
    // Percussive
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    // Sound effects
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

/// A [MidiInstrument] names one of the General MIDI instruments.
///
/// The name is kept as given; [MidiInstrument::program()] looks it up when
/// it's time to play. Names that aren't in [GENERAL_MIDI_NAMES] aren't an
/// error, they just don't resolve to a program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MidiInstrument {
    /// The General MIDI name, such as "Vibraphone".
    pub name: String,
}
impl MidiInstrument {
    /// Creates a [MidiInstrument] with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Creates a [MidiInstrument] from a program number. Returns None if the
    /// number is past the end of the table.
    pub fn new_with_program(program: u8) -> Option<Self> {
        GENERAL_MIDI_NAMES
            .get(program as usize)
            .map(|name| Self::new(name))
    }

    /// The zero-based program number of this instrument, if its name is a
    /// General MIDI name. The match is exact.
    pub fn program(&self) -> Option<u8> {
        GENERAL_MIDI_NAMES
            .iter()
            .position(|name| *name == self.name)
            .map(|index| index as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_midi_table_has_no_duplicates() {
        let mut names = GENERAL_MIDI_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 128);
    }

    #[test]
    fn names_resolve_to_programs() {
        assert_eq!(MidiInstrument::new("Acoustic Grand Piano").program(), Some(0));
        assert_eq!(MidiInstrument::new("Vibraphone").program(), Some(11));
        assert_eq!(MidiInstrument::new("Gunshot").program(), Some(127));
        assert_eq!(MidiInstrument::new("Kazoo").program(), None);
        assert_eq!(MidiInstrument::new("vibraphone").program(), None);
    }

    #[test]
    fn programs_resolve_to_names() {
        assert_eq!(
            MidiInstrument::new_with_program(40),
            Some(MidiInstrument::new("Violin"))
        );
        assert_eq!(MidiInstrument::new_with_program(128), None);
    }
}
