// Copyright (c) 2024 Mike Tsao

use super::{Result, Sequencer, SequencerEvent, PITCH_OFFSET};
use crate::{
    composition::{Note, NoteGroup},
    error::SequencerError,
    traits::{Clock, MidiDevice},
    types::MidiChannel,
};

impl<D: MidiDevice, C: Clock> Sequencer<D, C> {
    fn midi_key(note: &Note) -> Result<u8> {
        note.key
            .checked_add(PITCH_OFFSET)
            .ok_or(SequencerError::KeyOutOfRange(note.key))
    }

    /// Starts `note`. Its own channel and velocity, if it has them, take
    /// precedence over the ones given here.
    pub fn play_note(&mut self, note: &Note, channel: MidiChannel, velocity: u8) -> Result<()> {
        let channel = note.channel.unwrap_or(channel);
        let velocity = note.velocity.unwrap_or(velocity);
        let key = Self::midi_key(note)?;
        self.device.note_on(channel, key, velocity)?;
        log::trace!("note on {key} at {velocity} on channel {channel}");
        self.publish(SequencerEvent::NoteOn {
            channel,
            key,
            velocity,
        });
        Ok(())
    }

    /// Stops `note`, on its own channel if it has one.
    pub fn stop_note(&mut self, note: &Note, channel: MidiChannel) -> Result<()> {
        let channel = note.channel.unwrap_or(channel);
        let key = Self::midi_key(note)?;
        self.device.note_off(channel, key)?;
        log::trace!("note off {key} on channel {channel}");
        self.publish(SequencerEvent::NoteOff { channel, key });
        Ok(())
    }

    /// Starts every note in the group. Stops at the first failure; notes
    /// already started keep sounding.
    pub fn play_note_group(
        &mut self,
        notes: &NoteGroup,
        channel: MidiChannel,
        velocity: u8,
    ) -> Result<()> {
        notes
            .iter()
            .try_for_each(|note| self.play_note(note, channel, velocity))
    }

    /// Stops every note in the group. Stops at the first failure.
    pub fn stop_note_group(&mut self, notes: &NoteGroup, channel: MidiChannel) -> Result<()> {
        notes
            .iter()
            .try_for_each(|note| self.stop_note(note, channel))
    }
}
