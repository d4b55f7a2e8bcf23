// Copyright (c) 2024 Mike Tsao

use super::{PlaybackStatus, Result, Sequencer};
use crate::{
    composition::{Bar, Composition, Track},
    error::SequencerError,
    traits::{Clock, MidiDevice},
    types::MidiChannel,
};

impl<D: MidiDevice, C: Clock> Sequencer<D, C> {
    /// Plays a track's bars one after another on `channel`, at the session
    /// tempo. The track's instrument isn't selected; see
    /// [Sequencer::set_instrument()].
    pub fn play_track(&mut self, track: &Track, channel: MidiChannel) -> Result<()> {
        let tempo = self.tempo();
        Self::check_tempo(tempo)?;
        log::info!(
            "playing track \"{}\" ({} bars) on channel {channel}",
            track.name,
            track.len()
        );
        for bar in track.iter() {
            self.play_bar(bar, channel, tempo)?;
        }
        log::info!("finished track \"{}\"", track.name);
        Ok(())
    }

    /// Plays tracks together, one channel per track. See
    /// [Sequencer::play_tracks_while()].
    pub fn play_tracks(
        &mut self,
        tracks: &[Track],
        channels: &[MidiChannel],
    ) -> Result<PlaybackStatus> {
        self.play_tracks_while(tracks, channels, |_| true)
    }

    /// Plays tracks together, one channel per track, at the session tempo.
    ///
    /// Each track's instrument is selected on its channel first. Then bar `n`
    /// of every track is handed to [Sequencer::play_bars()], for each `n` in
    /// the first track. Tracks with fewer bars sit out once they run out, and
    /// bars past the end of the first track never play.
    ///
    /// `keep_playing` is asked before each bar, with that bar's index. When it
    /// says no, playback ends with [PlaybackStatus::Halted].
    pub fn play_tracks_while(
        &mut self,
        tracks: &[Track],
        channels: &[MidiChannel],
        mut keep_playing: impl FnMut(usize) -> bool,
    ) -> Result<PlaybackStatus> {
        if tracks.len() != channels.len() {
            return Err(SequencerError::VoiceCountMismatch {
                voices: tracks.len(),
                channels: channels.len(),
            });
        }
        let tempo = self.tempo();
        Self::check_tempo(tempo)?;
        let Some(first) = tracks.first() else {
            return Ok(PlaybackStatus::Completed);
        };

        for (track, channel) in tracks.iter().zip(channels) {
            self.set_instrument(*channel, track.program())?;
        }

        log::info!(
            "playing {} tracks for {} bars at {tempo}",
            tracks.len(),
            first.len()
        );
        for index in 0..first.len() {
            if !keep_playing(index) {
                log::info!("halted before bar {index}");
                return Ok(PlaybackStatus::Halted { bar: index });
            }

            let voices: Vec<(&Bar, MidiChannel)> = tracks
                .iter()
                .zip(channels.iter().copied())
                .filter_map(|(track, channel)| track.get(index).map(|bar| (bar, channel)))
                .collect();
            log::debug!("bar {index}: {} voices", voices.len());
            self.play_voices(voices, tempo)?;
        }
        log::info!("finished playing {} tracks", tracks.len());
        Ok(PlaybackStatus::Completed)
    }

    /// Plays every track of a composition. See
    /// [Sequencer::play_composition_while()].
    pub fn play_composition(
        &mut self,
        composition: &Composition,
        channels: Option<&[MidiChannel]>,
    ) -> Result<PlaybackStatus> {
        self.play_composition_while(composition, channels, |_| true)
    }

    /// Plays every track of a composition, as
    /// [Sequencer::play_tracks_while()] does. Without `channels`, track `n`
    /// plays on channel `n + 1`, so a composition with more tracks than there
    /// are channels needs explicit ones.
    pub fn play_composition_while(
        &mut self,
        composition: &Composition,
        channels: Option<&[MidiChannel]>,
        keep_playing: impl FnMut(usize) -> bool,
    ) -> Result<PlaybackStatus> {
        log::info!(
            "playing \"{}\" by {}",
            composition.title,
            if composition.author.is_empty() {
                "an unknown author"
            } else {
                composition.author.as_str()
            }
        );
        let default_channels: Vec<MidiChannel>;
        let channels = match channels {
            Some(channels) => channels,
            None => {
                if composition.len() > MidiChannel::COUNT {
                    return Err(SequencerError::VoiceCountMismatch {
                        voices: composition.len(),
                        channels: MidiChannel::COUNT,
                    });
                }
                default_channels = MidiChannel::all().take(composition.len()).collect();
                &default_channels
            }
        };
        self.play_tracks_while(&composition.tracks, channels, keep_playing)
    }
}
