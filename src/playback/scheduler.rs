// Copyright (c) 2024 Mike Tsao

use super::{Result, Sequencer};
use crate::{
    composition::{Bar, BarEntry},
    error::SequencerError,
    traits::{Clock, MidiDevice},
    types::{MidiChannel, Tempo},
};

/// A group that has been started and not yet stopped. Two of these are the
/// same if their entries have the same onset, duration, and notes, and they
/// went to the same channel.
#[derive(Debug, PartialEq)]
struct Sounding<'a> {
    entry: &'a BarEntry,
    channel: MidiChannel,
}

/// One voice's progress through its bar.
#[derive(Debug)]
struct Voice<'a> {
    bar: &'a Bar,
    channel: MidiChannel,
    cursor: usize,
    is_exhausted: bool,
}
impl<'a> Voice<'a> {
    fn current(&self) -> Option<&'a BarEntry> {
        if self.is_exhausted {
            None
        } else {
            self.bar.get(self.cursor)
        }
    }

    // The cursor stays on the last entry once it gets there.
    fn advance(&mut self) {
        if self.cursor + 1 < self.bar.len() {
            self.cursor += 1;
        } else {
            self.is_exhausted = true;
        }
    }
}

impl<D: MidiDevice, C: Clock> Sequencer<D, C> {
    /// Plays several bars at once, each on its own channel, returning when
    /// the first bar has run its length.
    ///
    /// Rather than sleeping, this polls the clock and works out where it is
    /// in the bar (the tick, a fraction of a whole bar). On each pass, each
    /// voice starts its current entry if the tick falls inside that entry's
    /// window, and every sounding entry whose window has closed is stopped.
    /// Because all voices are handled in the same pass, none of them has to
    /// wait for another.
    ///
    /// Only `bars[0]` decides how long this runs. If another bar is longer,
    /// its later entries never start; if one of them is still sounding when
    /// time runs out, it's stopped then along with everything else that's
    /// still sounding. A bar whose entries extend past its own length is
    /// treated the same way.
    ///
    /// Once a voice has started its last entry, that entry stays current but
    /// is never started again, even if a later pass lands exactly on the end
    /// of its window.
    ///
    /// If a note-on fails, the error is returned right away and whatever was
    /// sounding keeps sounding, unless
    /// [SequencerSettings::flush_on_failure](crate::util::SequencerSettings::flush_on_failure)
    /// is set. Then every sounding group, including the one whose start
    /// failed partway, is stopped first.
    pub fn play_bars(&mut self, bars: &[Bar], channels: &[MidiChannel], tempo: Tempo) -> Result<()> {
        if bars.len() != channels.len() {
            return Err(SequencerError::VoiceCountMismatch {
                voices: bars.len(),
                channels: channels.len(),
            });
        }
        self.play_voices(
            bars.iter().zip(channels.iter().copied()).collect(),
            tempo,
        )
    }

    /// Does the work of [Sequencer::play_bars()] for bars that have already
    /// been paired with their channels.
    pub(super) fn play_voices(
        &mut self,
        voices: Vec<(&Bar, MidiChannel)>,
        tempo: Tempo,
    ) -> Result<()> {
        Self::check_tempo(tempo)?;
        for (bar, _) in voices.iter() {
            Self::check_bar(bar)?;
        }
        let Some((first, _)) = voices.first() else {
            return Ok(());
        };

        let length = first.length();
        let bar_seconds = tempo.bar().0;
        let velocity = self.settings.default_velocity;
        let mut voices: Vec<Voice> = voices
            .into_iter()
            .map(|(bar, channel)| Voice {
                bar,
                channel,
                cursor: 0,
                is_exhausted: false,
            })
            .collect();
        let mut sounding: Vec<Sounding> = Vec::default();
        log::debug!(
            "playing {} voices for {length} of a bar at {tempo}",
            voices.len()
        );

        let start = self.clock.now();
        let mut tick = 0.0;
        while tick < length {
            for voice in voices.iter_mut() {
                let Some(entry) = voice.current() else {
                    continue;
                };
                if !entry.is_sounding_at(tick) {
                    continue;
                }
                let candidate = Sounding {
                    entry,
                    channel: voice.channel,
                };
                if sounding.contains(&candidate) {
                    continue;
                }
                if let Err(e) = self.play_note_group(&entry.notes, voice.channel, velocity) {
                    if self.settings.flush_on_failure {
                        // Part of the group may have started.
                        if let Err(e) = self.stop_note_group(&entry.notes, voice.channel) {
                            log::warn!("couldn't stop notes on channel {}: {e}", voice.channel);
                        }
                        self.stop_all_sounding(&mut sounding);
                    }
                    return Err(e);
                }
                log::trace!("tick {tick:0.4}: started entry at {}", entry.onset);
                sounding.push(candidate);
                voice.advance();
            }

            sounding.retain(|s| {
                if !s.entry.has_ended_by(tick) {
                    return true;
                }
                if let Err(e) = self.stop_note_group(&s.entry.notes, s.channel) {
                    log::warn!("couldn't stop notes on channel {}: {e}", s.channel);
                }
                false
            });

            if self.settings.yield_while_polling {
                self.clock.yield_now();
            }
            let elapsed = self.clock.now().saturating_sub(start).as_secs_f64();
            tick = elapsed / bar_seconds * length;
        }

        if !sounding.is_empty() {
            log::debug!("stopping {} groups still sounding", sounding.len());
        }
        self.stop_all_sounding(&mut sounding);
        Ok(())
    }

    fn stop_all_sounding(&mut self, sounding: &mut Vec<Sounding>) {
        for s in sounding.drain(..) {
            if let Err(e) = self.stop_note_group(&s.entry.notes, s.channel) {
                log::warn!("couldn't stop notes on channel {}: {e}", s.channel);
            }
        }
    }
}
