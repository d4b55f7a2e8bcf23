// Copyright (c) 2024 Mike Tsao

use super::{Result, Sequencer, SequencerEvent};
use crate::{
    composition::Bar,
    error::SequencerError,
    traits::{Clock, MidiDevice},
    types::{MidiChannel, Tempo},
};
use core::time::Duration;

impl<D: MidiDevice, C: Clock> Sequencer<D, C> {
    pub(super) fn check_bar(bar: &Bar) -> Result<()> {
        match bar
            .iter()
            .find(|entry| !(entry.denominator.is_finite() && entry.denominator > 0.0))
        {
            Some(entry) => Err(SequencerError::InvalidDuration(entry.denominator)),
            None => Ok(()),
        }
    }

    /// Plays one bar on one channel, one entry at a time, blocking until the
    /// last entry has stopped.
    ///
    /// Entries play in the order they're stored, each for its full duration,
    /// so onsets are ignored and entries never overlap. A failed note-on ends
    /// the bar. A failed note-off is logged and the bar continues.
    pub fn play_bar(&mut self, bar: &Bar, channel: MidiChannel, tempo: Tempo) -> Result<()> {
        Self::check_tempo(tempo)?;
        Self::check_bar(bar)?;

        let velocity = self.settings.default_velocity;
        log::debug!(
            "playing {} entries on channel {channel} at {tempo}",
            bar.len()
        );
        for entry in bar {
            self.play_note_group(&entry.notes, channel, velocity)?;

            let wait = Duration::from(tempo.note(entry.denominator));
            self.clock.sleep(wait);
            self.publish(SequencerEvent::Sleep(wait));

            if let Err(e) = self.stop_note_group(&entry.notes, channel) {
                log::warn!("couldn't stop notes on channel {channel}: {e}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        composition::{BarEntry, Note},
        util::{DeviceCall, ManualClock, RecordingDevice},
    };

    fn sequencer() -> Sequencer<RecordingDevice, ManualClock> {
        Sequencer::new_with_clock(RecordingDevice::default(), ManualClock::default())
    }

    fn four_quarters() -> Bar {
        let mut bar = Bar::default();
        for key in [48, 50, 52, 53] {
            assert!(bar.place_notes(Note::new(key), 4.0));
        }
        bar
    }

    #[test]
    fn four_quarters_take_two_seconds_at_120() {
        let mut s = sequencer();
        let events = s.subscribe();
        assert!(s
            .play_bar(&four_quarters(), MidiChannel(1), Tempo(120.0))
            .is_ok());
        assert_eq!(s.clock().peek(), Duration::from_secs(2));

        let keys: Vec<(bool, u8)> = s
            .device()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::NoteOn { key, .. } => Some((true, *key)),
                DeviceCall::NoteOff { key, .. } => Some((false, *key)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                (true, 60),
                (false, 60),
                (true, 62),
                (false, 62),
                (true, 64),
                (false, 64),
                (true, 65),
                (false, 65)
            ]
        );

        let sleeps: Vec<SequencerEvent> = events
            .try_iter()
            .filter(|e| matches!(e, SequencerEvent::Sleep(_)))
            .collect();
        assert_eq!(
            sleeps,
            vec![SequencerEvent::Sleep(Duration::from_millis(500)); 4]
        );
    }

    #[test]
    fn waits_follow_durations() {
        let mut s = sequencer();
        let events = s.subscribe();
        let mut bar = Bar::default();
        assert!(bar.place_notes(Note::new(48), 2.0));
        assert!(bar.place_notes(Note::new(48), 8.0));
        assert!(bar.place_rest(8.0));
        assert!(bar.place_notes(Note::new(48), 4.0));
        assert!(s.play_bar(&bar, MidiChannel(1), Tempo(60.0)).is_ok());

        let sleeps: Vec<Duration> = events
            .try_iter()
            .filter_map(|e| match e {
                SequencerEvent::Sleep(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(
            sleeps,
            vec![
                Duration::from_secs(2),
                Duration::from_millis(500),
                Duration::from_millis(500),
                Duration::from_secs(1)
            ]
        );
        assert_eq!(s.device().note_ons().len(), 3);
        assert_eq!(s.device().note_offs().len(), 3);
    }

    #[test]
    fn entries_play_in_stored_order() {
        let mut s = sequencer();
        let mut bar = Bar::default();
        assert!(bar.push_entry(BarEntry::new(0.5, 4.0, Note::new(50))).is_ok());
        assert!(bar.push_entry(BarEntry::new(0.0, 4.0, Note::new(48))).is_ok());
        assert!(s.play_bar(&bar, MidiChannel(1), Tempo(120.0)).is_ok());
        assert_eq!(
            s.device().note_ons()[0],
            DeviceCall::NoteOn {
                channel: MidiChannel(1),
                key: 62,
                velocity: 100
            }
        );
        assert_eq!(s.clock().peek(), Duration::from_secs(1));
    }

    #[test]
    fn failed_note_on_ends_the_bar() {
        let mut s = sequencer();
        s.device_mut().fail_nth_note_on(2);
        assert!(s
            .play_bar(&four_quarters(), MidiChannel(1), Tempo(120.0))
            .is_err());
        assert_eq!(s.device().note_ons().len(), 2);
        assert_eq!(s.device().note_offs().len(), 2);
        assert_eq!(s.clock().peek(), Duration::from_secs(1));
    }

    #[test]
    fn bad_tempos_play_nothing() {
        let mut s = sequencer();
        assert_eq!(
            s.play_bar(&four_quarters(), MidiChannel(1), Tempo(0.0)),
            Err(SequencerError::InvalidTempo(0.0))
        );
        assert!(s
            .play_bar(&four_quarters(), MidiChannel(1), Tempo(f64::NAN))
            .is_err());
        assert!(s.device().calls().is_empty());
        assert_eq!(s.clock().peek(), Duration::ZERO);
    }

    #[test]
    fn bad_durations_play_nothing() {
        let mut s = sequencer();
        let bar: Bar = serde_json::from_str(
            r#"{"entries":[{"onset":0.0,"denominator":4.0,"notes":[{"key":48}]},
                           {"onset":0.25,"denominator":0.0,"notes":[]}],
                "length":1.0,"current-beat":0.5}"#,
        )
        .unwrap();
        assert_eq!(
            s.play_bar(&bar, MidiChannel(1), Tempo(120.0)),
            Err(SequencerError::InvalidDuration(0.0))
        );
        assert!(s.device().calls().is_empty());
    }
}
