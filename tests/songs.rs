// Copyright (c) 2024 Mike Tsao

use cadenza::{
    prelude::*,
    types::{u7, MidiMessage},
    util::DeviceCall,
};
use cadenza_services::prelude::*;
use core::time::Duration;
use crossbeam::channel::{unbounded, Receiver};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bar_of(keys: &[u8], denominator: f64) -> Bar {
    let mut bar = Bar::default();
    for key in keys {
        assert!(bar.place_notes(Note::new(*key), denominator));
    }
    bar
}

fn set_up_song() -> Composition {
    let melody = TrackBuilder::default()
        .name("melody")
        .instrument(MidiInstrument::new("Vibraphone"))
        .bars(vec![
            bar_of(&[48, 48, 55, 55], 4.0),
            bar_of(&[57, 57], 4.0),
            bar_of(&[53, 53, 52, 52], 4.0),
        ])
        .build()
        .unwrap();
    let bass = TrackBuilder::default()
        .name("bass")
        .bars(vec![bar_of(&[36], 1.0), bar_of(&[41, 36], 2.0)])
        .build()
        .unwrap();
    CompositionBuilder::default()
        .title("Twinkle")
        .tracks(vec![melody, bass])
        .build()
        .unwrap()
}

fn drain_midi(receiver: &Receiver<MidiServiceInput>) -> Vec<(u8, MidiMessage)> {
    receiver
        .try_iter()
        .filter_map(|input| match input {
            MidiServiceInput::Midi(channel, message) => Some((channel.0, message)),
            _ => None,
        })
        .collect()
}

#[test]
fn song_plays_through_the_midi_service_device() {
    init_logging();
    let (sender, receiver) = unbounded();
    let mut s = Sequencer::new_with_clock(MidiServiceDevice::new_with(sender), ManualClock::default());
    assert_eq!(
        s.play_composition(&set_up_song(), None),
        Ok(PlaybackStatus::Completed)
    );

    let messages = drain_midi(&receiver);
    let bank_and_program = |channel: u8, program: u8| {
        vec![
            (
                channel,
                MidiMessage::Controller {
                    controller: u7::from(0),
                    value: u7::from(0),
                },
            ),
            (
                channel,
                MidiMessage::Controller {
                    controller: u7::from(32),
                    value: u7::from(0),
                },
            ),
            (
                channel,
                MidiMessage::ProgramChange {
                    program: u7::from(program),
                },
            ),
        ]
    };
    let mut expected = bank_and_program(1, 11);
    expected.extend(bank_and_program(2, 1));
    assert_eq!(&messages[..6], expected.as_slice());

    let ons: Vec<(u8, u8, u8)> = messages
        .iter()
        .filter_map(|(channel, message)| match message {
            MidiMessage::NoteOn { key, vel } => Some((*channel, key.as_int(), vel.as_int())),
            _ => None,
        })
        .collect();
    let offs = messages
        .iter()
        .filter(|(_, message)| matches!(message, MidiMessage::NoteOff { .. }))
        .count();

    // Ten melody notes and three bass notes. The melody's second bar is half
    // empty, and the bass has nothing for the third bar.
    assert_eq!(ons.len(), 13);
    assert_eq!(offs, 13);
    assert!(ons.iter().all(|(_, _, velocity)| *velocity == 100));
    assert_eq!(ons.iter().filter(|(channel, _, _)| *channel == 2).count(), 3);
    assert!(ons.contains(&(1, 69, 100)));
    assert!(ons.contains(&(2, 53, 100)));
}

#[test]
fn a_vanished_service_is_a_disconnected_device() {
    init_logging();
    let (sender, receiver) = unbounded();
    drop(receiver);
    let mut s = Sequencer::new_with_clock(MidiServiceDevice::new_with(sender), ManualClock::default());
    assert_eq!(
        s.play_bar(&bar_of(&[48], 1.0), MidiChannel(1), Tempo(120.0)),
        Err(SequencerError::Device(DeviceError::Disconnected))
    );
}

#[test]
fn listeners_can_halt_a_song() {
    init_logging();
    let mut s = Sequencer::new_with_clock(RecordingDevice::default(), ManualClock::default());
    let events = s.subscribe();

    // Stop once three notes have been heard.
    let mut heard = 0;
    let status = s.play_composition_while(&set_up_song(), None, |_| {
        heard += events
            .try_iter()
            .filter(|e| matches!(e, SequencerEvent::NoteOn { .. }))
            .count();
        heard < 3
    });
    assert_eq!(status, Ok(PlaybackStatus::Halted { bar: 1 }));
    assert_eq!(s.device().note_ons().len(), 5);
    assert!(s.device().is_silent());
}

#[test]
fn settings_shape_the_performance() {
    init_logging();
    let mut settings = SequencerSettings::default();
    settings.set_default_velocity(64);
    settings.set_tempo(Tempo(240.0));
    assert!(!settings.has_been_saved());

    let path = std::env::temp_dir().join(format!("cadenza-settings-{}.json", std::process::id()));
    assert!(settings.save(&path).is_ok());
    assert!(settings.has_been_saved());
    let loaded = SequencerSettings::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, settings);

    let mut s = Sequencer::new_with(RecordingDevice::default(), ManualClock::default(), loaded);
    let mut bar = Bar::default();
    assert!(bar.place_notes(Note::new(48), 2.0));
    assert!(bar.place_notes(Note::new(50).with_velocity(127), 2.0));
    let track = TrackBuilder::default().bars(vec![bar]).build().unwrap();

    assert!(s.play_track(&track, MidiChannel(4)).is_ok());
    assert_eq!(s.clock().peek(), Duration::from_secs(1));
    assert_eq!(
        s.device().note_ons(),
        vec![
            DeviceCall::NoteOn {
                channel: MidiChannel(4),
                key: 60,
                velocity: 64
            },
            DeviceCall::NoteOn {
                channel: MidiChannel(4),
                key: 62,
                velocity: 127
            }
        ]
    );
}
