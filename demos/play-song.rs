// Copyright (c) 2024 Mike Tsao

//! This example plays a short two-track song on a MIDI output port.
//!
//! Run it with `--list` to see the available ports, and then with `--port`
//! and part of a port's name to play through that port. A software
//! synthesizer such as FluidSynth will do.

use anyhow::anyhow;
use cadenza::{prelude::*, types::MidiPortDescriptor};
use cadenza_services::prelude::*;
use clap::Parser;
use core::time::Duration;

/// The program's command-line arguments.
#[derive(clap::Parser, Debug, Default)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Print version and exit
    #[clap(short = 'v', long, value_parser)]
    version: bool,

    /// List the MIDI output ports and exit
    #[clap(short = 'l', long, value_parser)]
    list: bool,

    /// Play through the first output port whose name contains this text
    #[clap(short = 'p', long, value_parser)]
    port: Option<String>,

    /// Beats per minute
    #[clap(short = 't', long, value_parser, default_value_t = 100.0)]
    tempo: f64,
}

const TIMEOUT: Duration = Duration::from_secs(5);

fn bar_of(notes: &[(u8, f64)]) -> anyhow::Result<Bar> {
    let mut bar = Bar::default();
    for (key, denominator) in notes {
        if !bar.place_notes(Note::new(*key), *denominator) {
            return Err(anyhow!("note {key} doesn't fit in the bar"));
        }
    }
    Ok(bar)
}

fn twinkle() -> anyhow::Result<Composition> {
    const C4: u8 = 48;
    const D4: u8 = C4 + 2;
    const E4: u8 = C4 + 4;
    const F4: u8 = C4 + 5;
    const G4: u8 = C4 + 7;
    const A4: u8 = C4 + 9;
    const C3: u8 = C4 - 12;
    const F3: u8 = F4 - 12;
    const G3: u8 = G4 - 12;

    let melody = TrackBuilder::default()
        .name("melody")
        .instrument(MidiInstrument::new("Vibraphone"))
        .bars(vec![
            bar_of(&[(C4, 4.0), (C4, 4.0), (G4, 4.0), (G4, 4.0)])?,
            bar_of(&[(A4, 4.0), (A4, 4.0), (G4, 2.0)])?,
            bar_of(&[(F4, 4.0), (F4, 4.0), (E4, 4.0), (E4, 4.0)])?,
            bar_of(&[(D4, 4.0), (D4, 4.0), (C4, 2.0)])?,
        ])
        .build()?;

    let mut last_chord = Bar::default();
    if !last_chord.place_notes(vec![Note::new(C3), Note::new(G3)], 1.0) {
        return Err(anyhow!("the chord doesn't fit in the bar"));
    }
    let bass = TrackBuilder::default()
        .name("bass")
        .instrument(MidiInstrument::new("Acoustic Bass"))
        .bars(vec![
            bar_of(&[(C3, 1.0)])?,
            bar_of(&[(F3, 2.0), (C3, 2.0)])?,
            bar_of(&[(F3, 2.0), (C3, 2.0)])?,
            last_chord,
        ])
        .build()?;

    Ok(CompositionBuilder::default()
        .title("Twinkle, Twinkle, Little Star")
        .author("Traditional")
        .tracks(vec![melody, bass])
        .build()?)
}

fn wait_for_ports(service: &MidiService) -> anyhow::Result<Vec<MidiPortDescriptor>> {
    service.send_input(MidiServiceInput::RefreshPorts);
    loop {
        match service.receiver().recv_timeout(TIMEOUT)? {
            MidiServiceEvent::OutputPorts(ports) => return Ok(ports),
            MidiServiceEvent::Error(e) => return Err(anyhow!(e)),
            _ => {}
        }
    }
}

fn wait_for_connection(
    service: &MidiService,
    port: MidiPortDescriptor,
) -> anyhow::Result<MidiPortDescriptor> {
    service.send_input(MidiServiceInput::SelectMidiOutput(port));
    loop {
        match service.receiver().recv_timeout(TIMEOUT)? {
            MidiServiceEvent::OutputPortSelected(Some(port)) => return Ok(port),
            MidiServiceEvent::Error(e) => return Err(anyhow!(e)),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.version {
        eprintln!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let service = MidiService::default();
    let ports = wait_for_ports(&service)?;
    if args.list {
        for port in ports {
            println!("{}: {port}", port.index);
        }
        return Ok(());
    }

    let wanted = args.port.unwrap_or_default();
    let port = ports
        .into_iter()
        .find(|port| port.name.contains(&wanted))
        .ok_or_else(|| anyhow!("no MIDI output port matches \"{wanted}\""))?;
    let port = wait_for_connection(&service, port)?;
    eprintln!("Playing on {port}");

    let composition = twinkle()?;
    let mut sequencer = Sequencer::new(service.device());
    sequencer.set_tempo(Tempo(args.tempo));
    let status = sequencer.play_composition(&composition, None);
    sequencer.stop_everything()?;
    service.send_input(MidiServiceInput::Quit);

    eprintln!("{:?}", status?);
    Ok(())
}
