// Copyright (c) 2024 Mike Tsao

//! Provides MIDI output services.

use crate::traits::ProvidesService;
use anyhow::anyhow;
use cadenza::{
    error::DeviceError,
    types::{checked_u7, u7, MidiChannel, MidiMessage, MidiPortDescriptor},
    util::HasSettings,
    MidiDevice,
};
use crossbeam::channel::{Receiver, Sender};
use derivative::Derivative;
use midir::{MidiOutput, MidiOutputConnection};
use midly::live::LiveEvent;
use serde::{Deserialize, Serialize};

/// The client sends requests to the MIDI interface through [MidiServiceInput]
/// messages.
#[derive(Clone, Debug)]
pub enum MidiServiceInput {
    /// Requests a rescan of the MIDI output ports.
    RefreshPorts,

    /// The user has picked a MIDI output. Switch to it.
    SelectMidiOutput(MidiPortDescriptor),

    /// Attempt to set the selected MIDI output by matching its name.
    RestoreMidiOutput(String),

    /// The application wants to send a MIDI message to the selected output.
    Midi(MidiChannel, MidiMessage),

    /// The app is ready to quit, so the service should end.
    Quit,
}

/// The service provides updates to the client through [MidiServiceEvent]
/// messages.
#[derive(Clone, Debug, PartialEq)]
pub enum MidiServiceEvent {
    /// The MIDI output ports have been updated.
    OutputPorts(Vec<MidiPortDescriptor>),

    /// A new output port has been selected, or the selection was lost.
    OutputPortSelected(Option<MidiPortDescriptor>),

    /// Something went wrong inside the service.
    Error(String),

    /// The service has processed [MidiServiceInput::Quit] and will go away
    /// shortly.
    Quit,
}

/// Contains persistent MIDI settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MidiSettings {
    /// The name of the output port to reconnect to at startup.
    #[serde(default)]
    pub selected_output: Option<String>,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    has_been_saved: bool,
}
impl HasSettings for MidiSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl MidiSettings {
    /// Updates the field and marks the struct eligible to save.
    pub fn set_output(&mut self, output: Option<&MidiPortDescriptor>) {
        let name = output.map(|port| port.name.clone());
        if name != self.selected_output {
            self.selected_output = name;
            self.needs_save();
        }
    }

    /// The input that reconnects to the remembered output, if there is one.
    pub fn restore_input(&self) -> Option<MidiServiceInput> {
        self.selected_output
            .as_ref()
            .map(|name| MidiServiceInput::RestoreMidiOutput(name.clone()))
    }
}

/// Owns the midir connection. Lives on the service thread.
struct MidiOutputHandler {
    sender: Sender<MidiServiceEvent>,
    connection: Option<(MidiPortDescriptor, MidiOutputConnection)>,
    has_reported_unconnected: bool,
    buffer: Vec<u8>,
}
impl MidiOutputHandler {
    const CLIENT_NAME: &'static str = "cadenza";

    fn new(sender: Sender<MidiServiceEvent>) -> Self {
        Self {
            sender,
            connection: None,
            has_reported_unconnected: false,
            buffer: Vec::with_capacity(3),
        }
    }

    fn send_event(&self, event: MidiServiceEvent) {
        if let Err(e) = self.sender.send(event) {
            log::debug!("nobody is listening to the MIDI service: {e:?}");
        }
    }

    fn report(&self, e: anyhow::Error) {
        log::warn!("MIDI service: {e:#}");
        self.send_event(MidiServiceEvent::Error(format!("{e:#}")));
    }

    fn ports() -> anyhow::Result<Vec<MidiPortDescriptor>> {
        let output = MidiOutput::new(Self::CLIENT_NAME)?;
        Ok(output
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                output
                    .port_name(port)
                    .ok()
                    .map(|name| MidiPortDescriptor { index, name })
            })
            .collect())
    }

    fn refresh_ports(&mut self) {
        match Self::ports() {
            Ok(ports) => self.send_event(MidiServiceEvent::OutputPorts(ports)),
            Err(e) => self.report(e),
        }
    }

    fn connect(&mut self, descriptor: &MidiPortDescriptor) -> anyhow::Result<()> {
        if let Some((_, connection)) = self.connection.take() {
            let _ = connection.close();
        }
        self.send_event(MidiServiceEvent::OutputPortSelected(None));

        let output = MidiOutput::new(Self::CLIENT_NAME)?;
        let ports = output.ports();
        let port = ports
            .get(descriptor.index)
            .filter(|port| output.port_name(port).ok().as_ref() == Some(&descriptor.name))
            .ok_or_else(|| anyhow!("MIDI output {descriptor} is no longer available"))?;
        let connection = output
            .connect(port, Self::CLIENT_NAME)
            .map_err(|e| anyhow!("couldn't connect to MIDI output {descriptor}: {e}"))?;

        log::info!("connected to MIDI output {descriptor}");
        self.connection = Some((descriptor.clone(), connection));
        self.has_reported_unconnected = false;
        self.send_event(MidiServiceEvent::OutputPortSelected(Some(
            descriptor.clone(),
        )));
        Ok(())
    }

    fn select(&mut self, descriptor: &MidiPortDescriptor) {
        if let Err(e) = self.connect(descriptor) {
            self.report(e);
        }
    }

    fn restore(&mut self, name: &str) {
        let result = Self::ports().and_then(|ports| {
            ports
                .into_iter()
                .find(|port| port.name == name)
                .ok_or_else(|| anyhow!("the remembered MIDI output \"{name}\" wasn't found"))
        });
        match result {
            Ok(descriptor) => self.select(&descriptor),
            Err(e) => self.report(e),
        }
    }

    fn send_midi(&mut self, channel: MidiChannel, message: MidiMessage) {
        let Some((descriptor, connection)) = self.connection.as_mut() else {
            if !self.has_reported_unconnected {
                self.has_reported_unconnected = true;
                self.report(anyhow!(DeviceError::NotConnected));
            }
            return;
        };
        let result = channel
            .wire()
            .map_err(anyhow::Error::from)
            .and_then(|channel| {
                self.buffer.clear();
                LiveEvent::Midi { channel, message }.write_std(&mut self.buffer)?;
                connection
                    .send(&self.buffer)
                    .map_err(|e| anyhow!("sending to MIDI output {descriptor}: {e}"))
            });
        if let Err(e) = result {
            self.report(e);
        }
    }
}

/// Wraps the [midir](https://crates.io/crates/midir) crate with a
/// crossbeam-channels interface.
#[derive(Debug)]
pub struct MidiService {
    input_sender: Sender<MidiServiceInput>,
    event_receiver: Receiver<MidiServiceEvent>,
}
impl Default for MidiService {
    fn default() -> Self {
        Self::new()
    }
}
impl MidiService {
    /// Starts the service thread. No port is opened until the client asks for
    /// one.
    pub fn new() -> Self {
        let (input_sender, input_receiver) = crossbeam::channel::unbounded();
        let (event_sender, event_receiver) = crossbeam::channel::unbounded();
        Self::start_thread(input_receiver, event_sender);
        Self {
            input_sender,
            event_receiver,
        }
    }

    fn start_thread(receiver: Receiver<MidiServiceInput>, sender: Sender<MidiServiceEvent>) {
        std::thread::spawn(move || {
            let mut handler = MidiOutputHandler::new(sender);
            while let Ok(input) = receiver.recv() {
                match input {
                    MidiServiceInput::RefreshPorts => handler.refresh_ports(),
                    MidiServiceInput::SelectMidiOutput(descriptor) => handler.select(&descriptor),
                    MidiServiceInput::RestoreMidiOutput(name) => handler.restore(&name),
                    MidiServiceInput::Midi(channel, message) => handler.send_midi(channel, message),
                    MidiServiceInput::Quit => {
                        handler.send_event(MidiServiceEvent::Quit);
                        break;
                    }
                }
            }
            log::debug!("MIDI service thread exiting");
        });
    }

    /// Creates a [MidiServiceDevice] that sends to this service.
    pub fn device(&self) -> MidiServiceDevice {
        MidiServiceDevice::new_with(self.input_sender.clone())
    }
}
impl ProvidesService<MidiServiceInput, MidiServiceEvent> for MidiService {
    fn sender(&self) -> &Sender<MidiServiceInput> {
        &self.input_sender
    }

    fn receiver(&self) -> &Receiver<MidiServiceEvent> {
        &self.event_receiver
    }
}

/// A [MidiDevice] that turns each call into [MidiServiceInput::Midi] messages.
///
/// Arguments are range-checked here, so a bad key or channel is reported to
/// the caller rather than to the service. Whether the service manages to
/// deliver the message is reported on its event channel.
#[derive(Clone, Debug)]
pub struct MidiServiceDevice {
    sender: Sender<MidiServiceInput>,
}
impl MidiServiceDevice {
    /// Bank select, most significant byte.
    pub const BANK_SELECT_MSB: u8 = 0;
    /// Bank select, least significant byte.
    pub const BANK_SELECT_LSB: u8 = 32;

    /// Creates a device that sends to `sender`.
    pub fn new_with(sender: Sender<MidiServiceInput>) -> Self {
        Self { sender }
    }

    fn send(&self, channel: MidiChannel, message: MidiMessage) -> Result<(), DeviceError> {
        channel.wire()?;
        self.sender
            .send(MidiServiceInput::Midi(channel, message))
            .map_err(|_| DeviceError::Disconnected)
    }
}
impl MidiDevice for MidiServiceDevice {
    fn note_on(
        &mut self,
        channel: MidiChannel,
        key: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        let message = MidiMessage::NoteOn {
            key: checked_u7("key", key as u16)?,
            vel: checked_u7("velocity", velocity as u16)?,
        };
        self.send(channel, message)
    }

    fn note_off(&mut self, channel: MidiChannel, key: u8) -> Result<(), DeviceError> {
        let message = MidiMessage::NoteOff {
            key: checked_u7("key", key as u16)?,
            vel: u7::from(0),
        };
        self.send(channel, message)
    }

    fn program_select(
        &mut self,
        channel: MidiChannel,
        bank: u16,
        program: u8,
    ) -> Result<(), DeviceError> {
        if bank > 0x3fff {
            return Err(DeviceError::OutOfRange {
                what: "bank",
                value: bank,
            });
        }
        let program = checked_u7("program", program as u16)?;
        channel.wire()?;

        self.send(
            channel,
            MidiMessage::Controller {
                controller: u7::from(Self::BANK_SELECT_MSB),
                value: u7::from_int_lossy((bank >> 7) as u8),
            },
        )?;
        self.send(
            channel,
            MidiMessage::Controller {
                controller: u7::from(Self::BANK_SELECT_LSB),
                value: u7::from_int_lossy((bank & 0x7f) as u8),
            },
        )?;
        self.send(channel, MidiMessage::ProgramChange { program })
    }

    fn control_change(
        &mut self,
        channel: MidiChannel,
        controller: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        let message = MidiMessage::Controller {
            controller: checked_u7("controller", controller as u16)?,
            value: checked_u7("value", value as u16)?,
        };
        self.send(channel, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn device() -> (MidiServiceDevice, Receiver<MidiServiceInput>) {
        let (sender, receiver) = crossbeam::channel::unbounded();
        (MidiServiceDevice::new_with(sender), receiver)
    }

    fn messages(receiver: &Receiver<MidiServiceInput>) -> Vec<(u8, MidiMessage)> {
        receiver
            .try_iter()
            .filter_map(|input| match input {
                MidiServiceInput::Midi(channel, message) => Some((channel.0, message)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn notes_become_messages() {
        let (mut device, receiver) = device();
        assert!(device.note_on(MidiChannel(10), 36, 127).is_ok());
        assert!(device.note_off(MidiChannel(10), 36).is_ok());
        assert_eq!(
            messages(&receiver),
            vec![
                (
                    10,
                    MidiMessage::NoteOn {
                        key: u7::from(36),
                        vel: u7::from(127)
                    }
                ),
                (
                    10,
                    MidiMessage::NoteOff {
                        key: u7::from(36),
                        vel: u7::from(0)
                    }
                )
            ]
        );
    }

    #[test]
    fn program_select_sends_bank_then_program() {
        let (mut device, receiver) = device();
        assert!(device.program_select(MidiChannel(1), 130, 11).is_ok());
        assert_eq!(
            messages(&receiver),
            vec![
                (
                    1,
                    MidiMessage::Controller {
                        controller: u7::from(0),
                        value: u7::from(1)
                    }
                ),
                (
                    1,
                    MidiMessage::Controller {
                        controller: u7::from(32),
                        value: u7::from(2)
                    }
                ),
                (
                    1,
                    MidiMessage::ProgramChange {
                        program: u7::from(11)
                    }
                )
            ]
        );
    }

    #[test]
    fn bad_arguments_send_nothing() {
        let (mut device, receiver) = device();
        assert_eq!(
            device.note_on(MidiChannel(0), 60, 100),
            Err(DeviceError::ChannelOutOfRange(0))
        );
        assert!(device.note_on(MidiChannel(1), 128, 100).is_err());
        assert!(device.control_change(MidiChannel(1), 7, 200).is_err());
        assert!(device.program_select(MidiChannel(17), 0, 0).is_err());
        assert!(device.program_select(MidiChannel(1), 0x4000, 0).is_err());
        assert!(messages(&receiver).is_empty());
    }

    #[test]
    fn closed_service_is_disconnected() {
        let (mut device, receiver) = device();
        drop(receiver);
        assert_eq!(
            device.control_change(MidiChannel(1), 7, 100),
            Err(DeviceError::Disconnected)
        );
    }

    #[test]
    fn service_quits_when_asked() {
        let service = MidiService::default();
        service.send_input(MidiServiceInput::Quit);
        assert_eq!(
            service.receiver().recv_timeout(Duration::from_secs(5)),
            Ok(MidiServiceEvent::Quit)
        );
    }

    #[test]
    fn settings_remember_the_output_by_name() {
        let mut settings = MidiSettings::default();
        assert!(settings.restore_input().is_none());

        settings.mark_clean();
        settings.set_output(Some(&MidiPortDescriptor {
            index: 3,
            name: "FluidSynth".to_string(),
        }));
        assert!(!settings.has_been_saved());
        assert!(matches!(
            settings.restore_input(),
            Some(MidiServiceInput::RestoreMidiOutput(name)) if name == "FluidSynth"
        ));

        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"selected-output":"FluidSynth"}"#);
        let restored: MidiSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }
}
