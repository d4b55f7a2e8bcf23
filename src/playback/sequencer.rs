// Copyright (c) 2024 Mike Tsao

use super::{Controller, Result, SequencerEvent};
use crate::{
    error::{DeviceError, SequencerError},
    traits::{Clock, MidiDevice},
    types::{MidiChannel, Tempo},
    util::{SequencerSettings, SystemClock},
};
use crossbeam::channel::{Receiver, Sender};

/// A [Sequencer] is one playback session. It owns the [MidiDevice] that makes
/// the sound and the [Clock] that paces it.
///
/// Only one playback call can run at a time, because each call needs the
/// device to itself. Create one [Sequencer] per device.
#[derive(Debug)]
pub struct Sequencer<D: MidiDevice, C: Clock = SystemClock> {
    pub(super) device: D,
    pub(super) clock: C,
    pub(super) settings: SequencerSettings,
    subscribers: Vec<Sender<SequencerEvent>>,
}
impl<D: MidiDevice> Sequencer<D, SystemClock> {
    /// Creates a session that plays on `device` in real time.
    pub fn new(device: D) -> Self {
        Self::new_with_clock(device, SystemClock::default())
    }
}
impl<D: MidiDevice, C: Clock> Sequencer<D, C> {
    /// The highest controller number, and the highest value, that
    /// [Sequencer::control_change()] accepts.
    pub const MAX_CONTROL_VALUE: u8 = 128;

    /// Creates a session that takes its time from `clock`.
    pub fn new_with_clock(device: D, clock: C) -> Self {
        Self::new_with(device, clock, SequencerSettings::default())
    }

    /// Creates a session with the given settings.
    pub fn new_with(device: D, clock: C, settings: SequencerSettings) -> Self {
        Self {
            device,
            clock,
            settings,
            subscribers: Vec::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[allow(missing_docs)]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Ends the session, handing back the device.
    pub fn into_device(self) -> D {
        self.device
    }

    #[allow(missing_docs)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn settings_mut(&mut self) -> &mut SequencerSettings {
        &mut self.settings
    }

    /// The tempo that tracks and compositions play at.
    pub fn tempo(&self) -> Tempo {
        self.settings.tempo
    }

    #[allow(missing_docs)]
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.settings.set_tempo(tempo);
    }

    /// Returns a channel that receives a [SequencerEvent] for every device
    /// call that succeeds from now on. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<SequencerEvent> {
        let (sender, receiver) = crossbeam::channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub(super) fn publish(&mut self, event: SequencerEvent) {
        if !self.subscribers.is_empty() {
            self.subscribers
                .retain(|subscriber| subscriber.send(event).is_ok());
        }
    }

    pub(super) fn check_tempo(tempo: Tempo) -> Result<()> {
        if tempo.is_playable() {
            Ok(())
        } else {
            Err(SequencerError::InvalidTempo(tempo.0))
        }
    }

    /// Sends a controller change. Controllers and values above
    /// [Self::MAX_CONTROL_VALUE] are refused without calling the device.
    pub fn control_change(
        &mut self,
        channel: MidiChannel,
        controller: u8,
        value: u8,
    ) -> Result<()> {
        if controller > Self::MAX_CONTROL_VALUE || value > Self::MAX_CONTROL_VALUE {
            return Err(SequencerError::ControlOutOfRange { controller, value });
        }
        self.device.control_change(channel, controller, value)?;
        log::trace!("control change {controller} = {value} on channel {channel}");
        self.publish(SequencerEvent::ControlChange {
            channel,
            controller,
            value,
        });
        Ok(())
    }

    /// Sends a change to one of the named [Controller]s.
    pub fn set_controller(
        &mut self,
        channel: MidiChannel,
        controller: Controller,
        value: u8,
    ) -> Result<()> {
        log::debug!("setting {controller} to {value} on channel {channel}");
        self.control_change(channel, controller.number(), value)
    }

    #[allow(missing_docs)]
    pub fn set_modulation(&mut self, channel: MidiChannel, value: u8) -> Result<()> {
        self.set_controller(channel, Controller::Modulation, value)
    }

    #[allow(missing_docs)]
    pub fn set_main_volume(&mut self, channel: MidiChannel, value: u8) -> Result<()> {
        self.set_controller(channel, Controller::MainVolume, value)
    }

    #[allow(missing_docs)]
    pub fn set_pan(&mut self, channel: MidiChannel, value: u8) -> Result<()> {
        self.set_controller(channel, Controller::Pan, value)
    }

    /// Selects `program` from bank 0 for `channel`.
    pub fn set_instrument(&mut self, channel: MidiChannel, program: u8) -> Result<()> {
        const BANK: u16 = 0;

        self.device.program_select(channel, BANK, program)?;
        log::debug!("channel {channel} now plays program {program}");
        self.publish(SequencerEvent::ProgramChange {
            channel,
            bank: BANK,
            program,
        });
        Ok(())
    }

    /// Stops every key on every channel, whether or not it's sounding.
    ///
    /// Every note-off is attempted even if some fail; the first failure is
    /// returned afterward.
    pub fn stop_everything(&mut self) -> Result<()> {
        let mut first_error: Option<DeviceError> = None;
        let mut failures = 0;
        for channel in MidiChannel::all() {
            for key in 0..=127 {
                match self.device.note_off(channel, key) {
                    Ok(()) => self.publish(SequencerEvent::NoteOff { channel, key }),
                    Err(e) => {
                        failures += 1;
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
        }
        match first_error {
            Some(e) => {
                log::warn!("{failures} note-offs failed while stopping everything: {e}");
                Err(e.into())
            }
            None => Ok(()),
        }
    }
}
