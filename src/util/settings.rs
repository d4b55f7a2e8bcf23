// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about a playback session.
//! Intended to be serialized.

use crate::types::Tempo;
use anyhow::{Context, Result};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tracks whether a settings struct has changed since it was last saved.
pub trait HasSettings {
    /// Whether the struct matches what's on disk.
    fn has_been_saved(&self) -> bool;

    /// Marks the struct as changed.
    fn needs_save(&mut self);

    /// Marks the struct as saved.
    fn mark_clean(&mut self);
}

/// Contains persistent playback settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SequencerSettings {
    /// The tempo that tracks and compositions play at.
    #[serde(default)]
    pub tempo: Tempo,

    /// The velocity used for notes that don't carry their own.
    #[serde(default = "SequencerSettings::default_velocity")]
    #[derivative(Default(value = "Self::DEFAULT_VELOCITY"))]
    pub default_velocity: u8,

    /// Whether multi-voice playback stops every sounding note before
    /// reporting a failed note-on.
    #[serde(default)]
    pub flush_on_failure: bool,

    /// Whether the multi-voice polling loop yields the thread between passes.
    #[serde(default = "SequencerSettings::default_yield_while_polling")]
    #[derivative(Default(value = "true"))]
    pub yield_while_polling: bool,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    has_been_saved: bool,
}
impl HasSettings for SequencerSettings {
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
impl SequencerSettings {
    #[allow(missing_docs)]
    pub const DEFAULT_VELOCITY: u8 = 100;

    fn default_velocity() -> u8 {
        Self::DEFAULT_VELOCITY
    }

    fn default_yield_while_polling() -> bool {
        true
    }

    /// Updates the tempo and marks the struct eligible to save.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        if tempo != self.tempo {
            self.tempo = tempo;
            self.needs_save();
        }
    }

    /// Updates the default velocity and marks the struct eligible to save.
    pub fn set_default_velocity(&mut self, velocity: u8) {
        if velocity != self.default_velocity {
            self.default_velocity = velocity;
            self.needs_save();
        }
    }

    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Writes settings to a JSON file, then marks them clean.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        self.mark_clean();
        Ok(())
    }
}
