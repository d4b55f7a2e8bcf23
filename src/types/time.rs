// Copyright (c) 2024 Mike Tsao

//! Handles wall-clock and musical time.

use core::fmt;
use core::time::Duration;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Beats per minute.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Derivative, PartialEq, PartialOrd)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct Tempo(#[derivative(Default(value = "120.0"))] pub f64);
impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} BPM", self.0))
    }
}
impl From<f64> for Tempo {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<u16> for Tempo {
    fn from(value: u16) -> Self {
        Self(value as f64)
    }
}
impl Tempo {
    /// The number of quarter notes in the bar that the schedulers measure
    /// everything against. Bar lengths and note durations are fractions of
    /// this bar.
    pub const QUARTERS_IN_BAR: f64 = 4.0;

    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 / 60.0
    }

    /// Whether this tempo can drive playback. Zero, negative, and non-finite
    /// tempos can't.
    pub fn is_playable(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// How long a quarter note lasts.
    pub fn quarter_note(&self) -> Seconds {
        Seconds(60.0 / self.0)
    }

    /// How long a whole bar lasts.
    pub fn bar(&self) -> Seconds {
        Seconds(self.quarter_note().0 * Self::QUARTERS_IN_BAR)
    }

    /// How long a note lasts whose length is `1 / denominator` of a bar. A
    /// denominator of 4 is a quarter note.
    pub fn note(&self, denominator: f64) -> Seconds {
        Seconds(self.quarter_note().0 * (Self::QUARTERS_IN_BAR / denominator))
    }
}

/// Wall-clock time, in seconds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.3}s", self.0))
    }
}
impl From<Duration> for Seconds {
    fn from(value: Duration) -> Self {
        Self(value.as_secs_f64())
    }
}
impl From<Seconds> for Duration {
    fn from(value: Seconds) -> Self {
        Duration::from_secs_f64(value.0.max(0.0))
    }
}
