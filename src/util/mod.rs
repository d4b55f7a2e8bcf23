// Copyright (c) 2024 Mike Tsao

//! System utilities: clocks, settings, and a device for tests.

/// Commonly used imports.
pub mod prelude {
    pub use super::{HasSettings, ManualClock, RecordingDevice, SequencerSettings, SystemClock};
}

pub use clock::{ManualClock, SystemClock};
pub use recording::{DeviceCall, RecordingDevice};
pub use settings::{HasSettings, SequencerSettings};

mod clock;
mod recording;
mod settings;
