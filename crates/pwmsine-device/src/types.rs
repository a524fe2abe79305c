use std::fmt;

use pwmsine_frame::command;
use serde::{Deserialize, Serialize};

/// Number of PWM output channels.
pub const CHANNEL_COUNT: u8 = 3;

/// A validated PWM channel index in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Channel(u8);

impl Channel {
    /// All channels in index order.
    pub const ALL: [Channel; CHANNEL_COUNT as usize] = [Channel(0), Channel(1), Channel(2)];

    /// Returns `None` unless `index` is 0, 1 or 2.
    pub const fn new(index: u8) -> Option<Self> {
        if index < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pwm{}", self.0)
    }
}

/// Sinusoid settings for one channel, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SineParams {
    /// Channel index, 0..=2.
    pub channel: u8,
    /// Normalized amplitude, `[0, 1]`.
    pub amplitude: f64,
    /// Phase in whole degrees, `[0, 360)`.
    pub phase_degrees: u16,
    /// Normalized offset, `[0, 1]`.
    pub offset: f64,
    /// Frequency in Hz, `[0, 200]`, resolved to 0.01 Hz.
    pub frequency_hz: f64,
}

/// Run state as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RunStatus {
    Stopped = 0,
    Running = 1,
}

impl RunStatus {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Stopped),
            1 => Some(Self::Running),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// Idle behavior: when on, each channel holds its DC value while stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DcMode {
    Off = 0,
    On = 1,
}

impl DcMode {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            _ => None,
        }
    }

    /// Each direction has its own command id.
    pub const fn command_id(self) -> u8 {
        match self {
            Self::On => command::DC_MODE_ON,
            Self::Off => command::DC_MODE_OFF,
        }
    }
}

impl fmt::Display for DcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::On => f.write_str("on"),
        }
    }
}

/// Raw diagnostic counters from the `DEBUG` command. Not converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugValues(pub [u16; 6]);

/// Everything the device reports about its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub status: RunStatus,
    pub max_cycle: u16,
    pub dc_mode: DcMode,
    pub dc_values: Vec<f64>,
    pub sine_params: Vec<SineParams>,
}

/// How a cancellable wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The device reported `Stopped`.
    Stopped,
    /// The cancellation token fired first.
    Cancelled,
    /// The deadline passed while the device was still running.
    DeadlineElapsed,
}
