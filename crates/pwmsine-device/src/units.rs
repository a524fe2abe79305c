//! Conversion between physical units and device integers.
//!
//! Amplitude, offset and DC values are fractions of the calibration constant
//! `top`. Frequency travels as centihertz and phase as whole degrees. Every
//! `*_to_device` function validates its input before any I/O happens.

use crate::error::{DeviceError, Result};
use crate::types::{Channel, CHANNEL_COUNT};

/// Highest frequency the device accepts, in Hz.
pub const MAX_FREQUENCY_HZ: f64 = 200.0;

/// Highest frequency the device accepts, in centihertz.
pub const MAX_FREQUENCY_CHZ: u16 = 20_000;

/// Phase is valid in `[0, PHASE_LIMIT)` degrees.
pub const PHASE_LIMIT: u16 = 360;

/// The device's full-scale duty-cycle count, read once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    top: u16,
}

impl Calibration {
    /// A zero `top` would make every duty conversion meaningless.
    pub fn new(top: u16) -> Result<Self> {
        if top == 0 {
            return Err(DeviceError::Protocol(
                "device reported a zero calibration constant".to_string(),
            ));
        }
        Ok(Self { top })
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    /// Normalized duty (amplitude, offset or DC value) to device counts.
    ///
    /// `round(value * top)`; fails if `value` is negative, not finite, or
    /// scales past `top`.
    pub fn duty_to_device(&self, parameter: &'static str, value: f64) -> Result<u16> {
        if !value.is_finite() {
            return Err(DeviceError::validation(parameter, "must be a finite number"));
        }
        if value < 0.0 {
            return Err(DeviceError::validation(
                parameter,
                format!("{value} must be >= 0"),
            ));
        }
        let scaled = (value * f64::from(self.top)).round();
        if scaled > f64::from(self.top) {
            return Err(DeviceError::validation(
                parameter,
                format!("{value} must be in range [0, 1]"),
            ));
        }
        Ok(scaled as u16)
    }

    /// Device counts to normalized duty.
    pub fn duty_from_device(&self, raw: u16) -> f64 {
        f64::from(raw) / f64::from(self.top)
    }
}

/// Hz to centihertz, `round(hz * 100)`.
pub fn frequency_to_device(hz: f64) -> Result<u16> {
    if !hz.is_finite() || !(0.0..=MAX_FREQUENCY_HZ).contains(&hz) {
        return Err(DeviceError::validation(
            "frequency",
            format!("{hz} Hz must be in range [0, {MAX_FREQUENCY_HZ}]"),
        ));
    }
    let chz = (hz * 100.0).round();
    if chz > f64::from(MAX_FREQUENCY_CHZ) {
        return Err(DeviceError::validation(
            "frequency",
            format!("{chz} cHz must be in range [0, {MAX_FREQUENCY_CHZ}]"),
        ));
    }
    Ok(chz as u16)
}

/// Centihertz to Hz.
pub fn frequency_from_device(chz: u16) -> f64 {
    f64::from(chz) / 100.0
}

pub fn phase_to_device(degrees: u16) -> Result<u16> {
    if degrees >= PHASE_LIMIT {
        return Err(DeviceError::validation(
            "phase",
            format!("{degrees} must be in range [0, {PHASE_LIMIT})"),
        ));
    }
    Ok(degrees)
}

pub fn validate_channel(index: u8) -> Result<Channel> {
    Channel::new(index).ok_or_else(|| {
        DeviceError::validation(
            "channel",
            format!("{index} must be in [0, {}]", CHANNEL_COUNT - 1),
        )
    })
}

pub fn validate_max_cycle(cycles: u16) -> Result<u16> {
    if cycles == 0 {
        return Err(DeviceError::validation("max_cycle", "must be >= 1"));
    }
    Ok(cycles)
}

/// Narrow a cycle count from a wider source, such as user input, to the
/// 16-bit wire field.
pub fn max_cycle_from_count(count: u32) -> Result<u16> {
    let cycles = u16::try_from(count).map_err(|_| {
        DeviceError::validation("max_cycle", format!("{count} must be in [1, {}]", u16::MAX))
    })?;
    validate_max_cycle(cycles)
}
