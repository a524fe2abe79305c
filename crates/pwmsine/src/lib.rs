//! Host driver for the USB PWM sine stimulus generator.
//!
//! The generator drives three phase-shifted sinusoidal (or fixed duty-cycle)
//! PWM outputs. This crate re-exports the layered driver and ships the
//! `sine-stim` command-line tool (feature `cli`).
//!
//! # Crate Structure
//!
//! - [`transport`]: USB bulk transport abstraction (`nusb` backend, mock)
//! - [`frame`]: 16-byte command frames and the command id table
//! - [`device`]: calibrated session, unit conversion and the device controller

/// Re-export transport types.
pub mod transport {
    pub use pwmsine_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pwmsine_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use pwmsine_device::*;
}

pub use pwmsine_device::{DcMode, DeviceError, PwmSineDevice, RunStatus, SineParams};
