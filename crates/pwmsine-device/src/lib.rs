//! Session and controller for the PWM sine stimulus generator.
//!
//! This is the "just works" layer. Open the device, set sine parameters in
//! physical units (normalized amplitude, degrees, Hz) and start or stop the
//! output. Range checks happen here, before any bytes reach the device.
//!
//! ```no_run
//! # #[cfg(feature = "usb")]
//! # fn demo() -> pwmsine_device::Result<()> {
//! use pwmsine_device::SineParams;
//!
//! let mut device = pwmsine_device::open()?;
//! device.set_sine_param(&SineParams {
//!     channel: 0,
//!     amplitude: 0.5,
//!     phase_degrees: 0,
//!     offset: 0.5,
//!     frequency_hz: 1.0,
//! })?;
//! device.start()?;
//! device.wait()?;
//! # Ok(())
//! # }
//! ```

pub mod connector;
pub mod controller;
pub mod error;
pub mod session;
pub mod types;
pub mod units;

#[cfg(feature = "usb")]
pub use connector::open;
pub use connector::open_with_config;
pub use controller::PwmSineDevice;
pub use error::{DeviceError, Result};
pub use session::{Session, SessionConfig, INTERFACE, PRODUCT_ID, VENDOR_ID};
pub use types::{
    Channel, DcMode, DebugValues, DeviceSnapshot, RunStatus, SineParams, WaitOutcome,
    CHANNEL_COUNT,
};
pub use units::{Calibration, MAX_FREQUENCY_HZ, PHASE_LIMIT};

/// Re-exported so callers of [`PwmSineDevice::wait_until`] need no direct dependency.
pub use tokio_util::sync::CancellationToken;
