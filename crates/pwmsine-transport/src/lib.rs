//! USB bulk transport abstraction.
//!
//! The stimulus generator talks over one bulk-out and one bulk-in endpoint.
//! This crate is the lowest layer: it knows how to find a device, claim its
//! interface and move raw bytes, and nothing about what those bytes mean.
//!
//! - [`UsbTransport`]: bulk read/write primitives with per-call timeouts
//! - [`Discovery`]: locates a device by vendor/product ID
//! - [`NusbDiscovery`] / [`NusbTransport`]: real hardware via `nusb` (`usb` feature)
//! - [`MockTransport`]: scripted in-memory transport for tests

pub mod error;
pub mod mock;
pub mod traits;

#[cfg(feature = "usb")]
pub mod usb;

pub use error::{Result, TransportError};
pub use mock::{MockRead, MockTransport, MockWrite};
pub use traits::{DeviceId, Discovery, UsbTransport};

#[cfg(feature = "usb")]
pub use usb::{NusbDiscovery, NusbTransport};
