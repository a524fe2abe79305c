use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Vendor/product ID pair used to locate a device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// An opened USB device handle exposing blocking bulk transfers.
///
/// Implementations own the underlying handle. After [`close`](Self::close)
/// every other method must fail with [`TransportError::Closed`] rather than
/// touch the released device.
///
/// [`TransportError::Closed`]: crate::TransportError::Closed
pub trait UsbTransport {
    /// Claim an interface so bulk transfers on its endpoints are permitted.
    fn claim_interface(&mut self, interface: u8) -> Result<()>;

    /// Write `data` to a bulk-out endpoint, returning the number of bytes sent.
    fn bulk_write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize>;

    /// Read from a bulk-in endpoint into `buf`.
    ///
    /// Returns `Ok(None)` when the device produced no data within `timeout`.
    /// That case is expected on this class of device and is not an error.
    fn bulk_read(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration)
        -> Result<Option<usize>>;

    /// Release the device handle.
    fn close(&mut self) -> Result<()>;
}

impl<T: UsbTransport + ?Sized> UsbTransport for Box<T> {
    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        (**self).claim_interface(interface)
    }

    fn bulk_write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize> {
        (**self).bulk_write(endpoint, data, timeout)
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>> {
        (**self).bulk_read(endpoint, buf, timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Finds and opens a device handle by ID.
///
/// First match wins; choosing between several identical devices is left to
/// implementations.
pub trait Discovery {
    type Transport: UsbTransport;

    /// Open the first attached device matching `id`.
    ///
    /// Fails with [`TransportError::NotFound`](crate::TransportError::NotFound)
    /// when nothing matches.
    fn find(&self, id: DeviceId) -> Result<Self::Transport>;
}
