use std::time::Duration;

use nusb::transfer::RequestBuffer;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{DeviceId, Discovery, UsbTransport};

/// Discovery over the host's USB bus via `nusb`.
///
/// Picks the first device whose descriptor matches the requested IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NusbDiscovery;

impl Discovery for NusbDiscovery {
    type Transport = NusbTransport;

    fn find(&self, id: DeviceId) -> Result<NusbTransport> {
        let info = nusb::list_devices()
            .map_err(TransportError::Enumerate)?
            .find(|d| d.vendor_id() == id.vendor_id && d.product_id() == id.product_id)
            .ok_or(TransportError::NotFound { id })?;

        info!(
            %id,
            bus = info.bus_number(),
            address = info.device_address(),
            "found usb device"
        );

        let device = info
            .open()
            .map_err(|source| TransportError::Open { id, source })?;
        NusbTransport::new(device)
    }
}

/// Blocking bulk transport over an opened `nusb` device.
///
/// `nusb` transfers are futures. A private current-thread runtime drives each
/// one to completion and bounds it with `tokio::time::timeout`; a transfer that
/// times out is dropped, which cancels it.
pub struct NusbTransport {
    device: Option<nusb::Device>,
    interface: Option<nusb::Interface>,
    runtime: Runtime,
}

impl NusbTransport {
    /// Wrap an opened device. No interface is claimed yet.
    pub fn new(device: nusb::Device) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        Ok(Self {
            device: Some(device),
            interface: None,
            runtime,
        })
    }

    fn interface(&self) -> Result<&nusb::Interface> {
        if self.device.is_none() {
            return Err(TransportError::Closed);
        }
        self.interface.as_ref().ok_or(TransportError::NotClaimed)
    }
}

impl UsbTransport for NusbTransport {
    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        let device = self.device.as_ref().ok_or(TransportError::Closed)?;
        // Detaches any kernel driver bound to the interface first.
        let claimed = device
            .detach_and_claim_interface(interface)
            .map_err(|source| TransportError::ClaimInterface { interface, source })?;
        debug!(interface, "claimed interface");
        self.interface = Some(claimed);
        Ok(())
    }

    fn bulk_write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize> {
        let transfer = self.interface()?.bulk_out(endpoint, data.to_vec());
        let completion = self
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, transfer).await })
            .map_err(|_| TransportError::Write {
                endpoint,
                source: std::io::Error::from(std::io::ErrorKind::TimedOut),
            })?;
        let sent = completion
            .into_result()
            .map_err(|err| TransportError::Write {
                endpoint,
                source: std::io::Error::other(err),
            })?;
        Ok(sent.actual_length())
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>> {
        let transfer = self
            .interface()?
            .bulk_in(endpoint, RequestBuffer::new(buf.len()));
        let completion = match self
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, transfer).await })
        {
            Ok(completion) => completion,
            Err(_elapsed) => return Ok(None),
        };
        let data = completion
            .into_result()
            .map_err(|err| TransportError::Read {
                endpoint,
                source: std::io::Error::other(err),
            })?;

        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(Some(len))
    }

    fn close(&mut self) -> Result<()> {
        if self.device.is_none() {
            return Err(TransportError::Closed);
        }
        self.interface = None;
        self.device = None;
        debug!("released usb device");
        Ok(())
    }
}

impl std::fmt::Debug for NusbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NusbTransport")
            .field("open", &self.device.is_some())
            .field("claimed", &self.interface.is_some())
            .finish()
    }
}
