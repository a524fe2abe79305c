use std::time::{Duration, Instant};

use pwmsine_frame::{
    command, command_name, encode_frame, Frame, FrameConfig, FrameLink, PayloadReader,
};
use pwmsine_transport::{DeviceId, UsbTransport};
use tracing::{debug, info, warn};

use crate::error::{DeviceError, Result};
use crate::units::Calibration;

/// USB vendor ID of the stimulus generator.
pub const VENDOR_ID: u16 = 0x1781;
/// USB product ID of the stimulus generator.
pub const PRODUCT_ID: u16 = 0x0BB0;
/// Interface carrying the bulk endpoints.
pub const INTERFACE: u8 = 0;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// IDs handed to discovery.
    pub device_id: DeviceId,
    /// Interface to claim after open.
    pub interface: u8,
    /// Endpoints and per-transfer timeouts.
    pub frame: FrameConfig,
    /// Maximum send/receive attempts per exchange while the device has no data.
    pub max_attempts: u32,
    /// Maximum wall time spent retrying one exchange.
    pub retry_budget: Duration,
    /// Read timeout for the priming exchange.
    pub prime_read_timeout: Duration,
    /// Status polling interval used by `wait`.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceId::new(VENDOR_ID, PRODUCT_ID),
            interface: INTERFACE,
            frame: FrameConfig::default(),
            max_attempts: 50,
            retry_budget: Duration::from_secs(5),
            prime_read_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// An open, calibrated connection to one device.
///
/// Owns the transport (through its [`FrameLink`]) and the calibration
/// constant. One request is in flight at a time; every call takes `&mut self`.
/// Dropping an open session closes it.
pub struct Session<T: UsbTransport> {
    link: Option<FrameLink<T>>,
    calibration: Calibration,
    config: SessionConfig,
}

impl<T: UsbTransport> Session<T> {
    /// Claim the interface, prime the endpoints and read the calibration.
    ///
    /// The first write/read pair after opening is unreliable on this device,
    /// so a `DUMMY` exchange goes first and its reply is discarded whatever it
    /// contains.
    pub fn open(transport: T, config: SessionConfig) -> Result<Self> {
        let mut link = FrameLink::with_config(transport, config.frame.clone());
        link.claim_interface(config.interface)?;
        link.clear_buffers();

        let dummy = encode_frame(command::DUMMY, &[])?;
        round_trip(&mut link, &config, &dummy, config.prime_read_timeout, false)?;
        debug!("endpoints primed");

        let request = encode_frame(command::GET_TOP, &[])?;
        let response = round_trip(&mut link, &config, &request, config.frame.read_timeout, true)?;
        let top = PayloadReader::new(response.payload()).u16()?;
        let calibration = Calibration::new(top)?;

        info!(top, device = %config.device_id, "session open");

        Ok(Self {
            link: Some(link),
            calibration,
            config,
        })
    }

    /// Send a command and return the matching response frame.
    ///
    /// Empty reads are retried by resending the request, up to
    /// `max_attempts` or `retry_budget`. A response for a different command
    /// fails immediately with [`DeviceError::ProtocolMismatch`].
    pub fn exchange(&mut self, command_id: u8, payload: &[u8]) -> Result<Frame> {
        let request = encode_frame(command_id, payload)?;
        let read_timeout = self.config.frame.read_timeout;
        let link = self.link.as_mut().ok_or(DeviceError::SessionClosed)?;
        round_trip(link, &self.config, &request, read_timeout, true)
    }

    /// Send a command without waiting for a response.
    pub fn send_only(&mut self, command_id: u8, payload: &[u8]) -> Result<()> {
        let request = encode_frame(command_id, payload)?;
        let link = self.link.as_mut().ok_or(DeviceError::SessionClosed)?;
        link.send(&request)?;
        debug!(command = command_name(command_id), "sent without response");
        Ok(())
    }

    /// Release the transport. Later calls fail with [`DeviceError::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        let mut link = self.link.take().ok_or(DeviceError::SessionClosed)?;
        link.close()?;
        info!("session closed");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<T: UsbTransport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(mut link) = self.link.take() {
            if let Err(err) = link.close() {
                debug!(error = %err, "close on drop failed");
            }
        }
    }
}

impl<T: UsbTransport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.link.is_some())
            .field("top", &self.calibration.top())
            .finish()
    }
}

fn round_trip<T: UsbTransport>(
    link: &mut FrameLink<T>,
    config: &SessionConfig,
    request: &Frame,
    read_timeout: Duration,
    check_id: bool,
) -> Result<Frame> {
    let expected = request.command_id();
    let name = command_name(expected);
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        link.send(request)?;

        match link.recv_timeout(read_timeout)? {
            Some(response) => {
                let received = response.command_id();
                debug!(command = name, attempts, received, "response received");
                if check_id && received != expected {
                    return Err(DeviceError::ProtocolMismatch { expected, received });
                }
                return Ok(response);
            }
            None => {
                let elapsed = started.elapsed();
                if attempts >= config.max_attempts || elapsed >= config.retry_budget {
                    return Err(DeviceError::Timeout {
                        command: name,
                        attempts,
                        elapsed,
                    });
                }
                warn!(command = name, attempt = attempts, "no data from device, resending");
            }
        }
    }
}
