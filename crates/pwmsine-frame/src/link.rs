use std::time::Duration;

use pwmsine_transport::UsbTransport;
use tracing::trace;

use crate::codec::{Frame, FrameConfig, FRAME_SIZE};
use crate::error::{FrameError, Result};

/// Moves whole frames over a [`UsbTransport`].
///
/// Owns the transport and the two frame-sized I/O buffers. Both buffers are
/// zeroed before each use so a frame never carries bytes from a previous one.
pub struct FrameLink<T> {
    inner: T,
    out_buf: [u8; FRAME_SIZE],
    in_buf: [u8; FRAME_SIZE],
    config: FrameConfig,
}

impl<T: UsbTransport> FrameLink<T> {
    /// Create a link with default endpoints and timeouts.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a link with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            out_buf: [0; FRAME_SIZE],
            in_buf: [0; FRAME_SIZE],
            config,
        }
    }

    /// Write one frame to the bulk-out endpoint (blocking).
    pub fn send(&mut self, frame: &Frame) -> Result<()> {
        self.out_buf.copy_from_slice(frame.as_bytes());
        let written = self.inner.bulk_write(
            self.config.out_endpoint,
            &self.out_buf,
            self.config.write_timeout,
        )?;
        if written < FRAME_SIZE {
            return Err(FrameError::ShortWrite {
                written,
                expected: FRAME_SIZE,
            });
        }
        trace!(?frame, "frame sent");
        Ok(())
    }

    /// Read one frame using the configured read timeout.
    ///
    /// Returns `Ok(None)` when the device had nothing to send.
    pub fn recv(&mut self) -> Result<Option<Frame>> {
        self.recv_timeout(self.config.read_timeout)
    }

    /// Read one frame with an explicit timeout.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        self.in_buf.fill(0);
        let read = self
            .inner
            .bulk_read(self.config.in_endpoint, &mut self.in_buf, timeout)?;
        match read {
            None => Ok(None),
            Some(len) => {
                let wire = self
                    .in_buf
                    .get(..len)
                    .ok_or(FrameError::Oversized {
                        len,
                        max: FRAME_SIZE,
                    })?;
                let frame = Frame::from_wire(wire)?;
                trace!(?frame, "frame received");
                Ok(Some(frame))
            }
        }
    }

    /// Zero both I/O buffers.
    pub fn clear_buffers(&mut self) {
        self.out_buf.fill(0);
        self.in_buf.fill(0);
    }

    /// Claim the device interface carrying the bulk endpoints.
    pub fn claim_interface(&mut self, interface: u8) -> Result<()> {
        self.inner.claim_interface(interface)?;
        Ok(())
    }

    /// Release the transport handle.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close()?;
        Ok(())
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the link and return the transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current link configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for FrameLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLink")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pwmsine_transport::{MockTransport, TransportError};

    use super::*;
    use crate::codec::{encode_frame, BULK_IN_ENDPOINT, BULK_OUT_ENDPOINT};
    use crate::command::{GET_TOP, SET_MAX_CYCLE};

    #[test]
    fn send_writes_full_frame_to_out_endpoint() {
        let mock = MockTransport::new();
        let mut link = FrameLink::new(mock.clone());

        let frame = encode_frame(SET_MAX_CYCLE, &[0x00, 0x05]).unwrap();
        link.send(&frame).unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].endpoint, BULK_OUT_ENDPOINT);
        assert_eq!(writes[0].data.len(), FRAME_SIZE);
        assert_eq!(&writes[0].data[..3], &[SET_MAX_CYCLE, 0x00, 0x05]);
        assert_eq!(writes[0].timeout, Duration::from_millis(9999));
    }

    #[test]
    fn recv_pads_short_reads() {
        let mock = MockTransport::new();
        mock.push_response(vec![GET_TOP, 0x03, 0xE8]);
        let mut link = FrameLink::new(mock);

        let frame = link.recv().unwrap().expect("frame expected");
        assert_eq!(frame.command_id(), GET_TOP);
        assert_eq!(&frame.payload()[..3], &[0x03, 0xE8, 0x00]);
    }

    #[test]
    fn recv_without_data_is_none() {
        let mut link = FrameLink::new(MockTransport::new());
        assert!(link.recv().unwrap().is_none());
    }

    #[test]
    fn recv_does_not_leak_previous_bytes() {
        let mock = MockTransport::new();
        mock.push_response(vec![GET_TOP; FRAME_SIZE])
            .push_response(vec![SET_MAX_CYCLE]);
        let mut link = FrameLink::new(mock);

        link.recv().unwrap();
        let second = link.recv().unwrap().expect("frame expected");
        assert!(second.payload().iter().all(|b| *b == 0));
    }

    #[test]
    fn read_failure_propagates_as_transport_error() {
        let mock = MockTransport::new();
        mock.push_failure();
        let mut link = FrameLink::new(mock);

        let err = link.recv().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Read {
                endpoint: BULK_IN_ENDPOINT,
                ..
            })
        ));
    }

    /// Claims to have read more bytes than the buffer it was handed.
    struct OverreportingTransport;

    impl UsbTransport for OverreportingTransport {
        fn claim_interface(&mut self, _interface: u8) -> pwmsine_transport::Result<()> {
            Ok(())
        }

        fn bulk_write(
            &mut self,
            _endpoint: u8,
            data: &[u8],
            _timeout: Duration,
        ) -> pwmsine_transport::Result<usize> {
            Ok(data.len())
        }

        fn bulk_read(
            &mut self,
            _endpoint: u8,
            _buf: &mut [u8],
            _timeout: Duration,
        ) -> pwmsine_transport::Result<Option<usize>> {
            Ok(Some(FRAME_SIZE + 1))
        }

        fn close(&mut self) -> pwmsine_transport::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn overreported_read_length_is_rejected() {
        let mut link = FrameLink::new(OverreportingTransport);
        let err = link.recv().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Oversized {
                len: 17,
                max: FRAME_SIZE
            }
        ));
    }

    #[test]
    fn close_releases_transport() {
        let mock = MockTransport::new();
        let mut link = FrameLink::new(mock.clone());
        link.close().unwrap();
        assert!(mock.is_closed());
        assert!(link.send(&encode_frame(GET_TOP, &[]).unwrap()).is_err());
    }
}
