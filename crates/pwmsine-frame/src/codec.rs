use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::command_name;
use crate::error::{FrameError, Result};

/// Frame size on the wire, both directions.
pub const FRAME_SIZE: usize = 16;

/// Payload capacity after the command byte.
pub const MAX_PAYLOAD: usize = FRAME_SIZE - 1;

/// Bulk-out endpoint address (host to device).
pub const BULK_OUT_ENDPOINT: u8 = 0x06;

/// Bulk-in endpoint address (device to host).
pub const BULK_IN_ENDPOINT: u8 = 0x82;

/// A fixed-size command frame.
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────┐
/// │ Command    │ Payload (15B, big-endian fields,          │
/// │ id (1B)    │ zero-padded)                              │
/// └────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_SIZE],
}

impl Frame {
    /// The command id in byte 0.
    pub fn command_id(&self) -> u8 {
        self.bytes[0]
    }

    /// The payload after the command byte, always [`MAX_PAYLOAD`] bytes.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// The full wire image.
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    /// Build an inbound frame from the bytes a bulk read returned.
    ///
    /// Short reads are zero-padded to the frame size.
    pub fn from_wire(wire: &[u8]) -> Result<Self> {
        if wire.is_empty() {
            return Err(FrameError::Empty);
        }
        if wire.len() > FRAME_SIZE {
            return Err(FrameError::Oversized {
                len: wire.len(),
                max: FRAME_SIZE,
            });
        }
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[..wire.len()].copy_from_slice(wire);
        Ok(Self { bytes })
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("command", &command_name(self.command_id()))
            .field("id", &self.command_id())
            .field("payload", &self.payload())
            .finish()
    }
}

/// Encode a command id and payload into a frame.
///
/// The payload starts at offset 1; the remainder is zero-filled.
pub fn encode_frame(command_id: u8, payload: &[u8]) -> Result<Frame> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[0] = command_id;
    bytes[1..1 + payload.len()].copy_from_slice(payload);
    Ok(Frame { bytes })
}

/// Split a frame into its command id and payload. No validation is done.
pub fn decode_frame(frame: &Frame) -> (u8, &[u8]) {
    (frame.command_id(), frame.payload())
}

/// Builds a request payload field by field.
///
/// Multi-byte fields are big-endian. Capacity is checked by [`encode_frame`].
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    buf: BytesMut,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_PAYLOAD),
        }
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.put_u8(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.put_u16(value);
        self
    }

    pub fn build(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Reads response payload fields in order.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { buf: payload }
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Big-endian: `(high << 8) | low`.
    pub fn u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.buf.advance(count);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(FrameError::Truncated {
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }
}

/// Endpoint and timeout configuration for frame transfer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bulk-out endpoint. Default: `0x06`.
    pub out_endpoint: u8,
    /// Bulk-in endpoint. Default: `0x82`.
    pub in_endpoint: u8,
    /// Timeout for each bulk write. Default: 9999 ms; the write side rarely stalls.
    pub write_timeout: Duration,
    /// Timeout for each bulk read. Default: 1000 ms.
    pub read_timeout: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            out_endpoint: BULK_OUT_ENDPOINT,
            in_endpoint: BULK_IN_ENDPOINT,
            write_timeout: Duration::from_millis(9999),
            read_timeout: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{GET_SINE_PARAM, SET_SINE_PARAM, START};

    #[test]
    fn test_encode_places_id_and_zero_pads() {
        let frame = encode_frame(SET_SINE_PARAM, &[1, 0x12, 0x34]).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), FRAME_SIZE);
        assert_eq!(bytes[0], SET_SINE_PARAM);
        assert_eq!(&bytes[1..4], &[1, 0x12, 0x34]);
        assert!(bytes[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode_frame(START, &[]).unwrap();
        assert_eq!(frame.command_id(), START);
        assert!(frame.payload().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_full_payload() {
        let payload = [0xAB; MAX_PAYLOAD];
        let frame = encode_frame(START, &payload).unwrap();
        assert_eq!(frame.payload(), &payload);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let result = encode_frame(START, &[0; MAX_PAYLOAD + 1]);
        assert!(matches!(
            result,
            Err(FrameError::PayloadTooLarge { size: 16, max: 15 })
        ));
    }

    #[test]
    fn test_decode_returns_payload_verbatim() {
        let frame = Frame::from_wire(&[GET_SINE_PARAM, 2, 0xFF]).unwrap();
        let (id, payload) = decode_frame(&frame);
        assert_eq!(id, GET_SINE_PARAM);
        assert_eq!(payload.len(), MAX_PAYLOAD);
        assert_eq!(&payload[..2], &[2, 0xFF]);
    }

    #[test]
    fn test_from_wire_rejects_empty_and_oversized() {
        assert!(matches!(Frame::from_wire(&[]), Err(FrameError::Empty)));
        assert!(matches!(
            Frame::from_wire(&[0; FRAME_SIZE + 1]),
            Err(FrameError::Oversized { len: 17, .. })
        ));
    }

    #[test]
    fn test_payload_fields_are_big_endian() {
        let payload = PayloadBuilder::new().u8(2).u16(0x1234).u16(359).build();
        assert_eq!(payload.as_ref(), &[2, 0x12, 0x34, 0x01, 0x67]);

        let mut reader = PayloadReader::new(&payload);
        assert_eq!(reader.u8().unwrap(), 2);
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.u16().unwrap(), 359);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_reports_truncation() {
        let mut reader = PayloadReader::new(&[0x01]);
        assert!(matches!(
            reader.u16(),
            Err(FrameError::Truncated {
                needed: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_reader_skip() {
        let mut reader = PayloadReader::new(&[9, 0x00, 0x2A]);
        reader.skip(1).unwrap();
        assert_eq!(reader.u16().unwrap(), 42);
    }

    #[test]
    fn test_debug_names_command() {
        let frame = encode_frame(START, &[]).unwrap();
        assert!(format!("{frame:?}").contains("START"));
    }
}
