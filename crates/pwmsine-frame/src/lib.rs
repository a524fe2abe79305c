//! Fixed-size command framing for the PWM sine stimulus generator.
//!
//! Every transfer in either direction is one 16-byte frame:
//! - byte 0 is the command id (echoed back in the response)
//! - bytes 1..16 are the command payload, big-endian fields, zero-padded
//!
//! The codec is pure; [`FrameLink`] moves frames over a USB transport.

pub mod codec;
pub mod command;
pub mod error;
pub mod link;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, PayloadBuilder, PayloadReader,
    BULK_IN_ENDPOINT, BULK_OUT_ENDPOINT, FRAME_SIZE, MAX_PAYLOAD,
};
pub use command::{command_name, expects_response};
pub use error::{FrameError, Result};
pub use link::FrameLink;
