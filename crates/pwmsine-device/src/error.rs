use std::time::Duration;

use pwmsine_transport::DeviceId;

/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Discovery found no device with the expected IDs.
    #[error("device {id} not found")]
    DeviceNotFound { id: DeviceId },

    /// A caller-supplied parameter is outside its domain. No I/O was done.
    #[error("invalid {parameter}: {reason}")]
    Validation {
        parameter: &'static str,
        reason: String,
    },

    /// The response answers a different command than the one sent.
    #[error("received incorrect command id {received} expected {expected}")]
    ProtocolMismatch { expected: u8, received: u8 },

    /// The response is well-framed but its contents are not valid.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The device never produced a response within the retry budget.
    #[error("no response to {command} after {attempts} attempts ({elapsed:?})")]
    Timeout {
        command: &'static str,
        attempts: u32,
        elapsed: Duration,
    },

    /// The session has been closed.
    #[error("session closed")]
    SessionClosed,

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] pwmsine_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] pwmsine_transport::TransportError),
}

impl DeviceError {
    pub(crate) fn validation(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
