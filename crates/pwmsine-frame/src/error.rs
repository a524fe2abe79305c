/// Errors that can occur during frame encoding, decoding, and transfer.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit after the command byte.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A bulk read returned zero bytes.
    #[error("empty frame received")]
    Empty,

    /// A bulk read returned more bytes than a frame holds.
    #[error("oversized frame received ({len} bytes, max {max})")]
    Oversized { len: usize, max: usize },

    /// A payload field was read past the end of the payload.
    #[error("payload truncated (needed {needed} bytes, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// The device accepted fewer bytes than a full frame.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] pwmsine_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
