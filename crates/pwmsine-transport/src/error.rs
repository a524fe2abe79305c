use crate::traits::DeviceId;

/// Errors that can occur in USB transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No attached device matched the requested vendor/product ID.
    #[error("no USB device matching {id}")]
    NotFound { id: DeviceId },

    /// Listing attached devices failed.
    #[error("failed to enumerate USB devices: {0}")]
    Enumerate(std::io::Error),

    /// The device was found but could not be opened.
    #[error("failed to open {id}: {source}")]
    Open {
        id: DeviceId,
        source: std::io::Error,
    },

    /// Claiming the control interface failed.
    #[error("failed to claim interface {interface}: {source}")]
    ClaimInterface {
        interface: u8,
        source: std::io::Error,
    },

    /// A bulk-out transfer failed.
    #[error("bulk write to endpoint {endpoint:#04x} failed: {source}")]
    Write {
        endpoint: u8,
        source: std::io::Error,
    },

    /// A bulk-in transfer failed for a reason other than "no data yet".
    #[error("bulk read from endpoint {endpoint:#04x} failed: {source}")]
    Read {
        endpoint: u8,
        source: std::io::Error,
    },

    /// A transfer was attempted before any interface was claimed.
    #[error("no interface claimed")]
    NotClaimed,

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,

    /// An I/O error occurred setting up the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
