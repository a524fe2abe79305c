use pwmsine_transport::{Discovery, TransportError};

use crate::controller::PwmSineDevice;
use crate::error::{DeviceError, Result};
use crate::session::{Session, SessionConfig};

/// Open the first attached stimulus generator with default settings.
#[cfg(feature = "usb")]
pub fn open() -> Result<PwmSineDevice<pwmsine_transport::NusbTransport>> {
    open_with_config(&pwmsine_transport::NusbDiscovery, SessionConfig::default())
}

/// Locate a device through `discovery` and open a calibrated session on it.
pub fn open_with_config<D: Discovery>(
    discovery: &D,
    config: SessionConfig,
) -> Result<PwmSineDevice<D::Transport>> {
    let transport = discovery.find(config.device_id).map_err(|err| match err {
        TransportError::NotFound { id } => DeviceError::DeviceNotFound { id },
        other => other.into(),
    })?;
    let session = Session::open(transport, config)?;
    Ok(PwmSineDevice::from_session(session))
}

#[cfg(test)]
mod tests {
    use pwmsine_frame::command;
    use pwmsine_transport::{DeviceId, MockTransport};

    use super::*;

    struct NothingAttached;

    impl Discovery for NothingAttached {
        type Transport = MockTransport;

        fn find(&self, id: DeviceId) -> pwmsine_transport::Result<MockTransport> {
            Err(TransportError::NotFound { id })
        }
    }

    #[test]
    fn missing_device_maps_to_not_found() {
        let err = open_with_config(&NothingAttached, SessionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::DeviceNotFound { id } if id == DeviceId::new(0x1781, 0x0BB0)
        ));
    }

    #[test]
    fn opens_through_discovery() {
        let mock = MockTransport::new();
        mock.push_response(vec![command::DUMMY])
            .push_response(vec![command::GET_TOP, 0x00, 0xFF]);

        let device = open_with_config(&mock, SessionConfig::default()).unwrap();
        assert_eq!(device.top(), 255);
        assert!(!mock.is_closed());
    }
}
