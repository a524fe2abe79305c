//! High-level operations on one stimulus generator.
//!
//! [`PwmSineDevice`] wraps a calibrated [`Session`] and exposes each firmware
//! command in physical units. Every setter validates its arguments before
//! anything is written to the device.

use std::thread;
use std::time::{Duration, Instant};

use pwmsine_frame::{command, PayloadBuilder, PayloadReader};
use pwmsine_transport::UsbTransport;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{DeviceError, Result};
use crate::session::Session;
use crate::types::{
    Channel, DcMode, DebugValues, DeviceSnapshot, RunStatus, SineParams, WaitOutcome,
};
use crate::units::{self, Calibration};

/// Controller for one PWM sine stimulus generator.
pub struct PwmSineDevice<T: UsbTransport> {
    session: Session<T>,
}

impl<T: UsbTransport> PwmSineDevice<T> {
    /// Wrap an already open session.
    pub fn from_session(session: Session<T>) -> Self {
        Self { session }
    }

    /// Full-scale duty count read at open.
    pub fn top(&self) -> u16 {
        self.calibration().top()
    }

    pub fn calibration(&self) -> Calibration {
        self.session.calibration()
    }

    /// Start waveform output on all channels.
    pub fn start(&mut self) -> Result<()> {
        self.session.exchange(command::START, &[])?;
        Ok(())
    }

    /// Stop waveform output.
    pub fn stop(&mut self) -> Result<()> {
        self.session.exchange(command::STOP, &[])?;
        Ok(())
    }

    /// Set how many periods of the slowest channel run before the device
    /// stops on its own.
    pub fn set_max_cycle(&mut self, cycles: u16) -> Result<()> {
        let cycles = units::validate_max_cycle(cycles)?;
        let payload = PayloadBuilder::new().u16(cycles).build();
        self.session.exchange(command::SET_MAX_CYCLE, &payload)?;
        Ok(())
    }

    pub fn get_max_cycle(&mut self) -> Result<u16> {
        let response = self.session.exchange(command::GET_MAX_CYCLE, &[])?;
        Ok(PayloadReader::new(response.payload()).u16()?)
    }

    /// Program one channel's sinusoid.
    pub fn set_sine_param(&mut self, params: &SineParams) -> Result<()> {
        let channel = units::validate_channel(params.channel)?;
        let calibration = self.calibration();
        let amplitude = calibration.duty_to_device("amplitude", params.amplitude)?;
        let phase = units::phase_to_device(params.phase_degrees)?;
        let offset = calibration.duty_to_device("offset", params.offset)?;
        let frequency = units::frequency_to_device(params.frequency_hz)?;

        let payload = PayloadBuilder::new()
            .u8(channel.index())
            .u16(amplitude)
            .u16(phase)
            .u16(offset)
            .u16(frequency)
            .build();
        self.session.exchange(command::SET_SINE_PARAM, &payload)?;
        debug!(%channel, amplitude, phase, offset, frequency, "sine parameters set");
        Ok(())
    }

    /// Read back one channel's sinusoid in physical units.
    pub fn get_sine_param(&mut self, channel: u8) -> Result<SineParams> {
        let channel = units::validate_channel(channel)?;
        let payload = PayloadBuilder::new().u8(channel.index()).build();
        let response = self.session.exchange(command::GET_SINE_PARAM, &payload)?;

        let mut reader = PayloadReader::new(response.payload());
        let echoed = reader.u8()?;
        if echoed != channel.index() {
            return Err(DeviceError::Protocol(format!(
                "sine parameters for channel {echoed} returned for request on channel {}",
                channel.index()
            )));
        }
        let amplitude = reader.u16()?;
        let phase_degrees = reader.u16()?;
        let offset = reader.u16()?;
        let frequency = reader.u16()?;

        let calibration = self.calibration();
        Ok(SineParams {
            channel: channel.index(),
            amplitude: calibration.duty_from_device(amplitude),
            phase_degrees,
            offset: calibration.duty_from_device(offset),
            frequency_hz: units::frequency_from_device(frequency),
        })
    }

    /// Set the duty cycle a channel holds while stopped in DC mode.
    pub fn set_dc_val(&mut self, channel: u8, value: f64) -> Result<()> {
        let channel = units::validate_channel(channel)?;
        let raw = self.calibration().duty_to_device("dc value", value)?;
        let payload = PayloadBuilder::new().u8(channel.index()).u16(raw).build();
        self.session.exchange(command::SET_DC_VAL, &payload)?;
        Ok(())
    }

    pub fn get_dc_val(&mut self, channel: u8) -> Result<f64> {
        let channel = units::validate_channel(channel)?;
        let payload = PayloadBuilder::new().u8(channel.index()).build();
        let response = self.session.exchange(command::GET_DC_VAL, &payload)?;

        let mut reader = PayloadReader::new(response.payload());
        // channel echo
        reader.skip(1)?;
        let raw = reader.u16()?;
        Ok(self.calibration().duty_from_device(raw))
    }

    /// Turn DC mode on or off.
    pub fn dc_mode(&mut self, mode: DcMode) -> Result<()> {
        self.session.exchange(mode.command_id(), &[])?;
        Ok(())
    }

    pub fn get_dc_mode(&mut self) -> Result<DcMode> {
        let byte = self.read_flag(command::GET_DC_MODE)?;
        DcMode::from_byte(byte)
            .ok_or_else(|| DeviceError::Protocol(format!("unknown dc mode received {byte}")))
    }

    pub fn get_status(&mut self) -> Result<RunStatus> {
        let byte = self.read_flag(command::GET_STATUS)?;
        RunStatus::from_byte(byte)
            .ok_or_else(|| DeviceError::Protocol(format!("unknown status received {byte}")))
    }

    /// Raw firmware diagnostic counters.
    pub fn get_debug_vals(&mut self) -> Result<DebugValues> {
        let response = self.session.exchange(command::DEBUG, &[])?;
        let mut reader = PayloadReader::new(response.payload());
        let mut values = [0u16; 6];
        for value in &mut values {
            *value = reader.u16()?;
        }
        Ok(DebugValues(values))
    }

    /// Put the device into firmware-update mode.
    ///
    /// The device detaches without answering, so nothing is read back. The
    /// session is closed and the controller consumed.
    pub fn enter_dfu_mode(mut self) -> Result<()> {
        self.session.send_only(command::DFU_MODE, &[])?;
        info!("device entering DFU mode");
        if let Err(err) = self.session.close() {
            debug!(error = %err, "close after DFU failed");
        }
        Ok(())
    }

    /// Block until the device reports `Stopped`.
    pub fn wait(&mut self) -> Result<()> {
        self.wait_until(&CancellationToken::new(), None)?;
        Ok(())
    }

    /// Poll the run status until the device stops, `cancel` fires, or
    /// `deadline` passes.
    ///
    /// Sleeps at most one poll interval between polls, so cancellation is
    /// observed within that interval.
    pub fn wait_until(
        &mut self,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<WaitOutcome> {
        let poll_interval = self.session.config().poll_interval;
        loop {
            if cancel.is_cancelled() {
                return Ok(WaitOutcome::Cancelled);
            }
            if self.get_status()? == RunStatus::Stopped {
                return Ok(WaitOutcome::Stopped);
            }

            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining == Duration::ZERO {
                        return Ok(WaitOutcome::DeadlineElapsed);
                    }
                    remaining.min(poll_interval)
                }
                None => poll_interval,
            };
            thread::sleep(pause);
        }
    }

    /// Read everything the device reports about its configuration.
    pub fn snapshot(&mut self) -> Result<DeviceSnapshot> {
        let status = self.get_status()?;
        let max_cycle = self.get_max_cycle()?;
        let dc_mode = self.get_dc_mode()?;
        let dc_values = Channel::ALL
            .iter()
            .map(|channel| self.get_dc_val(channel.index()))
            .collect::<Result<Vec<_>>>()?;
        let sine_params = Channel::ALL
            .iter()
            .map(|channel| self.get_sine_param(channel.index()))
            .collect::<Result<Vec<_>>>()?;

        Ok(DeviceSnapshot {
            status,
            max_cycle,
            dc_mode,
            dc_values,
            sine_params,
        })
    }

    /// Release the device.
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    fn read_flag(&mut self, command_id: u8) -> Result<u8> {
        let response = self.session.exchange(command_id, &[])?;
        Ok(PayloadReader::new(response.payload()).u8()?)
    }
}

impl<T: UsbTransport> std::fmt::Debug for PwmSineDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PwmSineDevice")
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pwmsine_transport::MockTransport;

    use super::*;
    use crate::session::SessionConfig;

    fn open(mock: &MockTransport) -> PwmSineDevice<MockTransport> {
        mock.push_response(vec![command::DUMMY])
            .push_response(vec![command::GET_TOP, 0x03, 0xE8]);
        let config = SessionConfig {
            max_attempts: 3,
            poll_interval: Duration::from_millis(1),
            ..SessionConfig::default()
        };
        PwmSineDevice::from_session(Session::open(mock.clone(), config).unwrap())
    }

    fn last_write(mock: &MockTransport) -> Vec<u8> {
        mock.writes().last().map(|w| w.data.clone()).unwrap_or_default()
    }

    #[test]
    fn set_sine_param_encodes_big_endian_fields() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::SET_SINE_PARAM]);

        device
            .set_sine_param(&SineParams {
                channel: 1,
                amplitude: 0.5,
                phase_degrees: 120,
                offset: 0.5,
                frequency_hz: 1.5,
            })
            .unwrap();

        assert_eq!(
            &last_write(&mock)[..10],
            &[command::SET_SINE_PARAM, 1, 0x01, 0xF4, 0x00, 0x78, 0x01, 0xF4, 0x00, 0x96]
        );
    }

    #[test]
    fn invalid_sine_param_does_no_io() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        let writes_before = mock.writes().len();

        let bad = SineParams {
            channel: 0,
            amplitude: 0.5,
            phase_degrees: 360,
            offset: 0.0,
            frequency_hz: 1.0,
        };
        assert!(matches!(
            device.set_sine_param(&bad),
            Err(DeviceError::Validation { parameter: "phase", .. })
        ));
        assert!(matches!(
            device.set_sine_param(&SineParams { channel: 3, ..bad }),
            Err(DeviceError::Validation { parameter: "channel", .. })
        ));
        assert_eq!(mock.writes().len(), writes_before);
    }

    #[test]
    fn get_sine_param_converts_units() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![
            command::GET_SINE_PARAM,
            2,
            0x00,
            0xFA,
            0x00,
            0xF0,
            0x01,
            0xF4,
            0x27,
            0x10,
        ]);

        let params = device.get_sine_param(2).unwrap();
        assert_eq!(params.channel, 2);
        assert_eq!(params.amplitude, 0.25);
        assert_eq!(params.phase_degrees, 240);
        assert_eq!(params.offset, 0.5);
        assert_eq!(params.frequency_hz, 100.0);
        assert_eq!(&last_write(&mock)[..2], &[command::GET_SINE_PARAM, 2]);
    }

    #[test]
    fn get_sine_param_rejects_wrong_channel_echo() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::GET_SINE_PARAM, 1]);

        assert!(matches!(
            device.get_sine_param(0),
            Err(DeviceError::Protocol(_))
        ));
    }

    #[test]
    fn get_dc_val_skips_channel_echo() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::GET_DC_VAL, 1, 0x01, 0xF4]);

        assert_eq!(device.get_dc_val(1).unwrap(), 0.5);
    }

    #[test]
    fn max_cycle_is_big_endian() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::SET_MAX_CYCLE])
            .push_response(vec![command::GET_MAX_CYCLE, 0x01, 0x2C]);

        device.set_max_cycle(300).unwrap();
        assert_eq!(&last_write(&mock)[..3], &[command::SET_MAX_CYCLE, 0x01, 0x2C]);
        assert_eq!(device.get_max_cycle().unwrap(), 300);
    }

    #[test]
    fn unknown_status_byte_is_protocol_error() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::GET_STATUS, 7])
            .push_response(vec![command::GET_DC_MODE, 2]);

        assert!(matches!(device.get_status(), Err(DeviceError::Protocol(_))));
        assert!(matches!(device.get_dc_mode(), Err(DeviceError::Protocol(_))));
    }

    #[test]
    fn dc_mode_uses_direction_command() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::DC_MODE_OFF]);

        device.dc_mode(DcMode::Off).unwrap();
        assert_eq!(last_write(&mock)[0], command::DC_MODE_OFF);
    }

    #[test]
    fn debug_values_read_six_words() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::DEBUG, 0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 1, 0]);

        assert_eq!(
            device.get_debug_vals().unwrap(),
            DebugValues([1, 2, 3, 4, 5, 256])
        );
    }

    #[test]
    fn wait_until_honours_cancellation_before_polling() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        let reads_before = mock.read_calls();

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            device.wait_until(&token, None).unwrap(),
            WaitOutcome::Cancelled
        );
        assert_eq!(mock.read_calls(), reads_before);
    }

    #[test]
    fn wait_until_reports_elapsed_deadline() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::GET_STATUS, 1]);

        let outcome = device
            .wait_until(&CancellationToken::new(), Some(Instant::now()))
            .unwrap();
        assert_eq!(outcome, WaitOutcome::DeadlineElapsed);
    }

    #[test]
    fn wait_polls_until_stopped() {
        let mock = MockTransport::new();
        let mut device = open(&mock);
        mock.push_response(vec![command::GET_STATUS, 1])
            .push_response(vec![command::GET_STATUS, 1])
            .push_response(vec![command::GET_STATUS, 0]);

        device.wait().unwrap();
        assert_eq!(mock.pending_reads(), 0);
    }

    #[test]
    fn dfu_sends_once_and_closes() {
        let mock = MockTransport::new();
        let device = open(&mock);
        let reads_before = mock.read_calls();
        let writes_before = mock.writes().len();

        device.enter_dfu_mode().unwrap();
        assert_eq!(mock.writes().len(), writes_before + 1);
        assert_eq!(mock.read_calls(), reads_before);
        assert!(mock.is_closed());
    }
}
