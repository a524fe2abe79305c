use pwmsine_device::{units, SineParams};

use crate::cmd::{DeviceArgs, SineParamArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: SineParamArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let params = SineParams {
        channel: args.channel,
        amplitude: args.amplitude,
        phase_degrees: args.phase,
        offset: args.offset,
        frequency_hz: args.frequency,
    };

    // Checks that need no calibration run before the device is opened.
    units::validate_channel(params.channel)
        .and_then(|_| units::phase_to_device(params.phase_degrees))
        .and_then(|_| units::frequency_to_device(params.frequency_hz))
        .map_err(|err| device_error("invalid sinewave parameters", err))?;

    let mut dev = device.open()?;
    dev.set_sine_param(&params)
        .map_err(|err| device_error("setting sinewave parameters failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_ack("sine-param", true, Some(format!("pwm{} updated", args.channel)), format);
    Ok(SUCCESS)
}
