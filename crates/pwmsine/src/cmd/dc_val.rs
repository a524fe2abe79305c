use pwmsine_device::units;

use crate::cmd::{DcValArgs, DeviceArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: DcValArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    units::validate_channel(args.channel)
        .map_err(|err| device_error("invalid dc value", err))?;

    let mut dev = device.open()?;
    dev.set_dc_val(args.channel, args.value)
        .map_err(|err| device_error("setting dc value failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_ack(
        "dc-val",
        true,
        Some(format!("pwm{} idle value {:.2}", args.channel, args.value)),
        format,
    );
    Ok(SUCCESS)
}
