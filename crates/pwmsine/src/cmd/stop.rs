use crate::cmd::{DeviceArgs, StopArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(_args: StopArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = device.open()?;
    dev.stop()
        .map_err(|err| device_error("stopping output failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_ack("stop", true, None, format);
    Ok(SUCCESS)
}
