use crate::cmd::{DeviceArgs, StatusArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_snapshot, OutputFormat};

pub fn run(_args: StatusArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = device.open()?;
    let snapshot = dev
        .snapshot()
        .map_err(|err| device_error("status query failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_snapshot(&snapshot, format);
    Ok(SUCCESS)
}
