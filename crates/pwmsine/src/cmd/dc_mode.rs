use pwmsine_device::DcMode;

use crate::cmd::{DcModeArgs, DeviceArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: DcModeArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = DcMode::from(args.mode);

    let mut dev = device.open()?;
    dev.dc_mode(mode)
        .map_err(|err| device_error("setting dc mode failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_ack("dc-mode", true, Some(format!("dc mode {mode}")), format);
    Ok(SUCCESS)
}
