use crate::cmd::{DeviceArgs, DfuModeArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(_args: DfuModeArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let dev = device.open()?;
    dev.enter_dfu_mode()
        .map_err(|err| device_error("entering DFU mode failed", err))?;

    let detail = "device is in DFU programming mode".to_string();
    print_ack("dfu-mode", true, Some(detail), format);
    Ok(SUCCESS)
}
