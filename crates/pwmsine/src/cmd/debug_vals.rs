use crate::cmd::{DebugArgs, DeviceArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_debug_values, OutputFormat};

pub fn run(_args: DebugArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = device.open()?;
    let values = dev
        .get_debug_vals()
        .map_err(|err| device_error("reading debug values failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_debug_values(&values, format);
    Ok(SUCCESS)
}
