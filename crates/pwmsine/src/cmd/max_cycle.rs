use pwmsine_device::units;

use crate::cmd::{DeviceArgs, MaxCycleArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: MaxCycleArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let cycles = units::max_cycle_from_count(args.cycles)
        .map_err(|err| device_error("invalid max cycle", err))?;

    let mut dev = device.open()?;
    dev.set_max_cycle(cycles)
        .map_err(|err| device_error("setting max cycle failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    print_ack("max-cycle", true, Some(format!("set to {cycles}")), format);
    Ok(SUCCESS)
}
