use std::time::Instant;

use pwmsine_device::{CancellationToken, WaitOutcome};
use tracing::info;

use crate::cmd::{DeviceArgs, StartArgs};
use crate::exit::{device_error, CliError, CliResult, INTERNAL, INTERRUPTED, SUCCESS, TIMEOUT};
use crate::output::{print_ack, wait_outcome_detail, OutputFormat};

pub fn run(args: StartArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = device.open()?;
    dev.start()
        .map_err(|err| device_error("starting output failed", err))?;

    if !args.wait {
        dev.close().map_err(|err| device_error("close failed", err))?;
        print_ack("start", true, None, format);
        return Ok(SUCCESS);
    }

    let cancel = CancellationToken::new();
    install_ctrlc_handler(cancel.clone())?;
    let deadline = args.timeout.map(|timeout| Instant::now() + timeout);

    info!("waiting for output to complete");
    let outcome = dev
        .wait_until(&cancel, deadline)
        .map_err(|err| device_error("waiting for completion failed", err))?;
    dev.close().map_err(|err| device_error("close failed", err))?;

    let detail = wait_outcome_detail(outcome).to_string();
    print_ack("start", outcome == WaitOutcome::Stopped, Some(detail), format);
    Ok(match outcome {
        WaitOutcome::Stopped => SUCCESS,
        WaitOutcome::Cancelled => INTERRUPTED,
        WaitOutcome::DeadlineElapsed => TIMEOUT,
    })
}

fn install_ctrlc_handler(cancel: CancellationToken) -> CliResult<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
