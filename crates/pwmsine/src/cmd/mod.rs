use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use pwmsine_device::{DcMode, PwmSineDevice, SessionConfig};
use pwmsine_transport::{NusbDiscovery, NusbTransport};
use tracing::debug;

use crate::exit::{device_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod dc_mode;
pub mod dc_val;
pub mod debug_vals;
pub mod dfu_mode;
pub mod max_cycle;
pub mod sine_param;
pub mod start;
pub mod status;
pub mod stop;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the current device settings.
    Status(StatusArgs),
    /// Set the sinusoid parameters of one channel.
    SineParam(SineParamArgs),
    /// Set the number of cycles of the slowest channel before output stops.
    MaxCycle(MaxCycleArgs),
    /// Start sinewave output.
    Start(StartArgs),
    /// Stop sinewave output.
    Stop(StopArgs),
    /// Put the device into DFU programming mode.
    DfuMode(DfuModeArgs),
    /// Turn DC mode on or off.
    DcMode(DcModeArgs),
    /// Set the idle duty cycle of one channel used while DC mode is on.
    DcVal(DcValArgs),
    /// Print the raw firmware diagnostic counters.
    Debug(DebugArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Status(args) => status::run(args, device, format),
        Command::SineParam(args) => sine_param::run(args, device, format),
        Command::MaxCycle(args) => max_cycle::run(args, device, format),
        Command::Start(args) => start::run(args, device, format),
        Command::Stop(args) => stop::run(args, device, format),
        Command::DfuMode(args) => dfu_mode::run(args, device, format),
        Command::DcMode(args) => dc_mode::run(args, device, format),
        Command::DcVal(args) => dc_val::run(args, device, format),
        Command::Debug(args) => debug_vals::run(args, device, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection settings shared by every device command.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Bulk-in read timeout per attempt (e.g. 1000ms, 1s).
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "1000ms",
        env = "PWMSINE_READ_TIMEOUT",
        value_parser = parse_duration,
        global = true
    )]
    pub read_timeout: Duration,

    /// Bulk-out write timeout.
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "9999ms",
        env = "PWMSINE_WRITE_TIMEOUT",
        value_parser = parse_duration,
        global = true
    )]
    pub write_timeout: Duration,

    /// Maximum attempts per command while the device returns no data.
    #[arg(
        long,
        value_name = "N",
        default_value = "50",
        env = "PWMSINE_MAX_ATTEMPTS",
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    pub max_attempts: u32,

    /// Maximum time spent retrying one command.
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "5s",
        env = "PWMSINE_RETRY_BUDGET",
        value_parser = parse_duration,
        global = true
    )]
    pub retry_budget: Duration,
}

impl DeviceArgs {
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig {
            max_attempts: self.max_attempts,
            retry_budget: self.retry_budget,
            ..SessionConfig::default()
        };
        config.frame.read_timeout = self.read_timeout;
        config.frame.write_timeout = self.write_timeout;
        config
    }

    /// Open the first attached device.
    pub fn open(&self) -> CliResult<PwmSineDevice<NusbTransport>> {
        let config = self.session_config();
        debug!(?config, "opening device");
        pwmsine_device::open_with_config(&NusbDiscovery, config)
            .map_err(|err| device_error("open failed", err))
    }
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Args, Debug)]
pub struct SineParamArgs {
    /// Channel number (0, 1, 2).
    pub channel: u8,
    /// Sinewave amplitude in [0, 1.0].
    pub amplitude: f64,
    /// Phase in whole degrees, [0, 360).
    pub phase: u16,
    /// Sinewave offset in [0, 1.0].
    pub offset: f64,
    /// Sinewave frequency in Hz, [0, 200].
    pub frequency: f64,
}

#[derive(Args, Debug)]
pub struct MaxCycleArgs {
    /// Maximum number of cycles of the slowest channel, in [1, 65535].
    pub cycles: u32,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Return only after the output has finished.
    #[arg(long, short = 'w')]
    pub wait: bool,
    /// Give up waiting after this long (e.g. 30s, 500ms). Requires --wait.
    #[arg(long, value_name = "DURATION", requires = "wait", value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Args, Debug, Default)]
pub struct StopArgs {}

#[derive(Args, Debug, Default)]
pub struct DfuModeArgs {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DcModeArg {
    On,
    Off,
}

impl From<DcModeArg> for DcMode {
    fn from(value: DcModeArg) -> Self {
        match value {
            DcModeArg::On => DcMode::On,
            DcModeArg::Off => DcMode::Off,
        }
    }
}

#[derive(Args, Debug)]
pub struct DcModeArgs {
    /// Idle behavior: on or off.
    #[arg(ignore_case = true)]
    pub mode: DcModeArg,
}

#[derive(Args, Debug)]
pub struct DcValArgs {
    /// Channel number (0, 1, 2).
    pub channel: u8,
    /// PWM duty cycle while idle, in [0, 1.0].
    pub value: f64,
}

#[derive(Args, Debug, Default)]
pub struct DebugArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `5s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
