//! Three-phase example: program all channels, run five cycles, wait for the end.
//!
//! Run with (device attached):
//!   cargo run --example three-phase

use pwmsine::device::{self, SineParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let channels = [
        (0, 0.25, 0, 1.0, 1.0),
        (1, 0.30, 90, 0.5, 2.0),
        (2, 0.50, 180, 0.25, 1.0),
    ];

    let mut dev = device::open()?;
    eprintln!("opened device, top = {}", dev.top());
    dev.set_max_cycle(5)?;

    for (channel, amplitude, phase_degrees, offset, frequency_hz) in channels {
        dev.set_sine_param(&SineParams {
            channel,
            amplitude,
            phase_degrees,
            offset,
            frequency_hz,
        })?;
    }

    dev.start()?;
    eprintln!("running...");
    dev.wait()?;
    eprintln!("done");
    dev.close()?;
    Ok(())
}
