//! Frequency sweep: compare commanded frequency against the one the firmware
//! actually synthesizes, using the debug counters.
//!
//! Run with (device attached):
//!   cargo run --example frequency-sweep

use std::thread;
use std::time::Duration;

use pwmsine::device::{self, SineParams};

/// PWM carrier frequency of the firmware, in Hz.
const PWM_FREQUENCY_HZ: f64 = 1.0e4;
const STEPS: u32 = 40;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = device::open()?;

    for step in 0..STEPS {
        let frequency_hz = 0.01 + (200.0 - 0.01) * f64::from(step) / f64::from(STEPS - 1);
        dev.set_sine_param(&SineParams {
            channel: 0,
            amplitude: 0.5,
            phase_degrees: 0,
            offset: 0.5,
            frequency_hz,
        })?;

        // synthesized frequency is the PWM rate over counters 0 and 3
        let values = dev.get_debug_vals()?.0;
        let divisor = f64::from(values[0]) * f64::from(values[3]);
        if divisor == 0.0 {
            println!("f: {frequency_hz:.3}, f_true: n/a");
        } else {
            let actual = PWM_FREQUENCY_HZ / divisor;
            let rel_err = (frequency_hz - actual).abs() / frequency_hz;
            println!("f: {frequency_hz:.3}, f_true: {actual:.3}, rel_err: {rel_err:.5}");
        }
        thread::sleep(Duration::from_millis(100));
    }

    dev.close()?;
    Ok(())
}
