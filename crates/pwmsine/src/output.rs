use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pwmsine_device::{DebugValues, DeviceSnapshot, WaitOutcome};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct AckOutput<'a> {
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Confirmation for commands that change device state.
///
/// `ok` is false when the command ran but did not reach its goal, such as an
/// interrupted or timed-out wait.
pub fn print_ack(command: &str, ok: bool, detail: Option<String>, format: OutputFormat) {
    println!("{}", render_ack(command, ok, detail, format));
}

fn render_ack(command: &str, ok: bool, detail: Option<String>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&AckOutput {
            command,
            ok,
            detail,
        }),
        OutputFormat::Table | OutputFormat::Pretty => match detail {
            Some(detail) => format!("{command}: {detail}"),
            None if ok => format!("{command}: done"),
            None => format!("{command}: failed"),
        },
    }
}

pub fn wait_outcome_detail(outcome: WaitOutcome) -> &'static str {
    match outcome {
        WaitOutcome::Stopped => "output complete",
        WaitOutcome::Cancelled => "wait cancelled, output still running",
        WaitOutcome::DeadlineElapsed => "wait timed out, output still running",
    }
}

pub fn print_snapshot(snapshot: &DeviceSnapshot, format: OutputFormat) {
    println!("{}", render_snapshot(snapshot, format));
}

fn render_snapshot(snapshot: &DeviceSnapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(snapshot),
        OutputFormat::Table => {
            let mut summary = Table::new();
            summary
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATUS", "MAX CYCLES", "DC MODE", "DC VALUES"])
                .add_row(vec![
                    snapshot.status.to_string(),
                    snapshot.max_cycle.to_string(),
                    snapshot.dc_mode.to_string(),
                    dc_values(&snapshot.dc_values),
                ]);

            let mut params = Table::new();
            params
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHAN", "AMP", "PHASE", "OFFSET", "FREQ (Hz)"]);
            for p in &snapshot.sine_params {
                params.add_row(vec![
                    p.channel.to_string(),
                    format!("{:.2}", p.amplitude),
                    p.phase_degrees.to_string(),
                    format!("{:.2}", p.offset),
                    format!("{:.2}", p.frequency_hz),
                ]);
            }
            format!("{summary}\n{params}")
        }
        OutputFormat::Pretty => {
            let mut out = format!(
                concat!(
                    "status: {}\nmaximum cycles: {}\ndc mode: {}\ndc vals: {}\n\n",
                    "sine params:\n{}\nchan\t amp\t phase\t offset\t freq",
                ),
                snapshot.status,
                snapshot.max_cycle,
                snapshot.dc_mode,
                dc_values(&snapshot.dc_values),
                "-".repeat(40),
            );
            for p in &snapshot.sine_params {
                out.push_str(&format!(
                    "\n{}\t {:.2}\t {}\t {:.2}\t {:.2}",
                    p.channel, p.amplitude, p.phase_degrees, p.offset, p.frequency_hz
                ));
            }
            out
        }
    }
}

pub fn print_debug_values(values: &DebugValues, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(values)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "VALUE"]);
            for (index, value) in values.0.iter().enumerate() {
                table.add_row(vec![index.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let joined = values
                .0
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("debug vals: ({joined})");
        }
    }
}

fn dc_values(values: &[f64]) -> String {
    let joined = values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({joined})")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
