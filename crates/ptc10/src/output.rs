use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ptc10_driver::NamedOutputs;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// JSON has no NaN; "no data" is written as null.
pub fn json_value(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    command: &'a str,
    reply: &'a str,
}

/// Print a raw controller reply (`identify`, `query`).
pub fn print_reply(command: &str, reply: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReplyOutput { command, reply }),
        OutputFormat::Table => print_table(
            vec!["COMMAND", "REPLY"],
            vec![vec![command.to_string(), reply.to_string()]],
        ),
        OutputFormat::Pretty => println!("{command} -> {reply}"),
        OutputFormat::Raw => println!("{reply}"),
    }
}

#[derive(Serialize)]
struct ReadingOutput<'a> {
    channel: &'a str,
    value: Option<f64>,
}

pub fn print_reading(channel: &str, value: f64, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReadingOutput {
            channel,
            value: json_value(value),
        }),
        OutputFormat::Table => print_table(
            vec!["CHANNEL", "VALUE"],
            vec![vec![channel.to_string(), format_value(value)]],
        ),
        OutputFormat::Pretty => println!("{channel}: {}", format_value(value)),
        OutputFormat::Raw => println!("{}", format_value(value)),
    }
}

pub fn print_names(names: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&names),
        OutputFormat::Table => print_table(
            vec!["INDEX", "CHANNEL"],
            names
                .iter()
                .enumerate()
                .map(|(i, name)| vec![i.to_string(), name.clone()])
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for name in names {
                println!("{name}");
            }
        }
    }
}

pub fn print_values(values: &[f64], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let values: Vec<Option<f64>> = values.iter().copied().map(json_value).collect();
            print_json(&values);
        }
        OutputFormat::Table => print_table(
            vec!["INDEX", "VALUE"],
            values
                .iter()
                .enumerate()
                .map(|(i, v)| vec![i.to_string(), format_value(*v)])
                .collect(),
        ),
        OutputFormat::Pretty => {
            for (i, v) in values.iter().enumerate() {
                println!("[{i}] {}", format_value(*v));
            }
        }
        OutputFormat::Raw => println!(
            "{}",
            values
                .iter()
                .map(|v| format_value(*v))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

pub fn print_outputs(outputs: &NamedOutputs, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(outputs),
        OutputFormat::Table => print_table(
            vec!["CHANNEL", "VALUE"],
            outputs
                .iter()
                .map(|(name, v)| vec![name.to_string(), format_value(v)])
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (name, v) in outputs.iter() {
                println!("{name}: {}", format_value(v));
            }
        }
    }
}

pub fn now_unix_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
