use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tagframe::messages::describe;
use tagframe::wire::{Message, TransportStats, TypeRegistry};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct ObjectOutput<'a> {
    tag: u8,
    name: &'a str,
    fields: String,
    timestamp: String,
}

pub fn print_object(message: &dyn Message, registry: &TypeRegistry, format: OutputFormat) {
    let tag = message.tag();
    let name = registry.name_of(tag).unwrap_or("unknown");
    let fields = describe(message);

    match format {
        OutputFormat::Json => {
            let out = ObjectOutput {
                tag,
                name,
                fields,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TAG", "TYPE", "FIELDS"])
                .add_row(vec![format!("{tag:#04x}"), name.to_string(), fields]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if fields.is_empty() {
                println!("{name} (tag {tag})");
            } else {
                println!("{name} (tag {tag}) {fields}");
            }
        }
        OutputFormat::Raw => print_raw(format!("{fields}\n").as_bytes()),
    }
}

#[derive(Serialize)]
struct TypeOutput<'a> {
    tag: u8,
    name: &'a str,
    version: u32,
    enabled: bool,
}

pub fn print_types(registry: &TypeRegistry, format: OutputFormat) {
    let rows: Vec<TypeOutput<'_>> = registry
        .entries()
        .into_iter()
        .map(|entry| TypeOutput {
            tag: entry.tag(),
            name: entry.name(),
            version: entry.version(),
            enabled: registry.is_enabled(entry.tag()),
        })
        .collect();

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TAG", "TYPE", "VERSION", "ENABLED"]);
            for row in &rows {
                table.add_row(vec![
                    format!("{:#04x}", row.tag),
                    row.name.to_string(),
                    row.version.to_string(),
                    row.enabled.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!("{:>3}  {} v{}", row.tag, row.name, row.version);
            }
        }
    }
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    command: &'a str,
    device: &'a str,
    frames_read: u64,
    frames_written: u64,
    header_rejects: u64,
    checksum_failures: u64,
    decode_failures: u64,
    bytes_discarded: u64,
}

/// Summary printed once a command finishes with its link.
pub fn print_stats(command: &str, device: &str, stats: &TransportStats, format: OutputFormat) {
    let out = StatsOutput {
        command,
        device,
        frames_read: stats.frames_read,
        frames_written: stats.frames_written,
        header_rejects: stats.header_rejects,
        checksum_failures: stats.checksum_failures,
        decode_failures: stats.decode_failures,
        bytes_discarded: stats.bytes_discarded,
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "READ",
                    "WRITTEN",
                    "REJECTED",
                    "BAD SUM",
                    "BAD FIELD",
                    "SKIPPED",
                ])
                .add_row(vec![
                    out.frames_read.to_string(),
                    out.frames_written.to_string(),
                    out.header_rejects.to_string(),
                    out.checksum_failures.to_string(),
                    out.decode_failures.to_string(),
                    out.bytes_discarded.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "{command} {device}: read={} written={} rejected={} bad_sum={} bad_field={} skipped={}",
            out.frames_read,
            out.frames_written,
            out.header_rejects,
            out.checksum_failures,
            out.decode_failures,
            out.bytes_discarded
        ),
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
