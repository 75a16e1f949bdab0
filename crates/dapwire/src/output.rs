use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

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

/// One decoded (or rejected) body from a framed stream.
#[derive(Debug, Serialize)]
pub struct MessageRecord {
    pub index: usize,
    pub size: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub body: Value,
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl MessageRecord {
    pub fn from_body(index: usize, raw: &[u8]) -> Self {
        let body = serde_json::from_slice(raw)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()));
        Self {
            index,
            size: raw.len(),
            ok: false,
            seq: None,
            kind: None,
            tag: None,
            error: None,
            body,
            raw: raw.to_vec(),
        }
    }
}

/// Writes records to stdout. The table format collects rows and renders
/// them in [`RecordPrinter::finish`].
pub struct RecordPrinter {
    format: OutputFormat,
    rows: Vec<Vec<String>>,
}

impl RecordPrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            rows: Vec::new(),
        }
    }

    pub fn print(&mut self, record: &MessageRecord) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => self.rows.push(vec![
                record.index.to_string(),
                display_or_dash(record.seq),
                record.kind.unwrap_or("-").to_string(),
                record.tag.clone().unwrap_or_else(|| "-".to_string()),
                record.size.to_string(),
                match &record.error {
                    Some(err) => format!("error: {err}"),
                    None => "ok".to_string(),
                },
            ]),
            OutputFormat::Pretty => match &record.error {
                None => println!(
                    "#{} seq={} {} {} ({} bytes)",
                    record.index,
                    display_or_dash(record.seq),
                    record.kind.unwrap_or("-"),
                    record.tag.as_deref().unwrap_or("-"),
                    record.size
                ),
                Some(err) => println!(
                    "#{} rejected ({} bytes): {err}",
                    record.index, record.size
                ),
            },
            OutputFormat::Raw => {
                let mut line = record.raw.clone();
                line.push(b'\n');
                print_raw(&line);
            }
        }
    }

    pub fn finish(self) {
        if !matches!(self.format, OutputFormat::Table) || self.rows.is_empty() {
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "SEQ", "TYPE", "TAG", "SIZE", "STATUS"]);
        for row in self.rows {
            table.add_row(row);
        }
        println!("{table}");
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn display_or_dash(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
