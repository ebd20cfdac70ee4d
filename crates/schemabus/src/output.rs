use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use schemabus_service::Reply;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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

pub fn print_reply(reply: &Reply, format: OutputFormat) {
    println!("{}", render_reply(reply, format));
}

pub fn print_keys(keys: &[String], format: OutputFormat) {
    println!("{}", render_keys(keys, format));
}

fn render_reply(reply: &Reply, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(reply),
        OutputFormat::Table => {
            let mut table = new_table();
            if let Some(violations) = reply.violations.as_deref() {
                table.set_header(vec!["#", "VIOLATION"]);
                for (index, violation) in violations.iter().enumerate() {
                    table.add_row(vec![(index + 1).to_string(), violation.message.clone()]);
                }
            } else {
                table.set_header(vec!["STATUS", "MESSAGE", "CAUSE"]).add_row(vec![
                    status_label(reply).to_string(),
                    reply.message.clone().unwrap_or_default(),
                    reply.cause.clone().unwrap_or_default(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            if reply.is_non_conforming() {
                return reply.message.clone().unwrap_or_default();
            }
            let mut line = status_label(reply).to_string();
            if let Some(message) = &reply.message {
                line.push_str(": ");
                line.push_str(message);
            }
            if let Some(cause) = &reply.cause {
                line.push_str(&format!(" ({cause})"));
            }
            line
        }
    }
}

fn render_keys(keys: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&Reply::schemas(keys.to_vec())),
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["KEY"]);
            for key in keys {
                table.add_row(vec![key.clone()]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            if keys.is_empty() {
                "no schemas registered".to_string()
            } else {
                keys.join("\n")
            }
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status_label(reply: &Reply) -> &'static str {
    if reply.is_ok() {
        "ok"
    } else {
        "error"
    }
}

fn to_json(reply: &Reply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|_| r#"{"status":"error"}"#.to_string())
}
