use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_result(&mut stdout.lock(), result, format, pretty)
}

pub fn write_result<W: Write>(
    out: &mut W,
    result: &CommandResult,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    if result.data.is_null() {
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_table(out, &result.data, 0)?,
    }

    Ok(())
}

fn write_table<W: Write>(out: &mut W, value: &Value, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(fields) => {
            let width = fields.keys().map(String::len).max().unwrap_or(0);
            for (key, field) in fields {
                if is_scalar(field) {
                    writeln!(out, "{indent}{key:<width$} : {}", scalar_text(field))?;
                } else {
                    writeln!(out, "{indent}{key}:")?;
                    write_table(out, field, depth + 1)?;
                }
            }
        }
        Value::Array(items) if items.is_empty() => writeln!(out, "{indent}(none)")?,
        Value::Array(items) => {
            for item in items {
                if is_scalar(item) {
                    writeln!(out, "{indent}- {}", scalar_text(item))?;
                } else {
                    writeln!(out, "{indent}-")?;
                    write_table(out, item, depth + 1)?;
                }
            }
        }
        scalar => writeln!(out, "{indent}{}", scalar_text(scalar))?,
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_owned(),
        other => other.to_string(),
    }
}
