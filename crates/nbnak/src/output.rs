//! Output formatting: YAML document or JSON.
//!
//! The rendered document is the only thing written to stdout. Logs and
//! diagnostics go to stderr.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Explicit start-of-document marker for YAML output.
const YAML_DOC_START: &str = "---\n";

/// Render `data` in the chosen format. The result always ends in a newline.
pub fn render<T: Serialize + ?Sized>(format: &OutputFormat, data: &T) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(data)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    let body = serde_yaml::to_string(data)?;
    let mut out = String::with_capacity(YAML_DOC_START.len() + body.len());
    out.push_str(YAML_DOC_START);
    out.push_str(&body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Write a rendered document to stdout.
pub fn print_output(output: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
