use std::collections::HashMap;

use anyhow::Result;
use lazy_static::lazy_static;
use serde::Serialize;
use thiserror::Error;

lazy_static! {
    static ref OUTPUT_TYPES: HashMap<&'static str, Output> = {
        let mut map = HashMap::new();
        map.insert("json", Output::Json);
        map.insert("text", Output::Text);
        map
    };
}

#[derive(Debug, Copy, Clone)]
pub enum Output {
    /// Pretty-printed JSON, for piping into other tools.
    Json,

    /// Human-readable lines; what the command would print by hand.
    Text,
}

impl Default for Output {
    fn default() -> Self {
        Output::Text
    }
}

#[derive(Debug, Error)]
#[error("Unsupported output \"{value}\". Supported values: json, text")]
pub(crate) struct OutputParseError {
    value: String,
}

pub(crate) fn parse_output(src: &str) -> Result<Output, OutputParseError> {
    match OUTPUT_TYPES.get(src) {
        Some(output) => Ok(*output),
        None => Err(OutputParseError {
            value: src.to_string(),
        }),
    }
}

pub(crate) fn print_output<A: std::fmt::Display + Serialize>(
    output: Output,
    value: A,
) -> Result<()> {
    match output {
        Output::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), &value)?;
            Ok(())
        }
        Output::Text => {
            println!("{value}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert!(matches!(parse_output("json"), Ok(Output::Json)));
        assert!(matches!(parse_output("text"), Ok(Output::Text)));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(parse_output("yaml").is_err());
    }
}
