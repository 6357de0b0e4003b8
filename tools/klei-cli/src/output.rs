//! JSON presentation of decoded record trees

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// Render `value` as JSON text.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("Failed to serialize JSON")
}

/// Print `value` as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = to_json(value, pretty)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("Failed to write to stdout")?;
    Ok(())
}

/// Write raw bytes to stdout.
pub fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .context("Failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        count: u32,
    }

    #[test]
    fn test_compact_keeps_field_order() {
        let json = to_json(&Sample { name: "idle", count: 2 }, false).unwrap();
        assert_eq!(json, r#"{"name":"idle","count":2}"#);
    }

    #[test]
    fn test_pretty_is_indented() {
        let json = to_json(&Sample { name: "idle", count: 2 }, true).unwrap();
        assert!(json.contains("\n  \"count\": 2"));
    }
}
