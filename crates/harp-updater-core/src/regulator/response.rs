//! Parsing of regulator stdout/stderr.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::RegulatorError;
use crate::types::Device;

/// stderr fragments the regulator (and the .NET serial stack under it) emits
/// when another process holds the device's serial port.
const PORT_IN_USE_PATTERN: &str = r"(?i)(access to the port .* is denied|\bport\b.*\b(is )?(already )?in use|being used by another process|resource busy)";

fn port_in_use_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PORT_IN_USE_PATTERN).expect("port-in-use pattern is valid"))
}

/// Check whether a failed call's stderr reports a busy serial port.
pub fn is_port_in_use(stderr: &str) -> bool {
    port_in_use_regex().is_match(stderr)
}

/// Parse JSON out of regulator stdout.
///
/// The regulator may print banner lines ahead of the payload and status
/// lines after it. The payload is the first line starting with `{` or `[`
/// that holds a complete JSON value; anything after that value is ignored.
pub fn parse_json_output(stdout: &str, command: &str) -> Result<Value, RegulatorError> {
    let mut first_error = None;
    let mut offset = 0;

    for line in stdout.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let start = offset + (line.len() - trimmed.len());
            let mut values =
                serde_json::Deserializer::from_str(&stdout[start..]).into_iter::<Value>();
            match values.next() {
                Some(Ok(value)) => return Ok(value),
                Some(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                None => {}
            }
        }
        offset += line.len();
    }

    Err(RegulatorError::ParseError {
        command: command.to_string(),
        message: match first_error {
            Some(e) => format!("Failed to parse JSON: {}", e),
            None => "No JSON found in output".to_string(),
        },
    })
}

/// Parse `list --json` output into device records.
///
/// Empty output means no devices. Records that do not deserialize or fail
/// validation are skipped with a warning; a payload that is not an array is
/// an error.
pub fn parse_device_list(stdout: &str) -> Result<Vec<Device>, RegulatorError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value = parse_json_output(stdout, "list")?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(RegulatorError::ParseError {
                command: "list".to_string(),
                message: format!("Expected a JSON array of devices, got {}", json_kind(&other)),
            })
        }
    };

    let mut devices = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let device: Device = match serde_json::from_value(item) {
            Ok(d) => d,
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable device record");
                continue;
            }
        };
        if let Err(reason) = device.validate() {
            warn!(index, %reason, "skipping invalid device record");
            continue;
        }
        devices.push(device);
    }

    Ok(devices)
}

/// Parse `inspect --json` output into its metadata object.
pub fn parse_inspect_output(
    stdout: &str,
) -> Result<serde_json::Map<String, Value>, RegulatorError> {
    if stdout.trim().is_empty() {
        return Err(RegulatorError::ParseError {
            command: "inspect".to_string(),
            message: "Empty output".to_string(),
        });
    }

    match parse_json_output(stdout, "inspect")? {
        Value::Object(map) => Ok(map),
        other => Err(RegulatorError::ParseError {
            command: "inspect".to_string(),
            message: format!("Expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
