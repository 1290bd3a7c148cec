//! JSONL input traces
//!
//! One record per line, `at` in milliseconds from the start of the trace:
//!
//! ```text
//! {"at": 1200, "input": {"kind": "scroll", "y": 840.0}}
//! {"at": 9000, "command": {"kind": "acknowledge"}}
//! ```
//!
//! Blank lines are skipped. Bad lines are collected, not fatal.

use std::fs;
use std::path::Path;

use presence_core::{Error, Millis};
use presence_runtime::Command;
use presence_sensor::InputEvent;
use serde::{Deserialize, Serialize};

/// What happens at one instant: raw input or a presentation command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAction {
    Input(InputEvent),
    Command(Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub at: Millis,
    #[serde(flatten)]
    pub action: TraceAction,
}

pub struct ParseResult {
    pub records: Vec<TraceRecord>,
    pub errors: Vec<ParseError>,
}

#[derive(Debug)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::trace(e.line, e.message)
    }
}

pub fn parse_trace(path: &Path) -> Result<ParseResult, std::io::Error> {
    let content = fs::read_to_string(path)?;
    Ok(parse_lines(&content))
}

pub fn parse_lines(content: &str) -> ParseResult {
    let mut records: Vec<TraceRecord> = Vec::new();
    let mut errors = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<TraceRecord>(line) {
            Ok(record) => match records.last() {
                Some(previous) if record.at < previous.at => errors.push(ParseError {
                    line: i + 1,
                    message: format!("at {} goes back in time (previous record at {})", record.at, previous.at),
                }),
                _ => records.push(record),
            },
            Err(e) => errors.push(ParseError {
                line: i + 1,
                message: e.to_string(),
            }),
        }
    }

    ParseResult { records, errors }
}

/// A live action line (no `at`; the clock supplies the instant).
pub fn parse_action(line: &str) -> Result<TraceAction, Error> {
    Ok(serde_json::from_str(line.trim())?)
}
