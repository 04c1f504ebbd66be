//! Line classification
//!
//! Scans a log line by line and records one [`Event`] for every rule whose
//! pattern occurs in the line. Every matching rule fires, in declaration order.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use super::loader::{Rule, RuleKind};
use crate::error::{Error, Result};

/// One rule matching one log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// 1-based line number in the log
    pub line_number: usize,
    pub source: String,
    /// Empty for solo notes
    pub destination: String,
    pub title: String,
    /// Log line without its line terminator
    pub raw_line: String,
    pub kind: RuleKind,
}

impl Event {
    fn new(rule: &Rule, line_number: usize, raw_line: &str) -> Self {
        Self {
            line_number,
            source: rule.source.clone(),
            destination: rule.destination.clone(),
            title: rule.title.clone(),
            raw_line: raw_line.to_string(),
            kind: rule.kind,
        }
    }
}

/// Rules matching `line`, in declaration order
pub fn matching_rules<'a>(rules: &'a [Rule], line: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
    rules.iter().filter(move |rule| rule.matches(line))
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Scan a log stream and collect events
///
/// Invalid UTF-8 is replaced with U+FFFD instead of failing the scan.
pub fn scan<R: BufRead>(rules: &[Rule], mut reader: R) -> io::Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let line: Cow<'_, str> = String::from_utf8_lossy(trim_line_ending(&buf));
        for rule in matching_rules(rules, &line) {
            debug!("Line {} matched rule '{}'", line_number, rule.title);
            events.push(Event::new(rule, line_number, &line));
        }
    }

    info!("Scanned {} lines, {} events", line_number, events.len());
    Ok(events)
}

/// Scan a log file on disk
pub fn scan_file(rules: &[Rule], path: &Path) -> Result<Vec<Event>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::LogRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    scan(rules, BufReader::new(file)).map_err(|source| Error::LogRead {
        path: path.to_path_buf(),
        source,
    })
}
