//! Rule table loading
//!
//! Reads a delimited table (`title,match,src,dst[,kind]`) and compiles each
//! usable row into a [`Rule`]. Any invalid pattern aborts the whole load.

use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Columns every rule table must declare
pub const REQUIRED_COLUMNS: [&str; 4] = ["title", "match", "src", "dst"];

/// Optional column selecting message or note rendering
pub const KIND_COLUMN: &str = "kind";

/// How a matched line is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    /// Arrow between two participants
    #[default]
    Message,
    /// Annotation over one or two participants
    Note,
}

impl RuleKind {
    /// Parse a `kind` cell (case-insensitive, unknown values fall back to Message)
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "note" => RuleKind::Note,
            _ => RuleKind::Message,
        }
    }
}

/// A single compiled row of the rule table
#[derive(Debug, Clone)]
pub struct Rule {
    pub title: String,
    pub pattern: Regex,
    pub source: String,
    /// Empty only for note rules
    pub destination: String,
    pub kind: RuleKind,
}

impl Rule {
    /// Unanchored search of the pattern within `line`
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Column positions resolved from the header row
struct Columns {
    title: usize,
    pattern: usize,
    src: usize,
    dst: usize,
    kind: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ConfigError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|&name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingColumns { missing });
        }

        Ok(Self {
            title: position("title").unwrap_or_default(),
            pattern: position("match").unwrap_or_default(),
            src: position("src").unwrap_or_default(),
            dst: position("dst").unwrap_or_default(),
            kind: position(KIND_COLUMN),
        })
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

/// Load rules from a table on disk
pub fn load_rules(path: &Path, delimiter: u8) -> Result<Vec<Rule>, ConfigError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Open {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let rules = parse_rules(file, delimiter)?;
    info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Parse rules from any reader, preserving declaration order
pub fn parse_rules<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Rule>, ConfigError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut rules = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let title = cell(&record, columns.title);
        let pattern = cell(&record, columns.pattern);
        let source = cell(&record, columns.src);
        let destination = cell(&record, columns.dst);
        let kind = columns
            .kind
            .map(|i| RuleKind::from_str(cell(&record, i)))
            .unwrap_or_default();

        if title.is_empty() || pattern.is_empty() || source.is_empty() {
            debug!("Skipping rule row {}: title, match and src are required", line);
            continue;
        }
        if kind == RuleKind::Message && destination.is_empty() {
            warn!("Skipping message rule '{}' (row {}): dst is empty", title, line);
            continue;
        }

        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        rules.push(Rule {
            title: title.to_string(),
            pattern: regex,
            source: source.to_string(),
            destination: destination.to_string(),
            kind,
        });
    }

    Ok(rules)
}
