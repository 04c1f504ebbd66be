//! Log to diagram conversion
//!
//! Loads the rule table, scans the log, registers participants and renders
//! the diagram. Nothing is returned unless every step succeeds.

use std::path::Path;
use tracing::info;

use crate::diagram::{EmitOptions, Emitter, ParticipantRegistry};
use crate::error::Result;
use crate::rules::{load_rules, scan_file};

use super::config::delimiter_byte;

/// Options for a single conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Rule table field delimiter
    pub delimiter: char,
    pub emit: EmitOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            emit: EmitOptions::default(),
        }
    }
}

/// Convert `log_path` into Mermaid text using the rules in `rules_path`
pub fn convert(log_path: &Path, rules_path: &Path, options: &ConvertOptions) -> Result<String> {
    let delimiter = delimiter_byte(options.delimiter)?;
    let rules = load_rules(rules_path, delimiter)?;
    let events = scan_file(&rules, log_path)?;
    let registry = ParticipantRegistry::from_events(&events);

    info!(
        "Converted {}: {} events, {} participants",
        log_path.display(),
        events.len(),
        registry.len()
    );

    Ok(Emitter::new(&registry, options.emit).render(&events))
}
