//! Rule table loading and log line matching

pub mod loader;
pub mod matcher;

pub use loader::{load_rules, parse_rules, Rule, RuleKind};
pub use matcher::{scan, scan_file, Event};
