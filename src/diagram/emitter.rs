//! Mermaid sequence diagram emission

use tracing::debug;

use super::participants::ParticipantRegistry;
use crate::app::config::DEFAULT_NOTE_MAX;
use crate::rules::{Event, RuleKind};

/// Diagram type header
pub const HEADER: &str = "sequenceDiagram";
/// Numbers every arrow in the rendered diagram
pub const AUTONUMBER: &str = "autonumber";

const INDENT: &str = "    ";
const ELLIPSIS: char = '…';

/// Rendering switches resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Echo each matched log line as a note
    pub echo_lines: bool,
    /// Maximum echoed note length in characters (0 = unlimited)
    pub note_max: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            echo_lines: false,
            note_max: DEFAULT_NOTE_MAX,
        }
    }
}

/// Make text safe to embed in a Mermaid statement
pub fn escape(text: &str) -> String {
    text.replace(['"', '`'], "'")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cut `text` to `max` characters, ending in an ellipsis when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push(ELLIPSIS);
    out
}

fn line_suffix(line_number: usize) -> String {
    format!("<br/>L:{}", line_number)
}

/// Renders events against a finished participant registry
pub struct Emitter<'a> {
    registry: &'a ParticipantRegistry,
    options: EmitOptions,
}

impl<'a> Emitter<'a> {
    pub fn new(registry: &'a ParticipantRegistry, options: EmitOptions) -> Self {
        Self { registry, options }
    }

    fn id<'n>(&'n self, name: &'n str) -> &'n str {
        self.registry.diagram_id(name).unwrap_or(name)
    }

    /// Participant declarations in registry order
    fn declarations(&self) -> impl Iterator<Item = String> + '_ {
        self.registry.participants().iter().map(|p| {
            if p.is_aliased() {
                format!(
                    "{INDENT}participant {} as \"{}\"",
                    p.diagram_id,
                    escape(&p.canonical_name)
                )
            } else {
                format!("{INDENT}participant {}", p.diagram_id)
            }
        })
    }

    /// Statements for a single event
    fn statements(&self, event: &Event) -> Vec<String> {
        let source = self.id(&event.source);
        let suffix = line_suffix(event.line_number);
        let scope = if event.destination.is_empty() {
            source.to_string()
        } else {
            format!("{},{}", source, self.id(&event.destination))
        };
        let title = format!("{}{}", escape(&event.title), suffix);

        let mut lines = Vec::with_capacity(2);
        match event.kind {
            RuleKind::Note => {
                lines.push(format!("{INDENT}Note over {scope}: {title}"));
            }
            RuleKind::Message => {
                // dst 未指定のメッセージは自分自身への矢印にする
                let destination = if event.destination.is_empty() {
                    source
                } else {
                    self.id(&event.destination)
                };
                lines.push(format!("{INDENT}{source} ->> {destination}: {title}"));
            }
        }

        if self.options.echo_lines {
            let note = truncate(&escape(&event.raw_line), self.options.note_max);
            lines.push(format!("{INDENT}Note over {scope}: {note}{suffix}"));
        }

        lines
    }

    /// All diagram lines in emission order
    pub fn lines(&self, events: &[Event]) -> Vec<String> {
        let mut lines = vec![HEADER.to_string(), format!("{INDENT}{AUTONUMBER}")];
        lines.extend(self.declarations());
        for event in events {
            lines.extend(self.statements(event));
        }
        debug!(
            "Emitted {} participants and {} events",
            self.registry.len(),
            events.len()
        );
        lines
    }

    /// Complete diagram text, newline terminated
    pub fn render(&self, events: &[Event]) -> String {
        let mut out = self.lines(events).join("\n");
        out.push('\n');
        out
    }
}
