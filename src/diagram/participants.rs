//! Participant discovery and diagram id assignment

use std::collections::HashMap;
use tracing::warn;

use crate::rules::Event;

/// Prefix for generated participant ids
const ALIAS_PREFIX: &str = "P";

/// A named actor in the diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Name exactly as written in the rule table
    pub canonical_name: String,
    /// Identifier used in diagram statements
    pub diagram_id: String,
}

impl Participant {
    /// Whether the diagram id differs from the canonical name
    pub fn is_aliased(&self) -> bool {
        self.diagram_id != self.canonical_name
    }
}

/// `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Participants in first-seen order
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
    index: HashMap<String, usize>,
    aliases_assigned: usize,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register source then destination of every event, in order
    pub fn from_events(events: &[Event]) -> Self {
        let mut registry = Self::new();
        for event in events {
            registry.register(&event.source);
            registry.register(&event.destination);
        }
        registry
    }

    /// Add a participant if the name is non-empty and unseen
    pub fn register(&mut self, name: &str) {
        if name.is_empty() || self.index.contains_key(name) {
            return;
        }

        let diagram_id = if is_bare_identifier(name) {
            name.to_string()
        } else {
            self.aliases_assigned += 1;
            format!("{}{}", ALIAS_PREFIX, self.aliases_assigned)
        };

        if self.id_taken(&diagram_id) {
            warn!(
                "Participant '{}' shares diagram id '{}' with another participant",
                name, diagram_id
            );
        }

        self.index.insert(name.to_string(), self.participants.len());
        self.participants.push(Participant {
            canonical_name: name.to_string(),
            diagram_id,
        });
    }

    fn id_taken(&self, id: &str) -> bool {
        self.participants.iter().any(|p| p.diagram_id == id)
    }

    /// Diagram id for a canonical name
    pub fn diagram_id(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.participants[i].diagram_id.as_str())
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    fn event(source: &str, destination: &str) -> Event {
        Event {
            line_number: 1,
            source: source.to_string(),
            destination: destination.to_string(),
            title: "t".to_string(),
            raw_line: String::new(),
            kind: RuleKind::Message,
        }
    }

    #[test]
    fn test_bare_identifier() {
        assert!(is_bare_identifier("Client"));
        assert!(is_bare_identifier("_db2"));
        assert!(is_bare_identifier("auth_service"));
        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("2fa"));
        assert!(!is_bare_identifier("web client"));
        assert!(!is_bare_identifier("api-gateway"));
        assert!(!is_bare_identifier("サーバー"));
    }

    #[test]
    fn test_first_seen_order() {
        let registry = ParticipantRegistry::from_events(&[
            event("Client", "Server"),
            event("Server", "Db"),
            event("Client", "Db"),
        ]);

        let names: Vec<&str> = registry
            .participants()
            .iter()
            .map(|p| p.canonical_name.as_str())
            .collect();
        assert_eq!(names, vec!["Client", "Server", "Db"]);
    }

    #[test]
    fn test_aliases_are_sequential() {
        let registry = ParticipantRegistry::from_events(&[
            event("web client", "Server"),
            event("Server", "auth-svc"),
            event("web client", "auth-svc"),
        ]);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.diagram_id("web client"), Some("P1"));
        assert_eq!(registry.diagram_id("Server"), Some("Server"));
        assert_eq!(registry.diagram_id("auth-svc"), Some("P2"));
        assert!(registry.participants()[0].is_aliased());
        assert!(!registry.participants()[1].is_aliased());
    }

    #[test]
    fn test_generated_alias_can_collide_with_bare_name() {
        let mut registry = ParticipantRegistry::new();
        registry.register("web client");
        assert!(registry.id_taken("P1"));
        assert!(!registry.id_taken("P2"));

        registry.register("P1");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.participants()[0].diagram_id, "P1");
        assert_eq!(registry.participants()[1].diagram_id, "P1");
        assert!(!registry.participants()[1].is_aliased());
    }

    #[test]
    fn test_empty_destination_is_ignored() {
        let registry = ParticipantRegistry::from_events(&[event("Server", "")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.diagram_id(""), None);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ParticipantRegistry::from_events(&[]);
        assert!(registry.is_empty());
        assert_eq!(registry.diagram_id("Client"), None);
    }
}
