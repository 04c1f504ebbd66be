//! Participant registry and Mermaid rendering

pub mod emitter;
pub mod participants;

pub use emitter::{escape, truncate, EmitOptions, Emitter};
pub use participants::{is_bare_identifier, Participant, ParticipantRegistry};
