/// Capability interface between the explorer and a narrative engine.
///
/// The engine is treated as a black box: the explorer can only advance it,
/// inspect the currently offered choices, pick one, and checkpoint/restore
/// its serialized state. Any engine binding that implements these traits can
/// be explored.

use rustc_hash::FxHasher;
use std::hash::Hasher;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("story definition failed to load: {0}")]
    MalformedStory(String),
    #[error("unknown knot '{0}'")]
    UnknownKnot(String),
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("choice index {index} out of range ({count} available)")]
    ChoiceOutOfRange { index: usize, count: usize },
    #[error("advance called with no pending content")]
    NoPendingContent,
    #[error("divert chain exceeded {0} hops without emitting content")]
    DivertOverflow(usize),
    #[error("state snapshot could not be decoded: {0}")]
    CorruptSnapshot(String),
}

/// One selectable option at a decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Display text shown to the reader.
    pub text: String,
    /// Opaque target reference, when the engine reports one. Knot
    /// attribution is inferred from this best-effort.
    pub target: Option<String>,
}

/// Opaque serialized session state.
///
/// The snapshot is the unit of backtracking (restore before trying a sibling
/// choice) and of loop detection (equal serialized states must produce equal
/// fingerprints, so engines serialize deterministically).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot(String);

impl StateSnapshot {
    pub fn new(raw: String) -> Self {
        StateSnapshot(raw)
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Cheap u64 digest of the serialized state.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(self.0.as_bytes());
        hasher.finish()
    }
}

/// A live, single-threaded story session. Mutates in place; the explorer
/// owns it exclusively for the duration of one call.
pub trait StorySession {
    /// Emit the next pending text fragment. Callable while
    /// `has_more_content()` returns true.
    fn advance(&mut self) -> Result<String, SessionError>;

    fn has_more_content(&self) -> bool;

    /// Currently offered choices, in the engine's order. Empty while content
    /// is pending or the session has ended.
    fn current_choices(&self) -> Vec<Choice>;

    /// Select the choice at `index`, mutating the session.
    fn choose(&mut self, index: usize) -> Result<(), SessionError>;

    fn save_state(&self) -> Result<StateSnapshot, SessionError>;

    fn restore_state(&mut self, snapshot: &StateSnapshot) -> Result<(), SessionError>;

    /// True once the story reached a natural terminal state.
    fn is_at_terminal(&self) -> bool;
}

/// Constructs sessions from serialized story definitions. Construction
/// errors are fatal to the whole exploration call and propagate unchanged.
pub trait StoryEngine {
    type Session: StorySession;

    fn open(&self, definition: &str) -> Result<Self::Session, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_snapshots_share_fingerprint() {
        let a = StateSnapshot::new("(knot:\"start\",line:1)".to_string());
        let b = StateSnapshot::new("(knot:\"start\",line:1)".to_string());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn distinct_snapshots_differ() {
        let a = StateSnapshot::new("(knot:\"start\",line:1)".to_string());
        let b = StateSnapshot::new("(knot:\"start\",line:2)".to_string());
        assert_ne!(a, b);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn snapshot_raw_round_trip() {
        let snap = StateSnapshot::new("payload".to_string());
        assert_eq!(snap.raw(), "payload");
    }
}
