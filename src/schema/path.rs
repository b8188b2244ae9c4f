/// Discovered-path result types shared by the explorer, search, and tools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a discovered path stopped extending. Set exactly once per path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Natural terminal state.
    Done,
    /// Decision-point depth ceiling reached.
    MaxDepth,
    /// Global discovered-path ceiling reached.
    MaxPaths,
    /// A serialized-state fingerprint recurred past the configured limit.
    LoopDetected,
    /// The engine faulted mid-branch; carries the fault description.
    EngineFault(String),
}

impl EndReason {
    pub fn label(&self) -> &'static str {
        match self {
            EndReason::Done => "done",
            EndReason::MaxDepth => "max-depth",
            EndReason::MaxPaths => "max-paths",
            EndReason::LoopDetected => "loop-detected",
            EndReason::EngineFault(_) => "engine-fault",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::EngineFault(message) => write!(f, "engine-fault: {}", message),
            other => f.write_str(other.label()),
        }
    }
}

/// A single discovered execution branch, immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    /// Display texts of the chosen options, one per decision point.
    pub choices: Vec<String>,
    /// Emitted text fragments; empty unless content tracking is on.
    pub content: Vec<String>,
    /// Best-effort knot identifiers inferred from choice target references.
    /// May be incomplete — the engine exposes no stable node-id API.
    pub knots_visited: Vec<String>,
    /// True exactly when `end_reason` is `Done`.
    pub completed: bool,
    pub end_reason: EndReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExploreStats {
    pub total_paths: usize,
    pub completed_paths: usize,
    pub loops_detected: usize,
    pub faulted_paths: usize,
    pub max_depth_reached: bool,
}

/// Aggregate result of one exhaustive discovery run. `paths` preserves
/// discovery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discovery {
    pub paths: Vec<Path>,
    pub stats: ExploreStats,
}

/// Partition of queried knot ids by best-effort visitation.
///
/// The contract is asymmetric: ids listed `unreachable` were never attributed
/// on any discovered path; ids listed `reachable` are attributions, not
/// exhaustive confirmations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reachability {
    pub reachable: Vec<String>,
    pub unreachable: Vec<String>,
}

/// Infer a knot identifier from an opaque choice target reference.
///
/// Takes the leading dot-separated component, e.g. `"cellar.0.2"` maps to
/// `"cellar"`. Relative or structural references (leading `^`, bare indices)
/// yield `None` — those fragments simply go unattributed.
pub fn infer_knot(target: &str) -> Option<String> {
    let head = target.trim_start_matches('.').split('.').next().unwrap_or("");
    let named = head
        .chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    if named {
        Some(head.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_knot_plain_name() {
        assert_eq!(infer_knot("cellar"), Some("cellar".to_string()));
    }

    #[test]
    fn infer_knot_dotted_reference() {
        assert_eq!(infer_knot("cellar.0.2"), Some("cellar".to_string()));
        assert_eq!(infer_knot(".attic.1"), Some("attic".to_string()));
    }

    #[test]
    fn infer_knot_structural_references() {
        assert_eq!(infer_knot("^.1.2"), None);
        assert_eq!(infer_knot("0.3"), None);
        assert_eq!(infer_knot(""), None);
    }

    #[test]
    fn end_reason_labels() {
        assert_eq!(EndReason::Done.label(), "done");
        assert_eq!(EndReason::MaxDepth.label(), "max-depth");
        assert_eq!(EndReason::MaxPaths.label(), "max-paths");
        assert_eq!(EndReason::LoopDetected.label(), "loop-detected");
        assert_eq!(
            EndReason::EngineFault("boom".to_string()).label(),
            "engine-fault"
        );
    }

    #[test]
    fn end_reason_display_carries_fault_message() {
        let reason = EndReason::EngineFault("undefined variable 'coins'".to_string());
        assert_eq!(
            reason.to_string(),
            "engine-fault: undefined variable 'coins'"
        );
        assert_eq!(EndReason::LoopDetected.to_string(), "loop-detected");
    }
}
