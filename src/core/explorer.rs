/// Bounded depth-first path discovery over an opaque story session.
///
/// One mutable session, checkpoint/restore instead of copy: a snapshot is
/// taken at each decision point before trying a choice and restored before
/// each next sibling, so sibling branches never see each other's mutations.

use rustc_hash::FxHashMap;

use crate::core::session::{SessionError, StoryEngine, StorySession};
use crate::schema::path::{infer_knot, Discovery, EndReason, Path};

/// Search limits and tracking toggles for one exploration call.
#[derive(Debug, Clone)]
pub struct ExploreOptions {
    /// Decision-point depth ceiling per path.
    pub max_depth: usize,
    /// Ceiling on recorded paths across the whole search. Once reached, no
    /// new branches are launched; branches already in flight still record.
    pub max_paths: usize,
    /// Record emitted text fragments per path. Off by default to bound
    /// memory on wide stories.
    pub track_content: bool,
    /// Occurrences of one state fingerprint allowed along a path before the
    /// path is abandoned as a loop.
    pub state_hash_limit: usize,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        ExploreOptions {
            max_depth: 100,
            max_paths: 1000,
            track_content: false,
            state_hash_limit: 2,
        }
    }
}

impl ExploreOptions {
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn max_paths(mut self, limit: usize) -> Self {
        self.max_paths = limit;
        self
    }

    pub fn track_content(mut self, on: bool) -> Self {
        self.track_content = on;
        self
    }

    pub fn state_hash_limit(mut self, limit: usize) -> Self {
        self.state_hash_limit = limit;
        self
    }
}

/// Mutable prefix of the branch currently being extended.
#[derive(Debug, Clone, Default)]
struct Branch {
    choices: Vec<String>,
    content: Vec<String>,
    knots: Vec<String>,
    /// Fingerprint occurrence counts along this path prefix.
    seen: FxHashMap<u64, usize>,
}

/// Exhaustively enumerate every choice combination reachable from the
/// story's start state, subject to `options`.
///
/// Construction errors propagate; runtime engine faults terminate only the
/// branch they occur on.
pub fn discover_all_paths<E: StoryEngine>(
    engine: &E,
    definition: &str,
    options: &ExploreOptions,
) -> Result<Discovery, SessionError> {
    let mut session = engine.open(definition)?;
    Ok(discover_session_paths(&mut session, options))
}

/// Explore from the session's current position. For callers that already
/// hold a compliant session.
pub fn discover_session_paths<S: StorySession>(
    session: &mut S,
    options: &ExploreOptions,
) -> Discovery {
    let mut result = Discovery::default();
    explore(session, 0, Branch::default(), options, &mut result);
    result
}

fn explore<S: StorySession>(
    session: &mut S,
    depth: usize,
    mut branch: Branch,
    options: &ExploreOptions,
    result: &mut Discovery,
) {
    // Drain pending content, fingerprinting the state after every advance.
    while session.has_more_content() {
        match session.advance() {
            Ok(text) => {
                if options.track_content {
                    branch.content.push(text);
                }
            }
            Err(fault) => {
                record(result, branch, EndReason::EngineFault(fault.to_string()));
                return;
            }
        }
        match session.save_state() {
            Ok(snapshot) => {
                let count = branch.seen.entry(snapshot.fingerprint()).or_insert(0);
                *count += 1;
                if *count > options.state_hash_limit {
                    record(result, branch, EndReason::LoopDetected);
                    return;
                }
            }
            Err(fault) => {
                record(result, branch, EndReason::EngineFault(fault.to_string()));
                return;
            }
        }
    }

    let choices = session.current_choices();
    if choices.is_empty() {
        record(result, branch, EndReason::Done);
        return;
    }
    if depth >= options.max_depth {
        record(result, branch, EndReason::MaxDepth);
        return;
    }
    if result.paths.len() >= options.max_paths {
        record(result, branch, EndReason::MaxPaths);
        return;
    }

    let fork = match session.save_state() {
        Ok(snapshot) => snapshot,
        Err(fault) => {
            record(result, branch, EndReason::EngineFault(fault.to_string()));
            return;
        }
    };

    for (i, choice) in choices.iter().enumerate() {
        if i > 0 {
            if let Err(fault) = session.restore_state(&fork) {
                // Session unusable; terminate this sibling and stop here.
                let mut child = branch.clone();
                child.choices.push(choice.text.clone());
                record(result, child, EndReason::EngineFault(fault.to_string()));
                return;
            }
        }

        let mut child = branch.clone();
        child.choices.push(choice.text.clone());

        match session.choose(i) {
            Ok(()) => {
                if let Some(knot) = choice.target.as_deref().and_then(infer_knot) {
                    child.knots.push(knot);
                }
                explore(session, depth + 1, child, options, result);
            }
            Err(fault) => record(result, child, EndReason::EngineFault(fault.to_string())),
        }
    }
}

fn record(result: &mut Discovery, branch: Branch, reason: EndReason) {
    match reason {
        EndReason::Done => result.stats.completed_paths += 1,
        EndReason::LoopDetected => result.stats.loops_detected += 1,
        EndReason::EngineFault(_) => result.stats.faulted_paths += 1,
        EndReason::MaxDepth => result.stats.max_depth_reached = true,
        EndReason::MaxPaths => {}
    }
    result.stats.total_paths += 1;
    result.paths.push(Path {
        completed: matches!(reason, EndReason::Done),
        choices: branch.choices,
        content: branch.content,
        knots_visited: branch.knots,
        end_reason: reason,
    });
}
