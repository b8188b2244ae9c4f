/// Shortest-path search: breadth-first over the choice tree to a target knot.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::core::explorer::ExploreOptions;
use crate::core::session::{SessionError, StateSnapshot, StoryEngine, StorySession};
use crate::schema::path::{infer_knot, EndReason, Path};

/// A frontier entry: a decision point reached by some choice prefix, with
/// the snapshot to resume from.
struct Frontier {
    snapshot: StateSnapshot,
    choices: Vec<String>,
    content: Vec<String>,
    knots: Vec<String>,
    depth: usize,
    seen: FxHashMap<u64, usize>,
}

/// Find the shortest (fewest-choices) path attributed to `target`.
///
/// Siblings expand left to right, so among equal-length hits the first in
/// choice order wins. Returns `Ok(None)` when no branch within `max_depth`
/// or the `max_paths` expansion budget reaches the target — a normal
/// outcome, not an error. Branches that loop past `state_hash_limit` or
/// fault at runtime are dropped from the frontier.
pub fn find_path_to_knot<E: StoryEngine>(
    engine: &E,
    definition: &str,
    target: &str,
    options: &ExploreOptions,
) -> Result<Option<Path>, SessionError> {
    let mut session = engine.open(definition)?;

    let mut root = Frontier {
        snapshot: StateSnapshot::new(String::new()),
        choices: Vec::new(),
        content: Vec::new(),
        knots: Vec::new(),
        depth: 0,
        seen: FxHashMap::default(),
    };
    if !drain(&mut session, &mut root, options) {
        return Ok(None);
    }
    root.snapshot = match session.save_state() {
        Ok(snapshot) => snapshot,
        Err(_) => return Ok(None),
    };

    let mut queue = VecDeque::new();
    queue.push_back(root);
    let mut expanded = 0usize;

    while let Some(node) = queue.pop_front() {
        if expanded >= options.max_paths {
            break;
        }
        expanded += 1;

        if session.restore_state(&node.snapshot).is_err() {
            break;
        }
        let choices = session.current_choices();

        for (i, choice) in choices.iter().enumerate() {
            if i > 0 && session.restore_state(&node.snapshot).is_err() {
                return Ok(None);
            }

            let mut child = Frontier {
                snapshot: node.snapshot.clone(),
                choices: node.choices.clone(),
                content: node.content.clone(),
                knots: node.knots.clone(),
                depth: node.depth + 1,
                seen: node.seen.clone(),
            };
            child.choices.push(choice.text.clone());
            let hit = match choice.target.as_deref().and_then(infer_knot) {
                Some(knot) => {
                    let matched = knot == target;
                    child.knots.push(knot);
                    matched
                }
                None => false,
            };

            if session.choose(i).is_err() {
                continue;
            }

            if hit {
                return Ok(Some(finish_hit(&mut session, child, options)));
            }

            if !drain(&mut session, &mut child, options) {
                continue;
            }
            if session.current_choices().is_empty() {
                continue;
            }
            if child.depth >= options.max_depth {
                continue;
            }
            child.snapshot = match session.save_state() {
                Ok(snapshot) => snapshot,
                Err(_) => continue,
            };
            queue.push_back(child);
        }
    }

    Ok(None)
}

/// Advance until the session blocks on choices or ends. Returns false if
/// the branch faulted or exceeded the loop limit.
fn drain<S: StorySession>(
    session: &mut S,
    node: &mut Frontier,
    options: &ExploreOptions,
) -> bool {
    while session.has_more_content() {
        match session.advance() {
            Ok(text) => {
                if options.track_content {
                    node.content.push(text);
                }
            }
            Err(_) => return false,
        }
        match session.save_state() {
            Ok(snapshot) => {
                let count = node.seen.entry(snapshot.fingerprint()).or_insert(0);
                *count += 1;
                if *count > options.state_hash_limit {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }
    true
}

fn finish_hit<S: StorySession>(
    session: &mut S,
    mut node: Frontier,
    options: &ExploreOptions,
) -> Path {
    // Settle the hit branch so the path reports terminal status; the loop
    // guard in drain bounds cyclic epilogues.
    let _ = drain(session, &mut node, options);
    Path {
        choices: node.choices,
        content: node.content,
        knots_visited: node.knots,
        completed: session.is_at_terminal(),
        end_reason: EndReason::Done,
    }
}
