/// Knot reachability validation over an exhaustive discovery run.

use rustc_hash::FxHashSet;

use crate::core::explorer::{discover_all_paths, ExploreOptions};
use crate::core::session::{SessionError, StoryEngine};
use crate::schema::path::Reachability;

/// Partition `knot_ids` by whether any discovered path was attributed to
/// them. Input order is preserved; duplicate ids collapse to their first
/// occurrence. An empty input yields two empty lists.
///
/// Attribution comes from choice target references only, so a knot reached
/// exclusively through unattributed flow can be misreported unreachable;
/// ids reported unreachable were never attributed anywhere in the search.
pub fn validate_knot_reachability<E: StoryEngine>(
    engine: &E,
    definition: &str,
    knot_ids: &[String],
    options: &ExploreOptions,
) -> Result<Reachability, SessionError> {
    let discovery = discover_all_paths(engine, definition, options)?;

    let mut visited = FxHashSet::default();
    for path in &discovery.paths {
        for knot in &path.knots_visited {
            visited.insert(knot.as_str());
        }
    }

    let mut report = Reachability::default();
    let mut queried = FxHashSet::default();
    for id in knot_ids {
        if !queried.insert(id.as_str()) {
            continue;
        }
        if visited.contains(id.as_str()) {
            report.reachable.push(id.clone());
        } else {
            report.unreachable.push(id.clone());
        }
    }
    Ok(report)
}
