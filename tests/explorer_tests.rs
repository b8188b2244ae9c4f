/// Path discovery integration tests over the fixture stories.

use story_explorer::core::engine::GraphEngine;
use story_explorer::core::explorer::{discover_all_paths, ExploreOptions};
use story_explorer::schema::path::EndReason;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn simple_linear_story_yields_one_completed_path() {
    let result =
        discover_all_paths(&GraphEngine, &fixture("simple.ron"), &ExploreOptions::default())
            .unwrap();

    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert!(path.completed);
    assert_eq!(path.end_reason, EndReason::Done);
    assert!(path.choices.is_empty());
    assert_eq!(result.stats.completed_paths, 1);
    assert!(!result.stats.max_depth_reached);
}

#[test]
fn both_choice_branches_are_explored() {
    let result =
        discover_all_paths(&GraphEngine, &fixture("choices.ron"), &ExploreOptions::default())
            .unwrap();

    assert_eq!(result.paths.len(), 2);
    assert_eq!(result.stats.completed_paths, 2);
    for path in &result.paths {
        assert_eq!(path.choices.len(), 1);
        assert_eq!(path.end_reason, EndReason::Done);
    }
    let first_choices: Vec<&str> = result.paths.iter().map(|p| p.choices[0].as_str()).collect();
    assert!(first_choices.contains(&"Option A"));
    assert!(first_choices.contains(&"Option B"));
}

#[test]
fn content_untracked_by_default() {
    let result =
        discover_all_paths(&GraphEngine, &fixture("simple.ron"), &ExploreOptions::default())
            .unwrap();
    assert!(result.paths[0].content.is_empty());
}

#[test]
fn content_tracked_when_enabled() {
    let options = ExploreOptions::default().track_content(true);
    let result = discover_all_paths(&GraphEngine, &fixture("simple.ron"), &options).unwrap();

    assert_eq!(
        result.paths[0].content,
        vec![
            "The archive door swings open.",
            "Dust motes drift in the lamplight.",
            "A single ledger waits on the desk.",
        ]
    );
}

#[test]
fn max_paths_caps_the_search() {
    let options = ExploreOptions::default().max_paths(1);
    let result = discover_all_paths(&GraphEngine, &fixture("choices.ron"), &options).unwrap();

    // The branch in flight when the ceiling hits may still record.
    assert!(result.paths.len() <= 2);
    assert!(result.stats.completed_paths >= 1);
}

#[test]
fn sticky_loop_is_detected_and_escape_completes() {
    let options = ExploreOptions::default().state_hash_limit(2).max_depth(20);
    let result = discover_all_paths(&GraphEngine, &fixture("loop.ron"), &options).unwrap();

    // Depth-first order: Continue,Continue loops; Continue,Exit and Exit
    // complete.
    assert_eq!(result.paths.len(), 3);
    assert_eq!(result.paths[0].end_reason, EndReason::LoopDetected);
    assert_eq!(result.paths[0].choices, vec!["Continue", "Continue"]);
    assert_eq!(result.paths[1].choices, vec!["Continue", "Exit"]);
    assert_eq!(result.paths[2].choices, vec!["Exit"]);
    assert_eq!(result.stats.completed_paths, 2);
    assert_eq!(result.stats.loops_detected, 1);
}

#[test]
fn exit_path_found_in_loop_story() {
    let options = ExploreOptions::default().state_hash_limit(3).max_depth(20);
    let result = discover_all_paths(&GraphEngine, &fixture("loop.ron"), &options).unwrap();

    assert!(result.stats.completed_paths > 0);
    let exit_path = result
        .paths
        .iter()
        .find(|p| p.completed && p.choices.contains(&"Exit".to_string()));
    assert!(exit_path.is_some());
}

#[test]
fn once_only_loop_choice_yields_two_completed_paths() {
    let options = ExploreOptions::default().state_hash_limit(2).max_depth(20);
    let result = discover_all_paths(&GraphEngine, &fixture("loop_once.ron"), &options).unwrap();

    // The Continue choice is consumed on its first use, so every branch
    // escapes.
    assert_eq!(result.paths.len(), 2);
    assert_eq!(result.stats.completed_paths, 2);
    let mut joined: Vec<String> = result.paths.iter().map(|p| p.choices.join(",")).collect();
    joined.sort();
    assert_eq!(joined, vec!["Continue,Exit", "Exit"]);
}

#[test]
fn unescapable_cycle_ends_loop_detected() {
    let options = ExploreOptions::default().state_hash_limit(2);
    let result = discover_all_paths(&GraphEngine, &fixture("cycle.ron"), &options).unwrap();

    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert_eq!(path.end_reason, EndReason::LoopDetected);
    assert!(!path.completed);
    assert!(path.choices.is_empty());
    assert_eq!(result.stats.loops_detected, 1);
    assert_eq!(result.stats.completed_paths, 0);
}

#[test]
fn loop_limit_bounds_repeated_states() {
    for limit in 1..=3 {
        let options = ExploreOptions::default().state_hash_limit(limit).track_content(true);
        let result = discover_all_paths(&GraphEngine, &fixture("cycle.ron"), &options).unwrap();

        // Two lines per lap; the path is cut when a state recurs past the
        // limit, so content stays within limit + 1 laps.
        assert_eq!(result.paths.len(), 1);
        assert!(result.paths[0].content.len() <= 2 * (limit + 1));
    }
}

#[test]
fn max_depth_cuts_the_loop_story() {
    let options = ExploreOptions::default().max_depth(5).state_hash_limit(100);
    let result = discover_all_paths(&GraphEngine, &fixture("loop.ron"), &options).unwrap();

    assert!(!result.paths.is_empty());
    assert!(result.stats.completed_paths > 0);
    assert!(result.stats.max_depth_reached);
    let deepest = result
        .paths
        .iter()
        .find(|p| p.end_reason == EndReason::MaxDepth)
        .unwrap();
    assert_eq!(deepest.choices.len(), 5);
}

#[test]
fn runtime_fault_terminates_only_its_branch() {
    let result =
        discover_all_paths(&GraphEngine, &fixture("fault.ron"), &ExploreOptions::default())
            .unwrap();

    assert_eq!(result.paths.len(), 2);
    assert_eq!(result.stats.faulted_paths, 1);
    assert_eq!(result.stats.completed_paths, 1);

    let faulted = &result.paths[0];
    assert_eq!(faulted.choices, vec!["Pay the toll"]);
    assert!(!faulted.completed);
    match &faulted.end_reason {
        EndReason::EngineFault(message) => assert!(message.contains("coins")),
        other => panic!("expected engine fault, got {}", other),
    }

    let survivor = &result.paths[1];
    assert_eq!(survivor.choices, vec!["Walk around"]);
    assert!(survivor.completed);
}

#[test]
fn completed_flag_matches_end_reason() {
    let options = ExploreOptions::default().state_hash_limit(2).max_depth(20);
    let result = discover_all_paths(&GraphEngine, &fixture("loop.ron"), &options).unwrap();

    assert_eq!(result.stats.total_paths, result.paths.len());
    for path in &result.paths {
        assert_eq!(path.completed, path.end_reason == EndReason::Done);
    }
    let done = result.paths.iter().filter(|p| p.completed).count();
    assert_eq!(done, result.stats.completed_paths);
}

#[test]
fn discovery_order_is_reported_choice_order() {
    let result =
        discover_all_paths(&GraphEngine, &fixture("knots.ron"), &ExploreOptions::default())
            .unwrap();

    assert_eq!(result.paths.len(), 2);
    assert_eq!(
        result.paths[0].choices,
        vec!["Take the forest trail", "Press deeper"]
    );
    assert_eq!(result.paths[1].choices, vec!["Follow the river"]);
}
