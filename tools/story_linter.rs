/// Story Linter — validates story graph structure and knot reachability.
///
/// Usage: story_linter <story.ron> [--max-depth <n>] [--max-paths <n>]
///
/// Static issues (dangling targets, missing start knot) are errors;
/// heuristically-unreachable knots are warnings, since attribution from
/// choice targets is best-effort. Exit code 1 when any error is found.

use story_explorer::core::engine::GraphEngine;
use story_explorer::core::explorer::ExploreOptions;
use story_explorer::core::reachability::validate_knot_reachability;
use story_explorer::schema::story::StoryGraph;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <story.ron> [--max-depth <n>] [--max-paths <n>]");
        process::exit(0);
    }

    let story_path = &args[1];
    let mut options = ExploreOptions::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--max-depth" if i + 1 < args.len() => {
                i += 1;
                options.max_depth = args[i].parse().unwrap_or(options.max_depth);
            }
            "--max-paths" if i + 1 < args.len() => {
                i += 1;
                options.max_paths = args[i].parse().unwrap_or(options.max_paths);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let definition = match std::fs::read_to_string(Path::new(story_path)) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("ERROR: failed to read '{}': {}", story_path, e);
            process::exit(1);
        }
    };

    let graph = match StoryGraph::parse_ron(&definition) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: failed to parse story: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded story: {} knots, start at '{}'",
        graph.knots.len(),
        graph.start
    );

    let mut errors = graph.validate();
    let mut warnings = Vec::new();

    // Reachability only makes sense once the structure is sound.
    if errors.is_empty() {
        // The start knot is entered without a choice target, so the
        // attribution heuristic can never claim it; skip it.
        let queried: Vec<String> = graph
            .knot_names()
            .into_iter()
            .filter(|name| *name != graph.start)
            .collect();

        match validate_knot_reachability(&GraphEngine, &definition, &queried, &options) {
            Ok(report) => {
                println!(
                    "Reachability: {} attributed, {} unattributed",
                    report.reachable.len(),
                    report.unreachable.len()
                );
                for knot in &report.unreachable {
                    warnings.push(format!(
                        "knot '{}' was never reached on any discovered path",
                        knot
                    ));
                }
            }
            Err(e) => {
                errors.push(format!("exploration failed: {}", e));
            }
        }
    }

    println!("\n=== Story Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
