/// Explore — enumerates the execution paths of a compiled story graph.
///
/// Usage: explore --story <path.ron> [--max-depth <n>] [--max-paths <n>]
///                [--hash-limit <n>] [--content] [--find <knot>]
///
/// Without --find, runs exhaustive path discovery and prints every path
/// with its end reason plus the stats block. With --find, searches for the
/// shortest path to the named knot instead.

use story_explorer::core::engine::GraphEngine;
use story_explorer::core::explorer::{discover_all_paths, ExploreOptions};
use story_explorer::core::search::find_path_to_knot;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut story_path = None;
    let mut find_target = None;
    let mut options = ExploreOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--story" if i + 1 < args.len() => {
                i += 1;
                story_path = Some(args[i].clone());
            }
            "--find" if i + 1 < args.len() => {
                i += 1;
                find_target = Some(args[i].clone());
            }
            "--max-depth" if i + 1 < args.len() => {
                i += 1;
                options.max_depth = args[i].parse().unwrap_or(options.max_depth);
            }
            "--max-paths" if i + 1 < args.len() => {
                i += 1;
                options.max_paths = args[i].parse().unwrap_or(options.max_paths);
            }
            "--hash-limit" if i + 1 < args.len() => {
                i += 1;
                options.state_hash_limit = args[i].parse().unwrap_or(options.state_hash_limit);
            }
            "--content" => {
                options.track_content = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let story_path = match story_path {
        Some(p) => p,
        None => {
            eprintln!("ERROR: --story is required");
            print_usage();
            process::exit(1);
        }
    };

    let definition = match std::fs::read_to_string(&story_path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("ERROR: failed to read '{}': {}", story_path, e);
            process::exit(1);
        }
    };

    if let Some(target) = find_target {
        run_search(&definition, &target, &options);
        return;
    }

    match discover_all_paths(&GraphEngine, &definition, &options) {
        Ok(result) => {
            println!("Total paths: {}", result.stats.total_paths);
            println!("Completed paths: {}", result.stats.completed_paths);
            println!("Loops detected: {}", result.stats.loops_detected);
            println!("Faulted paths: {}", result.stats.faulted_paths);
            println!("Max depth reached: {}", result.stats.max_depth_reached);

            println!("\nPaths:");
            for (i, path) in result.paths.iter().enumerate() {
                println!(
                    "  {}: choices=[{}], reason={}, completed={}",
                    i,
                    path.choices.join(", "),
                    path.end_reason,
                    path.completed
                );
                for line in &path.content {
                    println!("      | {}", line);
                }
            }
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }
}

fn run_search(definition: &str, target: &str, options: &ExploreOptions) {
    match find_path_to_knot(&GraphEngine, definition, target, options) {
        Ok(Some(path)) => {
            println!("Found path to '{}' in {} choice(s):", target, path.choices.len());
            for (i, choice) in path.choices.iter().enumerate() {
                println!("  {}. {}", i + 1, choice);
            }
            if !path.content.is_empty() {
                println!("\nContent along the path:");
                for line in &path.content {
                    println!("  | {}", line);
                }
            }
            println!("\nCompleted: {}", path.completed);
        }
        Ok(None) => {
            println!("No path to '{}' within the search budget", target);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Usage: explore --story <path.ron> [--max-depth <n>] [--max-paths <n>]");
    println!("               [--hash-limit <n>] [--content] [--find <knot>]");
}
