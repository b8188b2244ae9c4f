/// Compiled story graph definition — types, RON loading, static validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A mutation applied to an integer story variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarOp {
    /// Set the variable, defining it if absent.
    Set(String, i64),
    /// Add to an already-defined variable. Faults at runtime if undefined.
    Add(String, i64),
}

/// A guard on a choice, evaluated against the variable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    AtLeast(String, i64),
    LessThan(String, i64),
    Equals(String, i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub text: String,
    /// Name of the knot this choice diverts to.
    pub target: String,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub effects: Vec<VarOp>,
    /// Once-only choices disappear after being taken, like `*` choices in
    /// ink scripts; the default is sticky.
    #[serde(default)]
    pub once: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knot {
    /// Text fragments emitted one `advance` at a time.
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub on_enter: Vec<VarOp>,
    /// Offered after `lines` is exhausted, filtered by condition.
    #[serde(default)]
    pub choices: Vec<ChoiceDef>,
    /// Followed when no choice is offered; `None` ends the story.
    #[serde(default)]
    pub divert: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryGraph {
    pub start: String,
    pub knots: HashMap<String, Knot>,
}

impl StoryGraph {
    /// Load a story graph from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<StoryGraph, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a story graph from a RON string.
    pub fn parse_ron(input: &str) -> Result<StoryGraph, StoryError> {
        Ok(ron::from_str(input)?)
    }

    /// Static structural checks: dangling targets and a missing start knot.
    /// Returns human-readable issue descriptions.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.knots.is_empty() {
            issues.push("story has no knots".to_string());
        }
        if !self.knots.contains_key(&self.start) {
            issues.push(format!("start knot '{}' is not defined", self.start));
        }

        let mut names: Vec<&String> = self.knots.keys().collect();
        names.sort();
        for name in names {
            let knot = &self.knots[name];
            for choice in &knot.choices {
                if !self.knots.contains_key(&choice.target) {
                    issues.push(format!(
                        "knot '{}': choice '{}' targets undefined knot '{}'",
                        name, choice.text, choice.target
                    ));
                }
            }
            if let Some(ref target) = knot.divert {
                if !self.knots.contains_key(target) {
                    issues.push(format!(
                        "knot '{}': divert targets undefined knot '{}'",
                        name, target
                    ));
                }
            }
        }

        issues
    }

    /// All declared knot names, sorted for deterministic reports.
    pub fn knot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.knots.keys().cloned().collect();
        names.sort();
        names
    }
}
