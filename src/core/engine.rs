/// Built-in graph engine — a `StorySession` interpreter over
/// `schema::story::StoryGraph` definitions.
///
/// Emits knot lines one `advance` at a time; when a knot's lines run out it
/// offers the choices whose conditions hold, otherwise follows the knot's
/// divert, otherwise ends. Snapshots serialize the full session state as RON.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::session::{Choice, SessionError, StateSnapshot, StoryEngine, StorySession};
use crate::schema::story::{Condition, StoryGraph, VarOp};

/// Divert hops followed without emitting a line before the session faults.
const MAX_DIVERT_HOPS: usize = 64;

pub struct GraphEngine;

impl StoryEngine for GraphEngine {
    type Session = GraphSession;

    fn open(&self, definition: &str) -> Result<GraphSession, SessionError> {
        let graph = StoryGraph::parse_ron(definition)
            .map_err(|e| SessionError::MalformedStory(e.to_string()))?;
        GraphSession::new(graph)
    }
}

/// Serialized per-session state. `vars` and `taken` use ordered maps so
/// equal states serialize identically — snapshot fingerprints depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionState {
    knot: String,
    line: usize,
    vars: BTreeMap<String, i64>,
    taken: BTreeSet<String>,
    offered: Vec<OfferedChoice>,
    ended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OfferedChoice {
    /// Index into the knot's declared choice list.
    def: usize,
    text: String,
    target: String,
}

pub struct GraphSession {
    graph: StoryGraph,
    state: SessionState,
}

impl GraphSession {
    fn new(graph: StoryGraph) -> Result<GraphSession, SessionError> {
        if !graph.knots.contains_key(&graph.start) {
            return Err(SessionError::MalformedStory(format!(
                "start knot '{}' is not defined",
                graph.start
            )));
        }
        let start = graph.start.clone();
        let mut session = GraphSession {
            graph,
            state: SessionState {
                knot: start.clone(),
                line: 0,
                vars: BTreeMap::new(),
                taken: BTreeSet::new(),
                offered: Vec::new(),
                ended: false,
            },
        };
        session.enter(&start)?;
        session.settle()?;
        Ok(session)
    }

    fn current_lines_len(&self) -> usize {
        self.graph.knots[&self.state.knot].lines.len()
    }

    /// Move into a knot: reset the line cursor and apply its entry ops.
    fn enter(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.graph.knots.contains_key(name) {
            return Err(SessionError::UnknownKnot(name.to_string()));
        }
        self.state.knot = name.to_string();
        self.state.line = 0;
        self.state.offered.clear();
        let ops = self.graph.knots[name].on_enter.clone();
        for op in &ops {
            self.apply_op(op)?;
        }
        Ok(())
    }

    fn apply_op(&mut self, op: &VarOp) -> Result<(), SessionError> {
        match op {
            VarOp::Set(name, value) => {
                self.state.vars.insert(name.clone(), *value);
            }
            VarOp::Add(name, delta) => {
                let slot = self
                    .state
                    .vars
                    .get_mut(name)
                    .ok_or_else(|| SessionError::UndefinedVariable(name.clone()))?;
                *slot += *delta;
            }
        }
        Ok(())
    }

    fn eval(&self, condition: &Condition) -> Result<bool, SessionError> {
        let read = |name: &String| {
            self.state
                .vars
                .get(name)
                .copied()
                .ok_or_else(|| SessionError::UndefinedVariable(name.clone()))
        };
        Ok(match condition {
            Condition::AtLeast(name, n) => read(name)? >= *n,
            Condition::LessThan(name, n) => read(name)? < *n,
            Condition::Equals(name, n) => read(name)? == *n,
        })
    }

    /// Follow diverts until content is pending, choices are offered, or the
    /// story ends.
    fn settle(&mut self) -> Result<(), SessionError> {
        let mut hops = 0usize;
        loop {
            if self.state.ended || self.state.line < self.current_lines_len() {
                return Ok(());
            }

            let knot = self.graph.knots[&self.state.knot].clone();
            let mut offered = Vec::new();
            for (i, def) in knot.choices.iter().enumerate() {
                if def.once && self.state.taken.contains(&taken_key(&self.state.knot, i)) {
                    continue;
                }
                let open = match &def.condition {
                    Some(condition) => self.eval(condition)?,
                    None => true,
                };
                if open {
                    offered.push(OfferedChoice {
                        def: i,
                        text: def.text.clone(),
                        target: def.target.clone(),
                    });
                }
            }
            if !offered.is_empty() {
                self.state.offered = offered;
                return Ok(());
            }

            match knot.divert {
                Some(ref target) => {
                    hops += 1;
                    if hops > MAX_DIVERT_HOPS {
                        return Err(SessionError::DivertOverflow(MAX_DIVERT_HOPS));
                    }
                    self.enter(target)?;
                }
                None => {
                    self.state.ended = true;
                    return Ok(());
                }
            }
        }
    }
}

fn taken_key(knot: &str, index: usize) -> String {
    format!("{}#{}", knot, index)
}

impl StorySession for GraphSession {
    fn advance(&mut self) -> Result<String, SessionError> {
        if self.state.ended || self.state.line >= self.current_lines_len() {
            return Err(SessionError::NoPendingContent);
        }
        let text = self.graph.knots[&self.state.knot].lines[self.state.line].clone();
        self.state.line += 1;
        self.settle()?;
        Ok(text)
    }

    fn has_more_content(&self) -> bool {
        !self.state.ended && self.state.line < self.current_lines_len()
    }

    fn current_choices(&self) -> Vec<Choice> {
        self.state
            .offered
            .iter()
            .map(|c| Choice {
                text: c.text.clone(),
                target: Some(c.target.clone()),
            })
            .collect()
    }

    fn choose(&mut self, index: usize) -> Result<(), SessionError> {
        let offered = match self.state.offered.get(index) {
            Some(c) => c.clone(),
            None => {
                return Err(SessionError::ChoiceOutOfRange {
                    index,
                    count: self.state.offered.len(),
                })
            }
        };
        let def = self.graph.knots[&self.state.knot].choices[offered.def].clone();
        if def.once {
            self.state
                .taken
                .insert(taken_key(&self.state.knot, offered.def));
        }
        for op in &def.effects {
            self.apply_op(op)?;
        }
        self.enter(&def.target)?;
        self.settle()
    }

    fn save_state(&self) -> Result<StateSnapshot, SessionError> {
        let raw = ron::to_string(&self.state)
            .map_err(|e| SessionError::CorruptSnapshot(e.to_string()))?;
        Ok(StateSnapshot::new(raw))
    }

    fn restore_state(&mut self, snapshot: &StateSnapshot) -> Result<(), SessionError> {
        let state: SessionState = ron::from_str(snapshot.raw())
            .map_err(|e| SessionError::CorruptSnapshot(e.to_string()))?;
        self.state = state;
        Ok(())
    }

    fn is_at_terminal(&self) -> bool {
        self.state.ended
    }
}
