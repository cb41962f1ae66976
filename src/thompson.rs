//! This module compiles regular expression trees into epsilon-NFAs using the
//! Thompson construction. Every sub-expression becomes a fragment with one
//! start and one accept state, and fragments compose through epsilon edges
//! alone, so the resulting automaton has exactly one accepting state.

use crate::regex::Regex;
use crate::types::{Automaton, AutomatonError, Kind, Label, StateId, Transition};
use std::collections::{BTreeMap, BTreeSet};

/// A compiled sub-expression: its entry and its single exit state.
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Compiles a regex tree into an epsilon-NFA over the alphabet of symbols
/// the expression mentions.
///
/// The construction is infallible: state ids are handed out from an arena
/// and every edge it draws is valid by construction.
pub fn compile(regex: &Regex) -> Automaton {
    build_automaton(regex, regex.symbols())
}

/// Compiles a regex tree into an epsilon-NFA over a declared alphabet.
///
/// The declared alphabet may be a superset of the symbols the expression
/// uses; that only widens the alphabet of the result. A symbol used by the
/// expression but missing from the alphabet is a semantic error.
pub fn compile_over(
    regex: &Regex,
    alphabet: &BTreeSet<char>,
) -> Result<Automaton, AutomatonError> {
    if let Some(&symbol) = regex.symbols().iter().find(|s| !alphabet.contains(s)) {
        return Err(AutomatonError::SemanticError(format!(
            "Regex symbol '{symbol}' is not in the declared alphabet"
        )));
    }

    Ok(build_automaton(regex, alphabet.clone()))
}

fn build_automaton(regex: &Regex, alphabet: BTreeSet<char>) -> Automaton {
    let mut builder = Builder::default();
    let fragment = builder.build(regex);

    Automaton::from_parts(
        Kind::EpsilonNfa,
        builder.states,
        alphabet,
        fragment.start,
        BTreeSet::from([fragment.accept]),
        builder.transitions,
    )
}

/// Arena-style state allocator and edge collector for the construction.
#[derive(Default)]
struct Builder {
    states: Vec<String>,
    transitions: BTreeMap<StateId, Vec<Transition>>,
}

impl Builder {
    /// Allocates a fresh state named after its arena index.
    fn fresh(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(format!("s{id}"));
        id
    }

    /// Draws an edge, merging into an existing row when the label repeats.
    fn link(&mut self, from: StateId, label: Label, to: StateId) {
        let rows = self.transitions.entry(from).or_default();
        if let Some(row) = rows.iter_mut().find(|t| t.label == label) {
            row.targets.insert(to);
        } else {
            rows.push(Transition {
                label,
                targets: BTreeSet::from([to]),
            });
        }
    }

    /// Builds the fragment for a sub-expression:
    ///
    /// - `''` and a symbol become two states joined by one edge;
    /// - concatenation joins the left exit to the right entry over epsilon;
    /// - union adds a fresh entry/exit pair branching into both sides;
    /// - star adds a fresh entry/exit pair with a skip edge and a repeat
    ///   edge back to the body's entry.
    fn build(&mut self, regex: &Regex) -> Fragment {
        match regex {
            Regex::Epsilon => self.leaf(Label::Epsilon),
            Regex::Symbol(c) => self.leaf(Label::Symbol(*c)),
            Regex::Concat(lhs, rhs) => {
                let left = self.build(lhs);
                let right = self.build(rhs);
                self.link(left.accept, Label::Epsilon, right.start);
                Fragment {
                    start: left.start,
                    accept: right.accept,
                }
            }
            Regex::Union(lhs, rhs) => {
                let left = self.build(lhs);
                let right = self.build(rhs);
                let start = self.fresh();
                let accept = self.fresh();
                self.link(start, Label::Epsilon, left.start);
                self.link(start, Label::Epsilon, right.start);
                self.link(left.accept, Label::Epsilon, accept);
                self.link(right.accept, Label::Epsilon, accept);
                Fragment { start, accept }
            }
            Regex::Star(inner) => {
                let body = self.build(inner);
                let start = self.fresh();
                let accept = self.fresh();
                self.link(start, Label::Epsilon, body.start);
                self.link(start, Label::Epsilon, accept);
                self.link(body.accept, Label::Epsilon, body.start);
                self.link(body.accept, Label::Epsilon, accept);
                Fragment { start, accept }
            }
        }
    }

    fn leaf(&mut self, label: Label) -> Fragment {
        let start = self.fresh();
        let accept = self.fresh();
        self.link(start, label, accept);
        Fragment { start, accept }
    }
}
