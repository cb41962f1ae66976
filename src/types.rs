//! This module defines the core data structures and types used throughout the
//! finite-automaton engine, including the automaton representation, transition
//! labels, kind tags, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::analyzer;
use crate::{RegexRule, SpecRule};

/// The textual spelling of the epsilon label in specifications and regexes.
pub const EPSILON_TOKEN: &str = "''";
/// The maximum allowed size for a specification file in bytes.
pub const MAX_SPEC_SIZE: usize = 65536; // 64KB

/// Identifies a state by its index into the automaton's state table.
pub type StateId = usize;

/// The label attached to a transition edge.
///
/// `Epsilon` edges consume no input and are only legal on automata tagged
/// [`Kind::EpsilonNfa`]; `Symbol` edges consume exactly one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    /// A transition taken without consuming input.
    Epsilon,
    /// A transition consuming a single input character.
    Symbol(char),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "{}", EPSILON_TOKEN),
            Label::Symbol(c) => write!(f, "{}", c),
        }
    }
}

/// The kind of an automaton, assigned at construction and carried immutably.
///
/// Conversions consult this tag to enforce their preconditions: the epsilon
/// eliminator accepts `EpsilonNfa` and `Nfa`, the subset constructor accepts
/// `Nfa` only, and the simulator accepts any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// Nondeterministic automaton that may contain epsilon transitions.
    EpsilonNfa,
    /// Nondeterministic automaton without epsilon transitions.
    Nfa,
    /// Deterministic automaton: exactly one target per (state, symbol).
    Dfa,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::EpsilonNfa => "epsilon-NFA",
            Kind::Nfa => "NFA",
            Kind::Dfa => "DFA",
        };
        write!(f, "{}", name)
    }
}

/// A single outgoing transition row: one label mapping to a set of targets.
///
/// Rows are stored in canonical form, at most one row per (state, label) with
/// a non-empty target set, so a nondeterministic fan-out is always a single
/// `Transition` with several targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The label consumed (or skipped, for epsilon) when taking this edge.
    pub label: Label,
    /// The states reachable over this edge.
    pub targets: BTreeSet<StateId>,
}

/// Represents a finite automaton of any [`Kind`].
///
/// States live in an arena: a state is identified by its `StateId` index into
/// the label table, and all structural data refers to states by index. The
/// value is immutable after construction; conversions return fresh automata
/// and never mutate their input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    kind: Kind,
    states: Vec<String>,
    alphabet: BTreeSet<char>,
    initial: StateId,
    accepting: BTreeSet<StateId>,
    transitions: BTreeMap<StateId, Vec<Transition>>,
}

impl Automaton {
    /// Builds an automaton and validates it with [`analyzer::analyze`].
    ///
    /// Transition rows are normalized first: rows sharing a label are merged
    /// into one target set and rows with no targets are dropped.
    ///
    /// # Arguments
    ///
    /// * `kind` - the kind tag the automaton claims; validation rejects
    ///   structures that do not match it (e.g. epsilon edges on an `Nfa`).
    /// * `states` - display labels, indexed by `StateId`.
    /// * `alphabet` - the input alphabet.
    /// * `initial` - the initial state id.
    /// * `accepting` - the accepting state ids.
    /// * `transitions` - outgoing rows per state id.
    pub fn new(
        kind: Kind,
        states: Vec<String>,
        alphabet: BTreeSet<char>,
        initial: StateId,
        accepting: BTreeSet<StateId>,
        transitions: BTreeMap<StateId, Vec<Transition>>,
    ) -> Result<Self, AutomatonError> {
        let automaton = Self::from_parts(kind, states, alphabet, initial, accepting, transitions);
        analyzer::analyze(&automaton)?;
        Ok(automaton)
    }

    /// Builds an automaton without validation, for construction sites whose
    /// output is correct by construction (the converters and the compiler).
    pub(crate) fn from_parts(
        kind: Kind,
        states: Vec<String>,
        alphabet: BTreeSet<char>,
        initial: StateId,
        accepting: BTreeSet<StateId>,
        transitions: BTreeMap<StateId, Vec<Transition>>,
    ) -> Self {
        Self {
            kind,
            states,
            alphabet,
            initial,
            accepting,
            transitions: normalize(transitions),
        }
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the state labels, indexed by `StateId`.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Returns the number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the display label of a state.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a valid id for this automaton.
    pub fn state_label(&self, state: StateId) -> &str {
        &self.states[state]
    }

    /// Looks up a state id by its display label.
    pub fn find_state(&self, label: &str) -> Option<StateId> {
        self.states.iter().position(|s| s == label)
    }

    /// Returns the input alphabet.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Returns the initial state id.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Returns the accepting state ids.
    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Checks whether a state is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    /// Returns the outgoing transition rows of a state, sorted by label.
    pub fn transitions_from(&self, state: StateId) -> &[Transition] {
        self.transitions
            .get(&state)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates over every transition row together with its source state.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Transition)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&state, rows)| rows.iter().map(move |t| (state, t)))
    }

    /// Returns the target set of the transition from `state` over `label`,
    /// or `None` when no such transition exists.
    pub fn delta(&self, state: StateId, label: Label) -> Option<&BTreeSet<StateId>> {
        self.transitions_from(state)
            .iter()
            .find(|t| t.label == label)
            .map(|t| &t.targets)
    }

    /// Computes the epsilon closure of a state set: every state reachable
    /// from a member over epsilon edges alone, including the members.
    ///
    /// On automata without epsilon edges this is the identity.
    pub fn eps_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().copied().collect();

        while let Some(state) = stack.pop() {
            if let Some(targets) = self.delta(state, Label::Epsilon) {
                for &target in targets {
                    if closure.insert(target) {
                        stack.push(target);
                    }
                }
            }
        }

        closure
    }
}

/// Merges rows sharing a label, drops empty target sets, and orders each
/// state's rows by label.
fn normalize(
    transitions: BTreeMap<StateId, Vec<Transition>>,
) -> BTreeMap<StateId, Vec<Transition>> {
    let mut normalized = BTreeMap::new();

    for (state, rows) in transitions {
        let mut merged: BTreeMap<Label, BTreeSet<StateId>> = BTreeMap::new();
        for row in rows {
            if row.targets.is_empty() {
                continue;
            }
            merged.entry(row.label).or_default().extend(row.targets);
        }
        if merged.is_empty() {
            continue;
        }
        let rows = merged
            .into_iter()
            .map(|(label, targets)| Transition { label, targets })
            .collect();
        normalized.insert(state, rows);
    }

    normalized
}

/// Represents the errors that can occur while parsing, validating,
/// converting, or simulating automata.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomatonError {
    /// Indicates a syntax error in a regular expression.
    #[error("Regex parsing error: {0}")]
    RegexParseError(#[from] Box<pest::error::Error<RegexRule>>),
    /// Indicates a syntax error in an automaton specification.
    #[error("Specification parsing error: {0}")]
    SpecParseError(#[from] Box<pest::error::Error<SpecRule>>),
    /// Indicates a structurally valid input that violates a semantic rule,
    /// such as an undeclared state or a duplicated section.
    #[error("Semantic error: {0}")]
    SemanticError(String),
    /// Indicates a conversion applied to an automaton kind it is not
    /// defined for.
    #[error("Conversion precondition violated: {0}")]
    Precondition(String),
    /// Indicates a simulated word containing a character outside the
    /// automaton's alphabet.
    #[error("Input symbol {0:?} is not in the alphabet")]
    InputSymbol(char),
    /// Indicates an error related to file system operations while loading
    /// specification files.
    #[error("File error: {0}")]
    FileError(String),
}
