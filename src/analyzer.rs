//! This module provides semantic validation for automaton values, covering
//! the structural rules a well-formed automaton must satisfy: state ids in
//! range, symbols drawn from the alphabet, epsilon edges only where the kind
//! allows them, and determinism plus totality for DFAs.

use crate::types::{Automaton, AutomatonError, Kind, Label, StateId};
use std::collections::HashSet;

/// Represents the semantic violations that can be found in an automaton.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Indicates an automaton with an empty state table.
    NoStates,
    /// Indicates two states sharing the same display label.
    DuplicateStateLabel(String),
    /// Indicates an initial state id outside the state table.
    InvalidInitialState(StateId),
    /// Indicates an accepting state id outside the state table.
    InvalidAcceptingState(StateId),
    /// Indicates a transition whose source or target id is outside the
    /// state table.
    InvalidTransitionState(StateId),
    /// Indicates a transition consuming a symbol the alphabet does not
    /// declare.
    UndeclaredSymbol(char),
    /// Indicates an alphabet member outside the charset the specification
    /// syntax can express.
    InadmissibleSymbol(char),
    /// Indicates an epsilon transition on an automaton whose kind forbids
    /// them.
    UnexpectedEpsilon(Kind),
    /// Indicates a state with more than one target for a symbol in an
    /// automaton tagged as deterministic.
    NondeterministicState { state: String, symbol: char },
    /// Indicates a state missing a transition for an alphabet symbol in an
    /// automaton tagged as deterministic.
    MissingDfaTransition { state: String, symbol: char },
}

impl From<AnalysisError> for AutomatonError {
    /// Converts an `AnalysisError` into an `AutomatonError::SemanticError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoStates => {
                AutomatonError::SemanticError("Automaton has no states".to_string())
            }
            AnalysisError::DuplicateStateLabel(label) => {
                AutomatonError::SemanticError(format!("Duplicate state label: '{}'", label))
            }
            AnalysisError::InvalidInitialState(id) => AutomatonError::SemanticError(format!(
                "Initial state id {} is out of range",
                id
            )),
            AnalysisError::InvalidAcceptingState(id) => AutomatonError::SemanticError(format!(
                "Accepting state id {} is out of range",
                id
            )),
            AnalysisError::InvalidTransitionState(id) => AutomatonError::SemanticError(format!(
                "Transition references state id {} which is out of range",
                id
            )),
            AnalysisError::UndeclaredSymbol(symbol) => AutomatonError::SemanticError(format!(
                "Transition symbol {:?} is not in the alphabet",
                symbol
            )),
            AnalysisError::InadmissibleSymbol(symbol) => AutomatonError::SemanticError(format!(
                "Alphabet symbol {:?} cannot be written in the specification syntax",
                symbol
            )),
            AnalysisError::UnexpectedEpsilon(kind) => AutomatonError::SemanticError(format!(
                "Epsilon transition in an automaton tagged {}",
                kind
            )),
            AnalysisError::NondeterministicState { state, symbol } => {
                AutomatonError::SemanticError(format!(
                    "DFA state '{}' has multiple targets for symbol {:?}",
                    state, symbol
                ))
            }
            AnalysisError::MissingDfaTransition { state, symbol } => {
                AutomatonError::SemanticError(format!(
                    "DFA state '{}' has no transition for symbol {:?}",
                    state, symbol
                ))
            }
        }
    }
}

/// Checks whether a character may appear in an alphabet: the charset both
/// grammars can spell as a symbol literal.
pub(crate) fn is_admissible_symbol(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Analyzes an automaton for semantic violations.
///
/// This runs every structural check and reports the first violation found.
/// [`Automaton::new`] calls it on every hand-assembled automaton; conversion
/// outputs satisfy these rules by construction.
///
/// # Arguments
///
/// * `automaton` - A reference to the `Automaton` to be analyzed.
///
/// # Returns
///
/// * `Ok(())` if no violations are found.
/// * `Err(AutomatonError::SemanticError)` describing the first violation
///   otherwise.
pub fn analyze(automaton: &Automaton) -> Result<(), AutomatonError> {
    let errors = [
        check_states,
        check_initial,
        check_accepting,
        check_transition_states,
        check_labels,
        check_alphabet,
        check_determinism,
    ]
    .iter()
    .filter_map(|f| f(automaton).err())
    .collect::<Vec<_>>();

    if let Some(first_error) = errors.first() {
        return Err(first_error.clone().into());
    }

    Ok(())
}

/// Checks that the state table is non-empty and labels are unique.
fn check_states(automaton: &Automaton) -> Result<(), AnalysisError> {
    if automaton.state_count() == 0 {
        return Err(AnalysisError::NoStates);
    }

    let mut seen = HashSet::new();
    for label in automaton.states() {
        if !seen.insert(label) {
            return Err(AnalysisError::DuplicateStateLabel(label.clone()));
        }
    }

    Ok(())
}

/// Checks that the initial state id indexes the state table.
fn check_initial(automaton: &Automaton) -> Result<(), AnalysisError> {
    if automaton.initial() >= automaton.state_count() {
        return Err(AnalysisError::InvalidInitialState(automaton.initial()));
    }

    Ok(())
}

/// Checks that every accepting state id indexes the state table.
fn check_accepting(automaton: &Automaton) -> Result<(), AnalysisError> {
    for &id in automaton.accepting() {
        if id >= automaton.state_count() {
            return Err(AnalysisError::InvalidAcceptingState(id));
        }
    }

    Ok(())
}

/// Checks that every transition source and target indexes the state table.
fn check_transition_states(automaton: &Automaton) -> Result<(), AnalysisError> {
    let count = automaton.state_count();

    for (source, transition) in automaton.transitions() {
        if source >= count {
            return Err(AnalysisError::InvalidTransitionState(source));
        }
        for &target in &transition.targets {
            if target >= count {
                return Err(AnalysisError::InvalidTransitionState(target));
            }
        }
    }

    Ok(())
}

/// Checks that symbol labels are declared in the alphabet and epsilon labels
/// appear only on automata tagged [`Kind::EpsilonNfa`].
fn check_labels(automaton: &Automaton) -> Result<(), AnalysisError> {
    for (_, transition) in automaton.transitions() {
        match transition.label {
            Label::Symbol(symbol) => {
                if !automaton.alphabet().contains(&symbol) {
                    return Err(AnalysisError::UndeclaredSymbol(symbol));
                }
            }
            Label::Epsilon => {
                if automaton.kind() != Kind::EpsilonNfa {
                    return Err(AnalysisError::UnexpectedEpsilon(automaton.kind()));
                }
            }
        }
    }

    Ok(())
}

/// Checks that every alphabet member can be spelled by the specification
/// syntax, so any valid automaton can be rendered back to text.
fn check_alphabet(automaton: &Automaton) -> Result<(), AnalysisError> {
    for &symbol in automaton.alphabet() {
        if !is_admissible_symbol(symbol) {
            return Err(AnalysisError::InadmissibleSymbol(symbol));
        }
    }

    Ok(())
}

/// Checks that an automaton tagged [`Kind::Dfa`] is deterministic and total:
/// exactly one target per (state, symbol) pair over the whole alphabet.
fn check_determinism(automaton: &Automaton) -> Result<(), AnalysisError> {
    if automaton.kind() != Kind::Dfa {
        return Ok(());
    }

    for state in 0..automaton.state_count() {
        for &symbol in automaton.alphabet() {
            match automaton.delta(state, Label::Symbol(symbol)) {
                None => {
                    return Err(AnalysisError::MissingDfaTransition {
                        state: automaton.state_label(state).to_string(),
                        symbol,
                    });
                }
                Some(targets) if targets.len() != 1 => {
                    return Err(AnalysisError::NondeterministicState {
                        state: automaton.state_label(state).to_string(),
                        symbol,
                    });
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}
