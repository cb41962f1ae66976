//! This module provides the conversions between automaton kinds: epsilon
//! elimination (epsilon-NFA to NFA over the same state set) and the subset
//! construction (NFA to DFA with a total transition function). Each stage
//! checks the kind tag of its input and refuses automata it is not defined
//! for.

use crate::types::{Automaton, AutomatonError, Kind, Label, StateId, Transition};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Removes all epsilon transitions from an automaton, producing an NFA over
/// the same states, labels, and alphabet.
///
/// For every state `s` and symbol `a` the new target set is the epsilon
/// closure of everything reachable over `a` from the closure of `s`; `s` is
/// accepting in the result iff its closure intersects the accepting set.
/// The initial state is unchanged. Applying the elimination to an automaton
/// already free of epsilon transitions reproduces it, so the operation is
/// idempotent.
///
/// # Returns
///
/// * `Ok(Automaton)` tagged [`Kind::Nfa`].
/// * `Err(AutomatonError::Precondition)` when the input is a DFA.
pub fn eliminate_epsilon(automaton: &Automaton) -> Result<Automaton, AutomatonError> {
    match automaton.kind() {
        Kind::EpsilonNfa | Kind::Nfa => {}
        Kind::Dfa => {
            return Err(AutomatonError::Precondition(
                "Epsilon elimination applies to epsilon-NFAs and NFAs, not DFAs".to_string(),
            ));
        }
    }

    let closures: Vec<BTreeSet<StateId>> = (0..automaton.state_count())
        .map(|state| automaton.eps_closure(&BTreeSet::from([state])))
        .collect();

    let accepting: BTreeSet<StateId> = (0..automaton.state_count())
        .filter(|&state| {
            closures[state]
                .iter()
                .any(|&member| automaton.is_accepting(member))
        })
        .collect();

    let mut transitions: BTreeMap<StateId, Vec<Transition>> = BTreeMap::new();
    for state in 0..automaton.state_count() {
        let mut rows = Vec::new();
        for &symbol in automaton.alphabet() {
            let mut reachable = BTreeSet::new();
            for &member in &closures[state] {
                if let Some(targets) = automaton.delta(member, Label::Symbol(symbol)) {
                    reachable.extend(targets);
                }
            }
            if reachable.is_empty() {
                continue;
            }
            rows.push(Transition {
                label: Label::Symbol(symbol),
                targets: automaton.eps_closure(&reachable),
            });
        }
        if !rows.is_empty() {
            transitions.insert(state, rows);
        }
    }

    Ok(Automaton::from_parts(
        Kind::Nfa,
        automaton.states().to_vec(),
        automaton.alphabet().clone(),
        automaton.initial(),
        accepting,
        transitions,
    ))
}

/// Determinizes an NFA through the subset construction.
///
/// States of the result are sets of input states, discovered breadth-first
/// from `{initial}` with the alphabet visited in sorted order, so the state
/// numbering is reproducible. A composite state is labeled with the sorted
/// member labels in braces, e.g. `{p,q}`; the empty set becomes the explicit
/// dead sink `{}`, which loops to itself on every symbol. The resulting
/// transition function is total, and a composite state is accepting iff it
/// contains an accepting member.
///
/// # Returns
///
/// * `Ok(Automaton)` tagged [`Kind::Dfa`].
/// * `Err(AutomatonError::Precondition)` when the input still has epsilon
///   transitions or is already deterministic.
pub fn to_dfa(automaton: &Automaton) -> Result<Automaton, AutomatonError> {
    match automaton.kind() {
        Kind::Nfa => {}
        Kind::EpsilonNfa => {
            return Err(AutomatonError::Precondition(
                "Subset construction requires an NFA; eliminate epsilon transitions first"
                    .to_string(),
            ));
        }
        Kind::Dfa => {
            return Err(AutomatonError::Precondition(
                "Subset construction requires an NFA; the automaton is already deterministic"
                    .to_string(),
            ));
        }
    }

    // Member sets are kept sorted; insertion order doubles as the id order.
    let mut members: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut queue: VecDeque<(StateId, Vec<StateId>)> = VecDeque::new();
    let mut transitions: BTreeMap<StateId, Vec<Transition>> = BTreeMap::new();

    let initial_set = vec![automaton.initial()];
    members.insert(initial_set.clone(), 0);
    queue.push_back((0, initial_set));

    while let Some((id, member_set)) = queue.pop_front() {
        let mut rows = Vec::new();

        for &symbol in automaton.alphabet() {
            let mut successor = BTreeSet::new();
            for &state in &member_set {
                if let Some(targets) = automaton.delta(state, Label::Symbol(symbol)) {
                    successor.extend(targets);
                }
            }

            let successor: Vec<StateId> = successor.into_iter().collect();
            let target = match members.get(&successor) {
                Some(&existing) => existing,
                None => {
                    let fresh = members.len();
                    members.insert(successor.clone(), fresh);
                    queue.push_back((fresh, successor));
                    fresh
                }
            };

            rows.push(Transition {
                label: Label::Symbol(symbol),
                targets: BTreeSet::from([target]),
            });
        }

        if !rows.is_empty() {
            transitions.insert(id, rows);
        }
    }

    let mut states = Vec::with_capacity(members.len());
    let mut accepting = BTreeSet::new();
    for (index, member_set) in members.keys().enumerate() {
        states.push(composite_label(automaton, member_set));
        if member_set.iter().any(|&m| automaton.is_accepting(m)) {
            accepting.insert(index);
        }
    }

    Ok(Automaton::from_parts(
        Kind::Dfa,
        states,
        automaton.alphabet().clone(),
        0,
        accepting,
        transitions,
    ))
}

/// Runs whichever conversion stages the input still needs to become a DFA.
pub fn determinize(automaton: &Automaton) -> Result<Automaton, AutomatonError> {
    match automaton.kind() {
        Kind::EpsilonNfa => to_dfa(&eliminate_epsilon(automaton)?),
        Kind::Nfa => to_dfa(automaton),
        Kind::Dfa => Ok(automaton.clone()),
    }
}

/// Names a composite state after its members: sorted labels in braces.
fn composite_label(automaton: &Automaton, members: &[StateId]) -> String {
    let mut labels: Vec<&str> = members
        .iter()
        .map(|&member| automaton.state_label(member))
        .collect();
    labels.sort_unstable();
    format!("{{{}}}", labels.join(","))
}
