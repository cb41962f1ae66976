//! This module provides encoding functionality for converting an automaton
//! back into the specification text format understood by the parser.
//!
//! Format, one declaration per line:
//! - `Q = {..};` states in id order, `A = {..};` alphabet in sorted order,
//!   `I = ..;` initial state, `F = {..};` accepting states.
//! - One `(state, label) -> target;` line per transition row, states in id
//!   order and labels in sorted order with epsilon first.
//!
//! A DFA row is written with its bare single target, the nondeterministic
//! kinds always write a target set. Labels that the specification grammar
//! cannot spell, such as the composite `{p,q}` names minted by the subset
//! construction, force a wholesale renaming of the states to `q0..qN`.

use crate::analyzer::is_admissible_symbol;
use crate::types::{Automaton, Kind, Label, EPSILON_TOKEN};

/// Encodes an automaton as specification text that parses back to an
/// equivalent machine.
pub fn encode(automaton: &Automaton) -> String {
    let names = state_names(automaton);
    let mut lines = Vec::new();

    lines.push(format!("Q = {{{}}};", names.join(", ")));
    lines.push(format!(
        "A = {{{}}};",
        automaton
            .alphabet()
            .iter()
            .map(|&symbol| spell_symbol(symbol))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    lines.push(format!("I = {};", names[automaton.initial()]));
    lines.push(format!(
        "F = {{{}}};",
        automaton
            .accepting()
            .iter()
            .map(|&state| names[state].clone())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    for (state, transition) in automaton.transitions() {
        let targets = transition
            .targets
            .iter()
            .map(|&target| names[target].clone())
            .collect::<Vec<_>>();
        let target = match automaton.kind() {
            Kind::Dfa => targets.join(", "),
            _ => format!("{{{}}}", targets.join(", ")),
        };
        lines.push(format!(
            "({}, {}) -> {};",
            names[state],
            spell_label(transition.label),
            target
        ));
    }

    lines.join("\n") + "\n"
}

/// Picks the name under which each state is written.
///
/// Original labels are kept, quoted when they carry `_` or `-`. As soon as
/// one label falls outside the grammar's identifier charset, every state is
/// renamed to `q{id}` instead, since a partial renaming could collide with
/// a kept label.
fn state_names(automaton: &Automaton) -> Vec<String> {
    if automaton.states().iter().any(|label| !is_spellable(label)) {
        return (0..automaton.state_count())
            .map(|id| format!("q{id}"))
            .collect();
    }

    automaton
        .states()
        .iter()
        .map(|label| spell_state(label))
        .collect()
}

fn is_bare(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_spellable(label: &str) -> bool {
    !label.is_empty() && label.chars().all(is_admissible_symbol)
}

fn spell_state(label: &str) -> String {
    if is_bare(label) {
        label.to_string()
    } else {
        format!("'{label}'")
    }
}

fn spell_symbol(symbol: char) -> String {
    if symbol.is_ascii_alphanumeric() {
        symbol.to_string()
    } else {
        format!("'{symbol}'")
    }
}

fn spell_label(label: Label) -> String {
    match label {
        Label::Epsilon => EPSILON_TOKEN.to_string(),
        Label::Symbol(symbol) => spell_symbol(symbol),
    }
}
