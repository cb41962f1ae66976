//! Word simulation for every automaton kind.
//!
//! [`accepts`] answers the membership question in one call. [`Run`] exposes
//! the same walk one symbol at a time, which the command line platform uses
//! to trace the visited state sets.

use crate::types::{Automaton, AutomatonError, Kind, Label, StateId};
use std::collections::BTreeSet;

/// Decides whether `automaton` accepts `word`.
///
/// Every character of the word is checked against the alphabet before the
/// walk starts; the first foreign character aborts with
/// [`AutomatonError::InputSymbol`] regardless of where the walk would have
/// ended up.
///
/// A DFA is walked along its single path, rejecting defensively if a
/// transition row turns out to be missing. The nondeterministic kinds
/// advance the set of reachable states per symbol and reject early once the
/// set drains empty. The empty word is accepted iff the initial state, or
/// its epsilon closure, is accepting.
pub fn accepts(automaton: &Automaton, word: &str) -> Result<bool, AutomatonError> {
    for symbol in word.chars() {
        if !automaton.alphabet().contains(&symbol) {
            return Err(AutomatonError::InputSymbol(symbol));
        }
    }

    if automaton.kind() == Kind::Dfa {
        let mut current = automaton.initial();
        for symbol in word.chars() {
            let next = automaton
                .delta(current, Label::Symbol(symbol))
                .and_then(|targets| targets.iter().next());
            match next {
                Some(&target) => current = target,
                None => return Ok(false),
            }
        }
        return Ok(automaton.is_accepting(current));
    }

    let mut run = Run::new(automaton);
    for symbol in word.chars() {
        run.step(symbol)?;
        if run.is_stuck() {
            return Ok(false);
        }
    }
    Ok(run.is_accepting())
}

/// A stepwise walk over an automaton, tracking the set of reachable states.
///
/// The walk starts at the epsilon closure of the initial state, which is the
/// initial state alone for kinds without epsilon transitions. Stepping a DFA
/// keeps the set a singleton, so one run type serves every kind.
#[derive(Debug)]
pub struct Run<'a> {
    automaton: &'a Automaton,
    current: BTreeSet<StateId>,
    steps: usize,
}

impl<'a> Run<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        let current = automaton.eps_closure(&BTreeSet::from([automaton.initial()]));
        Run {
            automaton,
            current,
            steps: 0,
        }
    }

    /// Consumes one input symbol and returns the new state set.
    ///
    /// A symbol outside the alphabet fails with
    /// [`AutomatonError::InputSymbol`] and leaves the run untouched.
    pub fn step(&mut self, symbol: char) -> Result<&BTreeSet<StateId>, AutomatonError> {
        if !self.automaton.alphabet().contains(&symbol) {
            return Err(AutomatonError::InputSymbol(symbol));
        }

        let mut next = BTreeSet::new();
        for &state in &self.current {
            if let Some(targets) = self.automaton.delta(state, Label::Symbol(symbol)) {
                next.extend(targets);
            }
        }

        self.current = self.automaton.eps_closure(&next);
        self.steps += 1;
        Ok(&self.current)
    }

    /// States reachable after the symbols consumed so far.
    pub fn current_states(&self) -> &BTreeSet<StateId> {
        &self.current
    }

    /// True when at least one reachable state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.current
            .iter()
            .any(|&state| self.automaton.is_accepting(state))
    }

    /// True when no state is reachable anymore; no suffix can be accepted.
    pub fn is_stuck(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of symbols consumed since construction or the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Rewinds the run to the initial state set.
    pub fn reset(&mut self) {
        self.current = self
            .automaton
            .eps_closure(&BTreeSet::from([self.automaton.initial()]));
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::types::Transition;
    use std::collections::BTreeMap;

    fn cycle_dfa() -> Automaton {
        parser::parse_spec(
            r#"
Q = {p, q, r};
A = {0, 1};
I = p;
F = {p};
(p, 0) -> q;
(p, 1) -> r;
(q, 0) -> r;
(q, 1) -> p;
(r, 0) -> p;
(r, 1) -> q;
"#,
        )
        .unwrap()
    }

    fn toggle_dfa() -> Automaton {
        parser::parse_spec(
            r#"
Q = {p, q, r};
A = {0, 1};
I = p;
F = {p};
(p, 0) -> p;
(p, 1) -> q;
(q, 0) -> r;
(q, 1) -> p;
(r, 0) -> q;
(r, 1) -> r;
"#,
        )
        .unwrap()
    }

    fn ends_with_one_nfa() -> Automaton {
        parser::parse_spec(
            r#"
Q = {p, q};
A = {0, 1};
I = p;
F = {q};
(p, 0) -> {p};
(p, 1) -> {p, q};
"#,
        )
        .unwrap()
    }

    fn epsilon_loop_enfa() -> Automaton {
        parser::parse_spec(
            r#"
Q = {i, q, f};
A = {0, 1};
I = i;
F = {f};
(i, 1) -> {q, f};
(q, 0) -> {q};
(q, 1) -> {f};
(f, '') -> {i};
"#,
        )
        .unwrap()
    }

    fn parity_enfa() -> Automaton {
        parser::parse_spec(
            r#"
Q = {s0, s1, s2, s3, s4};
A = {0, 1};
I = s0;
F = {s1, s3};
(s0, '') -> {s1, s3};
(s1, 1) -> {s1};
(s1, 0) -> {s2};
(s2, 1) -> {s2};
(s2, 0) -> {s1};
(s3, 0) -> {s3};
(s3, 1) -> {s4};
(s4, 0) -> {s4};
(s4, 1) -> {s3};
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_accepts_dfa_cycle() {
        let dfa = cycle_dfa();
        assert_eq!(dfa.kind(), Kind::Dfa);

        for word in ["", "01", "0110"] {
            assert!(accepts(&dfa, word).unwrap(), "expected {word:?} accepted");
        }
        for word in ["0", "1", "011"] {
            assert!(!accepts(&dfa, word).unwrap(), "expected {word:?} rejected");
        }
    }

    #[test]
    fn test_accepts_dfa_longer_walk() {
        let dfa = toggle_dfa();

        for word in ["", "0", "110110110"] {
            assert!(accepts(&dfa, word).unwrap(), "expected {word:?} accepted");
        }
        for word in ["111", "10"] {
            assert!(!accepts(&dfa, word).unwrap(), "expected {word:?} rejected");
        }
    }

    #[test]
    fn test_accepts_nfa_ends_with_one() {
        let nfa = ends_with_one_nfa();
        assert_eq!(nfa.kind(), Kind::Nfa);

        for word in ["1", "011010101011"] {
            assert!(accepts(&nfa, word).unwrap(), "expected {word:?} accepted");
        }
        for word in ["", "10", "000000"] {
            assert!(!accepts(&nfa, word).unwrap(), "expected {word:?} rejected");
        }
    }

    #[test]
    fn test_accepts_epsilon_nfa_loop() {
        let enfa = epsilon_loop_enfa();
        assert_eq!(enfa.kind(), Kind::EpsilonNfa);

        for word in ["1", "11", "101", "101101"] {
            assert!(accepts(&enfa, word).unwrap(), "expected {word:?} accepted");
        }
        for word in ["", "10", "01", "1000"] {
            assert!(!accepts(&enfa, word).unwrap(), "expected {word:?} rejected");
        }
    }

    #[test]
    fn test_accepts_epsilon_nfa_parity() {
        let enfa = parity_enfa();

        // even number of zeros or even number of ones
        for word in ["", "0", "1", "00", "10101"] {
            assert!(accepts(&enfa, word).unwrap(), "expected {word:?} accepted");
        }
        for word in ["10", "01", "0111"] {
            assert!(!accepts(&enfa, word).unwrap(), "expected {word:?} rejected");
        }
    }

    #[test]
    fn test_accepts_empty_word_through_epsilon_closure() {
        let enfa = parser::parse_spec(
            r#"
Q = {a, b};
A = {0};
I = a;
F = {b};
(a, '') -> {b};
"#,
        )
        .unwrap();

        assert!(accepts(&enfa, "").unwrap());
        assert!(!accepts(&enfa, "0").unwrap());
    }

    #[test]
    fn test_accepts_rejects_symbol_outside_alphabet() {
        for automaton in [cycle_dfa(), ends_with_one_nfa(), epsilon_loop_enfa()] {
            assert_eq!(
                accepts(&automaton, "12").unwrap_err(),
                AutomatonError::InputSymbol('2')
            );
            assert_eq!(
                accepts(&automaton, "201").unwrap_err(),
                AutomatonError::InputSymbol('2')
            );
        }
    }

    #[test]
    fn test_accepts_defensive_on_missing_dfa_row() {
        let automaton = Automaton::from_parts(
            Kind::Dfa,
            vec!["a".to_string(), "b".to_string()],
            BTreeSet::from(['0', '1']),
            0,
            BTreeSet::from([1]),
            BTreeMap::from([(
                0,
                vec![Transition {
                    label: Label::Symbol('0'),
                    targets: BTreeSet::from([1]),
                }],
            )]),
        );

        assert!(accepts(&automaton, "0").unwrap());
        assert!(!accepts(&automaton, "1").unwrap());
        assert!(!accepts(&automaton, "00").unwrap());
    }

    #[test]
    fn test_run_steps_and_reset() {
        let enfa = epsilon_loop_enfa();
        let mut run = Run::new(&enfa);

        assert_eq!(run.current_states(), &BTreeSet::from([0]));
        assert_eq!(run.steps(), 0);
        assert!(!run.is_accepting());
        assert!(!run.is_stuck());

        // f is reached and its epsilon edge pulls i back in
        assert_eq!(run.step('1').unwrap(), &BTreeSet::from([0, 1, 2]));
        assert!(run.is_accepting());
        assert_eq!(run.steps(), 1);

        assert_eq!(run.step('0').unwrap(), &BTreeSet::from([1]));
        assert!(!run.is_accepting());
        assert_eq!(run.steps(), 2);

        run.reset();
        assert_eq!(run.current_states(), &BTreeSet::from([0]));
        assert_eq!(run.steps(), 0);
    }

    #[test]
    fn test_run_gets_stuck() {
        let nfa = parser::parse_spec(
            r#"
Q = {p, q};
A = {0, 1};
I = p;
F = {q};
(p, 1) -> {q};
"#,
        )
        .unwrap();
        let mut run = Run::new(&nfa);

        assert!(run.step('0').unwrap().is_empty());
        assert!(run.is_stuck());
        assert!(!run.is_accepting());

        assert!(run.step('1').unwrap().is_empty());
        assert!(run.is_stuck());
        assert_eq!(run.steps(), 2);
    }

    #[test]
    fn test_run_rejects_foreign_symbol() {
        let dfa = cycle_dfa();
        let mut run = Run::new(&dfa);

        assert_eq!(run.step('x').unwrap_err(), AutomatonError::InputSymbol('x'));
        assert_eq!(run.current_states(), &BTreeSet::from([0]));
        assert_eq!(run.steps(), 0);
    }

    #[test]
    fn test_run_traces_dfa_path() {
        let dfa = cycle_dfa();
        let mut run = Run::new(&dfa);

        assert_eq!(run.step('0').unwrap(), &BTreeSet::from([1]));
        assert!(!run.is_accepting());
        assert_eq!(run.step('1').unwrap(), &BTreeSet::from([0]));
        assert!(run.is_accepting());
        assert_eq!(run.steps(), 2);
    }
}
