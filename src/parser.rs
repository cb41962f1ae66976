//! This module provides the parser for textual automaton specifications,
//! utilizing the `pest` crate. It defines functions to parse the section-based
//! format (`Q`, `A`, `I`, `F` plus transition lines) into an `Automaton`,
//! resolving state references and inferring the automaton kind.

use crate::types::{Automaton, AutomatonError, Kind, Label, Transition};
use pest::{iterators::Pair, Parser as PestParser, Span};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Derives a `PestParser` for the specification grammar defined in
/// `grammar/automaton.pest`.
#[derive(PestParser)]
#[grammar = "grammar/automaton.pest"]
pub struct AutomatonParser;

/// A transition line as written, before state and symbol resolution.
struct RawTransition<'i> {
    source: &'i str,
    /// `None` spells the epsilon label `''`.
    symbol: Option<&'i str>,
    targets: Vec<&'i str>,
    span: Span<'i>,
}

/// Parses the given input string into an [`Automaton`].
///
/// This is the main entry point for parsing specification texts. It trims the
/// input, parses it with the `AutomatonParser`, resolves every state and
/// symbol reference against the declared `Q` and `A` sections, accumulates
/// repeated transition lines into unioned target sets, and infers the
/// automaton kind from the result.
///
/// Kind inference: any epsilon transition makes the automaton an epsilon-NFA;
/// otherwise it is a DFA when every (state, symbol) pair over the whole
/// alphabet has exactly one target, and an NFA in every remaining case.
///
/// # Arguments
///
/// * `input` - A string slice containing the specification text.
///
/// # Returns
///
/// * `Ok(Automaton)` if the input is successfully parsed and validated.
/// * `Err(AutomatonError::SpecParseError)` if there are any syntax errors.
/// * `Err(AutomatonError::SemanticError)` for undeclared references,
///   duplicated or missing sections, and malformed symbols.
pub fn parse_spec(input: &str) -> Result<Automaton, AutomatonError> {
    let root = AutomatonParser::parse(Rule::spec, input.trim())
        .map_err(|e| AutomatonError::SpecParseError(e.into()))?
        .next()
        .unwrap();

    parse_automaton(root)
}

/// Walks the parse tree of a `Pair<Rule::spec>` into an `Automaton`.
fn parse_automaton(pair: Pair<Rule>) -> Result<Automaton, AutomatonError> {
    let mut states: Option<Vec<&str>> = None;
    let mut alphabet: Option<BTreeSet<char>> = None;
    let mut initial: Option<(&str, Span)> = None;
    let mut accepting: Option<Vec<(&str, Span)>> = None;
    let mut raw_transitions: Vec<RawTransition> = Vec::new();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_section(rule, span, &mut seen)?;

        match rule {
            Rule::states_decl => states = Some(parse_state_names(p)),
            Rule::alphabet_decl => alphabet = Some(parse_alphabet(p)?),
            Rule::initial_decl => initial = Some(parse_initial(p)),
            Rule::accepting_decl => accepting = Some(parse_accepting(p)),
            Rule::transition => raw_transitions.push(parse_transition(p)),
            _ => {} // Skip EOI
        }
    }

    // Handle mandatory sections
    let states = check_required_section(states, "Q")?;
    let alphabet = check_required_section(alphabet, "A")?;
    let (initial_name, initial_span) = check_required_section(initial, "I")?;
    let accepting = check_required_section(accepting, "F")?;

    // Resolve names against the declared state set
    let index: HashMap<&str, usize> = states
        .iter()
        .enumerate()
        .map(|(id, &name)| (name, id))
        .collect();

    let initial_id = *index.get(initial_name).ok_or_else(|| {
        semantic_error(
            &format!("Undeclared initial state '{initial_name}'"),
            initial_span,
        )
    })?;

    let mut accepting_ids = BTreeSet::new();
    for (name, span) in accepting {
        let id = *index.get(name).ok_or_else(|| {
            semantic_error(&format!("Undeclared accepting state '{name}'"), span)
        })?;
        accepting_ids.insert(id);
    }

    let merged = resolve_transitions(raw_transitions, &index, &alphabet)?;
    let kind = infer_kind(&merged, states.len(), &alphabet);

    let mut transitions: BTreeMap<usize, Vec<Transition>> = BTreeMap::new();
    for ((source, label), targets) in merged {
        transitions
            .entry(source)
            .or_default()
            .push(Transition { label, targets });
    }

    Automaton::new(
        kind,
        states.into_iter().map(String::from).collect(),
        alphabet,
        initial_id,
        accepting_ids,
        transitions,
    )
}

/// Parses the `Q` section into an ordered, deduplicated list of state names.
/// Declaration order defines the state ids.
fn parse_state_names(pair: Pair<Rule>) -> Vec<&str> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    for ident in set_members(pair) {
        let name = unquote(ident.as_str());
        if seen.insert(name) {
            names.push(name);
        }
    }

    names
}

/// Parses the `A` section, checking that every member is a single character.
fn parse_alphabet(pair: Pair<Rule>) -> Result<BTreeSet<char>, AutomatonError> {
    let mut alphabet = BTreeSet::new();

    for ident in set_members(pair) {
        let span = ident.as_span();
        alphabet.insert(parse_symbol(ident.as_str(), span)?);
    }

    Ok(alphabet)
}

/// Parses the `I` section, keeping the span for resolution errors.
fn parse_initial(pair: Pair<Rule>) -> (&str, Span) {
    let ident = pair.into_inner().next().unwrap();
    let span = ident.as_span();
    (unquote(ident.as_str()), span)
}

/// Parses the `F` section, keeping each member's span for resolution errors.
fn parse_accepting(pair: Pair<Rule>) -> Vec<(&str, Span)> {
    set_members(pair)
        .map(|ident| {
            let span = ident.as_span();
            (unquote(ident.as_str()), span)
        })
        .collect()
}

/// Parses a transition line into its raw, unresolved parts.
fn parse_transition(pair: Pair<Rule>) -> RawTransition {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let source = unquote(pairs.next().unwrap().as_str());

    let label = pairs.next().unwrap();
    let symbol = match label.as_rule() {
        Rule::epsilon => None,
        _ => Some(unquote(label.as_str())),
    };

    let target = pairs.next().unwrap();
    let targets = match target.as_rule() {
        Rule::set => target
            .into_inner()
            .map(|ident| unquote(ident.as_str()))
            .collect(),
        _ => vec![unquote(target.as_str())],
    };

    RawTransition {
        source,
        symbol,
        targets,
        span,
    }
}

/// Resolves raw transition lines against the declared states and alphabet,
/// accumulating repeated (state, label) lines into unioned target sets.
fn resolve_transitions(
    raw: Vec<RawTransition>,
    index: &HashMap<&str, usize>,
    alphabet: &BTreeSet<char>,
) -> Result<BTreeMap<(usize, Label), BTreeSet<usize>>, AutomatonError> {
    let mut merged: BTreeMap<(usize, Label), BTreeSet<usize>> = BTreeMap::new();

    for transition in raw {
        let span = transition.span;

        let source = *index.get(transition.source).ok_or_else(|| {
            semantic_error(
                &format!("Undeclared state '{}' in transition", transition.source),
                span,
            )
        })?;

        let label = match transition.symbol {
            None => Label::Epsilon,
            Some(text) => {
                let symbol = parse_symbol(text, span)?;
                if !alphabet.contains(&symbol) {
                    return Err(semantic_error(
                        &format!("Undeclared symbol '{symbol}' in transition"),
                        span,
                    ));
                }
                Label::Symbol(symbol)
            }
        };

        let mut targets = BTreeSet::new();
        for name in transition.targets {
            let id = *index.get(name).ok_or_else(|| {
                semantic_error(&format!("Undeclared state '{name}' in transition"), span)
            })?;
            targets.insert(id);
        }

        // An empty target set contributes nothing
        if !targets.is_empty() {
            merged.entry((source, label)).or_default().extend(targets);
        }
    }

    Ok(merged)
}

/// Infers the kind tag from the resolved transition map.
fn infer_kind(
    merged: &BTreeMap<(usize, Label), BTreeSet<usize>>,
    state_count: usize,
    alphabet: &BTreeSet<char>,
) -> Kind {
    let has_epsilon = merged.keys().any(|&(_, label)| label == Label::Epsilon);
    if has_epsilon {
        return Kind::EpsilonNfa;
    }

    let deterministic = (0..state_count).all(|state| {
        alphabet.iter().all(|&symbol| {
            merged
                .get(&(state, Label::Symbol(symbol)))
                .map_or(false, |targets| targets.len() == 1)
        })
    });

    if deterministic {
        Kind::Dfa
    } else {
        Kind::Nfa
    }
}

/// Iterates over the `ident` members of a declaration's `set`.
fn set_members<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner()
        .flat_map(|p| p.into_inner())
        .filter(|p| p.as_rule() == Rule::ident)
}

/// Parses a single-character symbol from an identifier, handling quoted and
/// unquoted spellings.
fn parse_symbol(input: &str, span: Span) -> Result<char, AutomatonError> {
    let text = unquote(input);
    let mut chars = text.chars();

    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(semantic_error(
            &format!("Symbol '{text}' must be a single character"),
            span,
        )),
    }
}

/// Strips the quote marks off a quoted identifier.
fn unquote(input: &str) -> &str {
    input.trim_matches('\'')
}

/// Creates an `AutomatonError::SemanticError` from a message and a `Span`,
/// locating the offending text.
fn semantic_error(msg: &str, span: Span) -> AutomatonError {
    let (line, col) = span.start_pos().line_col();
    AutomatonError::SemanticError(format!("{msg} at line {line}, column {col}"))
}

/// Checks if a given section has already been declared, ensuring each of
/// `Q`, `A`, `I` and `F` appears at most once.
fn check_unique_section(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), AutomatonError> {
    if !matches!(
        rule,
        Rule::states_decl | Rule::alphabet_decl | Rule::initial_decl | Rule::accepting_decl
    ) {
        return Ok(());
    }

    if seen.contains(&rule) {
        return Err(semantic_error(
            &format!("Duplicate '{}' declaration", section_name(rule)),
            span,
        ));
    }

    seen.insert(rule);

    Ok(())
}

/// Checks if a required section is present, returning an `Err` naming it
/// when missing.
fn check_required_section<T>(value: Option<T>, name: &str) -> Result<T, AutomatonError> {
    value.ok_or_else(|| AutomatonError::SemanticError(format!("Missing '{name}' declaration")))
}

/// Maps a declaration rule to the section letter used in error messages.
fn section_name(rule: Rule) -> &'static str {
    match rule {
        Rule::states_decl => "Q",
        Rule::alphabet_decl => "A",
        Rule::initial_decl => "I",
        Rule::accepting_decl => "F",
        _ => "section",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dfa() {
        let input = r#"
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
"#;

        let result = parse_spec(input);
        assert!(result.is_ok());

        let automaton = result.unwrap();
        assert_eq!(automaton.kind(), Kind::Dfa);
        assert_eq!(automaton.states(), &["p", "q", "r"]);
        assert_eq!(automaton.initial(), 0);
        assert_eq!(automaton.accepting(), &BTreeSet::from([0]));
        assert_eq!(
            automaton.delta(0, Label::Symbol('0')),
            Some(&BTreeSet::from([1]))
        );
        assert_eq!(
            automaton.delta(2, Label::Symbol('1')),
            Some(&BTreeSet::from([1]))
        );
    }

    #[test]
    fn test_parse_nfa_with_set_target() {
        let input = r#"
Q = {p, q};
A = {0, 1};
I = p;
F = {q};
(p, 0) -> {p};
(p, 1) -> {p, q};
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::Nfa);
        assert_eq!(
            automaton.delta(0, Label::Symbol('1')),
            Some(&BTreeSet::from([0, 1]))
        );
    }

    #[test]
    fn test_parse_partial_single_target_machine_is_nfa() {
        // Every target is a single state, but q has no transitions at all,
        // so the transition function is not total.
        let input = r#"
Q = {p, q};
A = {0, 1};
I = p;
F = {q};
(p, 0) -> p;
(p, 1) -> q;
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::Nfa);
    }

    #[test]
    fn test_parse_epsilon_nfa() {
        let input = r#"
Q = {i, q, f};
A = {0, 1};
I = i;
F = {f};
(i, 1) -> {q, f};
(q, 0) -> {f};
(q, '') -> {f};
(f, 0) -> {f};
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::EpsilonNfa);
        assert_eq!(
            automaton.delta(1, Label::Epsilon),
            Some(&BTreeSet::from([2]))
        );
    }

    #[test]
    fn test_parse_epsilon_with_single_target() {
        let input = r#"
Q = {p, q};
A = {0};
I = p;
F = {q};
(p, '') -> q;
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::EpsilonNfa);
        assert_eq!(
            automaton.delta(0, Label::Epsilon),
            Some(&BTreeSet::from([1]))
        );
    }

    #[test]
    fn test_parse_accumulates_repeated_lines() {
        let input = r#"
Q = {p, q, r};
A = {0};
I = p;
F = {r};
(p, 0) -> q;
(p, 0) -> {r};
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::Nfa);
        assert_eq!(
            automaton.delta(0, Label::Symbol('0')),
            Some(&BTreeSet::from([1, 2]))
        );
    }

    #[test]
    fn test_parse_empty_target_set_is_absent_transition() {
        let input = r#"
Q = {p, q};
A = {0};
I = p;
F = {q};
(p, 0) -> {};
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::Nfa);
        assert_eq!(automaton.delta(0, Label::Symbol('0')), None);
    }

    #[test]
    fn test_parse_quoted_identifiers() {
        let input = r#"
Q = {'s-0', 's-1'};
A = {'-', a};
I = 's-0';
F = {'s-1'};
('s-0', '-') -> 's-1';
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.states(), &["s-0", "s-1"]);
        assert_eq!(
            automaton.delta(0, Label::Symbol('-')),
            Some(&BTreeSet::from([1]))
        );
    }

    #[test]
    fn test_parse_with_comments() {
        let input = r#"
// a two-state machine
Q = {p, q};
A = {0};
I = p;      // start at p
F = {q};
(p, 0) -> q;
"#;

        assert!(parse_spec(input).is_ok());
    }

    #[test]
    fn test_parse_duplicate_states_in_set_are_collapsed() {
        let input = r#"
Q = {p, p, q};
A = {0};
I = p;
F = {q};
(p, 0) -> q;
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.state_count(), 2);
    }

    #[test]
    fn test_parse_empty_accepting_set() {
        let input = r#"
Q = {p};
A = {0};
I = p;
F = {};
(p, 0) -> p;
"#;

        let automaton = parse_spec(input).unwrap();
        assert!(automaton.accepting().is_empty());
        assert_eq!(automaton.kind(), Kind::Dfa);
    }

    #[test]
    fn test_parse_empty_alphabet_is_vacuously_deterministic() {
        let input = r#"
Q = {p};
A = {};
I = p;
F = {p};
"#;

        let automaton = parse_spec(input).unwrap();
        assert_eq!(automaton.kind(), Kind::Dfa);
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
Q = {p};
Q = {q};
A = {0};
I = p;
F = {};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, AutomatonError::SemanticError(_)));
        assert!(error.to_string().contains("Duplicate 'Q' declaration"));
    }

    #[test]
    fn test_parse_missing_initial() {
        let input = r#"
Q = {p};
A = {0};
F = {p};
(p, 0) -> p;
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, AutomatonError::SemanticError(_)));
        assert_eq!(
            error.to_string(),
            "Semantic error: Missing 'I' declaration"
        );
    }

    #[test]
    fn test_parse_missing_states() {
        let input = r#"
A = {0};
I = p;
F = {};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing 'Q' declaration"));
    }

    #[test]
    fn test_parse_undeclared_state_in_transition() {
        let input = r#"
Q = {p, q};
A = {0};
I = p;
F = {q};
(p, 0) -> z;
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, AutomatonError::SemanticError(_)));
        assert!(error.to_string().contains("Undeclared state 'z'"));
        assert!(error.to_string().contains("line 5"));
    }

    #[test]
    fn test_parse_undeclared_symbol() {
        let input = r#"
Q = {p};
A = {0};
I = p;
F = {};
(p, 1) -> p;
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Undeclared symbol '1'"));
    }

    #[test]
    fn test_parse_undeclared_initial_state() {
        let input = r#"
Q = {p};
A = {0};
I = z;
F = {};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Undeclared initial state 'z'"));
    }

    #[test]
    fn test_parse_undeclared_accepting_state() {
        let input = r#"
Q = {p};
A = {0};
I = p;
F = {z};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Undeclared accepting state 'z'"));
    }

    #[test]
    fn test_parse_multi_character_symbol() {
        let input = r#"
Q = {p};
A = {'ab'};
I = p;
F = {};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Symbol 'ab' must be a single character"));
    }

    #[test]
    fn test_parse_malformed_syntax() {
        let input = r#"
Q = {p}
A = {0};
"#;

        let result = parse_spec(input);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            AutomatonError::SpecParseError(_)
        ));
    }

    #[test]
    fn test_parse_empty_input() {
        let result = parse_spec("");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing 'Q' declaration"));
    }
}
