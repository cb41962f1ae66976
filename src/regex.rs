//! This module provides the parser for regular expressions, utilizing the
//! `pest` crate. It turns the surface syntax (union, concatenation, Kleene
//! star, grouping, epsilon) into a [`Regex`] syntax tree for the compiler.

use crate::types::AutomatonError;
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::collections::BTreeSet;

/// Derives a `PestParser` for the regex grammar defined in
/// `grammar/regex.pest`.
#[derive(PestParser)]
#[grammar = "grammar/regex.pest"]
pub struct RegexParser;

/// A regular expression syntax tree.
///
/// Binary operators are left-associated: `a|b|c` parses as `(a|b)|c` and
/// `abc` as `(ab)c`. The tree is the compiler's input; it carries no source
/// positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    /// The empty word, written `''`.
    Epsilon,
    /// A single input character.
    Symbol(char),
    /// Zero or more repetitions of the inner expression.
    Star(Box<Regex>),
    /// The left expression followed by the right one.
    Concat(Box<Regex>, Box<Regex>),
    /// Either the left or the right expression.
    Union(Box<Regex>, Box<Regex>),
}

impl Regex {
    /// Returns the set of input symbols the expression mentions.
    pub fn symbols(&self) -> BTreeSet<char> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<char>) {
        match self {
            Regex::Epsilon => {}
            Regex::Symbol(c) => {
                symbols.insert(*c);
            }
            Regex::Star(inner) => inner.collect_symbols(symbols),
            Regex::Concat(lhs, rhs) | Regex::Union(lhs, rhs) => {
                lhs.collect_symbols(symbols);
                rhs.collect_symbols(symbols);
            }
        }
    }
}

/// Parses the given input string into a [`Regex`] tree.
///
/// # Arguments
///
/// * `input` - A string slice containing the regular expression.
///
/// # Returns
///
/// * `Ok(Regex)` if the input is a well-formed expression.
/// * `Err(AutomatonError::RegexParseError)` for any syntax error: an empty
///   input, an empty group `()`, a dangling operator, or an unbalanced
///   parenthesis.
pub fn parse(input: &str) -> Result<Regex, AutomatonError> {
    let root = RegexParser::parse(Rule::regex, input.trim())
        .map_err(|e| AutomatonError::RegexParseError(e.into()))?
        .next()
        .unwrap();

    let union = root.into_inner().next().unwrap();
    Ok(build_union(union))
}

/// Parses a regular expression and checks it against a declared alphabet.
///
/// # Returns
///
/// * `Ok(Regex)` if the expression parses and uses only declared symbols.
/// * `Err(AutomatonError::SemanticError)` naming the first symbol outside
///   the alphabet.
pub fn parse_with_alphabet(
    input: &str,
    alphabet: &BTreeSet<char>,
) -> Result<Regex, AutomatonError> {
    let regex = parse(input)?;

    if let Some(&symbol) = regex.symbols().iter().find(|s| !alphabet.contains(s)) {
        return Err(AutomatonError::SemanticError(format!(
            "Regex symbol '{symbol}' is not in the declared alphabet"
        )));
    }

    Ok(regex)
}

/// Folds the branches of a `Pair<Rule::union>` left-associatively.
fn build_union(pair: Pair<Rule>) -> Regex {
    let mut branches = pair.into_inner().map(build_concat);
    let first = branches.next().unwrap();
    branches.fold(first, |lhs, rhs| Regex::Union(Box::new(lhs), Box::new(rhs)))
}

/// Folds the factors of a `Pair<Rule::concat>` left-associatively.
fn build_concat(pair: Pair<Rule>) -> Regex {
    let mut factors = pair.into_inner().map(build_repeat);
    let first = factors.next().unwrap();
    factors.fold(first, |lhs, rhs| Regex::Concat(Box::new(lhs), Box::new(rhs)))
}

/// Builds an atom and wraps it in one `Star` per trailing `*`.
fn build_repeat(pair: Pair<Rule>) -> Regex {
    let mut pairs = pair.into_inner();
    let mut node = build_atom(pairs.next().unwrap());

    for _ in pairs {
        node = Regex::Star(Box::new(node));
    }

    node
}

/// Builds a group, epsilon, or symbol literal.
fn build_atom(pair: Pair<Rule>) -> Regex {
    match pair.as_rule() {
        Rule::group => build_union(pair.into_inner().next().unwrap()),
        Rule::epsilon => Regex::Epsilon,
        _ => {
            // A literal is a bare character or a quoted one such as '-'
            let symbol = pair.as_str().trim_matches('\'').chars().next().unwrap();
            Regex::Symbol(symbol)
        }
    }
}
