//! This crate provides the core logic for a finite automata engine.
//! It includes modules for parsing regular expressions and automaton
//! specifications, compiling regexes to epsilon-NFAs, converting between
//! automaton kinds, simulating word acceptance, and managing a collection
//! of predefined sample machines.

pub mod analyzer;
pub mod convert;
pub mod encoder;
pub mod loader;
pub mod parser;
pub mod regex;
pub mod samples;
pub mod simulator;
pub mod thompson;
pub mod types;

/// Re-exports the `Rule` enum generated for the specification grammar.
pub use crate::parser::Rule as SpecRule;
/// Re-exports the `Rule` enum generated for the regex grammar.
pub use crate::regex::Rule as RegexRule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the conversion functions from the convert module.
pub use convert::{determinize, eliminate_epsilon, to_dfa};
/// Re-exports the `encode` function from the encoder module.
pub use encoder::encode;
/// Re-exports the `SpecLoader` struct from the loader module.
pub use loader::SpecLoader;
/// Re-exports the `parse_spec` function from the parser module.
pub use parser::parse_spec;
/// Re-exports the regex parsing functions and AST from the regex module.
pub use regex::{parse, parse_with_alphabet, Regex};
/// Re-exports `Sample`, `SampleInfo`, `SampleManager`, and `SAMPLES` from the samples module.
pub use samples::{Sample, SampleInfo, SampleManager, SAMPLES};
/// Re-exports the word simulator from the simulator module.
pub use simulator::{accepts, Run};
/// Re-exports the Thompson construction from the thompson module.
pub use thompson::{compile, compile_over};
/// Re-exports various types related to automaton definition from the types module.
pub use types::{Automaton, AutomatonError, Kind, Label, StateId, Transition, MAX_SPEC_SIZE};
