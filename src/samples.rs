use crate::parser::parse_spec;
use crate::types::{Automaton, AutomatonError, Kind};

use std::sync::RwLock;

// Default embedded specifications
const SAMPLE_SPECS: [(&str, &str); 4] = [
    (
        "Epsilon branch",
        r#"
// accepts a 1 followed by zero or more 0s
Q = {i, q, f};
A = {0, 1};
I = i;
F = {f};
(i, 1) -> {q, f};
(q, 0) -> {f};
(q, '') -> {f};
(f, 0) -> {f};
"#,
    ),
    (
        "Three-state cycle",
        r#"
// accepts words where zeros and ones balance modulo three
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
    ),
    (
        "Ends with one",
        r#"
// accepts binary words ending in 1
Q = {p, q};
A = {0, 1};
I = p;
F = {q};
(p, 0) -> {p};
(p, 1) -> {p, q};
"#,
    ),
    (
        "Even zeros or even ones",
        r#"
// accepts words with an even number of zeros or an even number of ones
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
    ),
];

lazy_static::lazy_static! {
    pub static ref SAMPLES: RwLock<Vec<Sample>> = RwLock::new(Vec::new());
}

/// A named, ready-to-use automaton from the embedded collection.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    pub automaton: Automaton,
}

pub struct SampleManager;

impl SampleManager {
    /// Initialize the SampleManager with the embedded specifications
    pub fn load() -> Result<(), AutomatonError> {
        let mut samples = Vec::new();

        for (name, text) in SAMPLE_SPECS {
            match parse_spec(text) {
                Ok(automaton) => samples.push(Sample {
                    name: name.to_string(),
                    automaton,
                }),
                Err(e) => eprintln!("Failed to parse sample '{}': {}", name, e),
            }
        }

        // Store the loaded samples
        if let Ok(mut write_guard) = SAMPLES.write() {
            *write_guard = samples;
        } else {
            return Err(AutomatonError::FileError(
                "Failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of available samples
    pub fn get_sample_count() -> usize {
        // Initialize with the embedded samples if not already initialized
        let _ = Self::load();

        SAMPLES.read().map(|samples| samples.len()).unwrap_or(0)
    }

    /// Get a sample by its index
    pub fn get_sample_by_index(index: usize) -> Result<Sample, AutomatonError> {
        // Initialize with the embedded samples if not already initialized
        let _ = Self::load();

        SAMPLES
            .read()
            .map_err(|_| AutomatonError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                AutomatonError::SemanticError(format!("Sample index {} out of range", index))
            })
    }

    /// Get a sample by its name
    pub fn get_sample_by_name(name: &str) -> Result<Sample, AutomatonError> {
        // Initialize with the embedded samples if not already initialized
        let _ = Self::load();

        SAMPLES
            .read()
            .map_err(|_| AutomatonError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|sample| sample.name == name)
            .cloned()
            .ok_or_else(|| AutomatonError::SemanticError(format!("Sample '{}' not found", name)))
    }

    /// List all sample names
    pub fn list_sample_names() -> Vec<String> {
        // Initialize with the embedded samples if not already initialized
        let _ = Self::load();

        SAMPLES
            .read()
            .map(|samples| samples.iter().map(|sample| sample.name.clone()).collect())
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get information about a sample by its index
    pub fn get_sample_info(index: usize) -> Result<SampleInfo, AutomatonError> {
        let sample = Self::get_sample_by_index(index)?;
        let automaton = &sample.automaton;

        Ok(SampleInfo {
            index,
            name: sample.name.clone(),
            kind: automaton.kind(),
            initial_state: automaton.state_label(automaton.initial()).to_string(),
            state_count: automaton.state_count(),
            transition_count: automaton.transitions().count(),
        })
    }

    /// Search for samples by name
    pub fn search_samples(query: &str) -> Vec<usize> {
        // Initialize with the embedded samples if not already initialized
        let _ = Self::load();

        SAMPLES
            .read()
            .map(|samples| {
                samples
                    .iter()
                    .enumerate()
                    .filter(|(_, sample)| {
                        sample.name.to_lowercase().contains(&query.to_lowercase())
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get the original text of a sample by its index
    pub fn get_sample_text_by_index(index: usize) -> Result<&'static str, AutomatonError> {
        SAMPLE_SPECS.get(index).map(|(_, text)| *text).ok_or_else(|| {
            AutomatonError::SemanticError(format!("Sample text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct SampleInfo {
    pub index: usize,
    pub name: String,
    pub kind: Kind,
    pub initial_state: String,
    pub state_count: usize,
    pub transition_count: usize,
}
