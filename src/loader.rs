//! This module provides the `SpecLoader` struct, responsible for loading
//! automaton specifications from various sources, including files and strings.

use crate::parser::parse_spec;
use crate::types::{Automaton, AutomatonError, MAX_SPEC_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// `SpecLoader` is a utility struct for loading automaton specifications.
/// It provides methods to load specifications from individual files, from
/// string content, and to discover and load all `.fsm` files within a
/// specified directory.
pub struct SpecLoader;

impl SpecLoader {
    /// Loads a single automaton from the specified specification file.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.fsm` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is successfully read and parsed.
    /// * `Err(AutomatonError::FileError)` if the file cannot be read or
    ///   exceeds [`MAX_SPEC_SIZE`] bytes.
    /// * `Err(_)` with the parser's error if the content is not a valid
    ///   specification.
    pub fn load_spec(path: &Path) -> Result<Automaton, AutomatonError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutomatonError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_SPEC_SIZE {
            return Err(AutomatonError::FileError(format!(
                "Specification file {} exceeds {} bytes",
                path.display(),
                MAX_SPEC_SIZE
            )));
        }

        parse_spec(&content)
    }

    /// Loads a single automaton from the provided string content.
    ///
    /// This is useful for parsing specifications that are not stored in
    /// files, e.g., from user input.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the specification text.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the content is successfully parsed.
    /// * `Err(_)` with the parser's error otherwise.
    pub fn load_spec_from_string(content: &str) -> Result<Automaton, AutomatonError> {
        parse_spec(content)
    }

    /// Loads all automaton specification files (`.fsm` extension) from a
    /// given directory.
    ///
    /// It iterates through the directory, attempts to load each `.fsm` file,
    /// and collects the results. Directories and non-`.fsm` files are
    /// skipped.
    ///
    /// # Arguments
    ///
    /// * `directory` - A reference to the `Path` of the directory to scan.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Automaton), AutomatonError>>` - A vector where
    ///   each element is a `Result` indicating whether a specification was
    ///   successfully loaded (containing its path and the `Automaton` itself)
    ///   or if an error occurred during loading.
    pub fn load_specs(directory: &Path) -> Vec<Result<(PathBuf, Automaton), AutomatonError>> {
        if !directory.exists() {
            return vec![Err(AutomatonError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(AutomatonError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(AutomatonError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.fsm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != "fsm") {
                    return None;
                }

                match Self::load_spec(&path) {
                    Ok(automaton) => Some(Ok((path, automaton))),
                    Err(e) => Some(Err(AutomatonError::FileError(format!(
                        "Failed to load specification from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}
