use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::core::types::EntryId;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("Failed to read descriptions: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("No description for identifier: {0}")]
    UnknownIdentifier(EntryId),
}

/// Identifier → description lookup, read from a line-oriented text file.
///
/// Each line holds an identifier (first whitespace-delimited token) followed by its
/// description. Corpus files are named with `/` replaced by `_`, so identifiers are
/// mapped the same way.
#[derive(Debug, Clone, Default)]
pub struct DescriptionTable {
    descriptions: HashMap<EntryId, String>,
}

impl DescriptionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a description file
    ///
    /// # Errors
    ///
    /// Returns `DescriptionError::ReadError` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, DescriptionError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parse description text; blank lines are skipped and later lines win
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut descriptions = HashMap::new();

        for line in text.lines() {
            let line = line.replace('\0', "");
            let line = line.trim();
            let Some((key, rest)) = split_first_token(line) else {
                continue;
            };
            descriptions.insert(EntryId::new(key.replace('/', "_")), rest.trim().to_string());
        }

        Self { descriptions }
    }

    /// Look up the description for an identifier
    ///
    /// # Errors
    ///
    /// Returns `DescriptionError::UnknownIdentifier` when the identifier is absent.
    pub fn lookup(&self, id: &EntryId) -> Result<&str, DescriptionError> {
        self.descriptions
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| DescriptionError::UnknownIdentifier(id.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

fn split_first_token(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(idx) => Some((&line[..idx], &line[idx..])),
        None => Some((line, "")),
    }
}
