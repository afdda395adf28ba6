//! Keyword override table and offensive-term list.
//!
//! Both are loaded once at startup from TOML source files and are immutable
//! for the life of the process. A keyword hit substitutes a canned response
//! (with its helpline) for model generation; the offensive-term list is
//! loaded but not consulted by any request path — its moderation policy is
//! an open product decision.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// One loaded keyword row: trigger word, canned response, helpline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    /// Lowercased, trimmed trigger word.
    pub keyword: String,
    /// Canned response text.
    pub response: String,
    /// Helpline appended to the canned response.
    pub helpline: String,
}

impl KeywordEntry {
    /// Format the canned reply delivered to the user.
    #[must_use]
    pub fn canned_reply(&self) -> String {
        format!("{}\n\nHelpline: {}", self.response, self.helpline)
    }
}

/// Raw row shape as it appears in the source file. Rows with any missing
/// field are dropped at load time, not loaded with empty strings.
#[derive(Debug, Deserialize)]
struct RawEntry {
    keyword: Option<String>,
    response: Option<String>,
    helpline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(default)]
    entry: Vec<RawEntry>,
}

/// Static mapping from keyword to canned (response, helpline) pair.
///
/// Entries are kept in load order; [`lookup`](Self::lookup) returns the
/// first keyword that occurs as a substring of the input.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    /// Build a table from already-validated entries. Keys are lowercased,
    /// trimmed, and deduplicated (first occurrence wins).
    #[must_use]
    pub fn from_entries(raw: Vec<KeywordEntry>) -> Self {
        let mut entries: Vec<KeywordEntry> = Vec::with_capacity(raw.len());
        for mut e in raw {
            e.keyword = e.keyword.trim().to_lowercase();
            if e.keyword.is_empty() {
                continue;
            }
            if entries.iter().any(|existing| existing.keyword == e.keyword) {
                continue;
            }
            entries.push(e);
        }
        Self { entries }
    }

    /// Load the table from a TOML file, degrading to an empty table on any
    /// load failure. Startup never aborts over a bad override file.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(table) => {
                info!(
                    "loaded {} keyword overrides from {}",
                    table.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                warn!(
                    "keyword override file {} unusable ({e}); continuing with empty table",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: KeywordFile = toml::from_str(&content)
            .map_err(|e| crate::error::SolaceError::Config(e.to_string()))?;

        let complete = file
            .entry
            .into_iter()
            .filter_map(|row| match (row.keyword, row.response, row.helpline) {
                (Some(keyword), Some(response), Some(helpline)) => Some(KeywordEntry {
                    keyword,
                    response,
                    helpline,
                }),
                _ => None,
            })
            .collect();

        Ok(Self::from_entries(complete))
    }

    /// Case-insensitive substring lookup: returns the first entry (in load
    /// order) whose keyword occurs anywhere in `input`.
    #[must_use]
    pub fn lookup(&self, input: &str) -> Option<&KeywordEntry> {
        let lower = input.to_lowercase();
        self.entries.iter().find(|e| lower.contains(&e.keyword))
    }

    /// Number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct OffensiveFile {
    #[serde(default)]
    terms: Vec<String>,
}

/// Lowercased set of offensive terms.
///
/// Loaded at startup and held for the life of the process. No request path
/// consults it; see DESIGN.md for the open moderation-policy question.
#[derive(Debug, Clone, Default)]
pub struct OffensiveTerms {
    terms: HashSet<String>,
}

impl OffensiveTerms {
    /// Load the set from a TOML file, degrading to an empty set on any load
    /// failure.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(set) => {
                info!(
                    "loaded {} offensive terms from {}",
                    set.len(),
                    path.display()
                );
                set
            }
            Err(e) => {
                warn!(
                    "offensive-term file {} unusable ({e}); continuing with empty set",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: OffensiveFile = toml::from_str(&content)
            .map_err(|e| crate::error::SolaceError::Config(e.to_string()))?;
        let terms = file
            .terms
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(Self { terms })
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.trim().to_lowercase())
    }

    /// Number of loaded terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
