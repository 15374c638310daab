//! Minimal ini tokenizer for engine, level and book lists.
//!
//! Section and key order is preserved; keys keep their case.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Problems found while tokenizing an ini file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IniError {
    /// A line that is neither a section header, an entry nor a comment.
    #[error("line {line}: expected `[section]` or `key = value`, found `{content}`")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// Offending line, trimmed.
        content: String,
    },
    /// An entry before the first section header.
    #[error("line {line}: key `{key}` outside of any section")]
    OrphanKey {
        /// One-based line number.
        line: usize,
        /// Key of the entry.
        key: String,
    },
    /// A section header that was already seen.
    #[error("line {line}: duplicate section `{name}`")]
    DuplicateSection {
        /// One-based line number.
        line: usize,
        /// Section name.
        name: String,
    },
}

/// One `[section]` with its entries in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    /// Text between the brackets.
    pub name: String,
    /// `key = value` pairs.
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    /// Value of `key`, if present and not blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]$").expect("invalid section regex"));
static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^=:]+?)\s*[=:]\s*(.*)$").expect("invalid entry regex"));

/// Split `content` into sections.
pub fn parse(content: &str) -> Result<Vec<IniSection>, IniError> {
    let mut sections: Vec<IniSection> = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(caps) = SECTION_RE.captures(trimmed) {
            let name = caps[1].trim().to_string();
            if sections.iter().any(|section| section.name == name) {
                return Err(IniError::DuplicateSection { line, name });
            }
            sections.push(IniSection {
                name,
                entries: Vec::new(),
            });
            continue;
        }

        let Some(caps) = ENTRY_RE.captures(trimmed) else {
            return Err(IniError::Syntax {
                line,
                content: trimmed.to_string(),
            });
        };
        let key = caps[1].trim().to_string();
        let value = caps[2].trim().to_string();
        match sections.last_mut() {
            Some(section) => section.entries.push((key, value)),
            None => return Err(IniError::OrphanKey { line, key }),
        }
    }
    Ok(sections)
}
