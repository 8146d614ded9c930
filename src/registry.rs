//! The ordered list of launchable entries.
//!
//! Entries are addressed by their 1-based position in the `wineladb` file.
//! Loading and saving never reorder or deduplicate, so the ordinal printed by
//! `format_listing` is always the ordinal accepted by the launcher.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// A single launchable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display name.
    pub name: String,
    /// Path handed to the wrapper program.
    pub path: String,
}

/// Ordered collection of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry at a 1-based ordinal with a linear scan.
    pub fn get(&self, ordinal: i64) -> Option<&Entry> {
        self.entries
            .iter()
            .enumerate()
            .find(|(index, _)| *index as i64 + 1 == ordinal)
            .map(|(_, entry)| entry)
    }

    /// Appends an entry after the existing ones.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Removes the entry at a 1-based ordinal, shifting later entries up.
    pub fn remove(&mut self, ordinal: i64) -> Result<Entry> {
        if ordinal < 1 || ordinal as usize > self.entries.len() {
            return Err(anyhow!("exe number {}: not in list", ordinal));
        }
        Ok(self.entries.remove(ordinal as usize - 1))
    }

    /// Renders the registry as one `"<ordinal> <name>"` line per entry.
    pub fn format_listing(&self) -> String {
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(out, "{} {}", index + 1, entry.name);
        }
        out
    }
}

/// Loads the registry from a file path. An empty file is an empty registry.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry file {}", path.display()))?;
    let registry: Registry = toml::from_str(&raw)
        .with_context(|| format!("failed to parse registry file {}", path.display()))?;
    Ok(registry)
}

/// Writes the registry to a file path, replacing its contents.
pub fn save_registry(path: &Path, registry: &Registry) -> Result<()> {
    let raw = toml::to_string(registry).context("failed to serialize registry")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write registry file {}", path.display()))?;
    Ok(())
}
