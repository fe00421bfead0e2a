// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered riddle table.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::config::ConfigError;

/// One password-gated riddle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct RiddleEntry {
    /// Route segment, `"1"`, `"2"`, …
    pub path: String,
    /// Plaintext password. Compared trimmed and case-insensitively.
    pub password: String,
    /// URL of the video revealed on unlock.
    pub video_source: String,
    /// Message shown once the video unlocks the panel.
    pub message: String,
    /// Pointer to the next physical location, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clue: Option<String>,
}

impl RiddleEntry {
    fn new(path: &str, password: &str, message: &str, clue: &str) -> Self {
        Self {
            path: path.to_owned(),
            password: password.to_owned(),
            video_source: format!("/videos/riddle-{path}.mp4"),
            message: message.to_owned(),
            clue: Some(clue.to_owned()),
        }
    }
}

/// Riddles in hunt order, with paths numbered densely from `"1"`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<RiddleEntry>"))]
pub struct RiddleTable {
    entries: Vec<RiddleEntry>,
}

impl TryFrom<Vec<RiddleEntry>> for RiddleTable {
    type Error = ConfigError;

    fn try_from(entries: Vec<RiddleEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl RiddleTable {
    /// Validates and wraps `entries`.
    ///
    /// The table must be non-empty and the `n`th entry must have path `n`
    /// (1-based), which also rules out duplicates.
    pub fn new(entries: Vec<RiddleEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        for (i, entry) in entries.iter().enumerate() {
            let position = i + 1;
            if entry.path != format!("{position}") {
                return Err(ConfigError::NonDensePaths {
                    position,
                    found: entry.path.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Looks an entry up by its route segment.
    #[must_use]
    pub fn get_by_path(&self, path: &str) -> Option<&RiddleEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// The entry after `path`, or `None` for the last or an unknown path.
    #[must_use]
    pub fn next(&self, path: &str) -> Option<&RiddleEntry> {
        let idx = self.position(path)?;
        self.entries.get(idx + 1)
    }

    /// Whether `path` names the last entry.
    #[must_use]
    pub fn is_last(&self, path: &str) -> bool {
        self.position(path) == Some(self.entries.len() - 1)
    }

    /// The first entry.
    #[must_use]
    pub fn first(&self) -> &RiddleEntry {
        &self.entries[0]
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[RiddleEntry] {
        &self.entries
    }

    /// Number of entries. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries. Never true once validated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }
}

impl Default for RiddleTable {
    /// The shipped four-step hunt.
    fn default() -> Self {
        Self {
            entries: alloc::vec![
                RiddleEntry::new(
                    "1",
                    "12/08/2025",
                    "onde tudo começou, da ideia à realização",
                    "Na cesta guarda seu próximo passo.",
                ),
                RiddleEntry::new(
                    "2",
                    "16/10/1978",
                    "Sua família, seu bem mais precioso, sempre ao seu lado.",
                    "Se encontre com quem te deu a luz, quem te apoia e te guarda em orações.",
                ),
                RiddleEntry::new(
                    "3",
                    "Familia2025",
                    "Aquele que nasceu e te trouxe alegria: um recomeço que iluminou várias vidas.",
                    "Vá até o lugar onde seu sonho se iniciou... onde Deus te concedeu espaço e tranquilidade.",
                ),
                RiddleEntry::new(
                    "4",
                    "24/07/2025",
                    "Amizade não se mede pelo tempo, mas pelas ações: de um simples parabéns a um momento inesquecível.",
                    "Adentre seu lar, aproveite. Saiba que te amamos muito; cada detalhe foi pensado para te ver feliz.",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry(path: &str) -> RiddleEntry {
        RiddleEntry::new(path, "pw", "msg", "clue")
    }

    #[test]
    fn default_table_is_valid() {
        let table = RiddleTable::default();
        assert_eq!(
            RiddleTable::new(table.entries().to_vec()).as_ref(),
            Ok(&table)
        );
        assert_eq!(table.len(), 4);
        assert_eq!(table.first().path, "1");
        assert_eq!(table.first().video_source, "/videos/riddle-1.mp4");
    }

    #[test]
    fn lookup_next_and_last() {
        let table = RiddleTable::default();
        assert_eq!(table.get_by_path("3").map(|e| e.password.as_str()), Some("Familia2025"));
        assert!(table.get_by_path("5").is_none());
        assert!(table.get_by_path("").is_none());

        assert_eq!(table.next("1").map(|e| e.path.as_str()), Some("2"));
        assert!(table.next("4").is_none());
        assert!(table.next("x").is_none());

        assert!(table.is_last("4"));
        assert!(!table.is_last("3"));
        assert!(!table.is_last("nope"));
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(RiddleTable::new(vec![]), Err(ConfigError::EmptyTable));
    }

    #[test]
    fn rejects_gaps_and_duplicates() {
        assert_eq!(
            RiddleTable::new(vec![entry("1"), entry("3")]),
            Err(ConfigError::NonDensePaths {
                position: 2,
                found: "3".into(),
            })
        );
        assert_eq!(
            RiddleTable::new(vec![entry("1"), entry("1")]),
            Err(ConfigError::NonDensePaths {
                position: 2,
                found: "1".into(),
            })
        );
        assert!(RiddleTable::new(vec![entry("0")]).is_err());
        assert!(RiddleTable::new(vec![entry("01")]).is_err());
    }
}
