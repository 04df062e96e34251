//! The ordered list of thinkers every subject is analyzed through.

use anyhow::{bail, Result};

/// Thinkers used when the configuration does not override the roster.
pub const DEFAULT_THINKERS: [&str; 8] = [
    "Socrate",
    "Saint Augustin",
    "Épictète",
    "Friedrich Nietzsche",
    "Pierre Bourdieu",
    "Charles Péguy",
    "Eva Illouz",
    "Michel Foucault",
];

/// Immutable, ordered set of thinker names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    thinkers: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            thinkers: DEFAULT_THINKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Roster {
    /// Build a roster from configured names.
    ///
    /// Names are trimmed; blank names, duplicates and an empty list are rejected.
    /// A name contained in another name is rejected too, since prompts must
    /// mention each thinker exactly once.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut thinkers: Vec<String> = Vec::new();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                bail!("Thinker names must not be blank");
            }
            if thinkers.iter().any(|t| t == name) {
                bail!("Duplicate thinker in roster: {}", name);
            }
            if let Some(other) = thinkers
                .iter()
                .find(|t| t.contains(name) || name.contains(t.as_str()))
            {
                bail!("Thinker names overlap in roster: {} / {}", other, name);
            }
            thinkers.push(name.to_string());
        }

        if thinkers.is_empty() {
            bail!("Roster must contain at least one thinker");
        }

        Ok(Self { thinkers })
    }

    pub fn names(&self) -> &[String] {
        &self.thinkers
    }

    pub fn len(&self) -> usize {
        self.thinkers.len()
    }

    /// Names joined with `", "`, as embedded in prompts.
    pub fn joined(&self) -> String {
        self.thinkers.join(", ")
    }
}
