//! Collision-free entry naming for one archive.

use std::collections::{HashMap, HashSet};

/// Inserts `_n` before the extension of `name`, or appends it when there is none.
///
/// A leading dot (hidden file) does not start an extension: `.env` → `.env_1`.
pub fn with_suffix(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}_{}", name, n),
    }
}

/// Display name → times used, scoped to a single archive build.
///
/// The first occurrence of a display name keeps it; later ones are numbered
/// `_1`, `_2`, … in arrival order. A generated name that is already taken
/// (e.g. a unit literally called `a_1.jpg`) advances the counter until free.
#[derive(Debug, Default)]
pub struct ArchiveNameTable {
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl ArchiveNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored name for the next entry with `display_name`.
    pub fn assign(&mut self, display_name: &str) -> String {
        let mut n = self.counts.get(display_name).copied().unwrap_or(0);
        let mut candidate = if n == 0 {
            display_name.to_string()
        } else {
            with_suffix(display_name, n)
        };
        while self.used.contains(&candidate) {
            n += 1;
            candidate = with_suffix(display_name, n);
        }
        self.counts.insert(display_name.to_string(), n + 1);
        self.used.insert(candidate.clone());
        candidate
    }

    /// Times `display_name` has been assigned.
    pub fn count(&self, display_name: &str) -> usize {
        self.counts.get(display_name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
