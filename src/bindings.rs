//! Binding table: key sequences and modifier chords mapped to command strings

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use crate::config::KeybindSection;
use crate::keys::normalize_keystr;
use crate::observer::KeyObserver;

/// Marks a key-spec as a modifier chord when it wraps the spec on both ends
pub const MODIFIER_DELIMITER: char = '@';

/// Summary of a [`BindingTable::reload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Plain bindings registered
    pub plain: usize,
    /// Modifier bindings registered
    pub modifier: usize,
    /// Modifier key-specs skipped because their notation was invalid
    pub skipped: usize,
}

impl ReloadReport {
    pub fn is_empty(&self) -> bool {
        self.plain == 0 && self.modifier == 0
    }
}

/// Lookup tables for plain key sequences and modifier chords
///
/// Plain keys live in an ordered map so prefix checks are a range scan.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    plain: BTreeMap<String, String>,
    modifier: HashMap<String, String>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a keybind section
    pub fn from_section(section: &KeybindSection, observer: &dyn KeyObserver) -> Self {
        let mut table = Self::new();
        table.reload(section, observer);
        table
    }

    /// Replace all bindings with the ones in `section`
    ///
    /// Key-specs wrapped in `@` are normalized and go into the modifier table;
    /// everything else is stored verbatim in the plain table.
    pub fn reload(&mut self, section: &KeybindSection, observer: &dyn KeyObserver) -> ReloadReport {
        self.plain.clear();
        self.modifier.clear();

        let mut report = ReloadReport::default();
        for (key, cmd) in section.iter() {
            match modifier_spec(key) {
                Some(spec) => match normalize_keystr(spec) {
                    Ok(keystr) => {
                        observer.debug(&format!("registered mod key: {} -> {}", keystr, cmd));
                        self.modifier.insert(keystr, cmd.to_string());
                    }
                    Err(e) => {
                        observer.warn(&format!("ignoring binding {} -> {}: {}", key, cmd, e));
                        report.skipped += 1;
                    }
                },
                None => {
                    observer.debug(&format!("registered key: {} -> {}", key, cmd));
                    self.plain.insert(key.to_string(), cmd.to_string());
                }
            }
        }

        if self.is_empty() {
            observer.warn("No keybindings defined!");
        }

        report.plain = self.plain.len();
        report.modifier = self.modifier.len();
        report
    }

    /// Exact lookup in the plain table
    pub fn lookup_plain(&self, keystring: &str) -> Option<&str> {
        self.plain.get(keystring).map(String::as_str)
    }

    /// Exact lookup in the modifier table (canonical chord notation)
    pub fn lookup_modifier(&self, keystring: &str) -> Option<&str> {
        self.modifier.get(keystring).map(String::as_str)
    }

    /// Check if some plain binding strictly extends `keystring`
    pub fn is_plain_prefix(&self, keystring: &str) -> bool {
        self.plain
            .range::<str, _>((Bound::Included(keystring), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(keystring))
            .any(|(k, _)| k.len() > keystring.len())
    }

    pub fn plain_len(&self) -> usize {
        self.plain.len()
    }

    pub fn modifier_len(&self) -> usize {
        self.modifier.len()
    }

    pub fn len(&self) -> usize {
        self.plain.len() + self.modifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.modifier.is_empty()
    }

    /// Plain bindings in key order
    pub fn iter_plain(&self) -> impl Iterator<Item = (&str, &str)> {
        self.plain.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Modifier bindings, in no particular order
    pub fn iter_modifier(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modifier.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The body of a `@...@` key-spec, or `None` for a plain key-spec
fn modifier_spec(key: &str) -> Option<&str> {
    key.strip_prefix(MODIFIER_DELIMITER)?
        .strip_suffix(MODIFIER_DELIMITER)
}
