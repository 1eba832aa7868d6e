//! Configuration for the keychain interpreter
//!
//! Loads settings from ~/.config/keychain/config.toml

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the config section holding key bindings
pub const KEYBIND_SECTION: &str = "keybind";

/// Name of the config section holding input settings
pub const INPUT_SECTION: &str = "input";

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub keybind: KeybindSection,
}

impl Settings {
    /// Options that differ between `old` and `self`, as change notifications
    pub fn changes_from(&self, old: &Settings) -> Vec<ConfigChange> {
        let mut changes = Vec::new();

        if self.input.supports_count != old.input.supports_count {
            changes.push(ConfigChange::new(INPUT_SECTION, "supports_count"));
        }

        for (key, cmd) in self.keybind.iter() {
            if old.keybind.get(key) != Some(cmd) {
                changes.push(ConfigChange::new(KEYBIND_SECTION, key));
            }
        }
        for (key, _) in old.keybind.iter() {
            if self.keybind.get(key).is_none() {
                changes.push(ConfigChange::new(KEYBIND_SECTION, key));
            }
        }

        changes
    }
}

/// Input handling settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Accept a leading numeric count before a keychain (default: true)
    pub supports_count: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            supports_count: true,
        }
    }
}

/// The `[keybind]` section: key-spec -> command string, in file order
///
/// Key-specs wrapped in `@` (e.g. `"@ctrl-q@"`) are modifier chords,
/// everything else is a literal key sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeybindSection {
    entries: Vec<(String, String)>,
}

impl KeybindSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, replacing an earlier one with the same key-spec
    pub fn insert(&mut self, key: impl Into<String>, command: impl Into<String>) {
        let key = key.into();
        let command = command.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = command,
            None => self.entries.push((key, command)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cmd)| cmd.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeybindSection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut section = Self::new();
        for (key, command) in iter {
            section.insert(key, command);
        }
        section
    }
}

impl<'de> Deserialize<'de> for KeybindSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = KeybindSection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of key = \"command\" pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut section = KeybindSection::new();
                while let Some((key, command)) = map.next_entry::<String, String>()? {
                    section.insert(key, command);
                }
                Ok(section)
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

/// A single option changed in the configuration store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub section: String,
    pub option: String,
}

impl ConfigChange {
    pub fn new(section: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            option: option.into(),
        }
    }
}

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("keychain").join("config.toml"))
}

/// Get the directory log files are written to
pub fn logs_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("keychain").join("logs"))
}

/// Default config file template with documentation
pub fn default_config_template() -> &'static str {
    r#"# keychain configuration
# Location: ~/.config/keychain/config.toml

[input]
supports_count = true      # Allow a numeric count before a keychain (e.g. 5j)

# ============================================================================
# KEY BINDINGS
# ============================================================================
# key sequence = "command [args]"
#
# Plain keys are typed one after another: gg = "scroll-perc-y 0"
# Modifier chords are wrapped in @: "@ctrl-q@" = "quit"
#   Modifiers: ctrl/control, alt/mod1, meta/windows/mod4, shift
#
# A command that is missing its arguments (e.g. "open") is put on the
# command line instead, so you can type the rest.
#
# :, / and ? always start the command line / a search when nothing is typed.
[keybind]
o = "open"
go = "open-current"
O = "tabopen"
d = "tabclose"
J = "tabnext"
K = "tabprev"
r = "reload"
H = "back"
L = "forward"
gg = "scroll-perc-y 0"
G = "scroll-perc-y"
j = "scroll 0 40"
k = "scroll 0 -40"
h = "scroll -50 0"
l = "scroll 50 0"
u = "undo"
yy = "yank"
n = "search-next"
N = "search-prev"
"@ctrl-q@" = "quit"
"@ctrl-t@" = "tabopen"
"@ctrl-w@" = "tabclose"
"#
}

/// Ensure config directory and template file exist
fn ensure_config_exists(path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    if !path.exists() {
        let _ = std::fs::write(path, default_config_template());
    }
}

/// Parse settings from TOML text
pub fn parse_config(content: &str) -> Result<Settings, ConfigError> {
    Ok(toml::from_str::<Settings>(content)?)
}

/// Load settings from a specific file
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load settings from the config file
/// Returns the template's settings if the file can't be created or parsed
pub fn load_config() -> Settings {
    let Some(path) = config_path() else {
        tracing::warn!("{}", ConfigError::NoConfigDir);
        return default_settings();
    };

    ensure_config_exists(&path);

    match load_config_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            default_settings()
        }
    }
}

/// Settings described by the default template
pub fn default_settings() -> Settings {
    parse_config(default_config_template()).unwrap_or_default()
}
