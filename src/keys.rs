//! Key notation: printable text of key events and canonical modifier chords
//!
//! Modifier bindings are written as `@ctrl-a@`, `@Alt+F4@`, `@control-shift-tab@`
//! in the config. Both the config side and the key event side are reduced to
//! the same canonical notation (`Ctrl+A`, `Alt+F4`, `Ctrl+Shift+Tab`) so the
//! modifier table can be matched with plain string equality.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::KeySpecError;

/// Modifiers that turn a keypress into a chord (Shift alone does not)
const CHORD_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::META)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::HYPER);

/// A key combined with one or more modifiers, in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    modifiers: KeyModifiers,
    key: String,
}

impl Chord {
    /// Parse modifier notation such as `ctrl-a`, `Control+Shift+Tab` or `mod1-x`
    ///
    /// Separators `+` and `-` are interchangeable. Modifier names are
    /// case-insensitive; the key is upper-cased when it is a single character.
    pub fn parse(spec: &str) -> Result<Self, KeySpecError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(KeySpecError::Empty);
        }

        let (mods_part, key_part) = split_key(spec)?;
        if mods_part.is_empty() {
            return Err(KeySpecError::NoModifier(spec.to_string()));
        }

        let mut modifiers = KeyModifiers::NONE;
        for name in mods_part.split(is_separator) {
            modifiers |= parse_modifier(name).ok_or_else(|| KeySpecError::UnknownModifier {
                spec: spec.to_string(),
                modifier: name.to_string(),
            })?;
        }

        let key = parse_key_name(key_part).ok_or_else(|| KeySpecError::UnknownKey {
            spec: spec.to_string(),
            key: key_part.to_string(),
        })?;

        // Shift on a symbol is already part of the symbol itself
        if is_symbol(&key) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        if modifiers.intersection(CHORD_MODIFIERS).is_empty() {
            return Err(KeySpecError::NoModifier(spec.to_string()));
        }

        Ok(Self { modifiers, key })
    }

    /// Build the chord for a key event, if it carries a chord modifier
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if !has_modifier(event) {
            return None;
        }

        let mut modifiers = event.modifiers & (CHORD_MODIFIERS | KeyModifiers::SHIFT);
        if modifiers.contains(KeyModifiers::SUPER) || modifiers.contains(KeyModifiers::HYPER) {
            modifiers.remove(KeyModifiers::SUPER | KeyModifiers::HYPER);
            modifiers.insert(KeyModifiers::META);
        }

        let key = match event.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => {
                if c.is_alphabetic() {
                    if c.is_uppercase() {
                        modifiers.insert(KeyModifiers::SHIFT);
                    }
                } else {
                    modifiers.remove(KeyModifiers::SHIFT);
                }
                c.to_uppercase().collect()
            }
            KeyCode::BackTab => {
                modifiers.insert(KeyModifiers::SHIFT);
                "Tab".to_string()
            }
            KeyCode::F(n) => format!("F{}", n),
            code => named_key(code)?.to_string(),
        };

        Some(Self { modifiers, key })
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::META, "Meta"),
            (KeyModifiers::SHIFT, "Shift"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Normalize a modifier key-spec body into canonical chord notation
pub fn normalize_keystr(spec: &str) -> Result<String, KeySpecError> {
    Chord::parse(spec).map(|chord| chord.to_string())
}

/// Printable text of a key event, or `None` for whitespace and non-character keys
pub fn key_text(event: &KeyEvent) -> Option<String> {
    match event.code {
        KeyCode::Char(c) if !c.is_whitespace() && !c.is_control() => Some(c.to_string()),
        _ => None,
    }
}

/// Whether the event carries a chord modifier (Control, Alt, Meta/Super)
pub fn has_modifier(event: &KeyEvent) -> bool {
    event.modifiers.intersects(CHORD_MODIFIERS)
}

fn is_separator(c: char) -> bool {
    c == '+' || c == '-'
}

/// Split `mods<sep>key`, allowing the key itself to be `+` or `-`
fn split_key(spec: &str) -> Result<(&str, &str), KeySpecError> {
    let mut chars = spec.char_indices().rev();
    let Some((last_idx, last)) = chars.next() else {
        return Err(KeySpecError::Empty);
    };

    if is_separator(last) {
        return match chars.next() {
            Some((sep_idx, c)) if is_separator(c) => Ok((&spec[..sep_idx], &spec[last_idx..])),
            Some(_) => Err(KeySpecError::MissingKey(spec.to_string())),
            None => Ok(("", spec)),
        };
    }

    match spec.rfind(is_separator) {
        Some(idx) => Ok((&spec[..idx], &spec[idx + 1..])),
        None => Ok(("", spec)),
    }
}

fn parse_modifier(name: &str) -> Option<KeyModifiers> {
    match name.to_lowercase().as_str() {
        "ctrl" | "control" | "c" => Some(KeyModifiers::CONTROL),
        "alt" | "mod1" | "a" | "m" => Some(KeyModifiers::ALT),
        "meta" | "windows" | "win" | "mod4" | "super" | "cmd" => Some(KeyModifiers::META),
        "shift" | "s" => Some(KeyModifiers::SHIFT),
        _ => None,
    }
}

fn parse_key_name(name: &str) -> Option<String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c.to_uppercase().collect());
    }

    let lower = name.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=24).contains(&n) {
            return Some(format!("F{}", n));
        }
    }

    let canonical = match lower.as_str() {
        "cr" | "enter" | "return" => "Enter",
        "esc" | "escape" => "Esc",
        "tab" => "Tab",
        "bs" | "backspace" => "Backspace",
        "del" | "delete" => "Delete",
        "space" | "spc" => "Space",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "pageup" | "pgup" => "PageUp",
        "pagedown" | "pgdn" => "PageDown",
        "insert" | "ins" => "Insert",
        _ => return None,
    };
    Some(canonical.to_string())
}

fn named_key(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::Enter => Some("Enter"),
        KeyCode::Esc => Some("Esc"),
        KeyCode::Tab => Some("Tab"),
        KeyCode::Backspace => Some("Backspace"),
        KeyCode::Delete => Some("Delete"),
        KeyCode::Up => Some("Up"),
        KeyCode::Down => Some("Down"),
        KeyCode::Left => Some("Left"),
        KeyCode::Right => Some("Right"),
        KeyCode::Home => Some("Home"),
        KeyCode::End => Some("End"),
        KeyCode::PageUp => Some("PageUp"),
        KeyCode::PageDown => Some("PageDown"),
        KeyCode::Insert => Some("Insert"),
        _ => None,
    }
}

/// A single non-alphabetic character key such as `?` or `1`
fn is_symbol(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_keystr("ctrl-a").unwrap(), "Ctrl+A");
        assert_eq!(normalize_keystr("Control+a").unwrap(), "Ctrl+A");
        assert_eq!(normalize_keystr("Mod1-x").unwrap(), "Alt+X");
        assert_eq!(normalize_keystr("Windows-q").unwrap(), "Meta+Q");
        assert_eq!(normalize_keystr("mod4+q").unwrap(), "Meta+Q");
        assert_eq!(normalize_keystr("alt-f4").unwrap(), "Alt+F4");
    }

    #[test]
    fn test_normalize_orders_modifiers() {
        assert_eq!(normalize_keystr("shift-ctrl-tab").unwrap(), "Ctrl+Shift+Tab");
        assert_eq!(normalize_keystr("Meta+Alt+Ctrl+x").unwrap(), "Ctrl+Alt+Meta+X");
    }

    #[test]
    fn test_normalize_separator_as_key() {
        assert_eq!(normalize_keystr("ctrl--").unwrap(), "Ctrl+-");
        assert_eq!(normalize_keystr("ctrl++").unwrap(), "Ctrl++");
    }

    #[test]
    fn test_normalize_named_keys() {
        assert_eq!(normalize_keystr("ctrl-cr").unwrap(), "Ctrl+Enter");
        assert_eq!(normalize_keystr("alt-escape").unwrap(), "Alt+Esc");
        assert_eq!(normalize_keystr("ctrl-pgdn").unwrap(), "Ctrl+PageDown");
        assert_eq!(normalize_keystr("ctrl-space").unwrap(), "Ctrl+Space");
    }

    #[test]
    fn test_normalize_errors() {
        assert_eq!(normalize_keystr(""), Err(KeySpecError::Empty));
        assert!(matches!(normalize_keystr("a"), Err(KeySpecError::NoModifier(_))));
        assert!(matches!(normalize_keystr("shift-a"), Err(KeySpecError::NoModifier(_))));
        assert!(matches!(normalize_keystr("ctrl-"), Err(KeySpecError::MissingKey(_))));
        assert!(matches!(
            normalize_keystr("hyper-a"),
            Err(KeySpecError::UnknownModifier { .. })
        ));
        assert!(matches!(
            normalize_keystr("ctrl-nope"),
            Err(KeySpecError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_chord_from_event_matches_notation() {
        let chord = Chord::from_key_event(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(chord.to_string(), normalize_keystr("ctrl-a").unwrap());

        let chord = Chord::from_key_event(&key(
            KeyCode::Char('A'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ))
        .unwrap();
        assert_eq!(chord.to_string(), normalize_keystr("ctrl-shift-a").unwrap());

        let chord = Chord::from_key_event(&key(KeyCode::BackTab, KeyModifiers::CONTROL)).unwrap();
        assert_eq!(chord.to_string(), "Ctrl+Shift+Tab");

        let chord = Chord::from_key_event(&key(KeyCode::F(4), KeyModifiers::ALT)).unwrap();
        assert_eq!(chord.to_string(), "Alt+F4");
    }

    #[test]
    fn test_chord_from_event_shifted_symbol() {
        let chord = Chord::from_key_event(&key(
            KeyCode::Char('?'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ))
        .unwrap();
        assert_eq!(chord.to_string(), "Ctrl+?");
        assert_eq!(normalize_keystr("ctrl-shift-?").unwrap(), "Ctrl+?");
    }

    #[test]
    fn test_chord_from_event_super_is_meta() {
        let chord = Chord::from_key_event(&key(KeyCode::Char('q'), KeyModifiers::SUPER)).unwrap();
        assert_eq!(chord.to_string(), "Meta+Q");
        assert!(chord.modifiers().contains(KeyModifiers::META));
        assert_eq!(chord.key(), "Q");
    }

    #[test]
    fn test_no_chord_without_modifier() {
        assert!(Chord::from_key_event(&key(KeyCode::Char('a'), KeyModifiers::NONE)).is_none());
        assert!(Chord::from_key_event(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)).is_none());
    }

    #[test]
    fn test_key_text() {
        assert_eq!(key_text(&key(KeyCode::Char('g'), KeyModifiers::NONE)).as_deref(), Some("g"));
        assert_eq!(key_text(&key(KeyCode::Char('G'), KeyModifiers::SHIFT)).as_deref(), Some("G"));
        assert_eq!(key_text(&key(KeyCode::Char(':'), KeyModifiers::NONE)).as_deref(), Some(":"));
        assert_eq!(key_text(&key(KeyCode::Char(' '), KeyModifiers::NONE)), None);
        assert_eq!(key_text(&key(KeyCode::Enter, KeyModifiers::NONE)), None);
        assert_eq!(key_text(&key(KeyCode::Esc, KeyModifiers::NONE)), None);
    }
}
