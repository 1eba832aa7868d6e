//! Keychain interpreter
//!
//! Turns a stream of key events into command executions. Keys accumulate
//! into a keystring (optionally behind a numeric count) until the keystring
//! matches a binding exactly, stops being the prefix of any binding, or a
//! modifier chord arrives.

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::bindings::{BindingTable, ReloadReport};
use crate::config::{ConfigChange, Settings, KEYBIND_SECTION};
use crate::dispatch::{run_or_fill, CommandExecutor, Dispatched, StatusBar};
use crate::error::CommandError;
use crate::keys::{key_text, Chord};
use crate::observer::{KeyObserver, TracingObserver};

/// Characters that open the command line (`:`) or a search (`/`, `?`)
/// when typed with nothing pending
pub const STARTCHARS: [char; 3] = [':', '/', '?'];

/// Whether a keychain is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Nothing typed, no count
    Idle,
    /// A keystring and/or a count is pending
    Accumulating,
}

/// Result of handling one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatch {
    /// The event had no printable text and no chord; nothing changed
    Ignored,
    /// A start character was sent to the status line
    StatusText(char),
    /// A digit was added to the pending count
    Count(usize),
    /// The keystring is a prefix of a longer binding; waiting for more keys
    Partial,
    /// A binding matched and was dispatched
    Definitive(Dispatched),
    /// Nothing matches; the pending keystring was dropped
    None,
}

/// Interpreter for keychains bound to command strings
pub struct CommandKeyParser {
    bindings: BindingTable,
    keystring: String,
    count: Option<usize>,
    supports_count: bool,
    observer: Box<dyn KeyObserver>,
}

impl CommandKeyParser {
    /// Create a parser from settings, logging through `tracing`
    pub fn new(settings: &Settings) -> Self {
        Self::with_observer(settings, Box::new(TracingObserver))
    }

    pub fn with_observer(settings: &Settings, observer: Box<dyn KeyObserver>) -> Self {
        let mut parser = Self {
            bindings: BindingTable::new(),
            keystring: String::new(),
            count: None,
            supports_count: settings.input.supports_count,
            observer,
        };
        parser.read_config(settings);
        parser
    }

    /// Re-read the key bindings from `settings`
    pub fn read_config(&mut self, settings: &Settings) -> ReloadReport {
        self.reset();
        self.bindings.reload(&settings.keybind, self.observer.as_ref())
    }

    /// React to a config change; only the keybind section triggers a reload
    pub fn on_config_changed(
        &mut self,
        change: &ConfigChange,
        settings: &Settings,
    ) -> Option<ReloadReport> {
        if change.section == KEYBIND_SECTION {
            Some(self.read_config(settings))
        } else {
            None
        }
    }

    /// Handle a single key event
    ///
    /// Errors are only returned for executor failures other than an
    /// unknown command or a wrong argument count. The pending keychain is
    /// already reset when that happens.
    pub fn handle<H>(&mut self, key: &KeyEvent, host: &mut H) -> Result<KeyMatch, CommandError>
    where
        H: CommandExecutor + StatusBar + ?Sized,
    {
        if key.kind == KeyEventKind::Release {
            return Ok(KeyMatch::Ignored);
        }

        if let Some(chord) = Chord::from_key_event(key) {
            return self.handle_modifier_key(&chord, host);
        }

        match key_text(key) {
            Some(text) => self.handle_single_key(&text, host),
            None => Ok(KeyMatch::Ignored),
        }
    }

    /// Run a complete command string, e.g. one submitted from the command line
    ///
    /// Unlike keychain dispatch, an unknown command is returned as an error.
    pub fn execute<H>(
        &mut self,
        cmdstr: &str,
        count: Option<usize>,
        host: &mut H,
    ) -> Result<Dispatched, CommandError>
    where
        H: CommandExecutor + StatusBar + ?Sized,
    {
        run_or_fill(host, cmdstr, count, false, self.observer.as_ref())
    }

    /// Drop the pending keystring and count
    pub fn reset(&mut self) {
        self.keystring.clear();
        self.count = None;
    }

    pub fn keystring(&self) -> &str {
        &self.keystring
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn state(&self) -> ParserState {
        if self.keystring.is_empty() && self.count.is_none() {
            ParserState::Idle
        } else {
            ParserState::Accumulating
        }
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn supports_count(&self) -> bool {
        self.supports_count
    }

    pub fn set_supports_count(&mut self, supports_count: bool) {
        self.supports_count = supports_count;
        if !supports_count {
            self.count = None;
        }
    }

    fn handle_modifier_key<H>(&mut self, chord: &Chord, host: &mut H) -> Result<KeyMatch, CommandError>
    where
        H: CommandExecutor + StatusBar + ?Sized,
    {
        let keystr = chord.to_string();
        let count = self.count;
        self.reset();

        let Some(cmdstr) = self.bindings.lookup_modifier(&keystr).map(str::to_string) else {
            self.observer.debug(&format!("No binding for modifier key {}", keystr));
            return Ok(KeyMatch::None);
        };

        self.dispatch(&cmdstr, count, host)
    }

    fn handle_single_key<H>(&mut self, text: &str, host: &mut H) -> Result<KeyMatch, CommandError>
    where
        H: CommandExecutor + StatusBar + ?Sized,
    {
        if self.keystring.is_empty() {
            if let Some(c) = startchar(text) {
                self.count = None;
                host.set_cmd_text(text);
                return Ok(KeyMatch::StatusText(c));
            }

            if self.supports_count {
                if let Some(digit) = single_digit(text) {
                    let count = self.count.unwrap_or(0).saturating_mul(10).saturating_add(digit);
                    self.count = Some(count);
                    return Ok(KeyMatch::Count(count));
                }
            }
        }

        self.keystring.push_str(text);

        if let Some(cmdstr) = self.bindings.lookup_plain(&self.keystring).map(str::to_string) {
            let count = self.count;
            self.reset();
            return self.dispatch(&cmdstr, count, host);
        }

        if self.bindings.is_plain_prefix(&self.keystring) {
            self.observer
                .debug(&format!("No match for {} (added {})", self.keystring, text));
            return Ok(KeyMatch::Partial);
        }

        self.observer
            .debug(&format!("Giving up with {}, no matches", self.keystring));
        self.reset();
        Ok(KeyMatch::None)
    }

    fn dispatch<H>(
        &mut self,
        cmdstr: &str,
        count: Option<usize>,
        host: &mut H,
    ) -> Result<KeyMatch, CommandError>
    where
        H: CommandExecutor + StatusBar + ?Sized,
    {
        run_or_fill(host, cmdstr, count, true, self.observer.as_ref()).map(KeyMatch::Definitive)
    }
}

impl std::fmt::Debug for CommandKeyParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandKeyParser")
            .field("bindings", &self.bindings)
            .field("keystring", &self.keystring)
            .field("count", &self.count)
            .field("supports_count", &self.supports_count)
            .finish_non_exhaustive()
    }
}

fn startchar(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if STARTCHARS.contains(&c) => Some(c),
        _ => None,
    }
}

fn single_digit(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).map(|d| d as usize),
        _ => None,
    }
}
