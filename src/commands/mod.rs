//! Command line and a table-driven command executor
//!
//! The executor only knows command names and how many arguments they take.
//! What a command actually does is up to the host, which drains the recorded
//! [`Invocation`]s after each key.

use std::collections::HashMap;

use crate::dispatch::{CommandExecutor, StatusBar};
use crate::error::CommandError;

/// Name and arity of a registered command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub min_args: usize,
    /// `None` means any number of trailing arguments
    pub max_args: Option<usize>,
}

/// A command that passed name and argument checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
    pub count: Option<usize>,
}

/// Executor backed by a table of known commands
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
    invocations: Vec<Invocation>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command taking between `min_args` and `max_args` arguments
    pub fn register(&mut self, name: &str, min_args: usize, max_args: Option<usize>) -> &mut Self {
        self.commands.insert(
            name.to_string(),
            CommandSpec {
                name: name.to_string(),
                min_args,
                max_args,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Invocations recorded since the last call, oldest first
    pub fn take_invocations(&mut self) -> Vec<Invocation> {
        std::mem::take(&mut self.invocations)
    }
}

impl CommandExecutor for CommandRegistry {
    fn run(&mut self, cmdstr: &str, count: Option<usize>) -> Result<(), CommandError> {
        let mut parts = cmdstr.split_whitespace();
        let name = parts.next().unwrap_or("");
        let args: Vec<String> = parts.map(str::to_string).collect();

        let spec = self
            .commands
            .get(name)
            .ok_or_else(|| CommandError::NoSuchCommand(name.to_string()))?;

        let too_many = spec.max_args.is_some_and(|max| args.len() > max);
        if args.len() < spec.min_args || too_many {
            return Err(CommandError::ArgumentCount {
                command: name.to_string(),
                min: spec.min_args,
                max: spec.max_args,
                given: args.len(),
            });
        }

        self.invocations.push(Invocation {
            name: name.to_string(),
            args,
            count,
        });
        Ok(())
    }
}

/// What the user submitted from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// `:cmd args`
    Command(String),
    /// `/pattern`
    SearchForward(String),
    /// `?pattern`
    SearchBackward(String),
}

/// Command line state
///
/// The text includes its leading start character (`:`, `/` or `?`).
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    /// The current input buffer
    pub input: String,
    /// Cursor position in the input (byte offset)
    pub cursor: usize,
    /// Submitted lines, oldest first
    pub history: Vec<String>,
    /// Current position in history (for up/down navigation)
    pub history_index: Option<usize>,
    /// Saved input when browsing history
    pub saved_input: Option<String>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the command line currently holds input
    pub fn is_active(&self) -> bool {
        !self.input.is_empty()
    }

    /// Clear the command line
    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
        self.history_index = None;
        self.saved_input = None;
    }

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, ch: char) {
        self.input.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Delete character before cursor (backspace)
    ///
    /// Deleting the start character leaves the command line.
    pub fn delete_char_before(&mut self) {
        if let Some(ch) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
            self.input.remove(self.cursor);
        }
    }

    /// Delete character at cursor (delete key)
    pub fn delete_char_at(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    /// Move cursor left, never before the start character
    pub fn move_left(&mut self) {
        if let Some(ch) = self.input[..self.cursor].chars().next_back() {
            if self.cursor - ch.len_utf8() > 0 {
                self.cursor -= ch.len_utf8();
            }
        }
    }

    /// Move cursor right
    pub fn move_right(&mut self) {
        if let Some(ch) = self.input[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Move cursor to just after the start character
    pub fn move_to_start(&mut self) {
        self.cursor = self.input.chars().next().map_or(0, char::len_utf8);
    }

    /// Move cursor to end
    pub fn move_to_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Step back to the previous history entry that starts with what was
    /// typed before browsing began, so `:` recalls commands and `/` searches
    pub fn history_prev(&mut self) {
        let prefix = self.saved_input.as_deref().unwrap_or(&self.input);
        let end = self.history_index.unwrap_or(self.history.len());
        let Some(idx) = self.history[..end]
            .iter()
            .rposition(|entry| entry.starts_with(prefix))
        else {
            return;
        };

        if self.history_index.is_none() {
            self.saved_input = Some(self.input.clone());
        }
        self.history_index = Some(idx);
        self.input = self.history[idx].clone();
        self.cursor = self.input.len();
    }

    /// Step forward through matching entries, back to the typed text at the end
    pub fn history_next(&mut self) {
        let Some(current) = self.history_index else {
            return;
        };
        let prefix = self.saved_input.as_deref().unwrap_or_default();
        let next = self.history[current + 1..]
            .iter()
            .position(|entry| entry.starts_with(prefix))
            .map(|offset| current + 1 + offset);

        match next {
            Some(idx) => {
                self.history_index = Some(idx);
                self.input = self.history[idx].clone();
            }
            None => {
                self.history_index = None;
                if let Some(saved) = self.saved_input.take() {
                    self.input = saved;
                }
            }
        }
        self.cursor = self.input.len();
    }

    /// Add current input to history, clear it and return what was submitted
    pub fn submit(&mut self) -> Option<Submission> {
        let line = self.input.trim_end().to_string();
        self.clear();

        if self.history.last() != Some(&line) && line.chars().count() > 1 {
            self.history.push(line.clone());
        }

        let mut chars = line.chars();
        let start = chars.next()?;
        let rest = chars.as_str().trim().to_string();
        match start {
            ':' if !rest.is_empty() => Some(Submission::Command(rest)),
            '/' => Some(Submission::SearchForward(rest)),
            '?' => Some(Submission::SearchBackward(rest)),
            _ => None,
        }
    }

    /// Get display string
    pub fn display(&self) -> &str {
        &self.input
    }
}

impl StatusBar for CommandLine {
    fn set_cmd_text(&mut self, text: &str) {
        self.clear();
        self.input.push_str(text);
        self.cursor = self.input.len();
    }
}
