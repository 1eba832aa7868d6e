//! Interactive host: routes keys to the keychain parser or the command line
//! and applies the commands that ran

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::path::PathBuf;

use crate::commands::{CommandLine, CommandRegistry, Invocation, Submission};
use crate::config::{load_config_from, ConfigChange, Settings, INPUT_SECTION};
use crate::dispatch::{CommandExecutor, StatusBar};
use crate::error::CommandError;
use crate::keys::has_modifier;
use crate::parser::CommandKeyParser;

/// How many executed commands the screen keeps
const MAX_MESSAGES: usize = 200;

/// Command executor and status line handed to the parser
#[derive(Debug, Default)]
pub struct Host {
    pub registry: CommandRegistry,
    pub cmdline: CommandLine,
}

impl CommandExecutor for Host {
    fn run(&mut self, cmdstr: &str, count: Option<usize>) -> Result<(), CommandError> {
        self.registry.run(cmdstr, count)
    }
}

impl StatusBar for Host {
    fn set_cmd_text(&mut self, text: &str) {
        self.cmdline.set_cmd_text(text);
    }
}

/// Commands the demo host understands
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register("open", 1, Some(1))
        .register("open-current", 0, Some(0))
        .register("tabopen", 0, Some(1))
        .register("tabclose", 0, Some(0))
        .register("tabnext", 0, Some(0))
        .register("tabprev", 0, Some(0))
        .register("reload", 0, Some(0))
        .register("back", 0, Some(0))
        .register("forward", 0, Some(0))
        .register("scroll", 2, Some(2))
        .register("scroll-perc-y", 0, Some(1))
        .register("undo", 0, Some(0))
        .register("yank", 0, Some(0))
        .register("search-next", 0, Some(0))
        .register("search-prev", 0, Some(0))
        .register("echo", 0, None)
        .register("config-reload", 0, Some(0))
        .register("quit", 0, Some(0));
    registry
}

/// Application state
#[derive(Debug)]
pub struct App {
    pub parser: CommandKeyParser,
    pub host: Host,
    pub settings: Settings,
    /// Executed commands, oldest first
    pub messages: Vec<String>,
    /// Error or info shown on the status row while the command line is empty
    pub status: Option<String>,
    pub should_quit: bool,
    config_path: Option<PathBuf>,
}

impl App {
    pub fn new(settings: Settings, config_path: Option<PathBuf>) -> Self {
        Self::with_parser(CommandKeyParser::new(&settings), settings, config_path)
    }

    pub fn with_parser(
        parser: CommandKeyParser,
        settings: Settings,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            parser,
            host: Host {
                registry: default_registry(),
                cmdline: CommandLine::new(),
            },
            settings,
            messages: Vec::new(),
            status: None,
            should_quit: false,
            config_path,
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if self.host.cmdline.is_active() {
            self.handle_cmdline_key(key);
        } else {
            self.handle_normal_key(key);
        }

        for invocation in self.host.registry.take_invocations() {
            self.apply(invocation);
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.parser.reset();
            self.status = None;
            return;
        }

        self.status = None;
        if let Err(e) = self.parser.handle(&key, &mut self.host) {
            self.status = Some(format!("Error: {}", e));
        }
    }

    fn handle_cmdline_key(&mut self, key: KeyEvent) {
        let cmdline = &mut self.host.cmdline;
        match key.code {
            KeyCode::Esc => cmdline.clear(),
            KeyCode::Enter => {
                if let Some(submission) = cmdline.submit() {
                    self.submit(submission);
                }
            }
            KeyCode::Backspace => cmdline.delete_char_before(),
            KeyCode::Delete => cmdline.delete_char_at(),
            KeyCode::Left => cmdline.move_left(),
            KeyCode::Right => cmdline.move_right(),
            KeyCode::Home => cmdline.move_to_start(),
            KeyCode::End => cmdline.move_to_end(),
            KeyCode::Up => cmdline.history_prev(),
            KeyCode::Down => cmdline.history_next(),
            // Chords are not text; Ctrl-Q must not type a 'q'
            KeyCode::Char(c) if !has_modifier(&key) => cmdline.insert_char(c),
            _ => {}
        }
    }

    fn submit(&mut self, submission: Submission) {
        match submission {
            Submission::Command(cmdstr) => {
                if let Err(e) = self.parser.execute(&cmdstr, None, &mut self.host) {
                    self.status = Some(format!("Error: {}", e));
                }
            }
            Submission::SearchForward(pattern) => self.push_message(format!("search /{}", pattern)),
            Submission::SearchBackward(pattern) => {
                self.push_message(format!("search ?{}", pattern))
            }
        }
    }

    fn apply(&mut self, invocation: Invocation) {
        match invocation.name.as_str() {
            "quit" => self.should_quit = true,
            "config-reload" => self.reload_config(),
            _ => {
                let mut line = invocation.name.clone();
                for arg in &invocation.args {
                    line.push(' ');
                    line.push_str(arg);
                }
                if let Some(count) = invocation.count {
                    line.push_str(&format!(" (count {})", count));
                }
                self.push_message(line);
            }
        }
    }

    /// Re-read the config file and notify the parser of what changed
    pub fn reload_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.status = Some("No config file".to_string());
            return;
        };

        match load_config_from(&path) {
            Ok(settings) => {
                let changes = settings.changes_from(&self.settings);
                self.settings = settings;
                self.apply_config_changes(&changes);
                self.status = Some(format!("Config reloaded ({} change(s))", changes.len()));
            }
            Err(e) => self.status = Some(format!("Error: {}", e)),
        }
    }

    /// Deliver change notifications; a burst of keybind changes reloads once
    pub fn apply_config_changes(&mut self, changes: &[ConfigChange]) {
        let mut reloaded = false;
        for change in changes {
            if change.section == INPUT_SECTION {
                self.parser
                    .set_supports_count(self.settings.input.supports_count);
            } else if !reloaded {
                reloaded = self
                    .parser
                    .on_config_changed(change, &self.settings)
                    .is_some();
            }
        }
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }

    /// Text for the status row: command line, else status, else pending keys
    pub fn status_line(&self) -> String {
        if self.host.cmdline.is_active() {
            return self.host.cmdline.display().to_string();
        }
        if let Some(ref status) = self.status {
            return status.clone();
        }

        let mut pending = String::new();
        if let Some(count) = self.parser.count() {
            pending.push_str(&count.to_string());
        }
        pending.push_str(self.parser.keystring());
        pending
    }
}
