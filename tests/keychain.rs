//! End-to-end behaviour of the keychain interpreter through the public API

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keychain::commands::{CommandLine, CommandRegistry, Invocation};
use keychain::config::{load_config_from, parse_config};
use keychain::{
    CommandError, CommandExecutor, CommandKeyParser, ConfigChange, ConfigError, Dispatched,
    KeyMatch, KeyObserver, Settings, StatusBar,
};

/// Registry plus command line, the way a host wires them
struct Host {
    registry: CommandRegistry,
    cmdline: CommandLine,
    status_updates: usize,
}

impl Host {
    fn new() -> Self {
        let mut registry = CommandRegistry::new();
        registry
            .register("scroll-top", 0, Some(0))
            .register("scroll-top-partial", 0, Some(0))
            .register("open", 1, Some(1))
            .register("scroll", 2, Some(2))
            .register("tabopen", 0, Some(1));
        Self {
            registry,
            cmdline: CommandLine::new(),
            status_updates: 0,
        }
    }

    fn ran(&mut self) -> Vec<String> {
        self.registry
            .take_invocations()
            .into_iter()
            .map(|Invocation { name, .. }| name)
            .collect()
    }
}

impl CommandExecutor for Host {
    fn run(&mut self, cmdstr: &str, count: Option<usize>) -> Result<(), CommandError> {
        self.registry.run(cmdstr, count)
    }
}

impl StatusBar for Host {
    fn set_cmd_text(&mut self, text: &str) {
        self.status_updates += 1;
        self.cmdline.set_cmd_text(text);
    }
}

#[derive(Clone, Default)]
struct Warnings(Rc<RefCell<Vec<String>>>);

impl KeyObserver for Warnings {
    fn debug(&self, _message: &str) {}

    fn warn(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

fn settings(toml: &str) -> Settings {
    parse_config(toml).unwrap()
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn type_keys(parser: &mut CommandKeyParser, host: &mut Host, keys: &str) -> Vec<KeyMatch> {
    keys.chars()
        .map(|c| parser.handle(&key(c), host).unwrap())
        .collect()
}

#[test]
fn test_modifier_and_plain_tables_from_toml() {
    let settings = settings(
        r#"
[keybind]
gg = "scroll-top"
"@ctrl-t@" = "tabopen"
"@Control+Shift+Tab@" = "tabprev"
"#,
    );
    let parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let table = parser.bindings();

    assert_eq!(table.lookup_plain("gg"), Some("scroll-top"));
    assert_eq!(table.lookup_modifier("Ctrl+T"), Some("tabopen"));
    assert_eq!(table.lookup_modifier("Ctrl+Shift+Tab"), Some("tabprev"));
    assert_eq!(table.lookup_plain("@ctrl-t@"), None);
    assert_eq!(table.lookup_plain("Ctrl+T"), None);
    assert_eq!(table.lookup_modifier("gg"), None);
}

#[test]
fn test_second_key_completes_chain() {
    let settings = settings("[keybind]\ngg = \"scroll-top\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    type_keys(&mut parser, &mut host, "g");
    assert!(host.ran().is_empty());
    type_keys(&mut parser, &mut host, "g");
    assert_eq!(host.ran(), vec!["scroll-top"]);
}

#[test]
fn test_shorter_binding_wins_immediately() {
    let settings = settings(
        r#"
[keybind]
g = "scroll-top-partial"
gg = "scroll-top"
"#,
    );
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    let results = type_keys(&mut parser, &mut host, "g");
    assert_eq!(results, vec![KeyMatch::Definitive(Dispatched::Executed)]);
    assert_eq!(host.ran(), vec!["scroll-top-partial"]);
    assert_eq!(parser.keystring(), "");
}

#[test]
fn test_dead_end_no_dispatch() {
    let settings = settings("[keybind]\ngg = \"scroll-top\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    let results = type_keys(&mut parser, &mut host, "gx");
    assert_eq!(results.last(), Some(&KeyMatch::None));
    assert!(host.ran().is_empty());
    assert_eq!(host.status_updates, 0);
    assert_eq!(parser.keystring(), "");
}

#[test]
fn test_empty_table_warns_once_per_reload() {
    let warnings = Warnings::default();
    let settings = settings("");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(warnings.clone()));
    let mut host = Host::new();

    let results = type_keys(&mut parser, &mut host, "abcgg");
    assert!(results.iter().all(|r| *r == KeyMatch::None));
    assert!(host.ran().is_empty());
    assert_eq!(warnings.0.borrow().len(), 1);

    parser.on_config_changed(&ConfigChange::new("keybind", "gg"), &settings);
    assert_eq!(warnings.0.borrow().len(), 2);
}

#[test]
fn test_colon_opens_command_line() {
    let settings = settings("[keybind]\ngg = \"scroll-top\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    parser.handle(&key(':'), &mut host).unwrap();
    assert_eq!(host.cmdline.display(), ":");
    assert_eq!(host.status_updates, 1);
    assert_eq!(parser.keystring(), "");
}

#[test]
fn test_missing_argument_fills_command_line() {
    let settings = settings("[keybind]\no = \"open\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    let result = parser.handle(&key('o'), &mut host).unwrap();
    assert_eq!(result, KeyMatch::Definitive(Dispatched::Filled(":open ".to_string())));
    assert_eq!(host.cmdline.display(), ":open ");
}

#[test]
fn test_unknown_command_silent_vs_explicit() {
    let settings = settings("[keybind]\nx = \"no-such-thing\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    let result = parser.handle(&key('x'), &mut host).unwrap();
    assert_eq!(result, KeyMatch::Definitive(Dispatched::Ignored));
    assert_eq!(host.status_updates, 0);

    let err = parser.execute("no-such-thing", None, &mut host).unwrap_err();
    assert_eq!(err.to_string(), "no such command: no-such-thing");
}

#[test]
fn test_modifier_chord_with_count() {
    let settings = settings("[keybind]\n\"@ctrl-t@\" = \"tabopen\"\n");
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let mut host = Host::new();

    type_keys(&mut parser, &mut host, "2");
    parser
        .handle(&KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL), &mut host)
        .unwrap();

    assert_eq!(
        host.registry.take_invocations(),
        vec![Invocation {
            name: "tabopen".to_string(),
            args: vec![],
            count: Some(2),
        }]
    );
}

#[test]
fn test_reload_twice_same_behaviour() {
    let settings = settings(
        r#"
[keybind]
gg = "scroll-top"
j = "scroll 0 40"
"@ctrl-t@" = "tabopen"
"#,
    );
    let mut parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    let before: Vec<(String, String)> = parser
        .bindings()
        .iter_plain()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    parser.read_config(&settings);
    parser.read_config(&settings);
    let after: Vec<(String, String)> = parser
        .bindings()
        .iter_plain()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    assert_eq!(before, after);

    let fresh = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    for keystr in ["g", "gg", "j", "x", "Ctrl+T", "Ctrl+G"] {
        assert_eq!(
            parser.bindings().lookup_plain(keystr),
            fresh.bindings().lookup_plain(keystr)
        );
        assert_eq!(
            parser.bindings().lookup_modifier(keystr),
            fresh.bindings().lookup_modifier(keystr)
        );
        assert_eq!(
            parser.bindings().is_plain_prefix(keystr),
            fresh.bindings().is_plain_prefix(keystr)
        );
    }
    assert_eq!(parser.bindings().lookup_modifier("Ctrl+T"), Some("tabopen"));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[input]\nsupports_count = false\n\n[keybind]\nzz = \"scroll 0 0\"").unwrap();

    let settings = load_config_from(file.path()).unwrap();
    assert!(!settings.input.supports_count);
    assert_eq!(settings.keybind.get("zz"), Some("scroll 0 0"));

    let parser = CommandKeyParser::with_observer(&settings, Box::new(Warnings::default()));
    assert!(!parser.supports_count());
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_from(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
