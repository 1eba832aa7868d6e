pub mod app;
pub mod bindings;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod logging;
pub mod observer;
pub mod parser;
pub mod terminal;

pub use bindings::{BindingTable, ReloadReport};
pub use config::{load_config, ConfigChange, KeybindSection, Settings};
pub use dispatch::{run_or_fill, CommandExecutor, Dispatched, StatusBar};
pub use error::{CommandError, ConfigError, KeySpecError};
pub use keys::{normalize_keystr, Chord};
pub use observer::{KeyObserver, NullObserver, TracingObserver};
pub use parser::{CommandKeyParser, KeyMatch, ParserState, STARTCHARS};
pub use terminal::Terminal;
