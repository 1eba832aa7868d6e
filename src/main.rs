use std::env;
use std::path::PathBuf;

use keychain::app::App;
use keychain::config::{config_path, load_config, load_config_from};
use keychain::{logging, Terminal};

fn main() -> anyhow::Result<()> {
    logging::init();

    // An explicit config file may be given as the first argument
    let (settings, path) = match env::args().nth(1).map(PathBuf::from) {
        Some(path) => (load_config_from(&path)?, Some(path)),
        None => (load_config(), config_path()),
    };
    tracing::info!(
        "starting with {} keybinding(s) from {:?}",
        settings.keybind.len(),
        path
    );

    let mut app = App::new(settings, path);
    let mut terminal = Terminal::enter()?;

    // Main event loop
    loop {
        terminal.render(&app)?;
        if app.should_quit {
            break;
        }

        if let Some(key) = terminal.read_key()? {
            app.handle_key(key);
        }
    }

    Ok(())
}
