use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal::{self, ClearType},
};
use std::io::{self, Stdout, Write};

use crate::app::App;

/// Terminal handler responsible for rendering and input
pub struct Terminal {
    stdout: Stdout,
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor
    pub fn enter() -> anyhow::Result<Self> {
        let mut stdout = io::stdout();
        set_screen(&mut stdout, true)?;
        Ok(Self { stdout })
    }

    /// Draw the command log and the status row
    pub fn render(&mut self, app: &App) -> anyhow::Result<()> {
        let (width, height) = terminal::size()?;
        let width = width as usize;

        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetAttribute(Attribute::Bold),
            Print(truncate("keychain  (:quit or Ctrl-Q to exit, Esc cancels)", width)),
            SetAttribute(Attribute::Reset),
        )?;

        // Newest messages at the bottom, above the status row
        let rows = height.saturating_sub(3) as usize;
        let start = app.messages.len().saturating_sub(rows);
        for (i, message) in app.messages[start..].iter().enumerate() {
            queue!(
                self.stdout,
                cursor::MoveTo(0, (i + 2) as u16),
                Print(truncate(message, width)),
            )?;
        }

        let status = app.status_line();
        queue!(
            self.stdout,
            cursor::MoveTo(0, height.saturating_sub(1)),
            ResetColor,
            Print(truncate(&status, width)),
        )?;

        if app.host.cmdline.is_active() {
            let col = app.host.cmdline.input[..app.host.cmdline.cursor].chars().count();
            queue!(
                self.stdout,
                cursor::MoveTo(col as u16, height.saturating_sub(1)),
                cursor::Show,
            )?;
        } else {
            queue!(self.stdout, cursor::Hide)?;
        }

        self.stdout.flush()?;
        Ok(())
    }

    /// Block until a key is pressed or the screen needs redrawing
    ///
    /// Returns `None` on resize so the caller re-renders before reading again.
    pub fn read_key(&self) -> anyhow::Result<Option<KeyEvent>> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(Some(key)),
                Event::Resize(..) => return Ok(None),
                _ => {}
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = set_screen(&mut self.stdout, false);
    }
}

/// Switch between the interactive screen and the shell's normal one
fn set_screen(stdout: &mut Stdout, active: bool) -> io::Result<()> {
    if active {
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)
    } else {
        execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
