//! Running resolved command strings, or filling the command line when
//! arguments are missing

use crate::error::CommandError;
use crate::observer::KeyObserver;

/// Runs command strings on behalf of the interpreter
pub trait CommandExecutor {
    /// Run `cmdstr` (command name plus optional arguments) with an optional count
    fn run(&mut self, cmdstr: &str, count: Option<usize>) -> Result<(), CommandError>;
}

/// The status line the interpreter writes command text into
pub trait StatusBar {
    /// Replace the command-line text (e.g. `:` or `:open `)
    fn set_cmd_text(&mut self, text: &str);
}

/// What happened to a command string handed to [`run_or_fill`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The executor ran the command
    Executed,
    /// Unknown command, swallowed because the dispatch was silent
    Ignored,
    /// Arguments were missing; the status line was given this text
    Filled(String),
}

/// Run `cmdstr`, or put it on the command line if it needs more arguments
///
/// With `fail_silently`, an unknown command is dropped instead of returned
/// as an error. A wrong argument count is never an error: the status line
/// receives `:<cmdstr> ` so the user can type the rest. Any other executor
/// failure is returned unchanged.
pub fn run_or_fill<H>(
    host: &mut H,
    cmdstr: &str,
    count: Option<usize>,
    fail_silently: bool,
    observer: &dyn KeyObserver,
) -> Result<Dispatched, CommandError>
where
    H: CommandExecutor + StatusBar + ?Sized,
{
    match host.run(cmdstr, count) {
        Ok(()) => Ok(Dispatched::Executed),
        Err(CommandError::NoSuchCommand(name)) if fail_silently => {
            observer.debug(&format!("ignoring unknown command {}", name));
            Ok(Dispatched::Ignored)
        }
        Err(CommandError::ArgumentCount { .. }) => {
            observer.debug(&format!("Filling statusbar with partial command {}", cmdstr));
            let text = format!(":{} ", cmdstr);
            host.set_cmd_text(&text);
            Ok(Dispatched::Filled(text))
        }
        Err(e) => Err(e),
    }
}
