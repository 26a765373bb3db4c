//! Command-line interface and REPL

use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

use crate::selector::Mode;
use crate::surface::{Control, GRID_SIZE, NAV_BUTTON_COUNT, SIDE_BUTTON_COUNT};

/// Parsed REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Press(Control),
    Release(Control),
    /// Press and release immediately
    Tap(Control),
    /// Press and release after the hold threshold
    Hold(Control),
    Mode(Mode),
    Show,
    State,
    Disconnect,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  press <target>     button down
  release <target>   button up
  tap <target>       short press
  hold <target>      press past the hold threshold
  mode <name|index>  session, user1, user2, mixer (or 0-3)
  show               draw the surface
  state              selector state as JSON
  disconnect         tear the selector down
  help, quit

Targets:
  <col>,<row>  grid pad (0-7)
  s<N>         side/scene button (s7 arms delete)
  n<N>         navigation button (0 up, 1 down, 2 left, 3 right)
  m<N>         mode button (m0 session/zoom)";

/// Parse a button reference like `3,4`, `s2`, `n0` or `m3`
pub fn parse_target(token: &str) -> Result<Control> {
    let token = token.trim().to_ascii_lowercase();

    if let Some((col, row)) = token.split_once(',') {
        let col: usize = col.trim().parse().context("Invalid grid column")?;
        let row: usize = row.trim().parse().context("Invalid grid row")?;
        if col >= GRID_SIZE || row >= GRID_SIZE {
            bail!("Grid position {},{} out of range (0-{})", col, row, GRID_SIZE - 1);
        }
        return Ok(Control::Matrix { col, row });
    }

    let (prefix, rest) = token.split_at(token.chars().next().map_or(0, char::len_utf8));
    let index: usize = rest
        .parse()
        .with_context(|| format!("Invalid button '{}'", token))?;
    let (control, count) = match prefix {
        "s" => (Control::Side(index), SIDE_BUTTON_COUNT),
        "n" => (Control::Nav(index), NAV_BUTTON_COUNT),
        "m" => (Control::ModeButton(index), Mode::COUNT),
        _ => bail!("Unknown button '{}' (try 3,4 / s2 / n0 / m3)", token),
    };
    if index >= count {
        bail!("Button '{}' out of range (0-{})", token, count - 1);
    }
    Ok(control)
}

/// Parse one REPL line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("Too many arguments");
    }

    let target = || -> Result<Control> {
        parse_target(arg.ok_or_else(|| anyhow!("'{}' needs a button", verb))?)
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "press" | "p" => ReplCommand::Press(target()?),
        "release" | "r" => ReplCommand::Release(target()?),
        "tap" | "t" => ReplCommand::Tap(target()?),
        "hold" | "h" => ReplCommand::Hold(target()?),
        "mode" => ReplCommand::Mode(
            arg.ok_or_else(|| anyhow!("'mode' needs a mode name"))?
                .parse()?,
        ),
        "show" | "s" => ReplCommand::Show,
        "state" => ReplCommand::State,
        "disconnect" => ReplCommand::Disconnect,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => bail!("Unknown command '{}' (type 'help')", other),
    };
    Ok(Some(command))
}

/// Run the line editor on its own thread, forwarding parsed commands.
///
/// The thread sends `Quit` on EOF or Ctrl+C and exits once the receiver is gone.
pub fn spawn_repl(tx: mpsc::UnboundedSender<ReplCommand>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("{} {}", "failed to start line editor:".red().bold(), e);
                let _ = tx.send(ReplCommand::Quit);
                return;
            }
        };
        run_editor(&mut rl, &tx);
    })
}

fn run_editor(rl: &mut DefaultEditor, tx: &mpsc::UnboundedSender<ReplCommand>) {
    loop {
        match rl.readline("launchpad> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_command(&line) {
                    Ok(Some(command)) => {
                        let quit = command == ReplCommand::Quit;
                        if tx.send(command).is_err() || quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                let _ = tx.send(ReplCommand::Quit);
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "readline error:".red().bold(), e);
                let _ = tx.send(ReplCommand::Quit);
                break;
            }
        }
    }
}
