use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};

use tracing::warn;

use crate::error::Result;

/// Shows a drawn tree to the user, possibly waiting for them to dismiss it.
/// Pictures stay out of the parser's text output.
pub trait Viewer {
  fn show(&mut self, picture: &str) -> Result<()>;
}

/// Shows trees on the controlling terminal and waits for Enter there.
/// Standard input carries sentences and standard output carries the text
/// results, so both the picture and the keypress go through /dev/tty.
pub struct TerminalViewer {
  tty: Option<BufReader<File>>,
}

impl TerminalViewer {
  pub fn new() -> Self {
    let tty = match OpenOptions::new().read(true).write(true).open("/dev/tty") {
      Ok(file) => Some(BufReader::new(file)),
      Err(err) => {
        warn!(%err, "no terminal to draw on, drawn trees go to stderr");
        None
      }
    };

    Self { tty }
  }
}

impl Default for TerminalViewer {
  fn default() -> Self {
    Self::new()
  }
}

impl Viewer for TerminalViewer {
  fn show(&mut self, picture: &str) -> Result<()> {
    let tty = match self.tty.as_mut() {
      Some(tty) => tty,
      None => {
        writeln!(io::stderr(), "{}", picture)?;
        return Ok(());
      }
    };

    let screen = tty.get_mut();
    writeln!(screen, "{}", picture)?;
    write!(screen, "(press Enter to continue)")?;
    screen.flush()?;

    let mut line = String::new();
    if tty.read_line(&mut line)? == 0 {
      warn!("terminal closed, drawn trees go to stderr");
      self.tty = None;
    }
    Ok(())
  }
}
