//! Reads sentences line by line, parses them, and prints what came out

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::error::Result;
use crate::utils::token_list;
use crate::viewer::Viewer;

/// Margin that tree text is wrapped to
pub const DEFAULT_MARGIN: usize = 80;

/// Something that turns a sentence into parse trees
pub trait TreeParser {
  type Tree: RenderTree;

  /// All parses of `tokens`. Any trace output goes to `trace`.
  fn parse(&self, tokens: &[&str], trace: &mut dyn Write) -> io::Result<Vec<Self::Tree>>;
}

/// A tree that can be shown to a user
pub trait RenderTree {
  /// Bracketed text, wrapped to fit `margin` columns
  fn pformat(&self, margin: usize) -> String;

  /// A top-down picture of the tree
  fn draw(&self) -> String;
}

/// What happened to one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
  /// A comment or blank line
  Skipped,
  /// Parsed into this many trees
  Parsed(usize),
  Unparsed,
}

/// Counts over a whole run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub lines: usize,
  pub skipped: usize,
  pub parsed: usize,
  pub unparsed: usize,
}

impl Summary {
  fn record(&mut self, outcome: LineOutcome) {
    self.lines += 1;
    match outcome {
      LineOutcome::Skipped => self.skipped += 1,
      LineOutcome::Parsed(_) => self.parsed += 1,
      LineOutcome::Unparsed => self.unparsed += 1,
    }
  }
}

/// Unicode whitespace plus the ASCII file, group, record and unit separators
fn is_separator(c: char) -> bool {
  c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Splits a line into lowercase tokens. Returns None for comments (lines
/// starting with `#`) and lines with no tokens.
pub fn tokenize(line: &str) -> Option<Vec<String>> {
  if line.starts_with('#') {
    return None;
  }

  let tokens = line
    .to_lowercase()
    .split(is_separator)
    .filter(|token| !token.is_empty())
    .map(str::to_string)
    .collect::<Vec<_>>();

  if tokens.is_empty() { None } else { Some(tokens) }
}

pub struct LineProcessor<P> {
  parser: P,
  margin: usize,
  viewer: Option<Box<dyn Viewer>>,
}

impl<P: TreeParser> LineProcessor<P> {
  pub fn new(parser: P) -> Self {
    Self {
      parser,
      margin: DEFAULT_MARGIN,
      viewer: None,
    }
  }

  pub fn with_margin(mut self, margin: usize) -> Self {
    self.margin = margin;
    self
  }

  /// Show every tree in `viewer` after printing it
  pub fn with_viewer(mut self, viewer: Box<dyn Viewer>) -> Self {
    self.viewer = Some(viewer);
    self
  }

  /// Parses one line and writes its block of output to `out`
  pub fn process_line(&mut self, line: &str, out: &mut dyn Write) -> Result<LineOutcome> {
    let tokens = match tokenize(line) {
      Some(tokens) => tokens,
      None => return Ok(LineOutcome::Skipped),
    };
    let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();

    let trees = self.parser.parse(&tokens, out)?;
    let shown = token_list(&tokens);
    writeln!(out, "*** {} ***", shown)?;

    let outcome = if trees.is_empty() {
      writeln!(out, "Could not parse {}", shown)?;
      LineOutcome::Unparsed
    } else {
      for tree in trees.iter() {
        writeln!(out, "{}", tree.pformat(self.margin))?;
        if let Some(viewer) = self.viewer.as_mut() {
          viewer.show(&tree.draw())?;
        }
      }
      LineOutcome::Parsed(trees.len())
    };

    writeln!(out, "\n")?;
    debug!(tokens = tokens.len(), ?outcome, "processed line");
    Ok(outcome)
  }

  /// Processes every line of `input` until it runs out
  pub fn run<R: BufRead>(&mut self, input: R, out: &mut dyn Write) -> Result<Summary> {
    let mut summary = Summary::default();
    for line in input.lines() {
      let outcome = self.process_line(&line?, out)?;
      summary.record(outcome);
    }
    out.flush()?;

    info!(
      lines = summary.lines,
      parsed = summary.parsed,
      unparsed = summary.unparsed,
      skipped = summary.skipped,
      "input finished"
    );
    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Accepts sentences that are a single repeated word
  struct Echo;

  struct Flat(Vec<String>);

  impl RenderTree for Flat {
    fn pformat(&self, _margin: usize) -> String {
      format!("(S {})", self.0.join(" "))
    }

    fn draw(&self) -> String {
      "S".to_string()
    }
  }

  impl TreeParser for Echo {
    type Tree = Flat;

    fn parse(&self, tokens: &[&str], _trace: &mut dyn Write) -> io::Result<Vec<Flat>> {
      if tokens.iter().all(|t| *t == tokens[0]) {
        Ok(vec![Flat(tokens.iter().map(|t| t.to_string()).collect())])
      } else {
        Ok(Vec::new())
      }
    }
  }

  fn process(input: &str) -> (String, Summary) {
    let mut out = Vec::new();
    let summary = LineProcessor::new(Echo)
      .run(input.as_bytes(), &mut out)
      .unwrap();
    (String::from_utf8(out).unwrap(), summary)
  }

  #[test]
  fn test_tokenize() {
    assert_eq!(tokenize("# nope"), None);
    assert_eq!(tokenize("   \t "), None);
    assert_eq!(tokenize(""), None);
    assert_eq!(
      tokenize("  The  CAT\tsat "),
      Some(vec!["the".to_string(), "cat".to_string(), "sat".to_string()])
    );
    assert_eq!(
      tokenize("a\u{1c}b\u{1f}\u{a0}c"),
      Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert_eq!(tokenize("\u{1e}\u{1d}"), None);
    // only a leading # makes a comment
    assert_eq!(
      tokenize(" # x"),
      Some(vec!["#".to_string(), "x".to_string()])
    );
  }

  #[test]
  fn test_skipped_lines_print_nothing() {
    let (out, summary) = process("# comment\n\n   \n");
    assert_eq!(out, "");
    assert_eq!(
      summary,
      Summary {
        lines: 3,
        skipped: 3,
        parsed: 0,
        unparsed: 0
      }
    );
  }

  #[test]
  fn test_blocks() {
    let (out, summary) = process("Buffalo buffalo\nno way\n");
    assert_eq!(
      out,
      "*** ['buffalo', 'buffalo'] ***\n(S buffalo buffalo)\n\n\n\
       *** ['no', 'way'] ***\nCould not parse ['no', 'way']\n\n\n"
    );
    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.unparsed, 1);
  }

  #[test]
  fn test_viewer_sees_each_tree() {
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Viewer for Recorder {
      fn show(&mut self, picture: &str) -> Result<()> {
        self.0.borrow_mut().push(picture.to_string());
        Ok(())
      }
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut processor = LineProcessor::new(Echo).with_viewer(Box::new(Recorder(seen.clone())));

    let mut out = Vec::new();
    processor.process_line("a a", &mut out).unwrap();
    processor.process_line("a b", &mut out).unwrap();

    assert_eq!(*seen.borrow(), vec!["S".to_string()]);
    // pictures don't end up in the text output
    let out = String::from_utf8(out).unwrap();
    assert_eq!(
      out,
      "*** ['a', 'a'] ***\n(S a a)\n\n\n*** ['a', 'b'] ***\nCould not parse ['a', 'b']\n\n\n"
    );
  }
}
