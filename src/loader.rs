use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::parse_grammar::parse_rules;

/// Start symbol used when the caller doesn't pick one
pub const DEFAULT_START: &str = "Sentence";

/// Reads each grammar file in order and combines all of their rules into one
/// grammar rooted at `start` (or `DEFAULT_START`). Rules keep their order,
/// files first to last.
pub fn load_grammars<P: AsRef<Path>>(paths: &[P], start: Option<&str>) -> Result<Grammar> {
  let mut rules = Vec::new();

  for path in paths {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| Error::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut file_rules = parse_rules(&src).map_err(|err| Error::InFile {
      path: path.to_path_buf(),
      source: Box::new(err),
    })?;

    debug!(path = %path.display(), rules = file_rules.len(), "read grammar file");
    rules.append(&mut file_rules);
  }

  let start = start.unwrap_or(DEFAULT_START);
  let grammar = Grammar::new(start, rules)?;
  debug!(start, rules = grammar.rules().len(), "combined grammars");
  Ok(grammar)
}
