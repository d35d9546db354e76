use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("couldn't read grammar file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("in grammar file {}: {source}", path.display())]
  InFile {
    path: PathBuf,
    #[source]
    source: Box<Error>,
  },

  #[error("syntax error on line {line}: {message}")]
  Syntax { line: usize, message: String },

  #[error("unification failure: {0}")]
  Unification(String),

  #[error(transparent)]
  Grammar(#[from] GrammarError),

  #[error(transparent)]
  Io(#[from] io::Error),
}

/// Errors raised while assembling rules into a grammar
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
  #[error("grammar has no rules")]
  Empty,

  #[error("start symbol {0} has no rules")]
  MissingStart(String),
}
