//! Feature-grammar chart parsing.
//!
//! Grammars are written in `.fgr` files: context-free rules whose symbols
//! carry feature structures, e.g.
//!
//! ```text
//! S -> N[ num: #1 ] IV[ num: #1 ]
//! N[ num: sg ] -> mary
//! IV[ num: sg ] -> falls
//! ```
//!
//! Sentences are recognized with an Earley chart, every derivation is read
//! out of the chart, and derivations whose features don't unify are dropped.
//!
//! ```
//! use featparse::Grammar;
//!
//! let g: Grammar = r#"
//!   S -> N[ num: #1 ] IV[ num: #1 ]
//!   N[ num: sg ] -> mary
//!   N[ num: pl ] -> they
//!   IV[ num: sg ] -> falls
//!   IV[ num: pl ] -> fall
//! "#.parse().unwrap();
//!
//! assert_eq!(g.parse(&["mary", "falls"]).len(), 1);
//! assert!(g.parse(&["mary", "fall"]).is_empty());
//! ```

#[macro_use]
extern crate lazy_static;

pub mod draw;
pub mod earley;
pub mod error;
pub mod featurestructure;
pub mod forest;
pub mod grammar;
pub mod loader;
pub mod parse_grammar;
pub mod parser;
pub mod processor;
pub mod rules;
pub mod syntree;
pub mod utils;
pub mod viewer;

pub use crate::error::{Error, GrammarError, Result};
pub use crate::grammar::Grammar;
pub use crate::loader::{DEFAULT_START, load_grammars};
pub use crate::parser::{ChartParser, DEFAULT_TRACE_WIDTH, ParseTree};
pub use crate::processor::{
  DEFAULT_MARGIN, LineOutcome, LineProcessor, RenderTree, Summary, TreeParser, tokenize,
};
pub use crate::viewer::{TerminalViewer, Viewer};
