use std::fmt;

use crate::featurestructure::{NodeArena, NodeIdx};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// One element of a rule's right-hand side
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
  Terminal(String),
  Nonterminal(Symbol),
}

impl Production {
  pub fn symbol_str(&self) -> &str {
    match self {
      Self::Terminal(s) => s,
      Self::Nonterminal(s) => &s.name,
    }
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Self::Nonterminal(_))
  }
}

impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(s) => write!(f, "'{}'", s),
      Self::Nonterminal(s) => write!(f, "{}", s),
    }
  }
}

/// A grammar rule. Its features live in a private arena, and include the
/// features of each child under `child-N`.
#[derive(Debug, PartialEq)]
pub struct Rule {
  pub symbol: Symbol,
  pub arena: NodeArena,
  pub features: NodeIdx,
  pub productions: Vec<Production>,
}

impl Rule {
  pub fn len(&self) -> usize {
    self.productions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn symbol_str(&self) -> &str {
    &self.symbol.name
  }
}
