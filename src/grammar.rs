use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::str::FromStr;

use tracing::warn;

use crate::error::{Error, GrammarError};
use crate::parse_grammar::parse_rules;
use crate::rules::{Production, Rule};

/// An immutable set of rules with a designated start symbol
#[derive(Debug)]
pub struct Grammar {
  pub start: String,
  rules: Vec<Rc<Rule>>,
  by_symbol: HashMap<String, Vec<Rc<Rule>>>,
  nullables: HashSet<String>,
}

impl Grammar {
  /// Assembles rules, kept in the order given, into a grammar rooted at `start`.
  /// Fails if there are no rules or if nothing can produce `start`.
  pub fn new(start: impl Into<String>, rules: Vec<Rule>) -> Result<Self, GrammarError> {
    let start = start.into();
    if rules.is_empty() {
      return Err(GrammarError::Empty);
    }

    let rules = rules.into_iter().map(Rc::new).collect::<Vec<_>>();
    let mut by_symbol: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    for rule in rules.iter() {
      by_symbol
        .entry(rule.symbol.name.clone())
        .or_default()
        .push(rule.clone());
    }

    if !by_symbol.contains_key(&start) {
      return Err(GrammarError::MissingStart(start));
    }

    let undefined = rules
      .iter()
      .flat_map(|r| r.productions.iter())
      .filter(|p| p.is_nonterminal() && !by_symbol.contains_key(p.symbol_str()))
      .map(Production::symbol_str)
      .collect::<BTreeSet<_>>();
    for symbol in undefined {
      warn!(symbol, "nonterminal is used but has no rules");
    }

    let nullables = Self::find_nullables(&rules);

    Ok(Self {
      start,
      rules,
      by_symbol,
      nullables,
    })
  }

  fn rule_is_nullable(nullables: &HashSet<String>, rule: &Rule) -> bool {
    rule.productions.iter().all(|p| match p {
      Production::Nonterminal(s) => nullables.contains(&s.name),
      Production::Terminal(_) => false,
    })
  }

  fn find_nullables(rules: &[Rc<Rule>]) -> HashSet<String> {
    let mut nullables: HashSet<String> = HashSet::new();

    loop {
      let last_length = nullables.len();
      for r in rules.iter() {
        if !nullables.contains(&r.symbol.name) && Self::rule_is_nullable(&nullables, r) {
          nullables.insert(r.symbol.name.clone());
        }
      }
      if last_length == nullables.len() {
        return nullables;
      }
    }
  }

  /// All rules, in load order
  pub fn rules(&self) -> &[Rc<Rule>] {
    &self.rules
  }

  /// Rules whose left-hand side is `symbol`, in load order
  pub fn rules_for(&self, symbol: &str) -> &[Rc<Rule>] {
    self.by_symbol.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn is_nullable(&self, symbol: &str) -> bool {
    self.nullables.contains(symbol)
  }
}

impl FromStr for Grammar {
  type Err = Error;

  /// Parses a grammar from a string. Assumes the first rule's symbol
  /// is the start symbol.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rules = parse_rules(s)?;
    let start = match rules.first() {
      Some(rule) => rule.symbol.name.clone(),
      None => return Err(GrammarError::Empty.into()),
    };
    Ok(Self::new(start, rules)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_start_must_have_rules() {
    let rules = parse_rules("NP -> the cat;").unwrap();
    assert_eq!(
      Grammar::new("Sentence", rules).unwrap_err(),
      GrammarError::MissingStart("Sentence".to_string())
    );
  }

  #[test]
  fn test_empty_grammar() {
    assert_eq!(Grammar::new("S", Vec::new()).unwrap_err(), GrammarError::Empty);
    assert!(matches!(
      "  // nothing here\n".parse::<Grammar>(),
      Err(Error::Grammar(GrammarError::Empty))
    ));
  }

  #[test]
  fn test_nullables() {
    let g: Grammar = r#"
      S -> A B x;
      A -> ;
      B -> A A;
      C -> x;
    "#
    .parse()
    .unwrap();

    assert!(g.is_nullable("A"));
    assert!(g.is_nullable("B"));
    assert!(!g.is_nullable("S"));
    assert!(!g.is_nullable("C"));
  }

  #[test]
  fn test_rules_keep_order() {
    let g: Grammar = r#"
      S -> N V;
      N -> he;
      V -> falls;
      N -> she;
    "#
    .parse()
    .unwrap();

    assert_eq!(g.start, "S");
    let ns = g
      .rules_for("N")
      .iter()
      .map(|r| r.productions[0].symbol_str())
      .collect::<Vec<_>>();
    assert_eq!(ns, vec!["he", "she"]);
    assert!(g.rules_for("Q").is_empty());
    assert_eq!(g.rules().len(), 4);
  }
}
