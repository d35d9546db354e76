//! Simple recursive-descent parsing of grammar files

use regex::Regex;

use crate::error::{Error, Result};
use crate::featurestructure::{Feature, NodeArena};
use crate::rules::{Production, Rule, Symbol};

/// Feature value that unifies with anything
pub const TOP_STR: &str = "**top**";

/// Where parsing stopped, and why
struct Failure<'a> {
  at: &'a str,
  message: String,
}

impl<'a> Failure<'a> {
  fn new(at: &'a str, message: impl Into<String>) -> Self {
    Self {
      at,
      message: message.into(),
    }
  }

  fn context(self, what: &str) -> Self {
    Self {
      at: self.at,
      message: format!("{}: {}", what, self.message),
    }
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = std::result::Result<(T, &'a str), Failure<'a>>;

/// A feature as written, before it's been allocated into a rule's arena
#[derive(Debug, Clone, PartialEq)]
struct RawFeature {
  path: String,
  tag: Option<String>,
  /// None is **top**
  value: Option<String>,
}

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).expect("invalid static regex");
    }
  };
}

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => {
      let (matched, rest) = s.split_at(m.end());
      (Some(matched), rest)
    }
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, what: &str, s: &'a str) -> ParseResult<'a, &'a str> {
  match optional_re(re, s) {
    (Some(c), rest) => Ok((c, rest)),
    (None, _) => Err(Failure::new(s, format!("expected {}", what))),
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Try to consume a char, failing if it doesn't match
fn needed_char(c: char, s: &str) -> ParseResult<'_, char> {
  match optional_char(c, s) {
    (Some(c), rest) => Ok((c, rest)),
    (None, _) => Err(Failure::new(s, format!("expected '{}'", c))),
  }
}

/// Skips whitespace, newlines included, and // comments
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"^(?:\s+|//[^\n]*)+");
  optional_re(&WHITESPACE_OR_COMMENT, s).1
}

/// Skips spaces, tabs and a trailing // comment, but stops at the end of the line
fn skip_inline_whitespace(s: &str) -> &str {
  regex_static!(INLINE_WHITESPACE, r"^(?:[ \t]+|//[^\n]*)+");
  optional_re(&INLINE_WHITESPACE, s).1
}

fn at_line_end(s: &str) -> bool {
  s.is_empty() || s.starts_with('\n') || s.starts_with('\r')
}

/// Tries to parse a name made of letters, numbers, - and _
fn parse_name(s: &str) -> ParseResult<'_, &str> {
  regex_static!(NAME, r"^[a-zA-Z0-9\-_]+");
  needed_re(&NAME, "a name", s)
}

/// Tries to parse a name made of dotted segments (foo.bar.c.d)
fn parse_dotted(s: &str) -> ParseResult<'_, &str> {
  regex_static!(DOTTED, r"^[a-zA-Z0-9\-_]+(\.[a-zA-Z0-9\-_]+)*");
  needed_re(&DOTTED, "a dotted name", s)
}

/// Parses a terminal in single or double quotes. Backslash escapes the next char.
fn parse_quoted(s: &str) -> ParseResult<'_, String> {
  regex_static!(QUOTED, r#"^(?:"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#);
  let (quoted, rest) = needed_re(&QUOTED, "a quoted terminal", s)?;

  let inner = &quoted[1..quoted.len() - 1];
  let mut word = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      word.extend(chars.next());
    } else {
      word.push(c);
    }
  }

  if word.is_empty() {
    Err(Failure::new(s, "empty quoted terminal"))
  } else {
    Ok((word, rest))
  }
}

/// Parses an optional #tag
fn parse_tag(s: &str) -> ParseResult<'_, Option<String>> {
  let (hash, s) = optional_char('#', s);
  if hash.is_none() {
    Ok((None, s))
  } else {
    let s = skip_whitespace(s);
    let (name, s) = parse_name(s).map_err(|e| e.context("tag"))?;
    Ok((Some(name.to_string()), s))
  }
}

/// Parses a value with an optional tag: #tag value
fn parse_feature_value(s: &str) -> ParseResult<'_, (Option<String>, Option<String>)> {
  regex_static!(VALUE, r"^[a-zA-Z0-9\-_\*]+");
  let (tag, s) = parse_tag(s)?;
  let s = skip_whitespace(s);
  let (name, s) = optional_re(&VALUE, s);
  let value = match name {
    Some(TOP_STR) => None,
    Some(name) => Some(name.to_string()),
    None if tag.is_some() => None,
    None => return Err(Failure::new(s, "feature needs tag or value")),
  };
  Ok(((tag, value), s))
}

fn parse_feature(s: &str) -> ParseResult<'_, RawFeature> {
  let (name, s) = parse_dotted(s).map_err(|e| e.context("feature name"))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_char(':', s)?;
  let s = skip_whitespace(s);
  let ((tag, value), s) = parse_feature_value(s).map_err(|e| e.context("feature value"))?;
  let s = skip_whitespace(s);
  let (_, s) = optional_char(',', s);

  Ok((
    RawFeature {
      path: name.to_string(),
      tag,
      value,
    },
    s,
  ))
}

fn parse_featurestructure(s: &str) -> ParseResult<'_, Vec<RawFeature>> {
  let mut features = Vec::new();
  let mut rem = needed_char('[', s)?.1;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), rem) = optional_char(']', rem) {
      return Ok((features, rem));
    }
    if rem.is_empty() {
      return Err(Failure::new(s, "unclosed '['"));
    }
    let (feature, s) = parse_feature(rem)?;
    features.push(feature);
    rem = s;
  }
}

fn word_feature(word: &str) -> RawFeature {
  RawFeature {
    path: "word".to_string(),
    tag: None,
    value: Some(word.to_string()),
  }
}

fn parse_production(s: &str) -> ParseResult<'_, (Production, Vec<RawFeature>)> {
  // annotate terminals with their matching string
  if s.starts_with('"') || s.starts_with('\'') {
    let (word, s) = parse_quoted(s)?;
    let feature = word_feature(&word);
    return Ok(((Production::Terminal(word), vec![feature]), s));
  }

  let start = s;
  let (name, s) = parse_name(s).map_err(|e| e.context("symbol"))?;
  let after_space = skip_inline_whitespace(s);
  let (features, s) = if after_space.starts_with('[') {
    parse_featurestructure(after_space)?
  } else {
    (Vec::new(), s)
  };

  if name.starts_with(|c: char| c.is_lowercase()) {
    if !features.is_empty() {
      Err(Failure::new(
        start,
        format!("terminal (lower-case) cannot have features: {}", name),
      ))
    } else {
      Ok(((Production::Terminal(name.to_string()), vec![word_feature(name)]), s))
    }
  } else {
    Ok(((Production::Nonterminal(Symbol::new(name)), features), s))
  }
}

fn parse_symbol(s: &str) -> ParseResult<'_, (Symbol, Vec<RawFeature>)> {
  let (prod, rest) = parse_production(s)?;
  match prod {
    (Production::Nonterminal(symbol), features) => Ok(((symbol, features), rest)),
    (Production::Terminal(w), _) => Err(Failure::new(
      s,
      format!("expected symbol, got terminal {}", w),
    )),
  }
}

/// Symbol, then `->`, then productions, terminated by `;` or the end of the line.
/// `|` separates alternatives that share the left-hand side.
fn parse_rule(s: &str) -> ParseResult<'_, Vec<Rule>> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "^->");

  let start = s;
  let ((symbol, features), s) = parse_symbol(s).map_err(|e| e.context("rule symbol"))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&ARROW, "'->'", s).map_err(|e| e.context("rule arrow"))?;

  let mut alternatives = vec![Vec::new()];
  let mut rem = s;
  loop {
    rem = skip_inline_whitespace(rem);
    if let (Some(_), s) = optional_char(';', rem) {
      rem = s;
      break;
    }
    if at_line_end(rem) {
      break;
    }
    if let (Some(_), s) = optional_char('|', rem) {
      alternatives.push(Vec::new());
      rem = s;
      continue;
    }

    let (prod, s) = parse_production(rem).map_err(|e| e.context("rule production"))?;
    alternatives
      .last_mut()
      .expect("alternatives starts non-empty")
      .push(prod);
    rem = s;
  }

  let rules = alternatives
    .into_iter()
    .map(|prods| build_rule(&symbol, &features, prods))
    .collect::<Result<Vec<_>>>()
    .map_err(|e| Failure::new(start, format!("rule {}: {}", symbol, e)))?;

  Ok((rules, rem))
}

/// We want rules to be able to access their child features, and to be able to
/// unify between them
/// So we have the rule symbol "adopt" the features of its children, copying the
/// child features into child-0.(...), child-1.(...), etc.
fn adopt_child_features(
  rule_features: &[RawFeature],
  prods_features: Vec<(Production, Vec<RawFeature>)>,
) -> (Vec<RawFeature>, Vec<Production>) {
  let mut features = rule_features.to_vec();
  let mut productions = Vec::with_capacity(prods_features.len());

  for (idx, (prod, child_features)) in prods_features.into_iter().enumerate() {
    productions.push(prod);
    let prefix = format!("child-{}.", idx);
    features.extend(child_features.into_iter().map(|f| RawFeature {
      path: prefix.clone() + &f.path,
      ..f
    }));
  }

  (features, productions)
}

fn build_rule(
  symbol: &Symbol,
  rule_features: &[RawFeature],
  prods_features: Vec<(Production, Vec<RawFeature>)>,
) -> Result<Rule> {
  let (raw, productions) = adopt_child_features(rule_features, prods_features);

  let mut arena = NodeArena::new();
  let features = raw
    .into_iter()
    .map(|f| Feature {
      value: match f.value {
        Some(v) => arena.alloc_str(v),
        None => arena.alloc_top(),
      },
      path: f.path,
      tag: f.tag,
    })
    .collect::<Vec<_>>();
  let features = arena.alloc_from_features(features)?;

  Ok(Rule {
    symbol: symbol.clone(),
    arena,
    features,
    productions,
  })
}

fn line_of(src: &str, rest: &str) -> usize {
  let consumed = src.len().saturating_sub(rest.len());
  src[..consumed].matches('\n').count() + 1
}

/// Parses grammar source into its rules, in the order they're written.
/// Errors if the grammar doesn't parse or a rule's features can't be unified.
pub fn parse_rules(src: &str) -> Result<Vec<Rule>> {
  let mut rules = Vec::new();
  let mut rem = src;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      return Ok(rules);
    }

    match parse_rule(rem) {
      Ok((mut parsed, s)) => {
        rules.append(&mut parsed);
        rem = s;
      }
      Err(Failure { at, message }) => {
        return Err(Error::Syntax {
          line: line_of(src, at),
          message,
        });
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::featurestructure::SerializedNode;

  fn features_of(rule: &Rule) -> SerializedNode {
    SerializedNode::from_node(&rule.arena, rule.features).expect("rule has features")
  }

  #[test]
  fn test_semicolon_and_newline_terminators() {
    let with_semis = parse_rules("S -> N V; N -> he; V -> falls;").unwrap();
    let with_lines = parse_rules(
      r#"
      S -> N V
      N -> he   // a pronoun
      V -> falls
      "#,
    )
    .unwrap();

    assert_eq!(with_semis.len(), 3);
    assert_eq!(with_semis, with_lines);
  }

  #[test]
  fn test_quoted_terminals() {
    let rules = parse_rules(r#"NP -> "the" 'cat' "it\"s""#).unwrap();
    assert_eq!(
      rules[0].productions,
      vec![
        Production::Terminal("the".to_string()),
        Production::Terminal("cat".to_string()),
        Production::Terminal("it\"s".to_string()),
      ]
    );
    assert_eq!(
      features_of(&rules[0]).get_path_str(&["child-1", "word"]),
      Some("cat")
    );
  }

  #[test]
  fn test_alternatives() {
    let rules = parse_rules("VP[ tr: #1 ] -> V | V NP;").unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].len(), 1);
    assert_eq!(rules[1].len(), 2);
    assert_eq!(rules[0].symbol, rules[1].symbol);
  }

  #[test]
  fn test_features_and_tags() {
    let rules = parse_rules(
      r#"
      S -> N[ case: nom, num: #1 ] IV[ num: #1, tense: **top** ];
      "#,
    )
    .unwrap();
    let fs = features_of(&rules[0]);
    assert_eq!(fs.get_path_str(&["child-0", "case"]), Some("nom"));
    // num is shared, but still **top**, so it's stripped
    assert_eq!(fs.get_path(&["child-1", "num"]), None);
    assert_eq!(fs.get_path(&["child-1", "tense"]), None);
  }

  #[test]
  fn test_multiline_feature_block() {
    let rules = parse_rules(
      "N[ num: sg,\n   case: nom ] -> he\nV -> falls",
    )
    .unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(features_of(&rules[0]).get_path_str(&["case"]), Some("nom"));
  }

  #[test]
  fn test_empty_rule() {
    let rules = parse_rules("A -> ;\nB ->\n").unwrap();
    assert!(rules.iter().all(Rule::is_empty));
  }

  #[test]
  fn test_syntax_error_line() {
    let err = parse_rules("S -> N V;\nN -> he;\nV falls;\n").unwrap_err();
    match err {
      Error::Syntax { line, message } => {
        assert_eq!(line, 3);
        assert!(message.contains("arrow"), "{}", message);
      }
      other => panic!("unexpected error {:?}", other),
    }
  }

  #[test]
  fn test_terminal_features_rejected() {
    assert!(matches!(
      parse_rules("S -> he[ num: sg ];"),
      Err(Error::Syntax { line: 1, .. })
    ));
    assert!(matches!(
      parse_rules("he -> S;"),
      Err(Error::Syntax { line: 1, .. })
    ));
  }

  #[test]
  fn test_conflicting_tags_rejected() {
    let err = parse_rules("\n\nS -> N[ num: #1 sg ] V[ num: #1 pl ];").unwrap_err();
    assert!(matches!(err, Error::Syntax { line: 3, .. }), "{:?}", err);
  }
}
