use std::fmt;
use std::rc::Rc;

use crate::grammar::Grammar;
use crate::rules::{Production, Rule};

/// A rule with a dot position
#[derive(Debug, Clone, PartialEq)]
pub struct LR0 {
  pub rule: Rc<Rule>,
  pub pos: usize,
}

impl LR0 {
  pub fn new(rule: &Rc<Rule>) -> Self {
    Self {
      rule: rule.clone(),
      pos: 0,
    }
  }

  pub fn is_active(&self) -> bool {
    self.pos < self.rule.len()
  }

  pub fn advance(&self) -> Self {
    assert!(self.is_active());
    Self {
      rule: self.rule.clone(),
      pos: self.pos + 1,
    }
  }

  pub fn next_production(&self) -> Option<&Production> {
    self.rule.productions.get(self.pos)
  }
}

impl fmt::Display for LR0 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.rule.symbol)?;
    for (idx, production) in self.rule.productions.iter().enumerate() {
      if idx == self.pos {
        write!(f, " *")?;
      }
      write!(f, " {}", production)?;
    }
    if !self.is_active() {
      write!(f, " *")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
  pub lr0: LR0,
  pub origin: usize,
}

impl State {
  pub fn new(lr0: LR0, origin: usize) -> Self {
    Self { lr0, origin }
  }

  pub fn advance(&self) -> Self {
    Self::new(self.lr0.advance(), self.origin)
  }
}

/// Earley chart: entry k holds every state that ends at input position k
#[derive(Debug)]
pub struct Chart(Vec<Vec<State>>);

impl Chart {
  pub fn new(length: usize) -> Self {
    Self(vec![Vec::new(); length])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.0[k].len()
  }

  /// Total number of states over every position
  pub fn num_states(&self) -> usize {
    self.0.iter().map(Vec::len).sum()
  }

  pub fn has(&self, k: usize, state: &State) -> bool {
    self.0[k].contains(state)
  }

  pub fn add(&mut self, k: usize, state: State) {
    if !self.has(k, &state) {
      self.0[k].push(state);
    }
  }

  /// Get an owned state so that passing around &mut chart is more ergonomic
  /// The clone is fairly cheap, only an rc + 2 usize, State would be copy if not
  /// for the Rc<Rule>
  fn get_state(&self, k: usize, idx: usize) -> State {
    self.0[k][idx].clone()
  }

  /// A text diagram of every edge in the chart, `width` columns wide
  pub fn diagram<'a, S: AsRef<str>>(&'a self, tokens: &'a [S], width: usize) -> ChartDiagram<'a, S> {
    ChartDiagram {
      chart: self,
      tokens,
      width,
    }
  }
}

impl IntoIterator for Chart {
  type Item = (usize, Vec<State>);
  type IntoIter = std::iter::Enumerate<std::vec::IntoIter<Vec<State>>>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter().enumerate()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (k, states) in self.0.iter().enumerate() {
      writeln!(f, "State {}:", k)?;
      for state in states.iter() {
        writeln!(f, "  {}..{}: {}", state.origin, k, state.lr0)?;
      }
    }
    Ok(())
  }
}

/// Trace view of a chart. The leaves go on the first line, then one line per
/// edge with its span drawn as `[---]` (complete), `[--->` (waiting), or
/// `[===]` when a complete edge covers the whole input.
pub struct ChartDiagram<'a, S> {
  chart: &'a Chart,
  tokens: &'a [S],
  width: usize,
}

impl<S: AsRef<str>> ChartDiagram<'_, S> {
  /// Columns given to each input position
  fn cell_width(&self) -> usize {
    (self.width / (self.tokens.len() + 1)).max(2)
  }

  fn leaves(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cell = self.cell_width() - 1;
    write!(f, "|.")?;
    for token in self.tokens {
      let token = token.as_ref().chars().take(cell).collect::<String>();
      write!(f, "{:^cell$}.", token, cell = cell)?;
    }
    writeln!(f, "|")
  }

  fn edge(&self, f: &mut fmt::Formatter<'_>, state: &State, end: usize) -> fmt::Result {
    let width = self.cell_width();
    let start = state.origin;
    let complete = !state.lr0.is_active();
    let leaves = self.tokens.len();

    let mut line = String::from("|");
    line.push_str(&format!(".{}", " ".repeat(width - 1)).repeat(start));
    if start == end {
      line.push(if complete { '#' } else { '>' });
    } else {
      let fill = if complete && start == 0 && end == leaves {
        "="
      } else {
        "-"
      };
      line.push('[');
      line.push_str(&fill.repeat(width * (end - start - 1) + width - 1));
      line.push(if complete { ']' } else { '>' });
    }
    line.push_str(&format!("{}.", " ".repeat(width - 1)).repeat(leaves - end));
    line.push('|');

    writeln!(f, "{} [{}:{}] {}", line, start, end, state.lr0)
  }
}

impl<S: AsRef<str>> fmt::Display for ChartDiagram<'_, S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.leaves(f)?;
    for (end, states) in self.chart.0.iter().enumerate() {
      for state in states.iter() {
        self.edge(f, state, end)?;
      }
    }
    Ok(())
  }
}

pub fn parse_chart<S: AsRef<str>>(g: &Grammar, input: &[S]) -> Chart {
  let mut chart = Chart::new(input.len() + 1);

  for rule in g.rules_for(&g.start) {
    chart.add(0, State::new(LR0::new(rule), 0));
  }

  for k in 0..chart.len() {
    // need to use while loop because the number of states at k can expand during the loop
    let mut idx = 0;
    while idx < chart.len_at(k) {
      let state = chart.get_state(k, idx);
      idx += 1;

      match state.lr0.next_production() {
        None => completer(&mut chart, k, &state),
        Some(Production::Nonterminal(_)) => predictor(g, &mut chart, k, &state),
        Some(Production::Terminal(_)) => scanner(&mut chart, k, &state, input),
      };
    }
  }

  chart
}

fn completer(chart: &mut Chart, k: usize, state: &State) {
  assert!(!state.lr0.is_active(), "tried to complete active state");

  // lr0 has been completed, now look for states in the chart that are waiting for its symbol
  for idx in 0..chart.len_at(state.origin) {
    let other = chart.get_state(state.origin, idx);

    if let Some(Production::Nonterminal(np)) = other.lr0.next_production() {
      if np.name == state.lr0.rule.symbol_str() {
        // found one, advance its dot and add the new state to the chart *at k*,
        // because it's now waiting on a token there
        chart.add(k, other.advance())
      }
    }
  }
}

fn predictor(g: &Grammar, chart: &mut Chart, k: usize, state: &State) {
  assert!(state.lr0.is_active(), "tried to predict non-active state");

  // this lr0 is waiting for the next production
  // let's hypothesize that one of the rules that can build this production will
  // succeed at its current position
  let needed_symbol = match state.lr0.next_production() {
    Some(Production::Nonterminal(symbol)) => symbol.name.as_str(),
    _ => panic!("tried to predict a terminal"),
  };

  for wanted_rule in g.rules_for(needed_symbol) {
    chart.add(k, State::new(LR0::new(wanted_rule), k));
  }

  if g.is_nullable(needed_symbol) {
    // automatically complete `state` early, because we know
    // it will be completable anyways, because its next_production may be produced
    // by empty input. If we don't do this, nullable rules won't be completed
    // correctly, because complete() won't run after predict() without a new symbol.
    chart.add(k, state.advance());
  }
}

fn scanner<S: AsRef<str>>(chart: &mut Chart, k: usize, state: &State, input: &[S]) {
  assert!(state.lr0.is_active(), "tried to scan non-active state");

  let needed_symbol = match state.lr0.next_production() {
    Some(Production::Terminal(word)) => word.as_str(),
    _ => panic!("tried to scan a nonterminal"),
  };

  if input.get(k).is_some_and(|token| token.as_ref() == needed_symbol) {
    // advance the state to consume this token, and add to state k + 1, where
    // it will look for the next token
    chart.add(k + 1, state.advance());
  }
}
