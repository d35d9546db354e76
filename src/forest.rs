use std::rc::Rc;

use crate::earley::Chart;
use crate::grammar::Grammar;
use crate::rules::Rule;
use crate::syntree::{Constituent, SynTree, Word};
use crate::utils::combinations;

/// A tree whose branches still point at grammar rules
pub type RuleTree = SynTree<Rc<Rule>, String>;

/// A rule being expanded over a span
type Expansion = (*const Rule, (usize, usize));

#[derive(Debug, Clone, PartialEq)]
pub struct ForestState {
  rule: Rc<Rule>,
  span: (usize, usize),
}

impl ForestState {
  pub fn new(rule: &Rc<Rule>, start: usize, end: usize) -> Self {
    Self {
      rule: rule.clone(),
      span: (start, end),
    }
  }
}

impl From<&ForestState> for Constituent<Rc<Rule>> {
  fn from(state: &ForestState) -> Self {
    Constituent {
      value: state.rule.clone(),
      span: state.span,
    }
  }
}

/// Completed chart states, indexed by where they start
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
  states: Vec<Vec<ForestState>>,
  input_len: usize,
}

impl Forest {
  /// Length of the input this forest was built from
  pub fn len(&self) -> usize {
    self.input_len
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Checks if a subtree has already been completed by make_trees(),
  /// or if it is a leaf and doesn't need to be completed
  fn subtree_is_complete(node: &RuleTree) -> bool {
    match node.get_branch() {
      Some((cons, children)) => cons.value.productions.len() == children.len(),
      None => true,
    }
  }

  /// Takes a rule and search span, and returns a vec of all possible sequences
  /// of trees that correspond to the rule's productions.
  /// So for the situation:
  /// ```text
  /// g := '''
  ///   S -> x
  ///   S -> S S
  /// '''
  /// chart := parse(g, "x x x")
  /// chart.extend_out(g, S -> S S, start = 0, end = 3)
  /// ```
  /// , which, recall, has a chart that looks like:
  ///
  /// ```text
  /// 0..1: S -> x
  /// 0..2: S -> S S
  /// 0..3: S -> S S
  /// 1..2: S -> x
  /// 1..3: S -> S S
  /// 2..3: S -> x
  /// ```
  ///
  /// You'd get
  ///
  /// ```text
  /// [[(S -> x, 0..1), (S -> S S, (), 1..3)],
  ///  [(S -> S S, (), 0..2), (S -> x, 2..3)]]
  /// ```
  fn extend_out(
    &self,
    rule: &Rule,
    prod_idx: usize,
    search_start: usize,
    search_end: usize,
  ) -> Vec<Vec<RuleTree>> {
    if prod_idx == rule.len() {
      return if search_start == search_end {
        // base case, we consumed the whole rule and the whole span together.
        // provide a single empty sequence as a base for prepending onto as we unwind the stack
        vec![Vec::new()]
      } else {
        // ran out of productions before consuming everything
        Vec::new()
      };
    }

    let next_production = &rule.productions[prod_idx];
    if next_production.is_nonterminal() {
      let wanted_symbol = next_production.symbol_str();
      // look for potential next states to produce this production at the search start
      self.states[search_start]
        .iter()
        // only consider states inside the search range that have our wanted symbol
        .filter(|s| s.span.1 <= search_end && s.rule.symbol_str() == wanted_symbol)
        .flat_map(|state| {
          // recursively find possible sequences that start directly after this state
          self
            .extend_out(rule, prod_idx + 1, state.span.1, search_end)
            .into_iter()
            // if there are any, prepend an uncompleted tree headed by this state onto the sequence
            .map(move |mut seq| {
              seq.insert(0, SynTree::Branch(state.into(), Vec::new()));
              seq
            })
        })
        .collect()
    } else if search_start == search_end {
      // a terminal needs input, and there's none left
      Vec::new()
    } else {
      // all terminals with the same symbol_str are identical, so there's only one candidate
      let leaf = SynTree::Leaf(Word {
        value: next_production.symbol_str().to_string(),
        span: (search_start, search_start + 1),
      });

      self
        .extend_out(rule, prod_idx + 1, search_start + 1, search_end)
        .into_iter()
        .map(move |mut seq| {
          seq.insert(0, leaf.clone());
          seq
        })
        .collect()
    }
  }

  /// Takes a possibly-uncompleted tree, and returns all possible trees it describes.
  /// An uncompleted tree is a constituent with fewer children than its rule has productions. It needs to be passed
  /// into extend_out, and then glued onto.
  /// `expanding` holds the (rule, span) pairs being expanded further up the stack. A cyclic grammar
  /// (S -> S, or A -> B, B -> A) can lead back to one of them, and that branch yields nothing.
  fn make_trees(&self, tree: RuleTree, expanding: &mut Vec<Expansion>) -> Vec<RuleTree> {
    if Self::subtree_is_complete(&tree) {
      return vec![tree];
    }

    let cons = match tree.into_branch() {
      Some((cons, _)) => cons,
      None => unreachable!("leaves are always complete"),
    };

    let key = (Rc::as_ptr(&cons.value), cons.span);
    if expanding.contains(&key) {
      return Vec::new();
    }
    expanding.push(key);

    let mut trees = Vec::new();
    for children in self.extend_out(&cons.value, 0, cons.span.0, cons.span.1) {
      let child_sets = children
        .into_iter()
        .map(|child| self.make_trees(child, expanding))
        .collect::<Vec<_>>();
      trees.extend(
        combinations(&child_sets)
          .into_iter()
          .map(|set| SynTree::Branch(cons.clone(), set)),
      );
    }

    expanding.pop();
    trees
  }

  /// Every tree for the grammar's start symbol that spans the whole input
  pub fn trees(&self, g: &Grammar) -> Vec<RuleTree> {
    if self.is_empty() {
      return Vec::new();
    }

    // seed our search with all states that started at position 0, span to
    // the end of the string, and are named by the grammar's start symbol
    self.states[0]
      .iter()
      .filter(|state| state.span.1 == self.len() && state.rule.symbol_str() == g.start)
      .flat_map(|state| {
        let root = SynTree::Branch(state.into(), Vec::new());
        self.make_trees(root, &mut Vec::new())
      })
      .collect()
  }
}

impl From<Chart> for Forest {
  fn from(chart: Chart) -> Self {
    let input_len = chart.len().saturating_sub(1);
    // indexed by origin. Empty rules can start at the very end, so keep a slot for it
    let mut states = vec![Vec::new(); chart.len()];

    for (k, chart_states) in chart.into_iter() {
      for state in chart_states {
        // exclude unfinished rules that can't contribute to a tree
        if !state.lr0.is_active() {
          states[state.origin].push(ForestState::new(&state.lr0.rule, state.origin, k));
        }
      }
    }

    Self { states, input_len }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::earley::parse_chart;

  #[test]
  fn test_parse_chart() {
    let g: Grammar = r#"
      S -> x;
      S -> S S;
    "#
    .parse()
    .unwrap();

    let get_rule_with_len = |len: usize| g.rules_for("S").iter().find(|r| r.len() == len).unwrap();

    let rule1 = get_rule_with_len(1);
    let rule2 = get_rule_with_len(2);

    let forest: Forest = parse_chart(&g, &["x", "x", "x"]).into();

    assert_eq!(
      forest,
      Forest {
        states: vec![
          vec![
            ForestState::new(rule1, 0, 1),
            ForestState::new(rule2, 0, 2),
            ForestState::new(rule2, 0, 3),
          ],
          vec![ForestState::new(rule1, 1, 2), ForestState::new(rule2, 1, 3)],
          vec![ForestState::new(rule1, 2, 3)],
          vec![],
        ],
        input_len: 3,
      }
    );
  }

  #[test]
  fn test_tree_generation() {
    // test the tree ambiguity problem that naive earley forest processing has
    // correct algorithm finds 2 trees:
    //  (S (S x) (S (S x) (S x)))           -> [x][xx]
    //  (S (S (S x) (S x)) (S x))           -> [xx][x]
    // naive algorithm finds 2 addl. spurious trees:
    //  (S (S x) (S x))                     -> [x][x]
    //  (S (S (S x) (S x)) (S (S x) (S x))) -> [xx][xx]

    let g: Grammar = r#"
      S -> x;
      S -> S S;
    "#
    .parse()
    .unwrap();

    let forest: Forest = parse_chart(&g, &["x", "x", "x"]).into();
    let trees = forest.trees(&g);

    assert_eq!(trees.len(), 2);
  }

  #[test]
  fn test_empty_rule_at_end_of_input() {
    let g: Grammar = r#"
      S -> x A;
      A -> ;
    "#
    .parse()
    .unwrap();

    // A is predicted at the last position, past the final token
    let forest: Forest = parse_chart(&g, &["x"]).into();
    assert_eq!(forest.len(), 1);

    let trees = forest.trees(&g);
    assert_eq!(trees.len(), 1);
    let (_, children) = trees[0].get_branch().unwrap();
    assert_eq!(children.len(), 2);
    assert!(children[1].is_branch());
  }

  #[test]
  fn test_self_cycle_over_a_span() {
    let g: Grammar = r#"
      S -> S;
      S -> x;
    "#
    .parse()
    .unwrap();

    // (S x) and (S (S x)); the S inside S -> S can't be expanded with S -> S again
    let forest: Forest = parse_chart(&g, &["x"]).into();
    assert_eq!(forest.trees(&g).len(), 2);
  }

  #[test]
  fn test_indirect_unary_cycle() {
    let g: Grammar = r#"
      Sentence -> A;
      A -> Sentence;
      A -> x;
    "#
    .parse()
    .unwrap();

    let forest: Forest = parse_chart(&g, &["x"]).into();
    let trees = forest.trees(&g);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].leaves(), vec!["x"]);
  }

  #[test]
  fn test_cycle_through_nullable_rules() {
    let g: Grammar = r#"
      Sentence -> A x;
      A -> B;
      B -> A;
      B -> ;
    "#
    .parse()
    .unwrap();

    // only A -> B -> (empty) bottoms out
    let forest: Forest = parse_chart(&g, &["x"]).into();
    let trees = forest.trees(&g);
    assert_eq!(trees.len(), 1);

    let (_, children) = trees[0].get_branch().unwrap();
    let (a, a_children) = children[0].get_branch().unwrap();
    assert_eq!(a.value.symbol_str(), "A");
    assert_eq!(a.span, (0, 0));
    let (b, b_children) = a_children[0].get_branch().unwrap();
    assert_eq!(b.value.symbol_str(), "B");
    assert!(b_children.is_empty());
  }
}
