use std::fmt;
use std::io::{self, Write};

use tracing::{debug, trace};

use crate::draw::draw;
use crate::earley::{Chart, parse_chart};
use crate::error::Result;
use crate::featurestructure::{NodeArena, NodeDisplay, NodeIdx, SerializedNode};
use crate::forest::{Forest, RuleTree};
use crate::grammar::Grammar;
use crate::processor::{DEFAULT_MARGIN, RenderTree, TreeParser};
use crate::syntree::{Constituent, SynTree};

/// Width of the chart trace, in columns
pub const DEFAULT_TRACE_WIDTH: usize = 80;

/// A node label in a parse tree: the rule's symbol and where its features ended up
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
  pub symbol: String,
  pub features: NodeIdx,
}

/// A derivation that survived unification, with the arena its features live in
#[derive(Debug, Clone)]
pub struct ParseTree {
  pub tree: SynTree<Category, String>,
  pub arena: NodeArena,
}

impl ParseTree {
  /// Features of the root node, children included under `child-N`
  pub fn features(&self) -> NodeDisplay<'_> {
    let root = match &self.tree {
      SynTree::Branch(cons, _) => cons.value.features,
      SynTree::Leaf(_) => panic!("parse trees are rooted at a branch"),
    };
    self.arena.display(root)
  }

  /// Symbol plus the category's own features, e.g. `N[case: nom, num: sg]`
  pub fn label(&self, category: &Category) -> String {
    let own = SerializedNode::from_node_filtered(&self.arena, category.features, |label| {
      label != "word" && !label.starts_with("child-")
    });
    match own {
      Some(features) => format!("{}{}", category.symbol, features),
      None => category.symbol.clone(),
    }
  }
}

impl RenderTree for ParseTree {
  fn pformat(&self, margin: usize) -> String {
    self.tree.pformat(margin, &|c: &Category| self.label(c))
  }

  fn draw(&self) -> String {
    draw(&self.tree, &|c: &Category| self.label(c))
  }
}

impl fmt::Display for ParseTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.pformat(DEFAULT_MARGIN))
  }
}

/// Unifies a tree bottom-up, copying each rule's features into `arena` and
/// unifying every child's features into its parent's `child-N` arc.
/// Fails if any of those unifications do.
fn unify_tree(arena: &mut NodeArena, tree: RuleTree) -> Result<(SynTree<Category, String>, NodeIdx)> {
  match tree {
    SynTree::Leaf(w) => Ok((SynTree::Leaf(w), arena.alloc_top())),
    SynTree::Branch(cons, children) => {
      let rule = cons.value;
      let features = arena.import(&rule.arena, rule.features);

      let mut bare_children = Vec::with_capacity(children.len());
      for (idx, child) in children.into_iter().enumerate() {
        let (child_tree, child_features) = unify_tree(arena, child)?;
        bare_children.push(child_tree);

        let to_unify = arena.alloc_from_edges(vec![(format!("child-{}", idx), child_features)])?;
        arena.unify(features, to_unify)?;
      }

      let bare_self = SynTree::Branch(
        Constituent {
          span: cons.span,
          value: Category {
            symbol: rule.symbol.name.clone(),
            features,
          },
        },
        bare_children,
      );

      Ok((bare_self, features))
    }
  }
}

/// Earley parser over one grammar. Construct it once and reuse it for every sentence.
pub struct ChartParser<'g> {
  grammar: &'g Grammar,
  trace: bool,
  trace_width: usize,
}

impl<'g> ChartParser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      trace: false,
      trace_width: DEFAULT_TRACE_WIDTH,
    }
  }

  /// Write the chart out while parsing
  pub fn with_trace(mut self, trace: bool) -> Self {
    self.trace = trace;
    self
  }

  pub fn with_trace_width(mut self, width: usize) -> Self {
    self.trace_width = width;
    self
  }

  pub fn chart<S: AsRef<str>>(&self, tokens: &[S]) -> Chart {
    parse_chart(self.grammar, tokens)
  }

  /// Every unified parse of `tokens`, in the order the forest yields them
  pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<ParseTree> {
    self.derive(self.chart(tokens))
  }

  fn derive(&self, chart: Chart) -> Vec<ParseTree> {
    debug!(positions = chart.len(), states = chart.num_states(), "built chart");

    let forest = Forest::from(chart);
    let candidates = forest.trees(self.grammar);
    let total = candidates.len();

    let trees = candidates
      .into_iter()
      .filter_map(|candidate| {
        let mut arena = NodeArena::new();
        match unify_tree(&mut arena, candidate) {
          Ok((tree, _)) => Some(ParseTree { tree, arena }),
          Err(err) => {
            trace!(%err, "dropped derivation");
            None
          }
        }
      })
      .collect::<Vec<_>>();

    debug!(candidates = total, unified = trees.len(), "derived trees");
    trees
  }
}

impl TreeParser for ChartParser<'_> {
  type Tree = ParseTree;

  fn parse(&self, tokens: &[&str], trace: &mut dyn Write) -> io::Result<Vec<ParseTree>> {
    let chart = self.chart(tokens);
    if self.trace {
      write!(trace, "{}", chart.diagram(tokens, self.trace_width))?;
    }
    Ok(self.derive(chart))
  }
}

impl Grammar {
  /// Parses `input` with a fresh, untraced `ChartParser`
  pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> Vec<ParseTree> {
    ChartParser::new(self).parse(input)
  }
}
