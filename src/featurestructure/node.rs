use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Error, Result};

/// Index of a node inside a `NodeArena`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

/// Unpacked representation of a feature, that `NodeArena::alloc_from_features` can turn into a node
#[derive(Debug)]
pub struct Feature {
  /// Dotted path where each segment will be a node: "a.b.c" -> [a: [b: [c: ...]]]
  pub path: String,
  /// Unique string that will link features into a reentrant node, or None
  pub tag: Option<String>,
  /// What will end up at `path`. Will be unified with any other feature values with the same tag.
  pub value: NodeIdx,
}

/// A node in the feature structure graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  /// Top can unify with anything
  Top,
  /// A string-valued feature, such as "nom" in [case: nom]. Unifies with equal strings.
  Str(String),
  /// An arc-containing node. Arcs are ordered by label so display is stable.
  Edged(BTreeMap<String, NodeIdx>),
  /// A node that has been forwarded to another node through unification.
  /// Before using a node, it should be dereferenced to resolve its forward
  Forwarded(NodeIdx),
}

impl Node {
  fn is_top(&self) -> bool {
    matches!(self, Self::Top)
  }

  fn str(&self) -> Option<&str> {
    match self {
      Self::Str(s) => Some(s),
      _ => None,
    }
  }

  fn edged(&self) -> Option<&BTreeMap<String, NodeIdx>> {
    match self {
      Self::Edged(arcs) => Some(arcs),
      _ => None,
    }
  }

  fn edged_mut(&mut self) -> Option<&mut BTreeMap<String, NodeIdx>> {
    match self {
      Self::Edged(arcs) => Some(arcs),
      _ => None,
    }
  }
}

/// Owns every node of one or more feature structures. Rules keep a small arena
/// of their own, and each parse tree gets a fresh one that rule features are
/// imported into before unification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeArena {
  nodes: Vec<Node>,
}

impl NodeArena {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn alloc(&mut self, node: Node) -> NodeIdx {
    let idx = self.nodes.len() as u32;
    self.nodes.push(node);
    NodeIdx(idx)
  }

  pub fn alloc_top(&mut self) -> NodeIdx {
    self.alloc(Node::Top)
  }

  pub fn alloc_str(&mut self, s: String) -> NodeIdx {
    self.alloc(Node::Str(s))
  }

  pub fn alloc_edged(&mut self) -> NodeIdx {
    self.alloc(Node::Edged(BTreeMap::new()))
  }

  /// Display a NodeIdx
  pub fn display(&self, idx: NodeIdx) -> NodeDisplay<'_> {
    NodeDisplay { arena: self, idx }
  }

  /// Creates a node from a list of (label, target) arcs. Labels CANNOT be dotted!
  pub fn alloc_from_edges<I>(&mut self, edges: I) -> Result<NodeIdx>
  where
    I: IntoIterator<Item = (String, NodeIdx)>,
  {
    let node = self.alloc_edged();

    for (label, target) in edges {
      assert!(
        !label.contains('.'),
        "alloc_from_edges cannot take dotted paths!"
      );

      self.push_edge(node, label, target)?;
    }

    Ok(node)
  }

  /// Builds a feature structure out of dotted paths, unifying values that share a tag
  pub fn alloc_from_features<I>(&mut self, features: I) -> Result<NodeIdx>
  where
    I: IntoIterator<Item = Feature>,
  {
    let root = self.alloc_edged();

    let mut tags: HashMap<String, NodeIdx> = HashMap::new();
    for Feature { path, tag, value } in features {
      if let Some(tag) = tag {
        if let Some(&tagged) = tags.get(&tag) {
          self.unify(value, tagged)?;
        } else {
          tags.insert(tag, value);
        }
      }

      let mut current = root;
      let mut parts = path.split('.').peekable();
      while let Some(label) = parts.next() {
        if parts.peek().is_none() {
          self.push_edge(current, label.to_string(), value)?;
        } else {
          let next = self.alloc_edged();
          self.push_edge(current, label.to_string(), next)?;
          current = next;
        }
      }
    }

    Ok(root)
  }

  /// Deep-copies the structure at `idx` in `other` into this arena, keeping reentrancy
  pub fn import(&mut self, other: &NodeArena, idx: NodeIdx) -> NodeIdx {
    let mut copied = HashMap::new();
    self.import_node(other, idx, &mut copied)
  }

  fn import_node(
    &mut self,
    other: &NodeArena,
    idx: NodeIdx,
    copied: &mut HashMap<NodeIdx, NodeIdx>,
  ) -> NodeIdx {
    let idx = other.dereference(idx);
    if let Some(&existing) = copied.get(&idx) {
      return existing;
    }

    match other.get(idx) {
      Node::Top => {
        let new = self.alloc_top();
        copied.insert(idx, new);
        new
      }
      Node::Str(s) => {
        let new = self.alloc_str(s.clone());
        copied.insert(idx, new);
        new
      }
      Node::Edged(arcs) => {
        // register before recursing so cycles resolve to this node
        let new = self.alloc_edged();
        copied.insert(idx, new);
        let mut new_arcs = BTreeMap::new();
        for (label, target) in arcs.iter() {
          new_arcs.insert(label.clone(), self.import_node(other, *target, copied));
        }
        self.nodes[new.0 as usize] = Node::Edged(new_arcs);
        new
      }
      Node::Forwarded(_) => panic!("unexpected forward after dereference"),
    }
  }

  /// Get an idx. Assumes valid, panics on OOB
  pub fn get(&self, idx: NodeIdx) -> &Node {
    self.nodes.get(idx.0 as usize).expect("Invalid NodeIdx")
  }

  /// Mutably get an idx. Assumes valid, panics on OOB
  fn get_mut(&mut self, idx: NodeIdx) -> &mut Node {
    self.nodes.get_mut(idx.0 as usize).expect("Invalid NodeIdx")
  }

  fn forward_to(&mut self, from: NodeIdx, to: NodeIdx) -> Node {
    std::mem::replace(self.get_mut(from), Node::Forwarded(to))
  }

  pub fn is_top(&self, idx: NodeIdx) -> bool {
    self.get(self.dereference(idx)).is_top()
  }

  /// The string value at `idx`, if it resolves to one
  pub fn str(&self, idx: NodeIdx) -> Option<&str> {
    self.get(self.dereference(idx)).str()
  }

  /// The arcs at `idx`, if it resolves to an edged node
  pub fn edged(&self, idx: NodeIdx) -> Option<&BTreeMap<String, NodeIdx>> {
    self.get(self.dereference(idx)).edged()
  }

  #[allow(clippy::map_entry)]
  fn push_edge(&mut self, parent: NodeIdx, label: String, target: NodeIdx) -> Result<()> {
    let parent = self.dereference(parent);
    let node = self.get_mut(parent);

    if node.is_top() {
      *node = Node::Edged(BTreeMap::new());
    }

    let existing = match node.edged_mut() {
      Some(arcs) => match arcs.get(&label) {
        Some(&existing) => existing,
        None => {
          arcs.insert(label, target);
          return Ok(());
        }
      },
      None => {
        return Err(Error::Unification(format!(
          "can't add arc {} to a string value",
          label
        )));
      }
    };

    self.unify(existing, target)
  }

  pub fn dereference(&self, mut idx: NodeIdx) -> NodeIdx {
    while let Node::Forwarded(r) = self.get(idx) {
      idx = *r;
    }
    idx
  }

  /// Unify two feature structures within this arena. Both may be mutated, and on
  /// failure they're left partially unified.
  pub fn unify(&mut self, n1: NodeIdx, n2: NodeIdx) -> Result<()> {
    let n1 = self.dereference(n1);
    let n2 = self.dereference(n2);

    // if same node, already unified
    if n1 == n2 {
      return Ok(());
    }

    // top forwards to the other side without checking
    if self.get(n1).is_top() {
      self.forward_to(n1, n2);
      return Ok(());
    } else if self.get(n2).is_top() {
      self.forward_to(n2, n1);
      return Ok(());
    }

    match (self.get(n1), self.get(n2)) {
      (Node::Str(s1), Node::Str(s2)) => {
        if s1 == s2 {
          self.forward_to(n1, n2);
          Ok(())
        } else {
          Err(Error::Unification(format!("{} & {}", s1, s2)))
        }
      }
      (Node::Edged(_), Node::Edged(_)) => {
        let n1arcs = match self.forward_to(n1, n2) {
          Node::Edged(arcs) => arcs,
          _ => unreachable!(),
        };

        for (label, value) in n1arcs {
          // n2 may have been forwarded by a reentrant arc, so look it up fresh
          let n2 = self.dereference(n2);
          let shared = match self.get(n2).edged() {
            Some(arcs) => arcs.get(&label).copied(),
            None => {
              return Err(Error::Unification(format!(
                "{} arc met a string value",
                label
              )));
            }
          };

          match shared {
            Some(other) => self.unify(value, other)?,
            None => {
              if let Some(arcs) = self.get_mut(n2).edged_mut() {
                arcs.insert(label, value);
              }
            }
          }
        }

        Ok(())
      }
      (a, b) => Err(Error::Unification(format!(
        "{} & {}",
        self.display_node(a),
        self.display_node(b)
      ))),
    }
  }

  fn display_node(&self, node: &Node) -> String {
    match node {
      Node::Str(s) => s.clone(),
      Node::Edged(_) => "[...]".to_string(),
      Node::Top => "**top**".to_string(),
      Node::Forwarded(to) => self.display(*to).to_string(),
    }
  }
}

/// Helper struct for displaying a node
#[derive(Clone)]
pub struct NodeDisplay<'a> {
  pub arena: &'a NodeArena,
  pub idx: NodeIdx,
}

impl fmt::Display for NodeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut counts = HashMap::new();
    count_in_pointers(self.arena, self.idx, &mut counts);
    let mut has_printed = HashMap::new();
    format_node(self.arena, self.idx, &counts, &mut has_printed, 0, f)
  }
}

fn count_in_pointers(arena: &NodeArena, idx: NodeIdx, seen: &mut HashMap<NodeIdx, usize>) {
  let idx = arena.dereference(idx);
  if let Some(count) = seen.get_mut(&idx) {
    *count += 1;
    return;
  }

  seen.insert(idx, 1);
  if let Some(arcs) = arena.get(idx).edged() {
    for value in arcs.values() {
      count_in_pointers(arena, *value, seen);
    }
  }
}

fn format_node(
  arena: &NodeArena,
  idx: NodeIdx,
  counts: &HashMap<NodeIdx, usize>,
  has_printed: &mut HashMap<NodeIdx, usize>,
  indent: usize,
  f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
  let idx = arena.dereference(idx);

  if counts[&idx] > 1 {
    if let Some(id) = has_printed.get(&idx) {
      return write!(f, "#{}", id);
    }
    let id = has_printed.len();
    has_printed.insert(idx, id);
    write!(f, "#{} ", id)?;
  }

  match arena.get(idx) {
    Node::Top => write!(f, "**top**"),
    Node::Str(s) => write!(f, "{}", s),
    Node::Edged(arcs) => {
      if arcs.is_empty() {
        write!(f, "[]")
      } else if arcs.len() == 1 {
        let (label, value) = arcs.iter().next().expect("len == 1");
        write!(f, "[ {}: ", label)?;
        format_node(arena, *value, counts, has_printed, 0, f)?;
        write!(f, " ]")
      } else {
        writeln!(f, "[")?;
        for (label, value) in arcs.iter() {
          write!(f, "{:indent$}{}: ", "", label, indent = indent + 2)?;
          format_node(arena, *value, counts, has_printed, indent + 2, f)?;
          writeln!(f)?;
        }
        write!(f, "{:indent$}]", "", indent = indent)
      }
    }
    Node::Forwarded(_) => panic!("unexpected forward"),
  }
}
