use std::collections::BTreeMap;
use std::fmt;

use super::node::{Node, NodeArena, NodeIdx};

/// A feature structure copied out of its arena into a plain tree. Nodes with
/// multiple in-pointers are duplicated, and arcs that loop back to an
/// enclosing node are dropped.
/// IMPORTANT: **top** is /stripped out/. All top features will not be present in
/// the serialized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedNode {
  Str(String),
  Edged(BTreeMap<String, SerializedNode>),
}

impl SerializedNode {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Str(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_edged(&self) -> Option<&BTreeMap<String, SerializedNode>> {
    match self {
      Self::Edged(map) => Some(map),
      _ => None,
    }
  }

  pub fn get_path(&self, path: &[&str]) -> Option<&SerializedNode> {
    path
      .iter()
      .try_fold(self, |node, label| node.as_edged()?.get(*label))
  }

  pub fn get_path_str(&self, path: &[&str]) -> Option<&str> {
    self.get_path(path).and_then(Self::as_str)
  }

  /// Create a SerializedNode from a NodeArena and NodeIdx. Returns None if the
  /// whole structure is **top**.
  pub fn from_node(arena: &NodeArena, idx: NodeIdx) -> Option<Self> {
    Self::from_node_filtered(arena, idx, |_| true)
  }

  /// Like `from_node`, but only keeps the root's arcs whose label passes `keep`
  pub fn from_node_filtered<F>(arena: &NodeArena, idx: NodeIdx, keep: F) -> Option<Self>
  where
    F: Fn(&str) -> bool,
  {
    Self::serialize(arena, idx, &keep, &mut Vec::new())
  }

  /// `path` holds the nodes above `idx`. An arc leading back to one of them
  /// would never bottom out, so it's cut like a **top** value.
  fn serialize<F>(arena: &NodeArena, idx: NodeIdx, keep: &F, path: &mut Vec<NodeIdx>) -> Option<Self>
  where
    F: Fn(&str) -> bool,
  {
    let idx = arena.dereference(idx);
    if path.contains(&idx) {
      return None;
    }

    match arena.get(idx) {
      Node::Forwarded(_) => panic!("unexpected forward after dereference"),
      Node::Top => None,
      Node::Str(s) => Some(SerializedNode::Str(s.to_string())),
      Node::Edged(arcs) => {
        let at_root = path.is_empty();
        path.push(idx);
        let map = arcs
          .iter()
          .filter(|(label, _)| !at_root || keep(label))
          .filter_map(|(label, v)| {
            Self::serialize(arena, *v, keep, path).map(|value| (label.clone(), value))
          })
          .collect::<BTreeMap<_, _>>();
        path.pop();

        if map.is_empty() {
          None
        } else {
          Some(SerializedNode::Edged(map))
        }
      }
    }
  }
}

/// Compact single-line form, e.g. `[agr: [num: sg], case: nom]`
impl fmt::Display for SerializedNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Str(s) => write!(f, "{}", s),
      Self::Edged(map) => {
        write!(f, "[")?;
        for (idx, (label, value)) in map.iter().enumerate() {
          if idx > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}: {}", label, value)?;
        }
        write!(f, "]")
      }
    }
  }
}

impl From<&str> for SerializedNode {
  fn from(s: &str) -> Self {
    s.to_string().into()
  }
}

impl From<String> for SerializedNode {
  fn from(s: String) -> Self {
    Self::Str(s)
  }
}

impl From<BTreeMap<String, SerializedNode>> for SerializedNode {
  fn from(map: BTreeMap<String, SerializedNode>) -> Self {
    Self::Edged(map)
  }
}
