use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn into_branch(self) -> Option<(Constituent<T>, Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The words at the leaves, left to right
  pub fn leaves(&self) -> Vec<&U> {
    match self {
      Self::Leaf(w) => vec![&w.value],
      Self::Branch(_, children) => children.iter().flat_map(|c| c.leaves()).collect(),
    }
  }
}

impl<T, U: fmt::Display> SynTree<T, U> {
  /// Bracketed text of the tree, e.g. `(S (NP the cat) (VP sat))`. A subtree
  /// that fits within `margin` columns goes on one line, otherwise each child
  /// goes on its own line, indented two more spaces than its parent.
  pub fn pformat<F>(&self, margin: usize, label: &F) -> String
  where
    F: Fn(&T) -> String,
  {
    self.pformat_at(margin, 0, label)
  }

  fn pformat_at<F>(&self, margin: usize, indent: usize, label: &F) -> String
  where
    F: Fn(&T) -> String,
  {
    let flat = self.flat(label);
    if flat.chars().count() + indent < margin {
      return flat;
    }

    match self {
      Self::Leaf(w) => w.value.to_string(),
      Self::Branch(cons, children) => {
        let mut s = format!("({}", label(&cons.value));
        for child in children.iter() {
          s.push('\n');
          s.push_str(&" ".repeat(indent + 2));
          s.push_str(&child.pformat_at(margin, indent + 2, label));
        }
        s.push(')');
        s
      }
    }
  }

  fn flat<F>(&self, label: &F) -> String
  where
    F: Fn(&T) -> String,
  {
    match self {
      Self::Leaf(w) => w.value.to_string(),
      Self::Branch(cons, children) => {
        let mut s = format!("({}", label(&cons.value));
        for child in children.iter() {
          s.push(' ');
          s.push_str(&child.flat(label));
        }
        s.push(')');
        s
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn branch(label: &str, children: Vec<SynTree<String, String>>) -> SynTree<String, String> {
    SynTree::Branch(
      Constituent {
        value: label.to_string(),
        span: (0, 0),
      },
      children,
    )
  }

  fn leaf(word: &str) -> SynTree<String, String> {
    SynTree::Leaf(Word {
      value: word.to_string(),
      span: (0, 1),
    })
  }

  fn sentence() -> SynTree<String, String> {
    branch(
      "Sentence",
      vec![
        branch("NP", vec![leaf("the"), leaf("cat")]),
        branch("VP", vec![leaf("sat")]),
      ],
    )
  }

  #[test]
  fn test_pformat_flat() {
    assert_eq!(
      sentence().pformat(80, &String::clone),
      "(Sentence (NP the cat) (VP sat))"
    );
  }

  #[test]
  fn test_pformat_wraps() {
    // too wide for the root, but each child fits once indented
    assert_eq!(
      sentence().pformat(20, &String::clone),
      "(Sentence\n  (NP the cat)\n  (VP sat))"
    );
    assert_eq!(
      sentence().pformat(11, &String::clone),
      "(Sentence\n  (NP\n    the\n    cat)\n  (VP sat))"
    );
  }

  #[test]
  fn test_leaves() {
    assert_eq!(sentence().leaves(), vec!["the", "cat", "sat"]);
  }
}
