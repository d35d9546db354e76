//! Top-down text pictures of syntax trees

use std::fmt;

use crate::syntree::SynTree;

/// Columns between sibling subtrees
const GAP: usize = 2;

/// A laid-out subtree. `anchor` is the column its connector hangs from.
struct Block {
  lines: Vec<Vec<char>>,
  width: usize,
  anchor: usize,
}

impl Block {
  fn text(text: &str) -> Self {
    let chars = text.chars().collect::<Vec<_>>();
    let width = chars.len();
    Self {
      lines: vec![chars],
      width,
      anchor: width / 2,
    }
  }
}

fn put(line: &mut Vec<char>, at: usize, text: &[char]) {
  if line.len() < at + text.len() {
    line.resize(at + text.len(), ' ');
  }
  line[at..at + text.len()].copy_from_slice(text);
}

fn layout<T, U, F>(tree: &SynTree<T, U>, label: &F) -> Block
where
  U: fmt::Display,
  F: Fn(&T) -> String,
{
  let (cons, children) = match tree {
    SynTree::Leaf(w) => return Block::text(&w.value.to_string()),
    SynTree::Branch(cons, children) => (cons, children),
  };

  let text = label(&cons.value).chars().collect::<Vec<_>>();
  if children.is_empty() {
    return Block::text(&text.iter().collect::<String>());
  }

  let blocks = children.iter().map(|c| layout(c, label)).collect::<Vec<_>>();

  let mut offsets = Vec::with_capacity(blocks.len());
  let mut x = 0;
  for block in blocks.iter() {
    offsets.push(x);
    x += block.width + GAP;
  }

  let anchor_of = |idx: usize, offsets: &[usize]| offsets[idx] + blocks[idx].anchor;
  let mut center = (anchor_of(0, &offsets[..]) + anchor_of(blocks.len() - 1, &offsets[..])) / 2;

  // a label wider than its children pushes them right
  let shift = (text.len() / 2).saturating_sub(center);
  for offset in offsets.iter_mut() {
    *offset += shift;
  }
  center += shift;
  let anchors = (0..blocks.len())
    .map(|idx| anchor_of(idx, &offsets[..]))
    .collect::<Vec<_>>();

  let mut lines = Vec::new();

  let mut label_line = Vec::new();
  put(&mut label_line, center - text.len() / 2, &text);
  lines.push(label_line);

  let mut connector = Vec::new();
  if anchors.len() == 1 {
    put(&mut connector, center, &['|']);
    lines.push(connector);
  } else {
    let first = anchors[0];
    let last = anchors[anchors.len() - 1];
    put(&mut connector, first, &vec!['_'; last - first + 1]);
    put(&mut connector, center, &['|']);
    lines.push(connector);

    let mut drops = Vec::new();
    for anchor in anchors.iter() {
      put(&mut drops, *anchor, &['|']);
    }
    lines.push(drops);
  }

  let height = blocks.iter().map(|b| b.lines.len()).max().unwrap_or(0);
  for row in 0..height {
    let mut line = Vec::new();
    for (block, offset) in blocks.iter().zip(offsets.iter()) {
      if let Some(part) = block.lines.get(row) {
        put(&mut line, *offset, part);
      }
    }
    lines.push(line);
  }

  let width = lines.iter().map(Vec::len).max().unwrap_or(0);
  Block {
    lines,
    width,
    anchor: center,
  }
}

/// Draws `tree` as lines of text, labels centered over their children
pub fn draw<T, U, F>(tree: &SynTree<T, U>, label: &F) -> String
where
  U: fmt::Display,
  F: Fn(&T) -> String,
{
  layout(tree, label)
    .lines
    .iter()
    .map(|line| line.iter().collect::<String>().trim_end().to_string())
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntree::{Constituent, Word};

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

  #[test]
  fn test_unary() {
    let tree = branch("VP", vec![leaf("sat")]);
    assert_eq!(draw(&tree, &String::clone), "VP\n |\nsat");
  }

  #[test]
  fn test_binary() {
    let tree = branch("NP", vec![leaf("the"), leaf("cat")]);
    assert_eq!(
      draw(&tree, &String::clone),
      ["  NP", " __|___", " |    |", "the  cat"].join("\n")
    );
  }

  #[test]
  fn test_wide_label_shifts_children() {
    let tree = branch("Sentence", vec![leaf("go")]);
    let picture = draw(&tree, &String::clone);
    let lines = picture.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Sentence");
    assert_eq!(lines[1], "    |");
    assert_eq!(lines[2], "   go");
  }

  #[test]
  fn test_nested_keeps_every_word() {
    let tree = branch(
      "Sentence",
      vec![
        branch("NP", vec![leaf("the"), leaf("cat")]),
        branch("VP", vec![leaf("sat")]),
      ],
    );
    let picture = draw(&tree, &String::clone);
    for word in ["Sentence", "NP", "VP", "the", "cat", "sat"] {
      assert!(picture.contains(word), "{}", picture);
    }
    assert!(picture.lines().all(|l| !l.ends_with(' ')));
  }
}
