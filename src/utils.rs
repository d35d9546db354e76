/// Takes a list where each element is a set of choices, and returns every way of picking
/// one element from each set. Earlier sets vary fastest. Will clone the elements.
///
/// ```
/// let v = vec![
///   vec![1],
///   vec![2, 3],
///   vec![4],
///   vec![5, 6, 7],
/// ];
///
/// assert_eq!(featparse::utils::combinations(&v), vec![
///   vec![1, 2, 4, 5],
///   vec![1, 3, 4, 5],
///   vec![1, 2, 4, 6],
///   vec![1, 3, 4, 6],
///   vec![1, 2, 4, 7],
///   vec![1, 3, 4, 7],
/// ]);
/// ```
pub fn combinations<T>(list: &[Vec<T>]) -> Vec<Vec<T>>
where
  T: Clone,
{
  if list.is_empty() {
    return Vec::new();
  }

  // build suffixes back to front, so the head of each suffix is the fastest-moving choice
  let mut suffixes: Vec<Vec<T>> = vec![Vec::new()];
  for choices in list.iter().rev() {
    suffixes = suffixes
      .iter()
      .flat_map(|suffix| {
        choices.iter().map(move |choice| {
          let mut seq = Vec::with_capacity(suffix.len() + 1);
          seq.push(choice.clone());
          seq.extend(suffix.iter().cloned());
          seq
        })
      })
      .collect();
  }
  suffixes
}

/// Formats tokens like a Python list of strings: `['the', 'cat']`
///
/// ```
/// assert_eq!(featparse::utils::token_list(&["the", "cat"]), "['the', 'cat']");
/// assert_eq!(featparse::utils::token_list(&["don't"]), r#"["don't"]"#);
/// assert_eq!(featparse::utils::token_list::<&str>(&[]), "[]");
/// ```
pub fn token_list<S: AsRef<str>>(tokens: &[S]) -> String {
  let quoted = tokens
    .iter()
    .map(|t| quote_token(t.as_ref()))
    .collect::<Vec<_>>();
  format!("[{}]", quoted.join(", "))
}

fn quote_token(token: &str) -> String {
  let quote = if token.contains('\'') && !token.contains('"') {
    '"'
  } else {
    '\''
  };

  let mut s = String::with_capacity(token.len() + 2);
  s.push(quote);
  for c in token.chars() {
    match c {
      '\\' => s.push_str("\\\\"),
      '\t' => s.push_str("\\t"),
      '\n' => s.push_str("\\n"),
      '\r' => s.push_str("\\r"),
      c if c == quote => {
        s.push('\\');
        s.push(c);
      }
      c if !is_printable(c) => s.push_str(&escape_code(c)),
      c => s.push(c),
    }
  }
  s.push(quote);
  s
}

/// Control characters, separators other than the plain space, and the
/// invisible format characters are written as escapes
fn is_printable(c: char) -> bool {
  if c == ' ' {
    return true;
  }
  !(c.is_control()
    || c.is_whitespace()
    || matches!(
      c,
      '\u{ad}'
        | '\u{200b}'..='\u{200f}'
        | '\u{202a}'..='\u{202e}'
        | '\u{2060}'..='\u{2064}'
        | '\u{feff}'
    ))
}

fn escape_code(c: char) -> String {
  match c as u32 {
    n if n <= 0xff => format!("\\x{:02x}", n),
    n if n <= 0xffff => format!("\\u{:04x}", n),
    n => format!("\\U{:08x}", n),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn combinations_of_nothing_is_empty() {
    assert!(combinations::<u8>(&[]).is_empty());
    assert!(combinations(&[vec![1], Vec::new()]).is_empty());
  }

  #[test]
  fn token_list_escapes() {
    assert_eq!(token_list(&["a\\b"]), r"['a\\b']");
    assert_eq!(token_list(&["it's", "\"x\""]), r#"["it's", '"x"']"#);
    assert_eq!(token_list(&["'\""]), r#"['\'"']"#);
  }

  #[test]
  fn token_list_escapes_unprintable() {
    assert_eq!(token_list(&["a\u{0}b"]), r"['a\x00b']");
    assert_eq!(token_list(&["zero\u{200b}width"]), r"['zero\u200bwidth']");
    assert_eq!(token_list(&["\u{1f}"]), r"['\x1f']");
    assert_eq!(token_list(&["nbsp\u{a0}"]), r"['nbsp\xa0']");
    assert_eq!(token_list(&["caf\u{e9}", "\u{732b}"]), "['caf\u{e9}', '\u{732b}']");
  }
}
