use std::path::{Path, PathBuf};

use featparse::{ChartParser, Grammar, LineOutcome, LineProcessor, Summary, load_grammars};

fn grammar_path(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("grammars").join(name)
}

fn english(files: &[&str]) -> Grammar {
  let paths = files.iter().map(|f| grammar_path(f)).collect::<Vec<_>>();
  load_grammars(&paths, None).unwrap()
}

fn run(grammar: &Grammar, verbose: bool, input: &str) -> (String, Summary) {
  let parser = ChartParser::new(grammar).with_trace(verbose);
  let mut out = Vec::new();
  let summary = LineProcessor::new(parser)
    .run(input.as_bytes(), &mut out)
    .unwrap();
  (String::from_utf8(out).unwrap(), summary)
}

#[test]
fn test_toy_sentence() {
  let g = load_grammars(&[grammar_path("toy.fgr")], None).unwrap();
  let (out, summary) = run(&g, false, "The cat sat\n");

  assert_eq!(
    out,
    "*** ['the', 'cat', 'sat'] ***\n(Sentence (NP the cat) (VP sat))\n\n\n"
  );
  assert_eq!(summary.parsed, 1);
}

#[test]
fn test_unknown_word() {
  let g = load_grammars(&[grammar_path("toy.fgr")], None).unwrap();
  let (out, summary) = run(&g, false, "the dog sat\n");

  assert_eq!(
    out,
    "*** ['the', 'dog', 'sat'] ***\nCould not parse ['the', 'dog', 'sat']\n\n\n"
  );
  assert_eq!(summary.unparsed, 1);
}

#[test]
fn test_comments_and_blank_lines() {
  let g = load_grammars(&[grammar_path("toy.fgr")], None).unwrap();
  let (out, summary) = run(&g, false, "# the cat sat\n\n  \nthe cat sat\n");

  assert!(out.starts_with("*** ['the', 'cat', 'sat'] ***\n"), "{}", out);
  assert_eq!(out.matches("***").count(), 2);
  assert_eq!(summary.skipped, 3);
  assert_eq!(summary.lines, 4);
}

#[test]
fn test_agreement_across_files() {
  let g = english(&["english-syntax.fgr", "english-lexicon.fgr"]);
  let (out, summary) = run(&g, false, "kim walks\nkim walk\nthese dog barks\nthe dogs bark\n");

  assert!(out.contains("(PropN[agr: [num: sg]] kim)"), "{}", out);
  assert!(out.contains("Could not parse ['kim', 'walk']"), "{}", out);
  assert!(out.contains("Could not parse ['these', 'dog', 'barks']"), "{}", out);
  assert_eq!(summary.parsed, 2);
  assert_eq!(summary.unparsed, 2);
}

#[test]
fn test_attachment_ambiguity() {
  let g = english(&["english-syntax.fgr", "english-lexicon.fgr"]);
  let mut processor = LineProcessor::new(ChartParser::new(&g));
  let mut out = Vec::new();

  let outcome = processor
    .process_line("Kim saw the dog in the park", &mut out)
    .unwrap();
  assert_eq!(outcome, LineOutcome::Parsed(2));
}

#[test]
fn test_file_order_does_not_matter() {
  let forward = english(&["english-syntax.fgr", "english-lexicon.fgr"]);
  let backward = english(&["english-lexicon.fgr", "english-syntax.fgr"]);
  let input = "kim sees the dog\njody chase kim\n";

  assert_eq!(run(&forward, false, input), run(&backward, false, input));
}

#[test]
fn test_trace_comes_before_header() {
  let g = load_grammars(&[grammar_path("toy.fgr")], None).unwrap();
  let (out, _) = run(&g, true, "the cat sat\n");

  let header = out.find("*** ['the', 'cat', 'sat'] ***").unwrap();
  assert!(out.starts_with("|."), "{}", out);
  assert!(out[..header].contains("Sentence -> NP VP *"), "{}", out);
  assert!(out[header..].contains("(Sentence (NP the cat) (VP sat))"));
}
