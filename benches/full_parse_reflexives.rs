use criterion::{Criterion, black_box, criterion_group, criterion_main};

use featparse::{ChartParser, Grammar, RenderTree};

const GRAMMAR_SRC: &str = include_str!("../grammars/reflexives.fgr");

fn parse(parser: &ChartParser<'_>, input: &[&str]) -> usize {
  parser.parse(input).len()
}

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = GRAMMAR_SRC.parse::<Grammar>().unwrap();
  let parser = ChartParser::new(&grammar);
  let simple_input = "mary likes sue".split(' ').collect::<Vec<_>>();
  let complex_input = "mary said that she likes herself"
    .split(' ')
    .collect::<Vec<_>>();

  c.bench_function("parse simple", |b| {
    b.iter(|| parse(black_box(&parser), black_box(&simple_input)))
  });

  c.bench_function("parse complex reflexive", |b| {
    b.iter(|| parse(black_box(&parser), black_box(&complex_input)))
  });

  let trees = parser.parse(&complex_input);
  c.bench_function("format complex reflexive", |b| {
    b.iter(|| {
      trees
        .iter()
        .map(|t| black_box(t.pformat(80)).len())
        .sum::<usize>()
    })
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
