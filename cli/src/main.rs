use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use featparse::{
  ChartParser, DEFAULT_MARGIN, DEFAULT_TRACE_WIDTH, LineProcessor, TerminalViewer, load_grammars,
};

/// Parse sentences from standard input with one or more feature grammars
#[derive(Parser, Debug)]
#[command(name = "featparse", version, about, long_about = None)]
struct Args {
  /// Grammar files, read in order. Their rules are combined into one grammar.
  #[arg(required = true, num_args = 1..)]
  grammars: Vec<PathBuf>,

  /// Draw each tree and wait for Enter before moving on
  #[arg(long)]
  draw: bool,

  /// Print the parse chart for every sentence
  #[arg(short, long)]
  verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .try_init()
    .map_err(|err| anyhow::anyhow!("couldn't start logging: {}", err))
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_tracing(args.verbose)?;

  let grammar = load_grammars(&args.grammars, None).context("couldn't load grammars")?;
  info!(
    files = args.grammars.len(),
    rules = grammar.rules().len(),
    start = %grammar.start,
    "loaded grammar"
  );

  let parser = ChartParser::new(&grammar)
    .with_trace(args.verbose)
    .with_trace_width(DEFAULT_TRACE_WIDTH);
  let mut processor = LineProcessor::new(parser).with_margin(DEFAULT_MARGIN);
  if args.draw {
    processor = processor.with_viewer(Box::new(TerminalViewer::new()));
  }

  let stdin = io::stdin();
  let stdout = io::stdout();
  processor
    .run(stdin.lock(), &mut stdout.lock())
    .context("failed while parsing input")?;

  Ok(())
}
