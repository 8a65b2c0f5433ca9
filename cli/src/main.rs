use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;
use treedeps::{English, GrammaticalStructure, TypedDependency, read_trees};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} [FILE] [options]

Reads Penn Treebank bracketed trees from FILE (or stdin) and prints
their typed dependencies, one sentence per block.

Options:
  -h, --help          Print this message
  -m, --mode MODE     basic, all, tree, collapsed or ccprocessed
                      (defaults to ccprocessed)
  -x, --no-extras     Leave out extra dependencies in collapsed modes
  -t, --thread-safe   Lock the relation catalog while matching",
    prog_name
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Basic,
  All,
  Tree,
  Collapsed,
  CcProcessed,
}

impl Mode {
  fn from_name(s: &str) -> Option<Self> {
    match s {
      "basic" => Some(Self::Basic),
      "all" => Some(Self::All),
      "tree" => Some(Self::Tree),
      "collapsed" => Some(Self::Collapsed),
      "ccprocessed" | "cc" => Some(Self::CcProcessed),
      _ => None,
    }
  }
}

struct Args {
  filename: Option<String>,
  mode: Mode,
  extras: bool,
  thread_safe: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    let mut iter = v.into_iter();
    let Some(prog_name) = iter.next() else {
      return Err(Self::make_error_message("bad argument vector", "treedeps"));
    };

    let mut filename: Option<String> = None;
    let mut mode = Mode::CcProcessed;
    let mut extras = true;
    let mut thread_safe = false;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-m" || o == "--mode" {
        let name = iter
          .next()
          .ok_or_else(|| Self::make_error_message("missing mode name", &prog_name))?;
        mode = Mode::from_name(&name)
          .ok_or_else(|| Self::make_error_message(&format!("unknown mode `{}`", name), &prog_name))?;
      } else if o == "-x" || o == "--no-extras" {
        extras = false;
      } else if o == "-t" || o == "--thread-safe" {
        thread_safe = true;
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    Ok(Self {
      filename,
      mode,
      extras,
      thread_safe,
    })
  }
}

fn dependencies(gs: &GrammaticalStructure, opts: &Args) -> Vec<TypedDependency> {
  match opts.mode {
    Mode::Basic => gs.typed_dependencies(),
    Mode::All => gs.all_typed_dependencies(),
    Mode::Tree => gs.typed_dependencies_collapsed_tree(),
    Mode::Collapsed => gs.typed_dependencies_collapsed(opts.extras),
    Mode::CcProcessed => gs.typed_dependencies_cc_processed(opts.extras),
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let input = match &opts.filename {
    Some(filename) => fs::read_to_string(filename)?,
    None => {
      let mut input = String::new();
      io::stdin().read_to_string(&mut input)?;
      input
    }
  };

  let trees = read_trees(&input)?;
  info!(count = trees.len(), mode = ?opts.mode, "read trees");

  let english = English::global();
  let options = treedeps::BuildOptions {
    thread_safe: opts.thread_safe,
  };
  let stdout = io::stdout();
  let mut out = stdout.lock();
  for tree in &trees {
    let gs = GrammaticalStructure::with_options(tree, english, options)?;
    for dep in dependencies(&gs, &opts) {
      writeln!(out, "{}", dep)?;
    }
    writeln!(out)?;
  }

  Ok(())
}
