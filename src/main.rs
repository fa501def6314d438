mod analysis;
mod config;
mod ext;
mod format;
mod parse;
mod rank;
mod stats;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use self::analysis::Analysis;

#[derive(Parser)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Analyze benchmark logs and render the report.
  Report {
    /// Directory containing per-machine benchmark logs.
    #[arg(long, default_value = "./results")]
    results_dir: PathBuf,
    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Print the raw aggregated structure instead of the report.
  Dump {
    /// Directory containing per-machine benchmark logs.
    #[arg(long, default_value = "./results")]
    results_dir: PathBuf,
  },
}

fn main() -> Result<()> {
  match Args::parse().command {
    Command::Report { results_dir, output } => {
      let analysis = analyze(results_dir)?;
      let report = format::format(&analysis.machines, &analysis.algos, &analysis.options).context("format")?;

      match output {
        Some(path) => fs::write(&path, &report).with_context(|| format!("write {path:?}"))?,
        None => print!("{report}"),
      }
    }
    Command::Dump { results_dir } => {
      let analysis = analyze(results_dir)?;

      println!("{:#?}", analysis.machines);
    }
  }

  Ok(())
}

fn analyze(results_dir: PathBuf) -> Result<Analysis> {
  if !results_dir.exists() {
    anyhow::bail!("{results_dir:?} does not exist");
  }

  let mut analysis = Analysis::new(config::machines(), config::Options::default(), &results_dir);
  analysis.analyze().context("analyze")?;

  Ok(analysis)
}
