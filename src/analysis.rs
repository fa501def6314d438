use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
  config::{MachineConfig, Options},
  parse, rank,
  stats::{Cell, Machine, Metric, Op},
};

/// The full load/derive/rank pipeline over one set of benchmark logs.
pub struct Analysis {
  /// Configured machines, whether or not their log exists.
  configs: Vec<MachineConfig>,
  /// Base directory for relative log file names.
  results_dir: PathBuf,
  pub options: Options,
  /// Machines whose log file existed, in configuration order.
  pub machines: Vec<Machine>,
  /// Distinct algorithm names in first-seen order across all machines.
  pub algos: Vec<String>,
}

impl Analysis {
  pub fn new(configs: Vec<MachineConfig>, options: Options, results_dir: &Path) -> Self {
    Self {
      configs,
      results_dir: results_dir.to_path_buf(),
      options,
      machines: Vec::new(),
      algos: Vec::new(),
    }
  }

  /// Runs the pipeline: parse every existing log, backfill and prune the
  /// combined structure, then rank machines per metric.
  pub fn analyze(&mut self) -> Result<()> {
    self.load().context("load")?;
    self.backfill();
    self.prune();
    rank::rank(&mut self.machines, self.algos.len(), &self.options);

    Ok(())
  }

  fn load(&mut self) -> Result<()> {
    for config in self.configs.clone() {
      let path = self.resolve(&config.file);

      // A missing log only means this machine was not benchmarked yet.
      if !path.exists() {
        continue;
      }

      eprintln!("loading {path:?}");

      let parsed = parse::parse_file(&path, config.frequency, &self.options, &mut self.algos)
        .with_context(|| format!("parse {path:?}"))?;

      self.machines.push(Machine {
        name: config.name,
        frequency: config.frequency,
        file: path,
        openssl: config.openssl.or(parsed.openssl).unwrap_or_default(),
        index: self.machines.len(),
        width: 0,
        table: parsed.table,
      });
    }

    Ok(())
  }

  fn resolve(&self, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.results_dir.join(path)
    }
  }

  /// Inserts `Absent` for every missing (algorithm, operation, metric), so
  /// every machine exposes the same key set downstream.
  fn backfill(&mut self) {
    for machine in &mut self.machines {
      for algo in 0..self.algos.len() {
        for op in Op::ALL {
          for metric in Metric::ALL {
            machine.table.entry((algo, op, metric)).or_default();
          }
        }
      }
    }
  }

  /// Drops (algorithm, operation) pairs no machine measured, e.g. sign
  /// operations of an encryption-only algorithm.
  fn prune(&mut self) {
    for algo in 0..self.algos.len() {
      for op in Op::ALL {
        let empty = self.machines.iter().all(|machine| {
          Metric::ALL
            .iter()
            .all(|metric| matches!(machine.table.get(&(algo, op, *metric)), None | Some(Cell::Absent)))
        });

        if empty {
          for machine in &mut self.machines {
            for metric in Metric::ALL {
              machine.table.remove(&(algo, op, metric));
            }
          }
        }
      }
    }
  }
}
