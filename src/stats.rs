use std::{collections::BTreeMap, path::PathBuf};

use crate::format;

/// Composite key into a machine's flat metric table: index into the global
/// algorithm list, operation, metric. Keeps iteration order uniform across
/// machines without nested maps.
pub type Key = (usize, Op, Metric);

/// Cryptographic operations measured by the benchmark, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Op {
  OaepEncrypt,
  OaepDecrypt,
  PssSign,
  PssVerify,
}

impl Op {
  pub const ALL: [Op; 4] = [Op::OaepEncrypt, Op::OaepDecrypt, Op::PssSign, Op::PssVerify];

  /// The operation name as it appears in benchmark log keys.
  pub fn name(self) -> &'static str {
    match self {
      Op::OaepEncrypt => "oaep-encrypt",
      Op::OaepDecrypt => "oaep-decrypt",
      Op::PssSign => "pss-sign",
      Op::PssVerify => "pss-verify",
    }
  }

  pub fn from_name(name: &str) -> Option<Op> {
    Self::ALL.into_iter().find(|op| op.name() == name)
  }
}

/// Metrics derived from each (microseconds, count) sample, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Metric {
  /// Operations per reference-second window.
  OpRate,
  /// Operations per reference-cycle window.
  OpCycle,
  /// Processor cycles consumed per operation.
  Cycles,
}

impl Metric {
  pub const ALL: [Metric; 3] = [Metric::OpRate, Metric::OpCycle, Metric::Cycles];
}

/// One measurement slot. `Absent` means no sample contributed for this
/// combination; a present cell keeps `rank` 0 until the ranking pass assigns
/// a dense rank, and forever if its value is not strictly positive.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
  #[default]
  Absent,
  Present { value: f64, text: String, rank: usize },
}

impl Cell {
  /// An unranked cell with its display text derived from `value`.
  pub fn present(value: f64) -> Self {
    Cell::Present {
      value,
      text: format::format_num(value),
      rank: 0,
    }
  }

  pub fn value(&self) -> Option<f64> {
    match self {
      Cell::Absent => None,
      Cell::Present { value, .. } => Some(*value),
    }
  }

  /// Display text; empty for absent cells.
  pub fn text(&self) -> &str {
    match self {
      Cell::Absent => "",
      Cell::Present { text, .. } => text,
    }
  }
}

/// One benchmarked machine's full result set.
#[derive(Debug)]
pub struct Machine {
  /// Display name.
  pub name: String,
  /// Clock frequency in GHz.
  pub frequency: f64,
  /// Resolved path of the source log file.
  pub file: PathBuf,
  /// Crypto library version, from configuration or the log. May be empty.
  pub openssl: String,
  /// Position among surviving machines; join key and tie-break for ranking.
  pub index: usize,
  /// Widest annotated cell text, tracked by the ranking pass for layout.
  pub width: usize,
  /// Flat metric table, backfilled to the full surviving key set.
  pub table: BTreeMap<Key, Cell>,
}

impl Machine {
  pub fn frequency_label(&self) -> String {
    format!("{:.2} GHz", self.frequency)
  }
}
