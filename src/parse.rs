use std::{
  collections::BTreeMap,
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use anyhow::{Context, Result};
use regex::Regex;

use crate::{
  config::Options,
  ext::StrExt,
  stats::{Cell, Key, Metric, Op},
};

/// Leading version token of an `openssl:` record, e.g. `3.0.13` or `1.1.1w`.
const VERSION_PATTERN: &str = r"[0-9.]+[a-zA-Z]*";

/// Data extracted from one machine's benchmark log.
#[derive(Debug)]
pub struct Parsed {
  pub table: BTreeMap<Key, Cell>,
  /// Version token from the first `openssl:` record, if any.
  pub openssl: Option<String>,
}

/// Reads one benchmark log and derives the metric cells for every completed
/// (microseconds, count) sample pair.
///
/// `algos` is the global algorithm list shared across machines; names unseen
/// so far are appended, keeping first-seen order.
///
/// # Errors
///
/// This will return an error if:
/// - the file cannot be opened or read;
/// - a recognized sample record carries a malformed number;
/// - a `count` record arrives without a usable `microsec` value.
pub fn parse_file(path: &Path, frequency: f64, options: &Options, algos: &mut Vec<String>) -> Result<Parsed> {
  let file = File::open(path).with_context(|| format!("open {path:?}"))?;
  let version = Regex::new(VERSION_PATTERN).context("version pattern")?;

  let mut parsed = Parsed {
    table: BTreeMap::new(),
    openssl: None,
  };

  // Sample records are only meaningful inside an `algo:` block, and a count
  // pairs with the most recently seen microseconds value.
  let mut algo: Option<usize> = None;
  let mut microsec: Option<f64> = None;

  for (number, line) in BufReader::new(file).lines().enumerate() {
    let number = number + 1;
    let line = line.with_context(|| format!("read {path:?}"))?;

    let fields = line.split_fields(':');
    if fields.len() < 2 {
      continue;
    }
    let (key, value) = (fields[0], fields[1]);

    if key == "algo" {
      let index = algos.iter().position(|known| known == value).unwrap_or_else(|| {
        algos.push(value.to_string());
        algos.len() - 1
      });

      for op in Op::ALL {
        for metric in Metric::ALL {
          parsed.table.insert((index, op, metric), Cell::Absent);
        }
      }

      algo = Some(index);
      continue;
    }

    if key == "openssl" {
      if parsed.openssl.is_none() {
        parsed.openssl = version.find(value).map(|token| token.as_str().to_string());
      }
      continue;
    }

    // Remaining recognized keys are `<op>-microsec` and `<op>-count`; any
    // other key is ignored (`key-size`, `data-size`, ...).
    let segments = key.split_fields('-');
    let Some((&kind, operation)) = segments.split_last() else {
      continue;
    };
    let Some(op) = Op::from_name(&operation.join("-")) else {
      continue;
    };

    match (kind, algo) {
      ("microsec", Some(_)) => {
        microsec = Some(value.parse_number().with_context(|| format!("{}:{number}", path.display()))?);
      }
      ("count", Some(index)) => {
        let count = value.parse_number().with_context(|| format!("{}:{number}", path.display()))?;
        let microsec = match microsec {
          Some(elapsed) if elapsed > 0.0 => elapsed,
          _ => anyhow::bail!("{}:{number}: count record without a usable microsec", path.display()),
        };

        let oprate = options.reference_seconds as f64 * 1e6 * count / microsec;
        let opcycle = options.reference_cycles as f64 * count / (1000.0 * microsec * frequency);
        let cycles = if count > 0.0 { 1000.0 * microsec * frequency / count } else { 0.0 };

        parsed.table.insert((index, op, Metric::OpRate), Cell::present(oprate));
        parsed.table.insert((index, op, Metric::OpCycle), Cell::present(opcycle));
        parsed.table.insert((index, op, Metric::Cycles), Cell::present(cycles));
      }
      _ => {}
    }
  }

  Ok(parsed)
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  fn write_log(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  fn parse(contents: &str, frequency: f64, algos: &mut Vec<String>) -> Result<Parsed> {
    let file = write_log(contents);
    parse_file(file.path(), frequency, &Options::default(), algos)
  }

  #[test]
  fn derives_metrics_from_sample_pairs() {
    let mut algos = Vec::new();
    let parsed = parse(
      "algo: rsa2048\noaep-encrypt-microsec: 50.0\noaep-encrypt-count: 1000.0\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    assert_eq!(algos, vec!["rsa2048"]);

    let cell = |metric| parsed.table[&(0, Op::OaepEncrypt, metric)].clone();
    assert_eq!(cell(Metric::OpRate), Cell::present(20_000.0));
    assert_eq!(cell(Metric::OpCycle), Cell::present(10_000_000.0));
    assert_eq!(cell(Metric::Cycles), Cell::present(100.0));
    assert_eq!(cell(Metric::OpRate).text(), "20,000");
  }

  #[test]
  fn unmeasured_operations_stay_absent() {
    let mut algos = Vec::new();
    let parsed = parse(
      "algo: rsa2048\noaep-encrypt-microsec: 50.0\noaep-encrypt-count: 1000.0\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    assert_eq!(parsed.table[&(0, Op::PssSign, Metric::OpRate)], Cell::Absent);
    assert_eq!(parsed.table.len(), Op::ALL.len() * Metric::ALL.len());
  }

  #[test]
  fn samples_outside_an_algo_block_are_ignored() {
    let mut algos = Vec::new();
    let parsed = parse("oaep-encrypt-microsec: 50.0\noaep-encrypt-count: 1000.0\n", 2.0, &mut algos).unwrap();

    assert!(algos.is_empty());
    assert!(parsed.table.is_empty());
  }

  #[test]
  fn unrecognized_keys_are_ignored() {
    let mut algos = Vec::new();
    let parsed = parse(
      "algo: rsa2048\nkey-size: 2048\ndata-size: 128\nnot a record\ncbc-encrypt-count: 12\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    assert!(parsed.table.values().all(|cell| *cell == Cell::Absent));
  }

  #[test]
  fn repeated_algo_block_reinitializes() {
    let mut algos = Vec::new();
    let parsed = parse(
      "algo: rsa2048\noaep-encrypt-microsec: 50.0\noaep-encrypt-count: 1000.0\nalgo: rsa2048\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    assert_eq!(algos, vec!["rsa2048"]);
    assert!(parsed.table.values().all(|cell| *cell == Cell::Absent));
  }

  #[test]
  fn extracts_openssl_version_once() {
    let mut algos = Vec::new();
    let parsed = parse(
      "openssl: OpenSSL 3.0.13 30 Jan 2024\nopenssl: OpenSSL 1.1.1w\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    assert_eq!(parsed.openssl.as_deref(), Some("3.0.13"));
  }

  #[test]
  fn malformed_number_fails_with_line_context() {
    let mut algos = Vec::new();
    let error = parse("algo: rsa2048\noaep-encrypt-microsec: fast\n", 2.0, &mut algos).unwrap_err();

    assert!(format!("{error:#}").contains(":2"), "{error:#}");
  }

  #[test]
  fn count_without_microsec_fails() {
    let mut algos = Vec::new();
    let error = parse("algo: rsa2048\noaep-encrypt-count: 1000.0\n", 2.0, &mut algos).unwrap_err();

    assert!(format!("{error:#}").contains("microsec"), "{error:#}");
  }

  #[test]
  fn zero_count_yields_zero_valued_cells() {
    let mut algos = Vec::new();
    let parsed = parse(
      "algo: rsa2048\noaep-encrypt-microsec: 50.0\noaep-encrypt-count: 0\n",
      2.0,
      &mut algos,
    )
    .unwrap();

    let cell = &parsed.table[&(0, Op::OaepEncrypt, Metric::Cycles)];
    assert_eq!(cell.value(), Some(0.0));
    assert_eq!(cell.text(), "0");
  }
}
