use std::fmt::Write;

use anyhow::Result;

use crate::{
  config::Options,
  stats::{Cell, Machine, Metric, Op},
};

const COLUMN_SEPARATOR: &str = "   ";
const HEADER_LABELS: [&str; 3] = ["CPU", "Frequency", "OpenSSL"];

fn header_values(machine: &Machine) -> [String; 3] {
  [machine.name.clone(), machine.frequency_label(), machine.openssl.clone()]
}

/// Formats a metric value compactly: thousands-grouped integer for whole or
/// large values, then one to three decimals as the magnitude drops. Column
/// widths derive from these strings, so the ladder is load-bearing.
pub fn format_num(value: f64) -> String {
  if value == value.trunc() || value >= 100.0 {
    group_thousands(value as u64)
  } else if value >= 10.0 {
    format!("{value:.1}")
  } else if value >= 1.0 {
    format!("{value:.2}")
  } else {
    format!("{value:.3}")
  }
}

/// Thousands-grouped decimal rendering, `1234567` -> `"1,234,567"`.
fn group_thousands(value: u64) -> String {
  let digits = value.to_string();

  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (position, digit) in digits.chars().enumerate() {
    if position > 0 && (digits.len() - position) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }

  grouped
}

fn title(metric: Metric, options: &Options) -> String {
  match metric {
    Metric::OpRate => match options.reference_seconds {
      1 => "CRYPTOGRAPHIC OPERATIONS PER SECOND".to_string(),
      n => format!("CRYPTOGRAPHIC OPERATIONS PER {} SECONDS", group_thousands(n)),
    },
    Metric::OpCycle => match options.reference_cycles {
      1 => "CRYPTOGRAPHIC OPERATIONS PER PROCESSOR CYCLE".to_string(),
      n => format!("CRYPTOGRAPHIC OPERATIONS PER {} PROCESSOR CYCLES", group_thousands(n)),
    },
    Metric::Cycles => "CYCLES PER OPERATION".to_string(),
  }
}

/// A pair survives pruning when any machine still keys it.
fn surviving(machines: &[Machine], algo: usize, op: Op) -> bool {
  machines
    .iter()
    .any(|machine| machine.table.contains_key(&(algo, op, Metric::ALL[0])))
}

fn format_table(machines: &[Machine], algos: &[String], metric: Metric) -> Result<String> {
  let label_width = HEADER_LABELS.iter().map(|label| label.len()).max().unwrap_or(0);
  let algo_width = algos.iter().map(String::len).max().unwrap_or(0);
  let op_width = Op::ALL.iter().map(|op| op.name().len()).max().unwrap_or(0);
  let first = label_width.max(algo_width + op_width + 1);

  let headers: Vec<[String; 3]> = machines.iter().map(header_values).collect();
  let widths: Vec<usize> = headers
    .iter()
    .zip(machines)
    .map(|(values, machine)| values.iter().map(String::len).fold(machine.width, usize::max))
    .collect();

  let mut table = String::new();

  for (row, label) in HEADER_LABELS.into_iter().enumerate() {
    let mut line = format!("{label:<first$}");
    for (values, &width) in headers.iter().zip(&widths) {
      write!(line, "{COLUMN_SEPARATOR}{:>width$}", values[row])?;
    }
    writeln!(table, "{}", line.trim_end())?;
  }

  let mut rule = "-".repeat(first);
  for &width in &widths {
    rule.push_str(COLUMN_SEPARATOR);
    rule.push_str(&"-".repeat(width));
  }
  writeln!(table, "{rule}")?;

  for (algo, name) in algos.iter().enumerate() {
    for op in Op::ALL {
      if !surviving(machines, algo, op) {
        continue;
      }

      let mut line = format!("{:<first$}", format!("{name} {}", op.name()));
      for (machine, &width) in machines.iter().zip(&widths) {
        let text = machine.table.get(&(algo, op, metric)).map_or("", Cell::text);
        write!(line, "{COLUMN_SEPARATOR}{text:>width$}")?;
      }
      writeln!(table, "{}", line.trim_end())?;
    }
  }

  Ok(table)
}

/// Renders the full report: one titled table per metric, blank-line separated.
pub fn format(machines: &[Machine], algos: &[String], options: &Options) -> Result<String> {
  let mut report = String::new();

  for (position, metric) in Metric::ALL.into_iter().enumerate() {
    if position > 0 {
      writeln!(report)?;
    }
    writeln!(report, "{}", title(metric, options))?;
    writeln!(report)?;
    write!(report, "{}", format_table(machines, algos, metric)?)?;
  }

  Ok(report)
}
