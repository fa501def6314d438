use std::cmp::Ordering;

use crate::{
  config::Options,
  stats::{Cell, Key, Machine, Metric, Op},
};

/// Ranks machines against each other for every (algorithm, operation, metric)
/// and rewrites every ranked cell's text with its rank annotation.
///
/// Only strictly positive values compete; everything else keeps rank 0.
pub fn rank(machines: &mut [Machine], algo_count: usize, options: &Options) {
  for algo in 0..algo_count {
    for op in Op::ALL {
      for metric in Metric::ALL {
        rank_one(machines, (algo, op, metric), options.lower_is_better.contains(&metric));
      }
    }
  }

  for machine in machines {
    annotate(machine);
  }
}

/// Assigns dense 1-based ranks for a single table key. Exact value ties
/// resolve by machine index, keeping reruns byte-stable.
fn rank_one(machines: &mut [Machine], key: Key, lower_is_better: bool) {
  let mut order: Vec<(usize, f64)> = machines
    .iter()
    .filter_map(|machine| {
      let value = machine.table.get(&key)?.value()?;
      (value > 0.0).then_some((machine.index, value))
    })
    .collect();

  order.sort_by(|a, b| {
    let by_value = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
    let by_value = if lower_is_better { by_value } else { by_value.reverse() };
    by_value.then(a.0.cmp(&b.0))
  });

  for (position, (index, _)) in order.into_iter().enumerate() {
    if let Some(Cell::Present { rank, .. }) = machines[index].table.get_mut(&key) {
      *rank = position + 1;
    }
  }
}

/// Appends ` (N)` to every ranked cell of `machine`. When the machine's ranks
/// for a metric span single and double digits, single-digit annotations get an
/// extra leading space so the closing parentheses line up in the column. Also
/// tracks the machine's widest annotated text for table layout.
fn annotate(machine: &mut Machine) {
  for metric in Metric::ALL {
    let mut min = usize::MAX;
    let mut max = 0;
    for ((_, _, cell_metric), cell) in &machine.table {
      if *cell_metric != metric {
        continue;
      }
      let rank = match cell {
        Cell::Present { rank, .. } => *rank,
        Cell::Absent => 0,
      };
      min = min.min(rank);
      max = max.max(rank);
    }

    let mut width = machine.width;
    for ((_, _, cell_metric), cell) in &mut machine.table {
      if *cell_metric != metric {
        continue;
      }
      if let Cell::Present { value, text, rank } = cell {
        if *value > 0.0 {
          let space = if min < 10 && max >= 10 && *rank < 10 { "  " } else { " " };
          text.push_str(&format!("{space}({rank})"));
          width = width.max(text.len());
        }
      }
    }
    machine.width = width;
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::BTreeMap, path::PathBuf};

  use super::*;

  const KEY: Key = (0, Op::OaepEncrypt, Metric::OpRate);

  fn machine(index: usize, cells: Vec<(Key, Cell)>) -> Machine {
    Machine {
      name: format!("machine-{index}"),
      frequency: 1.0,
      file: PathBuf::new(),
      openssl: String::new(),
      index,
      width: 0,
      table: BTreeMap::from_iter(cells),
    }
  }

  fn fleet(values: &[f64]) -> Vec<Machine> {
    values
      .iter()
      .enumerate()
      .map(|(index, &value)| machine(index, vec![(KEY, Cell::present(value))]))
      .collect()
  }

  fn ranks(machines: &[Machine]) -> Vec<usize> {
    machines
      .iter()
      .map(|machine| match machine.table[&KEY] {
        Cell::Present { rank, .. } => rank,
        Cell::Absent => 0,
      })
      .collect()
  }

  #[test]
  fn higher_is_better_by_default() {
    let mut machines = fleet(&[10.0, 30.0, 20.0]);
    rank(&mut machines, 1, &Options::default());

    assert_eq!(ranks(&machines), vec![3, 1, 2]);
  }

  #[test]
  fn lower_is_better_reverses_order() {
    let mut machines = fleet(&[10.0, 30.0, 20.0]);
    let options = Options {
      lower_is_better: [Metric::OpRate].into(),
      ..Options::default()
    };
    rank(&mut machines, 1, &options);

    assert_eq!(ranks(&machines), vec![1, 3, 2]);
  }

  #[test]
  fn exact_ties_resolve_by_machine_index() {
    let mut machines = fleet(&[20.0, 20.0, 30.0]);
    rank(&mut machines, 1, &Options::default());

    assert_eq!(ranks(&machines), vec![2, 3, 1]);
  }

  #[test]
  fn zero_and_absent_cells_stay_unranked() {
    let mut machines = vec![
      machine(0, vec![(KEY, Cell::present(0.0))]),
      machine(1, vec![(KEY, Cell::Absent)]),
      machine(2, vec![(KEY, Cell::present(5.0))]),
    ];
    rank(&mut machines, 1, &Options::default());

    assert_eq!(ranks(&machines), vec![0, 0, 1]);
    assert_eq!(machines[0].table[&KEY].text(), "0");
    assert_eq!(machines[2].table[&KEY].text(), "5 (1)");
  }

  #[test]
  fn annotation_pads_single_digit_ranks_among_double_digits() {
    let second = (0, Op::OaepDecrypt, Metric::OpRate);
    let mut machines = vec![machine(0, vec![
      (KEY, Cell::Present { value: 5.0, text: "5".to_string(), rank: 3 }),
      (second, Cell::Present { value: 20.0, text: "20".to_string(), rank: 11 }),
    ])];
    annotate(&mut machines[0]);

    assert_eq!(machines[0].table[&KEY].text(), "5  (3)");
    assert_eq!(machines[0].table[&second].text(), "20 (11)");
    assert_eq!(machines[0].width, "20 (11)".len());
  }

  #[test]
  fn annotation_uses_single_space_for_uniform_rank_widths() {
    let mut machines = fleet(&[10.0, 30.0, 20.0]);
    rank(&mut machines, 1, &Options::default());

    assert_eq!(machines[1].table[&KEY].text(), "30 (1)");
    assert_eq!(machines[1].width, "30 (1)".len());
  }
}
