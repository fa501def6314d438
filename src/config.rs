use std::collections::BTreeSet;

use crate::stats::Metric;

/// Pipeline options, passed explicitly into the analysis entry point.
#[derive(Clone, Debug)]
pub struct Options {
  /// Operations are reported per this many seconds.
  pub reference_seconds: u64,
  /// Operations are reported per this many processor cycles.
  pub reference_cycles: u64,
  /// Metrics ranked ascending instead of descending.
  pub lower_is_better: BTreeSet<Metric>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      reference_seconds: 1,
      reference_cycles: 1_000_000_000,
      lower_is_better: BTreeSet::from([Metric::Cycles]),
    }
  }
}

/// One machine registered for analysis. The `file` is resolved against the
/// results directory unless absolute.
#[derive(Clone, Debug)]
pub struct MachineConfig {
  pub name: String,
  pub frequency: f64,
  pub file: String,
  pub openssl: Option<String>,
}

impl MachineConfig {
  pub fn new(name: &str, frequency: f64, file: &str) -> Self {
    Self {
      name: name.to_string(),
      frequency,
      file: file.to_string(),
      openssl: None,
    }
  }
}

/// The benchmarked machines and the log file each one produced.
pub fn machines() -> Vec<MachineConfig> {
  vec![
    MachineConfig::new("i7-8565U", 4.20, "intel-i7-8565U-linux-vm.txt"),
    MachineConfig::new("i7-13700H", 5.00, "intel-i7-13700H-linux-vm.txt"),
    MachineConfig::new("Xeon G6242R", 3.10, "intel-xeon-gold-6242r-linux.txt"),
    MachineConfig::new("Xeon G6348", 2.60, "intel-xeon-gold-6348-linux.txt"),
    MachineConfig::new("Xeon M9460", 3.50, "intel-xeon-max-9460-linux.txt"),
    MachineConfig::new("EPYC 7543P", 3.70, "amd-epyc-7543p-linux.txt"),
    MachineConfig::new("EPYC 9534", 3.70, "amd-epyc-9534-linux.txt"),
    MachineConfig::new("Rasp. Pi 3", 1.20, "arm-rpi3-cortex-a53-linux.txt"),
    MachineConfig::new("Rasp. Pi 4", 1.80, "arm-rpi4-cortex-a72-linux.txt"),
    MachineConfig::new("Ampere Altra", 3.00, "arm-ampere-neoverse-n1-30-linux.txt"),
    MachineConfig::new("Ampere Altra", 3.30, "arm-ampere-neoverse-n1-33-linux.txt"),
    MachineConfig::new("Cobalt 100", 3.40, "arm-cobalt100-neoverse-n2-linux.txt"),
    MachineConfig::new("Graviton 3", 2.60, "arm-graviton3-neoverse-v1-linux-vm.txt"),
    MachineConfig::new("Nvidia Grace", 3.30, "arm-grace-neoverse-v2-linux.txt"),
    MachineConfig::new("Apple M1", 3.20, "arm-apple-m1-macos.txt"),
    MachineConfig::new("Apple M2", 3.49, "arm-apple-m2-macos.txt"),
    MachineConfig::new("Apple M3", 4.05, "arm-apple-m3-macos.txt"),
    MachineConfig::new("Apple M4", 4.40, "arm-apple-m4-macos.txt"),
  ]
}
