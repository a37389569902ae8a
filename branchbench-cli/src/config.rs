//! Configuration loading from branchbench.toml
//!
//! The sweep, timing schedule and output options can be kept in a
//! `branchbench.toml` file. It is discovered by walking up from the current
//! directory; command-line flags override whatever it sets.

use branchbench_core::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "branchbench.toml";

/// BranchBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BenchConfig {
    /// Which configurations and operations to run
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Timing schedule and generation settings
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameter sweep: every size is paired with every probability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Sequence lengths
    #[serde(default = "default_sizes")]
    pub sizes: Vec<usize>,
    /// Target branch-taken percentages
    #[serde(default = "default_probabilities")]
    pub probabilities: Vec<u32>,
    /// Regex selecting operations by id
    #[serde(default = "default_operations")]
    pub operations: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            probabilities: default_probabilities(),
            operations: default_operations(),
        }
    }
}

fn default_sizes() -> Vec<usize> {
    vec![100, 1000, 10000]
}
fn default_probabilities() -> Vec<u32> {
    vec![50, 80, 100]
}
fn default_operations() -> String {
    ".*".to_string()
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerConfig {
    /// Warm-up iterations per operation (discarded)
    #[serde(default = "default_warmup_iterations")]
    pub warmup_iterations: u32,
    /// Length of each warm-up iteration (e.g., "5s")
    #[serde(default = "default_iteration_time")]
    pub warmup_time: String,
    /// Measured iterations per operation
    #[serde(default = "default_measurement_iterations")]
    pub measurement_iterations: u32,
    /// Length of each measured iteration (e.g., "5s")
    #[serde(default = "default_iteration_time")]
    pub measurement_time: String,
    /// Base seed; each configuration derives its own seed from it
    #[serde(default)]
    pub seed: Option<u64>,
    /// Generator attempts before a configuration is given up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pin the timing thread to this CPU (Linux only)
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: default_warmup_iterations(),
            warmup_time: default_iteration_time(),
            measurement_iterations: default_measurement_iterations(),
            measurement_time: default_iteration_time(),
            seed: None,
            max_attempts: default_max_attempts(),
            pin_cpu: None,
        }
    }
}

fn default_warmup_iterations() -> u32 {
    3
}
fn default_measurement_iterations() -> u32 {
    4
}
fn default_iteration_time() -> String {
    "5s".to_string()
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Report format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text table
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Report format: "human" or "json"
    #[serde(default)]
    pub format: OutputFormat,
    /// Report file (stdout if not set)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Walk up from the current directory looking for `branchbench.toml`
    pub fn discover() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Default configuration as a commented TOML template
    pub fn default_toml() -> String {
        format!(
            r#"# BranchBench Configuration

[sweep]
# Sequence lengths
sizes = [100, 1000, 10000]
# Target branch-taken percentages; each must be exactly reachable for every size
probabilities = [50, 80, 100]
# Regex over operation ids (int_loop_min, long_reduction_max, ...)
operations = ".*"

[runner]
# Warm-up iterations per operation, discarded from results
warmup_iterations = 3
warmup_time = "5s"
# Measured iterations per operation
measurement_iterations = 4
measurement_time = "5s"
# Base seed for reproducible fixtures (uncomment to enable)
# seed = 42
# Generator attempts before a configuration is given up
max_attempts = {DEFAULT_MAX_ATTEMPTS}
# Pin the timing thread to one CPU, Linux only (uncomment to enable)
# pin_cpu = 2

[output]
# Report format: human or json
format = "human"
# Report file, stdout if unset (uncomment to enable)
# path = "target/branchbench/report.json"
"#
        )
    }

    /// Parse duration string (e.g., "5s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("Empty duration string");
        }

        let (num_part, unit_part) = s
            .find(|c: char| c.is_alphabetic())
            .map(|i| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {num_part}"))?;
        if value < 0.0 {
            anyhow::bail!("Negative duration: {s}");
        }

        let multiplier: f64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" | "min" => 60e9,
            _ => anyhow::bail!("Unknown duration unit: {unit_part}"),
        };

        Ok((value * multiplier) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.sweep.sizes, vec![100, 1000, 10000]);
        assert_eq!(config.sweep.probabilities, vec![50, 80, 100]);
        assert_eq!(config.runner.warmup_iterations, 3);
        assert_eq!(config.runner.measurement_iterations, 4);
        assert_eq!(config.runner.measurement_time, "5s");
        assert_eq!(config.runner.seed, None);
        assert_eq!(config.output.format, OutputFormat::Human);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(BenchConfig::parse_duration("3s").unwrap(), 3_000_000_000);
        assert_eq!(BenchConfig::parse_duration("500ms").unwrap(), 500_000_000);
        assert_eq!(BenchConfig::parse_duration("100us").unwrap(), 100_000);
        assert_eq!(BenchConfig::parse_duration("1000ns").unwrap(), 1000);
        assert_eq!(BenchConfig::parse_duration("2m").unwrap(), 120_000_000_000);
        assert_eq!(BenchConfig::parse_duration("1.5s").unwrap(), 1_500_000_000);
        assert_eq!(BenchConfig::parse_duration("7").unwrap(), 7_000_000_000);
        assert_eq!(BenchConfig::parse_duration("0s").unwrap(), 0);
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(BenchConfig::parse_duration("").is_err());
        assert!(BenchConfig::parse_duration("fast").is_err());
        assert!(BenchConfig::parse_duration("3h").is_err());
        assert!(BenchConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [sweep]
            sizes = [10, 20]

            [runner]
            measurement_time = "1s"
            seed = 7

            [output]
            format = "json"
        "#;

        let config: BenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.sizes, vec![10, 20]);
        assert_eq!(config.runner.measurement_time, "1s");
        assert_eq!(config.runner.seed, Some(7));
        assert_eq!(config.output.format, OutputFormat::Json);
        // Defaults should still apply
        assert_eq!(config.sweep.probabilities, vec![50, 80, 100]);
        assert_eq!(config.runner.warmup_time, "5s");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: BenchConfig = toml::from_str(&BenchConfig::default_toml()).unwrap();
        assert_eq!(config, BenchConfig::default());
    }
}
