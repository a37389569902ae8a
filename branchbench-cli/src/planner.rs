//! Sweep Planner
//!
//! Expands the sweep into the configurations and operations to run.
//!
//! - every size is paired with every probability; duplicates are dropped
//! - unreachable pairs are rejected here, before any fixture is generated
//! - operations are selected by a regex over their ids
//!
//! Ordering: configurations by size then probability, operations in
//! [`Operation::ALL`] order, so runs are deterministic.

use branchbench_core::{ConfigError, Configuration, Operation};
use regex::Regex;
use thiserror::Error;

/// Planning failures
#[derive(Debug, Error)]
pub enum PlanError {
    /// A sweep entry cannot be benchmarked
    #[error("Invalid sweep entry size={size} probability={probability}: {source}")]
    InvalidEntry {
        /// Requested size
        size: usize,
        /// Requested percentage
        probability: u32,
        /// Why it was rejected
        source: ConfigError,
    },

    /// No sizes or no probabilities
    #[error("Sweep is empty: at least one size and one probability are required")]
    EmptySweep,

    /// The operation filter matched nothing
    #[error("No operation matches filter '{0}'")]
    NoOperations(String),
}

/// Configurations and operations selected for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Configurations, in run order
    pub configurations: Vec<Configuration>,
    /// Operations timed against each configuration
    pub operations: Vec<Operation>,
}

impl ExecutionPlan {
    /// Number of timed runs (configurations × operations)
    pub fn len(&self) -> usize {
        self.configurations.len() * self.operations.len()
    }

    /// Whether nothing would run
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the execution plan for a sweep.
///
/// Fails on the first unreachable or invalid `(size, probability)` pair.
pub fn build_plan(
    sizes: &[usize],
    probabilities: &[u32],
    filter: Option<&Regex>,
) -> Result<ExecutionPlan, PlanError> {
    if sizes.is_empty() || probabilities.is_empty() {
        return Err(PlanError::EmptySweep);
    }

    let mut configurations = Vec::with_capacity(sizes.len() * probabilities.len());
    for &size in sizes {
        for &probability in probabilities {
            let config = Configuration::new(size, probability).map_err(|source| {
                PlanError::InvalidEntry {
                    size,
                    probability,
                    source,
                }
            })?;
            configurations.push(config);
        }
    }
    configurations.sort();
    configurations.dedup();

    let operations: Vec<_> = Operation::ALL
        .into_iter()
        .filter(|op| filter.is_none_or(|re| re.is_match(op.id())))
        .collect();
    if operations.is_empty() {
        let pattern = filter.map(|re| re.as_str().to_string()).unwrap_or_default();
        return Err(PlanError::NoOperations(pattern));
    }

    Ok(ExecutionPlan {
        configurations,
        operations,
    })
}
