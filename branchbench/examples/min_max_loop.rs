//! Min/Max Loop Benchmarks
//!
//! Sweeps sizes and branch-taken probabilities across the eight min/max
//! operations. Settings come from `branchbench.toml` when one is found;
//! command-line flags override it.
//!
//! ```text
//! cargo run --release --example min_max_loop -- --size 1000 --probability 50,80,100
//! cargo run --release --example min_max_loop -- verify --seed 42
//! ```

fn main() {
    if let Err(e) = branchbench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
