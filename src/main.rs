//! anova-lab: one-way ANOVA on the embedded strength table
//!
//! Prints the report to stdout. Logging goes to stderr and is controlled by
//! `RUST_LOG` (default `warn`).

use anova_lab::{dataset, Analysis};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let storage = dataset::strength_table().context("failed to build strength table")?;
    let analysis = Analysis::builder().alpha(0.05).build()?;
    let report = analysis.run(&storage).context("one-way analysis failed")?;

    println!("{report}");
    Ok(())
}
