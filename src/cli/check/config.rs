use std::path::Path;

use crate::cli::output;
use crate::infrastructure::config::Settings;

/// Validate the configuration file without running an optimization.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed or fails validation.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> anyhow::Result<()> {
    let path = config_path.as_ref();
    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&format!("Checking {}", path.display()));

    if !path.exists() {
        anyhow::bail!("configuration file not found: {}", path.display());
    }

    let settings = Settings::load(path)?;
    output::success("configuration file is valid");

    let optimizer = &settings.optimizer;
    output::section("Summary");
    output::field("Strategy", optimizer.strategy);
    output::field("Population", optimizer.population_size);
    output::field("Generations", optimizer.generations);
    output::field(
        "Sellers",
        match optimizer.max_sellers {
            Some(max) => format!("{}..={max}", optimizer.min_sellers),
            None => format!("{}..", optimizer.min_sellers),
        },
    );
    output::field(
        "Language",
        optimizer.preferred_language.as_deref().unwrap_or("any"),
    );
    output::field(
        "MILP limit",
        format!("{:.1}s", optimizer.limits.milp_time_limit_secs),
    );
    output::field("Log level", &settings.logging.level);

    // Valid but repairable values are corrected on every run.
    let (_, corrections) = optimizer.validated()?;
    for correction in &corrections {
        output::warning(correction);
    }
    if optimizer.seed.is_none() {
        output::hint("no seed configured; evolutionary runs are not reproducible");
    }
    Ok(())
}
