//! Handler for `cardplan optimize`.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tabled::{Table, Tabled};
use tokio::signal;
use tracing::{info, warn};

use super::output;
use super::{InputArgs, OptimizeArgs};
use crate::application::{
    CancelToken, OptimizationConfig, OptimizationResult, Optimizer, RunStatus,
};
use crate::domain::{Listing, Problem, PurchasePlan, SellerId, WantedItem};
use crate::infrastructure::config::Settings;

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Card")]
    card: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Seller")]
    seller: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Unit")]
    unit_price: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct AlternativeRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Spend")]
    spend: String,
    #[tabled(rename = "Score Cost")]
    score_cost: String,
    #[tabled(rename = "Sellers")]
    sellers: usize,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Complete")]
    complete: &'static str,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {what} file {}", path.display()))
}

/// Load and index the buylist and catalog.
///
/// # Errors
///
/// Returns an error if a file is unreadable, malformed, or violates a
/// record invariant.
pub fn load_problem(input: &InputArgs) -> anyhow::Result<Problem> {
    let wanted: Vec<WantedItem> = read_json(&input.buylist, "buylist")?;
    let listings: Vec<Listing> = read_json(&input.catalog, "catalog")?;
    let problem = Problem::new(wanted, listings).context("invalid input records")?;
    Ok(problem)
}

/// Apply command-line overrides on top of the settings file.
#[must_use]
pub fn effective_config(base: &OptimizationConfig, args: &OptimizeArgs) -> OptimizationConfig {
    let mut config = base.clone();
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(min) = args.min_sellers {
        config.min_sellers = min;
    }
    if let Some(max) = args.max_sellers {
        config.max_sellers = Some(max);
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(population) = args.population {
        config.population_size = population;
    }
    config
        .excluded_sellers
        .extend(args.excluded_sellers.iter().map(|s| SellerId::new(s.as_str())));
    config
}

/// Execute the optimize command.
///
/// Ctrl-C cancels the run; the partial result is still printed.
///
/// # Errors
///
/// Returns an error if inputs or settings cannot be loaded, or the
/// configuration cannot be repaired.
pub async fn execute(args: &OptimizeArgs, settings: &Settings) -> anyhow::Result<RunStatus> {
    output::configure(args.json);

    let problem = load_problem(&args.input)?;
    let config = effective_config(&settings.optimizer, args);
    info!(
        wanted = problem.wanted().len(),
        listings = problem.listings().len(),
        sellers = problem.sellers().len(),
        strategy = %config.strategy,
        "inputs loaded"
    );

    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        Optimizer::default().optimize(&problem, &config, &worker_cancel)
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = signal::ctrl_c() => {
            warn!("interrupt received, cancelling run");
            cancel.cancel();
            task.await
        }
    };
    let result = joined.context("optimizer task aborted")??;

    if args.json {
        output::json_output(&serde_json::to_value(&result)?);
    } else {
        render(&result, args.alternatives);
    }
    Ok(result.status)
}

fn money(value: rust_decimal::Decimal) -> String {
    format!("${}", value.round_dp(2))
}

fn render(result: &OptimizationResult, alternatives: usize) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Run");
    output::field("Run", &result.run_id);
    output::field("Status", result.status);
    if result.strategy_requested == result.strategy_used {
        output::field("Strategy", result.strategy_used);
    } else {
        output::field(
            "Strategy",
            format!("{} (requested {})", result.strategy_used, result.strategy_requested),
        );
    }
    output::field("Algorithm", &result.diagnostics.algorithm);
    output::field("Time", format!("{} ms", result.execution_time_ms));
    if result.diagnostics.generations > 0 {
        output::field("Generations", result.diagnostics.generations);
    }
    output::field("Front", result.diagnostics.front_size);

    if let Some(message) = &result.message {
        match result.status {
            RunStatus::Completed => output::hint(message),
            _ => output::warning(message),
        }
    }
    for correction in &result.diagnostics.corrections {
        output::warning(correction);
    }
    for note in &result.diagnostics.notes {
        output::hint(note);
    }

    let Some(plan) = &result.recommended else {
        output::warning("no plan produced");
        return;
    };
    render_plan(plan);

    if result.alternatives.len() > 1 && alternatives > 0 {
        output::section("Alternatives");
        let rows: Vec<AlternativeRow> = result
            .alternatives
            .iter()
            .take(alternatives)
            .enumerate()
            .map(|(i, alt)| AlternativeRow {
                rank: i + 1,
                spend: money(alt.total_cost),
                score_cost: format!("{:.2}", alt.score.total_cost),
                sellers: alt.seller_count,
                quality: format!("{:.3}", alt.score.quality_score),
                complete: if alt.is_complete() { "yes" } else { "no" },
            })
            .collect();
        output::lines(&Table::new(rows).to_string());
    }
}

fn render_plan(plan: &PurchasePlan) {
    output::section("Recommended plan");
    if !plan.lines.is_empty() {
        let rows: Vec<LineRow> = plan
            .lines
            .iter()
            .map(|line| LineRow {
                card: line.card_name.clone(),
                quantity: line.quantity,
                seller: line.seller_name.clone(),
                quality: line.quality.to_string(),
                language: line.language.clone(),
                unit_price: money(line.unit_price),
                total: money(line.line_total),
            })
            .collect();
        output::lines(&Table::new(rows).to_string());
    }

    output::field("Total", output::highlight(money(plan.total_cost)));
    output::field("Sellers", plan.seller_count);
    output::field(
        "Fulfilled",
        format!("{:.0}%", plan.fulfilled_fraction * 100.0),
    );
    for seller in &plan.sellers {
        output::field(
            &seller.seller_name,
            format!("{} item(s), {}", seller.items, money(seller.subtotal)),
        );
    }
    if plan.is_complete() {
        output::success("every wanted copy is sourced");
    }
    for shortfall in &plan.shortfalls {
        output::warning(&format!(
            "{}: {} of {} copies unavailable",
            shortfall.card_name, shortfall.missing, shortfall.requested
        ));
    }
}
