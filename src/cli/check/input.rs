use crate::cli::optimize::load_problem;
use crate::cli::output;
use crate::cli::InputArgs;

/// Validate buylist and catalog files and report coverage per wanted item.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded.
pub fn execute_input(input: &InputArgs) -> anyhow::Result<()> {
    output::header(env!("CARGO_PKG_VERSION"));
    let problem = load_problem(input)?;
    output::success("input files are valid");

    output::section("Summary");
    output::field("Wanted", problem.wanted().len());
    output::field("Units", problem.unit_count());
    output::field("Listings", problem.listings().len());
    output::field("Sellers", problem.sellers().len());

    output::section("Coverage");
    for (w, item) in problem.wanted().iter().enumerate() {
        let supply = problem.supply_for(w);
        let message = format!(
            "{}: {} wanted, {} eligible cop{} across {} listing(s)",
            item.card_name,
            item.quantity,
            supply,
            if supply == 1 { "y" } else { "ies" },
            problem.eligible_for(w).len(),
        );
        if supply >= u64::from(item.quantity) {
            output::success(&message);
        } else {
            output::warning(&message);
        }
    }
    Ok(())
}
