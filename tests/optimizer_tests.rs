//! End-to-end optimizer behavior across the three strategies.

use std::collections::HashMap;

use cardplan::application::{optimize, OptimizationConfig, OptimizationResult, RunStatus, Strategy};
use cardplan::domain::{Problem, QualityTier};
use cardplan::testkit::config::{bounded, fast};
use cardplan::testkit::domain::{bolt_market, listing, listing_at, problem, spread_market, want, want_at};
use rust_decimal_macros::dec;

const ALL: [Strategy; 3] = [Strategy::Exact, Strategy::Evolutionary, Strategy::Hybrid];

fn run(problem: &Problem, strategy: Strategy) -> OptimizationResult {
    optimize(problem, &fast(strategy)).expect("config is valid")
}

fn best_cost(result: &OptimizationResult) -> f64 {
    result
        .recommended
        .as_ref()
        .expect("recommended plan")
        .score
        .total_cost
}

#[test]
fn quality_floor_excludes_cheaper_played_copies() {
    let problem = problem(
        vec![want_at("Lightning Bolt", 2, QualityTier::NearMint)],
        vec![
            listing("a-1", "Lightning Bolt", "A", 100, 4),
            listing_at("b-1", "Lightning Bolt", "B", 50, 4, QualityTier::LightlyPlayed),
        ],
    );

    for strategy in ALL {
        let result = run(&problem, strategy);
        let plan = result.recommended.expect("plan");

        assert_eq!(result.status, RunStatus::Completed, "{strategy}");
        assert_eq!(plan.total_cost, dec!(2.00), "{strategy}");
        assert_eq!(plan.score.availability_score, 1);
        assert!(plan.lines.iter().all(|l| l.seller_id.as_str() == "A"));
        assert_eq!(plan.lines.iter().map(|l| l.quantity).sum::<u32>(), 2);
    }
}

#[test]
fn shortage_is_reported_not_failed() {
    let problem = problem(
        vec![want("Counterspell", 5)],
        vec![
            listing("a-1", "Counterspell", "A", 200, 2),
            listing("b-1", "Counterspell", "B", 250, 1),
        ],
    );

    for strategy in ALL {
        let result = run(&problem, strategy);
        let plan = result.recommended.as_ref().expect("plan");

        assert_eq!(result.status, RunStatus::Completed, "{strategy}");
        assert!(result.partial, "{strategy}");
        assert_eq!(result.unfulfilled_units(), 2, "{strategy}");
        assert_eq!(plan.score.availability_score, 0);
        assert!(plan.score.total_cost >= 20_000.0);
        assert!(plan.score.total_cost < 30_000.0);
        assert_eq!(plan.shortfalls[0].missing, 2);
    }
}

#[test]
fn single_seller_cap_beats_global_cheapest() {
    // Cheapest overall is 2 from A plus 2 from B; with one seller allowed
    // the plan buys all four from B.
    let problem = problem(
        vec![want("Lightning Bolt", 4)],
        vec![
            listing("a-1", "Lightning Bolt", "A", 100, 2),
            listing("b-1", "Lightning Bolt", "B", 150, 4),
        ],
    );

    for strategy in [Strategy::Exact, Strategy::Hybrid] {
        let result = optimize(&problem, &bounded(strategy, 1, Some(1))).expect("valid");
        let plan = result.recommended.expect("plan");

        assert_eq!(plan.seller_count, 1, "{strategy}");
        assert_eq!(plan.total_cost, dec!(6.00), "{strategy}");
        assert!(plan.is_complete());
    }

    let config = OptimizationConfig {
        population_size: 60,
        convergence_patience: 30,
        ..bounded(Strategy::Evolutionary, 1, Some(1))
    };
    let plan = optimize(&problem, &config)
        .expect("valid")
        .recommended
        .expect("plan");
    assert_eq!(plan.seller_count, 1);
    assert_eq!(plan.total_cost, dec!(6.00));
}

#[test]
fn single_seller_cap_holds_when_splitting_saves_a_lot() {
    // Splitting costs 2.00 against 101.00 from either seller alone.
    let problem = problem(
        vec![want("Opt", 1), want("Ponder", 1)],
        vec![
            listing("a-opt", "Opt", "A", 100, 1),
            listing("a-ponder", "Ponder", "A", 10_000, 1),
            listing("b-opt", "Opt", "B", 10_000, 1),
            listing("b-ponder", "Ponder", "B", 100, 1),
        ],
    );

    for strategy in ALL {
        let config = OptimizationConfig {
            population_size: 60,
            ..bounded(strategy, 1, Some(1))
        };
        let result = optimize(&problem, &config).expect("valid");
        let plan = result.recommended.expect("plan");

        assert_eq!(plan.seller_count, 1, "{strategy}");
        assert!(plan.is_complete(), "{strategy}");
        assert_eq!(plan.total_cost, dec!(101.00), "{strategy}");
    }

    let unbounded = run(&problem, Strategy::Exact).recommended.expect("plan");
    assert_eq!(unbounded.seller_count, 2);
    assert_eq!(unbounded.total_cost, dec!(2.00));
}

#[test]
fn unbounded_sellers_take_the_global_cheapest() {
    let result = run(&bolt_market(), Strategy::Exact);
    let plan = result.recommended.expect("plan");

    // Two from alpha at 1.00 and two from beta at 1.50; the second seller
    // is inside the default bound.
    assert_eq!(plan.total_cost, dec!(5.00));
    assert_eq!(plan.seller_count, 2);
}

#[test]
fn exact_cost_never_falls_as_demand_grows() {
    let mut previous = 0.0;
    for quantity in 1..=18 {
        let problem = problem(
            vec![want("Lightning Bolt", quantity)],
            vec![
                listing("a-1", "Lightning Bolt", "alpha", 100, 2),
                listing("b-1", "Lightning Bolt", "beta", 150, 4),
                listing("c-1", "Lightning Bolt", "gamma", 300, 10),
            ],
        );
        let cost = best_cost(&run(&problem, Strategy::Exact));
        assert!(
            cost + 1e-9 >= previous,
            "quantity {quantity}: {cost} < {previous}"
        );
        previous = cost;
    }
}

#[test]
fn hybrid_is_never_worse_than_unseeded_search() {
    for (cards, sellers) in [(4, 3), (6, 5), (8, 4)] {
        let problem = spread_market(cards, sellers);
        let hybrid = run(&problem, Strategy::Hybrid);
        let evolutionary = run(&problem, Strategy::Evolutionary);

        assert!(!hybrid.fallback);
        assert!(
            best_cost(&hybrid) <= best_cost(&evolutionary) + 1e-9,
            "{cards}x{sellers}: hybrid {} > evolutionary {}",
            best_cost(&hybrid),
            best_cost(&evolutionary)
        );
    }
}

#[test]
fn hybrid_matches_the_exact_optimum() {
    let problem = spread_market(6, 4);
    let exact = run(&problem, Strategy::Exact);
    let hybrid = run(&problem, Strategy::Hybrid);

    assert!((best_cost(&exact) - best_cost(&hybrid)).abs() < 1e-6);
    assert_eq!(hybrid.diagnostics.algorithm, "hybrid");
    assert!(hybrid.diagnostics.milp_status.is_some());
}

#[test]
fn plans_never_oversubscribe_listings() {
    let problem = spread_market(6, 4);
    let stock: HashMap<_, _> = problem
        .listings()
        .iter()
        .map(|l| (l.id.clone(), l.quantity))
        .collect();

    for strategy in ALL {
        let result = run(&problem, strategy);
        for plan in result.recommended.iter().chain(&result.alternatives) {
            let mut drawn: HashMap<_, u32> = HashMap::new();
            for line in &plan.lines {
                *drawn.entry(line.listing_id.clone()).or_default() += line.quantity;
            }
            for (id, quantity) in drawn {
                assert!(quantity <= stock[&id], "{strategy}: {id} drew {quantity}");
            }
        }
    }
}

#[test]
fn foreign_copies_pay_the_language_surcharge() {
    let problem = problem(
        vec![want("Brainstorm", 1)],
        vec![
            listing("en", "Brainstorm", "A", 80, 1),
            listing("ja", "Brainstorm", "B", 60, 1).with_language("Japanese"),
        ],
    );
    let plan = run(&problem, Strategy::Exact).recommended.expect("plan");

    assert_eq!(plan.lines[0].listing_id.as_str(), "en");
    assert!((plan.score.total_cost - 0.80).abs() < 1e-9);
}

#[test]
fn same_seed_reproduces_the_evolutionary_run() {
    let problem = spread_market(5, 4);
    let first = run(&problem, Strategy::Evolutionary);
    let second = run(&problem, Strategy::Evolutionary);

    assert_eq!(first.recommended, second.recommended);
    assert_eq!(first.alternatives, second.alternatives);
    assert_eq!(first.diagnostics.generations, second.diagnostics.generations);
}

#[test]
fn evolutionary_diagnostics_are_filled_in() {
    let result = run(&spread_market(4, 3), Strategy::Evolutionary);
    let diagnostics = &result.diagnostics;

    assert_eq!(diagnostics.algorithm, "evolutionary");
    assert_eq!(diagnostics.population_size, 24);
    assert!(diagnostics.generations >= 1 && diagnostics.generations <= 40);
    assert!(diagnostics.evaluations >= 24);
    assert!(diagnostics.stop_reason.is_some());
    assert!(diagnostics.front_size >= result.alternatives.len());
}
