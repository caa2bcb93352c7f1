//! Pareto front invariants, at the domain level and through the optimizer.

use cardplan::application::{optimize, recommend, Strategy};
use cardplan::domain::{Allocation, ParetoFront, QualityTier, ScoreVector, SellerBounds};
use cardplan::testkit::config::fast;
use cardplan::testkit::domain::{listing_at, problem, want};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn score(total_cost: f64, quality_score: f64, availability: u8, sellers: usize) -> ScoreVector {
    ScoreVector {
        total_cost,
        quality_score,
        availability_score: availability,
        seller_count: sellers,
    }
}

fn random_score(rng: &mut StdRng) -> ScoreVector {
    score(
        f64::from(rng.gen_range(0..40_u32)) / 4.0,
        f64::from(rng.gen_range(0..5_u32)) / 4.0,
        rng.gen_range(0..=1),
        rng.gen_range(1..5),
    )
}

#[test]
fn front_stays_mutually_non_dominated() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut front = ParetoFront::new();
    let mut offered = Vec::new();

    for _ in 0..500 {
        let candidate = random_score(&mut rng);
        offered.push(candidate);
        front.insert(Allocation::unfulfilled(0), candidate);
    }

    let members = front.members();
    for (i, a) in members.iter().enumerate() {
        for (j, b) in members.iter().enumerate() {
            if i != j {
                assert!(!a.score.dominates(&b.score));
                assert!(!a.score.same_as(&b.score));
            }
        }
    }
    // Everything offered is represented: either kept or covered by a member.
    for candidate in offered {
        assert!(members
            .iter()
            .any(|m| m.score.dominates(&candidate) || m.score.same_as(&candidate)));
    }
}

#[test]
fn dominated_members_are_evicted() {
    let mut front = ParetoFront::new();
    assert!(front.insert(Allocation::unfulfilled(0), score(10.0, 0.8, 1, 2)));
    assert!(front.insert(Allocation::unfulfilled(0), score(12.0, 1.0, 1, 2)));
    assert_eq!(front.len(), 2);

    assert!(front.insert(Allocation::unfulfilled(0), score(9.0, 1.0, 1, 1)));
    assert_eq!(front.len(), 1);
    assert!(!front.insert(Allocation::unfulfilled(0), score(9.0, 1.0, 1, 1)));
}

#[test]
fn recommendation_prefers_full_availability() {
    let mut front = ParetoFront::new();
    front.insert(Allocation::unfulfilled(0), score(5.0, 0.5, 0, 1));
    front.insert(Allocation::unfulfilled(0), score(8.0, 0.9, 1, 2));
    front.insert(Allocation::unfulfilled(0), score(8.0, 0.9, 1, 1));

    let best = recommend(&front, &SellerBounds::default()).expect("non-empty front");
    assert_eq!(best.score.availability_score, 1);
    assert_eq!(best.score.seller_count, 1);
}

#[test]
fn recommendation_stays_inside_the_seller_bound() {
    let mut front = ParetoFront::new();
    front.insert(Allocation::unfulfilled(0), score(2.25, 1.0, 1, 2));
    front.insert(Allocation::unfulfilled(0), score(101.0, 1.0, 1, 1));

    let single = SellerBounds { min: 1, max: Some(1) };
    let best = recommend(&front, &single).expect("non-empty front");
    assert_eq!(best.score.seller_count, 1);
}

#[test]
fn alternatives_trade_cost_against_quality() {
    // Near Mint copies cost more than played ones, so the front holds both.
    let problem = problem(
        vec![want("Force of Will", 2), want("Daze", 2)],
        vec![
            listing_at("a-fow", "Force of Will", "A", 9000, 2, QualityTier::NearMint),
            listing_at("b-fow", "Force of Will", "B", 6000, 2, QualityTier::HeavilyPlayed),
            listing_at("a-daze", "Daze", "A", 300, 4, QualityTier::NearMint),
            listing_at("b-daze", "Daze", "B", 150, 4, QualityTier::ModeratelyPlayed),
        ],
    );

    for strategy in [Strategy::Evolutionary, Strategy::Hybrid] {
        let result = optimize(&problem, &fast(strategy)).expect("valid");
        let alternatives = &result.alternatives;

        assert!(alternatives.len() >= 2, "{strategy}");
        for (i, a) in alternatives.iter().enumerate() {
            for (j, b) in alternatives.iter().enumerate() {
                if i != j {
                    assert!(!a.score.dominates(&b.score), "{strategy}");
                }
            }
        }
        let costs: Vec<f64> = alternatives.iter().map(|p| p.score.total_cost).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]), "{strategy}: {costs:?}");

        let recommended = result.recommended.as_ref().expect("plan");
        assert!(alternatives.contains(recommended));
    }
}

#[test]
fn front_size_is_capped_for_callers() {
    let problem = problem(
        vec![want("Force of Will", 2), want("Daze", 2)],
        vec![
            listing_at("a-fow", "Force of Will", "A", 9000, 2, QualityTier::NearMint),
            listing_at("b-fow", "Force of Will", "B", 6000, 2, QualityTier::HeavilyPlayed),
            listing_at("a-daze", "Daze", "A", 300, 4, QualityTier::NearMint),
            listing_at("b-daze", "Daze", "B", 150, 4, QualityTier::ModeratelyPlayed),
        ],
    );
    let mut config = fast(Strategy::Evolutionary);
    config.max_front_size = 2;

    let result = optimize(&problem, &config).expect("valid");
    assert!(result.alternatives.len() <= 2);
    assert!(result.diagnostics.front_size >= result.alternatives.len());
}
