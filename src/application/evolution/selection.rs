//! NSGA-II ranking and selection.

use std::cmp::Ordering;

use rand::Rng;

use crate::domain::pareto::crowding_distances;
use crate::domain::ScoreVector;

/// Partition indices into successive non-dominated fronts.
///
/// `fronts[0]` holds the individuals no one dominates, `fronts[1]` those
/// dominated only by members of `fronts[0]`, and so on.
#[must_use]
pub fn non_dominated_sort(scores: &[ScoreVector]) -> Vec<Vec<usize>> {
    let n = scores.len();
    let mut dominated_by_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            if scores[i].dominates(&scores[j]) {
                dominates[i].push(j);
                dominated_by_count[j] += 1;
            } else if scores[j].dominates(&scores[i]) {
                dominates[j].push(i);
                dominated_by_count[i] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|i| dominated_by_count[*i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominates[i] {
                dominated_by_count[j] -= 1;
                if dominated_by_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Front rank and in-front crowding distance of every individual.
#[derive(Debug, Clone)]
pub struct Ranking {
    rank: Vec<usize>,
    crowding: Vec<f64>,
}

impl Ranking {
    #[must_use]
    pub fn new(scores: &[ScoreVector]) -> Self {
        let mut rank = vec![0; scores.len()];
        let mut crowding = vec![0.0; scores.len()];
        for (r, front) in non_dominated_sort(scores).iter().enumerate() {
            let members: Vec<ScoreVector> = front.iter().map(|i| scores[*i]).collect();
            for (&i, d) in front.iter().zip(crowding_distances(&members)) {
                rank[i] = r;
                crowding[i] = d;
            }
        }
        Self { rank, crowding }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rank.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    #[must_use]
    pub fn rank(&self, i: usize) -> usize {
        self.rank[i]
    }

    /// Crowded-comparison order: lower rank first, then larger crowding.
    #[must_use]
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        self.rank[a]
            .cmp(&self.rank[b])
            .then_with(|| self.crowding[b].total_cmp(&self.crowding[a]))
    }
}

/// Binary tournament under the crowded-comparison order.
///
/// # Panics
///
/// Panics if the ranking is empty.
pub fn tournament<R: Rng + ?Sized>(ranking: &Ranking, rng: &mut R) -> usize {
    let a = rng.gen_range(0..ranking.len());
    let b = rng.gen_range(0..ranking.len());
    if ranking.compare(b, a) == Ordering::Less {
        b
    } else {
        a
    }
}

/// Indices of the `target` individuals that survive into the next generation.
///
/// The `elite_count` cheapest individuals survive unconditionally; the rest
/// are filled front by front, breaking the last partial front by crowding.
#[must_use]
pub fn survivors(scores: &[ScoreVector], target: usize, elite_count: usize) -> Vec<usize> {
    if scores.len() <= target {
        return (0..scores.len()).collect();
    }

    let mut by_cost: Vec<usize> = (0..scores.len()).collect();
    by_cost.sort_by(|a, b| {
        scores[*a]
            .total_cost
            .total_cmp(&scores[*b].total_cost)
            .then(scores[*a].seller_count.cmp(&scores[*b].seller_count))
    });
    let mut chosen = vec![false; scores.len()];
    let mut kept: Vec<usize> = by_cost.into_iter().take(elite_count.min(target)).collect();
    for &i in &kept {
        chosen[i] = true;
    }

    for front in non_dominated_sort(scores) {
        let remaining: Vec<usize> = front.into_iter().filter(|i| !chosen[*i]).collect();
        let room = target - kept.len();
        if room == 0 {
            break;
        }
        if remaining.len() <= room {
            kept.extend(remaining);
            continue;
        }

        let members: Vec<ScoreVector> = remaining.iter().map(|i| scores[*i]).collect();
        let distances = crowding_distances(&members);
        let mut order: Vec<usize> = (0..remaining.len()).collect();
        order.sort_by(|a, b| distances[*b].total_cmp(&distances[*a]));
        kept.extend(order.into_iter().take(room).map(|k| remaining[k]));
        break;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn score(cost: f64, sellers: usize) -> ScoreVector {
        ScoreVector {
            total_cost: cost,
            quality_score: 0.5,
            availability_score: 1,
            seller_count: sellers,
        }
    }

    #[test]
    fn sorts_into_layers() {
        let scores = [score(1.0, 3), score(3.0, 1), score(2.0, 3), score(4.0, 4)];
        let fronts = non_dominated_sort(&scores);
        assert_eq!(fronts.len(), 3);
        let mut first = fronts[0].clone();
        first.sort_unstable();
        assert_eq!(first, vec![0, 1]);
        assert_eq!(fronts[1], vec![2]);
        assert_eq!(fronts[2], vec![3]);
    }

    #[test]
    fn survivors_keep_cheapest_elites() {
        let scores = [
            score(10.0, 1),
            score(11.0, 1),
            score(12.0, 1),
            score(13.0, 1),
            score(5.0, 9),
        ];
        assert_eq!(survivors(&scores, 1, 1), vec![4]);

        let kept = survivors(&scores, 2, 1);
        assert_eq!(kept.len(), 2);
        assert!(kept.contains(&4));
        assert!(kept.contains(&0));
    }

    #[test]
    fn survivors_fill_by_rank() {
        let scores = [score(1.0, 3), score(3.0, 1), score(2.0, 3), score(4.0, 4)];
        let mut kept = survivors(&scores, 3, 0);
        kept.sort_unstable();
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn tournament_prefers_lower_rank() {
        let scores = [score(1.0, 1), score(5.0, 5)];
        let ranking = Ranking::new(&scores);
        let mut rng = StdRng::seed_from_u64(3);
        let picks: Vec<usize> = (0..50).map(|_| tournament(&ranking, &mut rng)).collect();
        assert!(picks.iter().filter(|p| **p == 0).count() > 25);
        assert_eq!(ranking.rank(1), 1);
    }
}
