//! Running set of mutually non-dominated allocations.

use super::allocation::Allocation;
use super::score::ScoreVector;

/// One member of a [`ParetoFront`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMember {
    pub allocation: Allocation,
    pub score: ScoreVector,
}

/// Set of allocations no member of which dominates another.
///
/// Members are deduplicated by score: an allocation whose score equals a
/// member's score is not added.
#[derive(Debug, Clone, Default)]
pub struct ParetoFront {
    members: Vec<FrontMember>,
}

impl ParetoFront {
    /// Create an empty front.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate to the front.
    ///
    /// The candidate is rejected if a member dominates it or has the same
    /// score. Otherwise it is added and every member it dominates is
    /// dropped. Returns whether the candidate was added.
    pub fn insert(&mut self, allocation: Allocation, score: ScoreVector) -> bool {
        if !self.admits(&score) {
            return false;
        }
        self.members.retain(|m| !score.dominates(&m.score));
        self.members.push(FrontMember { allocation, score });
        true
    }

    /// Whether [`ParetoFront::insert`] would accept a candidate with this
    /// score.
    #[must_use]
    pub fn admits(&self, score: &ScoreVector) -> bool {
        !self
            .members
            .iter()
            .any(|m| m.score.dominates(score) || m.score.same_as(score))
    }

    /// Offer many candidates; returns how many were added.
    pub fn extend<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = (Allocation, ScoreVector)>,
    {
        candidates
            .into_iter()
            .map(|(allocation, score)| usize::from(self.insert(allocation, score)))
            .sum()
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[FrontMember] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when nothing has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member with the lowest total cost.
    #[must_use]
    pub fn cheapest(&self) -> Option<&FrontMember> {
        self.members
            .iter()
            .min_by(|a, b| a.score.total_cost.total_cmp(&b.score.total_cost))
    }

    /// Members sorted by cost, thinned to at most `limit` by crowding
    /// distance.
    ///
    /// The extremes of every objective always survive the thinning.
    #[must_use]
    pub fn truncated(&self, limit: usize) -> Vec<FrontMember> {
        let mut members = self.members.clone();
        while members.len() > limit.max(1) {
            let scores: Vec<ScoreVector> = members.iter().map(|m| m.score).collect();
            let distances = crowding_distances(&scores);
            let (most_crowded, _) = distances
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .unwrap_or((0, &0.0));
            members.swap_remove(most_crowded);
        }
        members.sort_by(|a, b| {
            a.score
                .total_cost
                .total_cmp(&b.score.total_cost)
                .then(a.score.seller_count.cmp(&b.score.seller_count))
        });
        members
    }
}

/// NSGA-II crowding distance of each score within one set.
///
/// Boundary points of every non-constant objective get `f64::INFINITY`;
/// interior points sum the normalized gap between their neighbours per
/// objective.
#[must_use]
pub fn crowding_distances(scores: &[ScoreVector]) -> Vec<f64> {
    let n = scores.len();
    let mut distance = vec![0.0; n];
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let objectives: Vec<[f64; 4]> = scores.iter().map(ScoreVector::objectives).collect();
    let mut order: Vec<usize> = (0..n).collect();

    for dim in 0..4 {
        order.sort_by(|a, b| objectives[*a][dim].total_cmp(&objectives[*b][dim]));
        let span = objectives[order[n - 1]][dim] - objectives[order[0]][dim];
        if span <= 0.0 {
            continue;
        }
        distance[order[0]] = f64::INFINITY;
        distance[order[n - 1]] = f64::INFINITY;
        for w in 1..n - 1 {
            let gap = objectives[order[w + 1]][dim] - objectives[order[w - 1]][dim];
            distance[order[w]] += gap / span;
        }
    }

    distance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(cost: f64, sellers: usize) -> ScoreVector {
        ScoreVector {
            total_cost: cost,
            quality_score: 1.0,
            availability_score: 1,
            seller_count: sellers,
        }
    }

    fn alloc(tag: usize) -> Allocation {
        Allocation::unfulfilled(tag)
    }

    #[test]
    fn dominated_candidates_are_rejected() {
        let mut front = ParetoFront::new();
        assert!(front.insert(alloc(1), score(10.0, 1)));
        assert!(!front.insert(alloc(2), score(11.0, 2)));
        assert_eq!(front.len(), 1);
    }

    #[test]
    fn dominating_candidates_evict_members() {
        let mut front = ParetoFront::new();
        front.insert(alloc(1), score(10.0, 2));
        front.insert(alloc(2), score(12.0, 1));
        assert_eq!(front.len(), 2);

        assert!(front.insert(alloc(3), score(9.0, 1)));
        assert_eq!(front.len(), 1);
        assert_eq!(front.members()[0].score.total_cost, 9.0);
    }

    #[test]
    fn equal_scores_are_deduplicated() {
        let mut front = ParetoFront::new();
        front.insert(alloc(1), score(10.0, 1));
        assert!(!front.insert(alloc(2), score(10.0, 1)));
    }

    #[test]
    fn members_never_dominate_each_other() {
        let mut front = ParetoFront::new();
        let candidates = [
            (5.0, 4),
            (6.0, 3),
            (7.0, 3),
            (4.0, 5),
            (6.0, 2),
            (3.0, 6),
            (5.5, 2),
        ];
        for (i, (cost, sellers)) in candidates.into_iter().enumerate() {
            front.insert(alloc(i), score(cost, sellers));
        }
        for a in front.members() {
            for b in front.members() {
                assert!(!a.score.dominates(&b.score));
            }
        }
    }

    #[test]
    fn truncation_keeps_extremes() {
        let mut front = ParetoFront::new();
        for i in 0..10 {
            front.insert(alloc(i), score(i as f64, 10 - i));
        }
        let kept = front.truncated(3);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].score.total_cost, 0.0);
        assert_eq!(kept[2].score.total_cost, 9.0);
    }

    #[test]
    fn crowding_marks_boundaries_infinite() {
        let scores = [score(1.0, 3), score(2.0, 2), score(3.0, 1)];
        let distances = crowding_distances(&scores);
        assert!(distances[0].is_infinite());
        assert!(distances[1].is_finite());
        assert!(distances[2].is_infinite());
    }
}
