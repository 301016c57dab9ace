//! # Promotion Rule
//!
//! Pure predicate deciding whether a post's tally crosses the popularity
//! threshold. Both knobs are configuration, not constants: deployments have
//! shipped with minimum up-vote counts of 5 and 20.

use domains::Rating;

/// Popularity thresholds for promotion to the popular channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionPolicy {
    /// Up-votes must make up strictly more than this percentage of all votes.
    pub min_percent: u8,
    /// And there must be at least this many up-votes in absolute terms.
    pub min_up_votes: i64,
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        PromotionPolicy {
            min_percent: 80,
            min_up_votes: 20,
        }
    }
}

impl PromotionPolicy {
    /// True iff `up / (up + down)` exceeds the percentage threshold and the
    /// absolute up-vote floor is met. A post with no votes is never popular.
    ///
    /// Integer comparison: `up * 100 > total * percent` avoids both the
    /// division by zero and floating point.
    pub fn is_popular(&self, rating: Rating) -> bool {
        let total = rating.total();
        if total == 0 {
            return false;
        }
        rating.up * 100 > total * i64::from(self.min_percent) && rating.up >= self.min_up_votes
    }
}
