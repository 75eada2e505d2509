//! Reward sizing buckets.
//!
//! A bucket maps a probability range `[p0, p1)` to a reward value range
//! `[min, max)`. Sizing uses two independent draws: the first picks the
//! bucket, the second picks the value inside it.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bucket used when no configured bucket contains the first draw.
pub const FALLBACK_BUCKET: RewardBucket = RewardBucket {
    p0: 0.0,
    p1: 1.0,
    min: 3,
    max: 10,
};

/// One configured probability bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBucket {
    /// Inclusive lower probability bound.
    pub p0: f64,
    /// Exclusive upper probability bound.
    pub p1: f64,
    /// Inclusive lower reward value.
    pub min: u32,
    /// Exclusive upper reward value.
    pub max: u32,
}

impl RewardBucket {
    /// Whether the probability draw `p` falls in this bucket.
    pub fn contains(&self, p: f64) -> bool {
        self.p0 <= p && p < self.p1
    }

    /// Map a uniform draw `u ∈ [0, 1)` onto `[min, max)`.
    pub fn value_at(&self, u: f64) -> u32 {
        let span = f64::from(self.max) - f64::from(self.min);
        let value = u.mul_add(span, f64::from(self.min)).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value.max(0.0) as u32;
        // Rounding must never reach the exclusive bound.
        if self.max > self.min {
            value.clamp(self.min, self.max - 1)
        } else {
            self.min
        }
    }
}

/// Ordered list of configured buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketTable {
    buckets: Vec<RewardBucket>,
}

impl BucketTable {
    pub fn new(buckets: Vec<RewardBucket>) -> Self {
        Self { buckets }
    }

    /// First bucket containing `p`, or the fallback bucket.
    pub fn bucket_for(&self, p: f64) -> RewardBucket {
        self.buckets
            .iter()
            .find(|bucket| bucket.contains(p))
            .copied()
            .unwrap_or(FALLBACK_BUCKET)
    }

    /// Draw a target reward value.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let p = rng.gen_range(0.0..1.0);
        let bucket = self.bucket_for(p);
        let u = rng.gen_range(0.0..1.0);
        bucket.value_at(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn table() -> BucketTable {
        BucketTable::new(vec![
            RewardBucket { p0: 0.0, p1: 0.95, min: 3, max: 10 },
            RewardBucket { p0: 0.95, p1: 0.98, min: 10, max: 25 },
            RewardBucket { p0: 0.98, p1: 1.0, min: 25, max: 200 },
        ])
    }

    #[test]
    fn test_bucket_for_picks_first_match() {
        let table = table();
        assert_eq!(table.bucket_for(0.0).max, 10);
        assert_eq!(table.bucket_for(0.95).min, 10);
        assert_eq!(table.bucket_for(0.9999).min, 25);
    }

    #[test]
    fn test_gap_uses_fallback() {
        let table = BucketTable::new(vec![RewardBucket { p0: 0.5, p1: 0.6, min: 50, max: 60 }]);
        assert_eq!(table.bucket_for(0.1), FALLBACK_BUCKET);
        assert_eq!(BucketTable::default().bucket_for(0.7), FALLBACK_BUCKET);
    }

    #[test]
    fn test_value_at_bounds() {
        let bucket = RewardBucket { p0: 0.0, p1: 1.0, min: 3, max: 10 };
        assert_eq!(bucket.value_at(0.0), 3);
        assert_eq!(bucket.value_at(0.999_999_999), 9);
        assert_eq!(bucket.value_at(0.5), 6);
    }

    #[test]
    fn test_degenerate_bucket_returns_min() {
        let bucket = RewardBucket { p0: 0.0, p1: 1.0, min: 5, max: 5 };
        assert_eq!(bucket.value_at(0.7), 5);
    }

    #[test]
    fn test_seeded_draws_replay() {
        let table = table();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first: Vec<u32> = (0..20).map(|_| table.draw(&mut a)).collect();
        let second: Vec<u32> = (0..20).map(|_| table.draw(&mut b)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (3..200).contains(v)));
    }
}
