//! Summary figures shown above the feedback table.

use crate::models::FeedbackRecord;
use std::cmp::Ordering;

pub const POSITIVE_MIN: u8 = 4;
pub const NEGATIVE_BELOW: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Analytics {
    pub total: usize,
    /// Ratings of 4 and 5.
    pub positive: usize,
    /// Ratings of 1 and 2. A 3 is neither positive nor negative.
    pub negative: usize,
    average_tenths: Option<u64>,
}

impl Analytics {
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let total = records.len();
        let sum: u64 = records.iter().map(|r| u64::from(r.rating)).sum();
        let average_tenths = (total > 0).then(|| round_tenths(sum as f64 / total as f64));
        Analytics {
            total,
            positive: records.iter().filter(|r| r.rating >= POSITIVE_MIN).count(),
            negative: records.iter().filter(|r| r.rating < NEGATIVE_BELOW).count(),
            average_tenths,
        }
    }

    /// Mean rating to one decimal, e.g. `"3.0"`; `"0"` when there is no feedback.
    pub fn avg_rating_display(&self) -> String {
        match self.average_tenths {
            Some(t) => format!("{}.{}", t / 10, t % 10),
            None => "0".to_string(),
        }
    }

    pub fn average(&self) -> Option<f64> {
        self.average_tenths.map(|t| t as f64 / 10.0)
    }
}

/// Tenths nearest to the exact binary value of `x`, ties going up.
///
/// 23/20 is stored as 1.1499.. and so gives 11, while 2.25 is exact and gives 23.
/// `format!("{:.1}")` would round that tie to even.
fn round_tenths(x: f64) -> u64 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let mut lo = (x * 10.0).floor() as u64;
    // x*10 can itself round across a boundary; settle lo so lo/10 <= x < (lo+1)/10.
    while lo > 0 && cmp_exact(x, lo, 10) == Ordering::Less {
        lo -= 1;
    }
    while cmp_exact(x, lo + 1, 10) != Ordering::Less {
        lo += 1;
    }
    match cmp_exact(x, 2 * lo + 1, 20) {
        Ordering::Less => lo,
        _ => lo + 1,
    }
}

/// Compare a positive finite `x` with `num / den` without rounding.
fn cmp_exact(x: f64, num: u64, den: u64) -> Ordering {
    let bits = x.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & ((1u64 << 52) - 1);
    let (mant, exp) = if exp_bits == 0 {
        (frac, -1074)
    } else {
        (frac | (1u64 << 52), exp_bits - 1075)
    };
    // x * den = mant * den * 2^exp
    let lhs = u128::from(mant) * u128::from(den);
    let rhs = u128::from(num);
    if exp >= 0 {
        match lhs.checked_shl(exp as u32).filter(|v| v >> exp == lhs) {
            Some(l) => l.cmp(&rhs),
            None => Ordering::Greater,
        }
    } else {
        let shift = (-exp) as u32;
        if rhs == 0 {
            return lhs.cmp(&0);
        }
        // lhs < 2^64, so any rhs shifted past that wins
        if shift >= 64 {
            return Ordering::Less;
        }
        lhs.cmp(&(rhs << shift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ratings(ratings: &[u8]) -> Vec<FeedbackRecord> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &rating)| FeedbackRecord {
                id: i as u64 + 1,
                name: "n".into(),
                email: "n@x.com".into(),
                message: "m".into(),
                rating,
                created_at: "2024-01-01T00:00:00.000Z".into(),
            })
            .collect()
    }

    #[test]
    fn empty_collection() {
        let a = Analytics::from_records(&[]);
        assert_eq!(a.total, 0);
        assert_eq!(a.positive, 0);
        assert_eq!(a.negative, 0);
        assert_eq!(a.avg_rating_display(), "0");
        assert_eq!(a.average(), None);
    }

    #[test]
    fn three_counts_toward_neither_bucket() {
        let a = Analytics::from_records(&with_ratings(&[5, 3, 1]));
        assert_eq!(a.total, 3);
        assert_eq!(a.avg_rating_display(), "3.0");
        assert_eq!(a.positive, 1);
        assert_eq!(a.negative, 1);
    }

    #[test]
    fn average_rounds_half_up() {
        // 9 / 4 = 2.25
        assert_eq!(Analytics::from_records(&with_ratings(&[2, 2, 2, 3])).avg_rating_display(), "2.3");
        // 13 / 3 = 4.333..
        assert_eq!(Analytics::from_records(&with_ratings(&[4, 4, 5])).avg_rating_display(), "4.3");
        // 14 / 3 = 4.666..
        assert_eq!(Analytics::from_records(&with_ratings(&[4, 5, 5])).avg_rating_display(), "4.7");
    }

    #[test]
    fn average_rounds_the_stored_double() {
        // 23 / 20 is held as 1.1499.., so it rounds down
        let mut ratings = vec![2u8; 3];
        ratings.extend(std::iter::repeat(1u8).take(17));
        assert_eq!(Analytics::from_records(&with_ratings(&ratings)).avg_rating_display(), "1.1");
        // 9 / 4 = 2.25 exactly, a tie, which goes up
        assert_eq!(Analytics::from_records(&with_ratings(&[2, 2, 2, 3])).avg_rating_display(), "2.3");
    }

    #[test]
    fn round_tenths_edges() {
        assert_eq!(round_tenths(0.0), 0);
        assert_eq!(round_tenths(1.0), 10);
        assert_eq!(round_tenths(0.05), 1);
        assert_eq!(round_tenths(0.25), 3);
        assert_eq!(round_tenths(0.35), 3);
        assert_eq!(round_tenths(4.95), 50);
        assert_eq!(round_tenths(5.0), 50);
    }

    #[test]
    fn all_fives() {
        let a = Analytics::from_records(&with_ratings(&[5, 5]));
        assert_eq!(a.avg_rating_display(), "5.0");
        assert_eq!(a.positive, 2);
        assert_eq!(a.average(), Some(5.0));
    }
}
