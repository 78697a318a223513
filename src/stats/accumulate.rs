//! Online update of a single statistic.

use rust_decimal::Decimal;

use super::Stat;
use crate::util::math::sqrt_or_zero;

/// Folds observation `x` into `prev`, where `count` is the number of
/// observations including `x`.
///
/// Mean and variance follow the running recurrences
///
/// ```text
/// mean' = (mean * (n - 1) + x) / n  =  mean + (x - mean) / n
/// var'  = ((m - 1) * var + (x - mean) * (x - mean')) / m,   m = n - 1
/// ```
///
/// with `var' = 0` when `m == 0`. The mean is evaluated in the incremental
/// form so that repeated identical observations keep it exact. `stdev` is the
/// square root of the variance and `error` the standard error
/// `stdev / sqrt(n)`. A `count` of zero leaves `prev` untouched.
pub fn accumulate(prev: Stat, count: u64, x: Decimal) -> Stat {
    if count == 0 {
        return prev;
    }
    let n = Decimal::from(count);
    let mean = prev.mean + (x - prev.mean) / n;

    let previous = count - 1;
    let variance = if previous == 0 {
        Decimal::ZERO
    } else {
        let m = Decimal::from(previous);
        ((m - Decimal::ONE) * prev.variance + (x - prev.mean) * (x - mean)) / m
    };
    let stdev = sqrt_or_zero(variance);
    let error = stdev / sqrt_or_zero(n);

    Stat {
        mean,
        variance,
        stdev,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::accumulate;
    use crate::stats::Stat;
    use rust_decimal::prelude::MathematicalOps;
    use rust_decimal::Decimal;

    #[test]
    fn first_observation_sets_mean_only() {
        let s = accumulate(Stat::default(), 1, Decimal::from(42));
        assert_eq!(s.mean, Decimal::from(42));
        assert_eq!(s.variance, Decimal::ZERO);
        assert_eq!(s.stdev, Decimal::ZERO);
        assert_eq!(s.error, Decimal::ZERO);
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let prev = Stat {
            mean: Decimal::ONE,
            ..Stat::default()
        };
        assert_eq!(accumulate(prev, 0, Decimal::from(9)), prev);
    }

    #[test]
    fn three_values_match_hand_computation() {
        let mut s = Stat::default();
        for (i, x) in [100, 102, 104].into_iter().enumerate() {
            s = accumulate(s, i as u64 + 1, Decimal::from(x));
        }
        assert_eq!(s.mean, Decimal::from(102));
        assert_eq!(s.variance, Decimal::from(4));
        assert!((s.stdev - Decimal::from(2)).abs() < Decimal::new(1, 20));
    }

    #[test]
    fn repeated_full_precision_value_stays_exact() {
        let x = Decimal::from(6100).sqrt().unwrap_or_default();
        let mut s = Stat::default();
        for n in 1..=10 {
            s = accumulate(s, n, x);
        }
        assert_eq!(s.mean, x);
        assert_eq!(s.variance, Decimal::ZERO);
    }
}
