/// Non-negative loss charged for playing `prediction` when `outcome` is realised.
///
/// Scores only ever decrease because losses are never negative; implementations must keep
/// that promise.
pub trait Loss<A, Y> {
    /// Loss of one round.
    fn loss(&self, prediction: &A, outcome: &Y) -> f64;
}

impl<A, Y, F> Loss<A, Y> for F
where
    F: Fn(&A, &Y) -> f64,
{
    fn loss(&self, prediction: &A, outcome: &Y) -> f64 {
        self(prediction, outcome)
    }
}

/// Mismatch indicator: `0.0` on a hit, `1.0` otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroOneLoss;

impl<A: PartialEq<Y>, Y> Loss<A, Y> for ZeroOneLoss {
    fn loss(&self, prediction: &A, outcome: &Y) -> f64 {
        zero_one_loss(prediction, outcome)
    }
}

/// Free-function form of [`ZeroOneLoss`].
pub fn zero_one_loss<A: PartialEq<Y>, Y>(prediction: &A, outcome: &Y) -> f64 {
    if prediction == outcome {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experts::Side;

    #[test]
    fn zero_one_counts_mismatches() {
        assert_eq!(ZeroOneLoss.loss(&Side::Left, &Side::Left), 0.0);
        assert_eq!(ZeroOneLoss.loss(&Side::Left, &Side::Right), 1.0);
        assert_eq!(zero_one_loss(&3, &4), 1.0);
    }

    #[test]
    fn closures_are_losses() {
        let absolute = |p: &f64, y: &f64| (p - y).abs();
        assert!((Loss::loss(&absolute, &0.25, &1.0) - 0.75).abs() < 1e-12);
    }
}
