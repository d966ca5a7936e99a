//! Fusion weights derived from the scale-smoothness regularizer.

use nalgebra::DMatrix;

use crate::util::{ScaleFuseError, ScaleFuseResult};

/// Inverse of the tridiagonal scale-smoothness matrix.
///
/// The regularizer `R` is a discretized second-difference penalty over the
/// scale axis with free boundaries: each level carries a unit fidelity term
/// pulling toward its own cost and `-lambda` couplings pulling toward its
/// pyramid neighbors. Row `m` of the inverse gives the per-scale weights that
/// produce level `m`'s fused cost; every row of `R` sums to exactly 1, so
/// every row of the inverse does too.
pub struct RegularizationWeights {
    levels: usize,
    data: Vec<f64>,
}

impl RegularizationWeights {
    /// Builds and inverts the regularizer for the given pyramid depth.
    ///
    /// `lambda = 0` yields the identity (no cross-scale coupling). The
    /// inversion guard exists for completeness: the matrix is strictly
    /// diagonally dominant for any finite `lambda >= 0` and does not go
    /// singular in practice.
    pub fn new(levels: usize, lambda: f64) -> ScaleFuseResult<Self> {
        if levels == 0 {
            return Err(ScaleFuseError::EmptyPyramid);
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(ScaleFuseError::InvalidSmoothness { lambda });
        }

        let mut reg = DMatrix::<f64>::zeros(levels, levels);
        for s in 0..levels {
            if levels == 1 {
                reg[(s, s)] = 1.0;
            } else if s == 0 {
                reg[(s, s)] = 1.0 + lambda;
                reg[(s, s + 1)] = -lambda;
            } else if s == levels - 1 {
                reg[(s, s)] = 1.0 + lambda;
                reg[(s, s - 1)] = -lambda;
            } else {
                reg[(s, s)] = 1.0 + 2.0 * lambda;
                reg[(s, s - 1)] = -lambda;
                reg[(s, s + 1)] = -lambda;
            }
        }

        let inverse = reg
            .try_inverse()
            .ok_or(ScaleFuseError::SingularRegularization { levels, lambda })?;
        let mut data = Vec::with_capacity(levels * levels);
        for m in 0..levels {
            for s in 0..levels {
                data.push(inverse[(m, s)]);
            }
        }
        Ok(Self { levels, data })
    }

    /// Returns the pyramid depth the weights were built for.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the weight row for target level `m`.
    pub fn row(&self, m: usize) -> Option<&[f64]> {
        if m >= self.levels {
            return None;
        }
        Some(&self.data[m * self.levels..(m + 1) * self.levels])
    }

    /// Returns the weight of source scale `s` for target level `m`.
    pub fn get(&self, m: usize, s: usize) -> Option<f64> {
        if m >= self.levels || s >= self.levels {
            return None;
        }
        Some(self.data[m * self.levels + s])
    }
}

#[cfg(test)]
mod tests {
    use super::RegularizationWeights;
    use crate::util::ScaleFuseError;

    #[test]
    fn zero_lambda_gives_identity() {
        for levels in 1..6 {
            let weights = RegularizationWeights::new(levels, 0.0).unwrap();
            for m in 0..levels {
                for s in 0..levels {
                    let expected = if m == s { 1.0 } else { 0.0 };
                    assert!((weights.get(m, s).unwrap() - expected).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn rows_sum_to_one() {
        for levels in 1..7 {
            for lambda in [0.0, 0.1, 0.3, 1.0, 10.0] {
                let weights = RegularizationWeights::new(levels, lambda).unwrap();
                for m in 0..levels {
                    let sum: f64 = weights.row(m).unwrap().iter().sum();
                    assert!(
                        (sum - 1.0).abs() < 1e-9,
                        "row {m} sums to {sum} for L={levels}, lambda={lambda}"
                    );
                }
            }
        }
    }

    #[test]
    fn single_level_is_identity_for_any_lambda() {
        let weights = RegularizationWeights::new(1, 5.0).unwrap();
        assert_eq!(weights.get(0, 0), Some(1.0));
    }

    #[test]
    fn negative_lambda_is_rejected() {
        let err = RegularizationWeights::new(3, -0.5).err().unwrap();
        assert_eq!(err, ScaleFuseError::InvalidSmoothness { lambda: -0.5 });
    }

    #[test]
    fn empty_depth_is_rejected() {
        let err = RegularizationWeights::new(0, 0.3).err().unwrap();
        assert_eq!(err, ScaleFuseError::EmptyPyramid);
    }
}
