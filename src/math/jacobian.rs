//! Forward-difference Jacobian approximation.
//!
//! For a residual function `r: ℝⁿ → ℝᵐ` the `j`-th column is approximated by
//!
//! ```text
//! ∂r/∂x_j ≈ (r(x + h_j e_j) − r(x)) / h_j,   h_j = √ε · max(|x_j|, 1)
//! ```
//!
//! Numerical notes:
//! - The step scales with `|x_j|` so large parameters (λ is typically in the
//!   hundreds or thousands) are not perturbed below their rounding noise.
//! - The effective step is recomputed as `(x_j + h_j) − x_j` so the quotient uses
//!   the perturbation that was actually representable.

use nalgebra::{DMatrix, DVector};

/// `√ε` for `f64`.
const STEP_SCALE: f64 = 1.490_116_119_384_765_6e-8;

/// Approximate the Jacobian of `residuals` at `x`.
///
/// `r0` must be `residuals(x)`; it is passed in because the solver already has it,
/// so each call costs exactly one extra residual evaluation per parameter.
pub fn forward_difference<F>(residuals: &F, x: &DVector<f64>, r0: &DVector<f64>) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64> + ?Sized,
{
    let mut jacobian = DMatrix::zeros(r0.len(), x.len());
    let mut perturbed = x.clone();

    for j in 0..x.len() {
        let xj = x[j];
        perturbed[j] = xj + STEP_SCALE * xj.abs().max(1.0);
        let h = perturbed[j] - xj;

        let r = residuals(&perturbed);
        jacobian.set_column(j, &((r - r0) / h));

        perturbed[j] = xj;
    }

    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_residuals_are_differentiated_exactly() {
        // r(x) = A x + b
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, -3.0, 0.5, 0.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, -1.0, 2.0]);
        let f = |x: &DVector<f64>| &a * x + &b;

        let x = DVector::from_row_slice(&[0.3, -7.0]);
        let jac = forward_difference(&f, &x, &f(&x));

        for i in 0..3 {
            for j in 0..2 {
                assert_relative_eq!(jac[(i, j)], a[(i, j)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn nonlinear_residuals_match_analytic_derivative() {
        // r(x) = [x0 * exp(x1), x0^2]
        let f = |x: &DVector<f64>| DVector::from_row_slice(&[x[0] * x[1].exp(), x[0] * x[0]]);
        let x = DVector::from_row_slice(&[1000.0, 0.25]);
        let jac = forward_difference(&f, &x, &f(&x));

        assert_relative_eq!(jac[(0, 0)], 0.25_f64.exp(), max_relative = 1e-6);
        assert_relative_eq!(jac[(0, 1)], 1000.0 * 0.25_f64.exp(), max_relative = 1e-6);
        assert_relative_eq!(jac[(1, 0)], 2000.0, max_relative = 1e-6);
        assert_eq!(jac[(1, 1)], 0.0);
    }

    #[test]
    fn shape_is_residuals_by_parameters() {
        let f = |x: &DVector<f64>| DVector::from_element(5, x.sum());
        let x = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let jac = forward_difference(&f, &x, &f(&x));
        assert_eq!(jac.shape(), (5, 3));
    }
}
