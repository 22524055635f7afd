//! Continuous to discrete conversion of linear state-space systems.
//!
//! For `ẋ = A_c·x + B_c·u` with `u` held constant over a sample period `T`,
//! van Loan's method gives the exact discrete pair through one matrix
//! exponential of the augmented block matrix
//!
//! ```text
//!     M = ⎡ A_c  B_c ⎤        exp(M·T) = ⎡ A_d  B_d ⎤
//!         ⎣  0    0  ⎦                   ⎣  0    I  ⎦
//! ```
//!
//! so `x[k+1] = A_d·x[k] + B_d·u[k]` matches the continuous trajectory at every
//! sample instant regardless of how large `T` is.

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::error::{SimError, SimResult};

/// Exact zero-order-hold discretization of `(A_c, B_c)` over `sample_period` seconds.
pub fn discretize<const N: usize, const M: usize>(
    continuous_system: &SMatrix<f64, N, N>,
    continuous_input: &SMatrix<f64, N, M>,
    sample_period: f64,
) -> SimResult<(SMatrix<f64, N, N>, SMatrix<f64, N, M>)> {
    if !(sample_period.is_finite() && sample_period > 0.0) {
        return Err(SimError::NonPositiveTimeStep { time_step: sample_period });
    }

    let size = N + M;
    let mut block = DMatrix::<f64>::zeros(size, size);
    block.view_mut((0, 0), (N, N)).copy_from(continuous_system);
    block.view_mut((0, N), (N, M)).copy_from(continuous_input);

    let phi = (block * sample_period).exp();
    let discrete_system = phi.fixed_view::<N, N>(0, 0).into_owned();
    let discrete_input = phi.fixed_view::<N, M>(0, N).into_owned();
    Ok((discrete_system, discrete_input))
}

/// Moore-Penrose left pseudoinverse `B⁺ = (BᵀB)⁻¹Bᵀ`.
///
/// Only meaningful for "tall" input matrices (more states than inputs) with
/// full column rank; anything else makes `BᵀB` singular.
pub fn pseudo_inverse<const N: usize, const M: usize>(
    input: &SMatrix<f64, N, M>,
) -> SimResult<SMatrix<f64, M, N>> {
    let b = DMatrix::from_column_slice(N, M, input.as_slice());
    let b_transpose = b.transpose();
    let gram = &b_transpose * &b;
    let gram_inverse = gram.try_inverse().ok_or(SimError::SingularInputMatrix)?;
    let result = gram_inverse * b_transpose;
    if result.iter().any(|value| !value.is_finite()) {
        return Err(SimError::SingularInputMatrix);
    }
    Ok(SMatrix::<f64, M, N>::from_column_slice(result.as_slice()))
}

/// Discrete counterpart of a constant continuous forcing term `c`.
///
/// The forcing is mapped back to the equivalent input through `B_c⁺` and then
/// pushed through `B_d`, so `x[k+1] = A_d·x + B_d·u + B_d·B_c⁺·c`.
pub fn discrete_constant<const N: usize, const M: usize>(
    discrete_input: &SMatrix<f64, N, M>,
    continuous_input_pseudo_inverse: &SMatrix<f64, M, N>,
    continuous_constant: &SVector<f64, N>,
) -> SVector<f64, N> {
    discrete_input * (continuous_input_pseudo_inverse * continuous_constant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix1, Matrix2, Vector1, Vector2};
    use proptest::prelude::*;

    #[test]
    fn test_double_integrator_closed_form() {
        let a = Matrix2::new(0.0, 1.0, 0.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        let t = 0.02;

        let (a_d, b_d) = discretize(&a, &b, t).unwrap();

        assert_relative_eq!(a_d, Matrix2::new(1.0, t, 0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(b_d, Vector2::new(0.5 * t * t, t), epsilon = 1e-12);
    }

    #[test]
    fn test_first_order_closed_form() {
        let a = Matrix1::new(-3.0);
        let b = Matrix1::new(2.0);
        let t = 0.5;

        let (a_d, b_d) = discretize(&a, &b, t).unwrap();

        let expected_a = (-3.0_f64 * t).exp();
        assert_relative_eq!(a_d[(0, 0)], expected_a, max_relative = 1e-10);
        assert_relative_eq!(b_d[(0, 0)], 2.0 / -3.0 * (expected_a - 1.0), max_relative = 1e-10);
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let a = Matrix2::<f64>::zeros();
        let b = Vector2::new(0.0, 1.0);
        assert_eq!(
            discretize(&a, &b, 0.0),
            Err(SimError::NonPositiveTimeStep { time_step: 0.0 })
        );
        assert!(discretize(&a, &b, -1e-3).is_err());
        assert!(discretize(&a, &b, f64::NAN).is_err());
    }

    #[test]
    fn test_substeps_compose_to_one_shot() {
        // Damped actuator-like plant: position integrates velocity, velocity has back-EMF damping
        let a = Matrix2::new(0.0, 1.0, 0.0, -215.97);
        let b = Vector2::new(0.0, 35.49);
        let period = 0.05;
        let u = 4.0;

        let (a_full, b_full) = discretize(&a, &b, period).unwrap();
        let one_shot = a_full * Vector2::new(0.3, -0.1) + b_full * u;

        for substeps in [2_usize, 10, 100] {
            let (a_sub, b_sub) = discretize(&a, &b, period / substeps as f64).unwrap();
            let mut x = Vector2::new(0.3, -0.1);
            for _ in 0..substeps {
                x = a_sub * x + b_sub * u;
            }
            assert_relative_eq!(x, one_shot, max_relative = 1e-6, epsilon = 1e-12);
        }
    }

    struct Plant {
        a: Matrix2<f64>,
        b: Vector2<f64>,
        u: f64,
    }

    impl ode_solvers::System<f64, ode_solvers::Vector2<f64>> for Plant {
        fn system(
            &self,
            _t: f64,
            y: &ode_solvers::Vector2<f64>,
            dy: &mut ode_solvers::Vector2<f64>,
        ) {
            let x = Vector2::new(y[0], y[1]);
            let dx = self.a * x + self.b * self.u;
            dy[0] = dx[0];
            dy[1] = dx[1];
        }
    }

    #[test]
    fn test_matches_numeric_integration() {
        let a = Matrix2::new(0.0, 1.0, 0.0, -40.0);
        let b = Vector2::new(0.0, 12.0);
        let u = 2.5;
        let period = 0.1;

        let (a_d, b_d) = discretize(&a, &b, period).unwrap();
        let exact = a_d * Vector2::new(0.2, 0.0) + b_d * u;

        let y0 = ode_solvers::Vector2::new(0.2, 0.0);
        let plant = Plant { a, b, u };
        let mut stepper = ode_solvers::rk4::Rk4::new(plant, 0.0, y0, period, period / 2000.0);
        stepper.integrate().unwrap();
        let integrated = stepper.y_out().last().copied().unwrap();

        assert_relative_eq!(integrated[0], exact[0], max_relative = 1e-6);
        assert_relative_eq!(integrated[1], exact[1], max_relative = 1e-6);
    }

    #[test]
    fn test_pseudo_inverse_of_voltage_column() {
        let b = Vector2::new(0.0, 35.49);
        let b_pinv = pseudo_inverse(&b).unwrap();
        assert_relative_eq!(b_pinv[(0, 0)], 0.0);
        assert_relative_eq!(b_pinv[(0, 1)], 1.0 / 35.49, max_relative = 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_singular() {
        let b = Vector2::<f64>::zeros();
        assert_eq!(pseudo_inverse(&b), Err(SimError::SingularInputMatrix));
    }

    #[test]
    fn test_discrete_constant_matches_input_equivalent() {
        let a = Matrix2::new(0.0, 1.0, 0.0, -10.0);
        let b = Vector2::new(0.0, 5.0);
        let (_, b_d) = discretize(&a, &b, 0.01).unwrap();
        let b_pinv = pseudo_inverse(&b).unwrap();
        let gravity = Vector2::new(0.0, -9.81);

        // Gravity behaves exactly like an input of g / 5 volts
        let constant = discrete_constant(&b_d, &b_pinv, &gravity);
        assert_relative_eq!(constant, b_d * (-9.81 / 5.0), max_relative = 1e-12);
    }

    proptest! {
        #[test]
        fn test_pseudo_inverse_is_left_inverse(
            b0 in -50.0_f64..50.0,
            b1 in 0.5_f64..50.0,
        ) {
            let b = Vector2::new(b0, b1);
            let b_pinv = pseudo_inverse(&b).unwrap();
            let identity = b_pinv * b;
            prop_assert!((identity - Vector1::new(1.0)).norm() < 1e-12);
        }
    }
}
