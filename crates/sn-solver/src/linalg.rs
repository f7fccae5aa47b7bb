//! Dense solves shared by the steady pipeline.

use crate::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Solve a square system by column-pivoting QR, falling back to an SVD
/// pseudo-inverse when the factorization reports rank deficiency.
pub fn solve_square(a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<DVector<f64>> {
    if let Some(x) = a.clone().col_piv_qr().solve(b) {
        if x.iter().all(|v| v.is_finite()) {
            return Ok(x);
        }
    }
    solve_least_squares(a, b)
}

/// Minimum-norm least-squares solve for rectangular or rank-deficient
/// systems.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<DVector<f64>> {
    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !(max_sv > 0.0) || !max_sv.is_finite() {
        return Err(SolverError::Singular {
            what: "matrix has no finite nonzero singular value",
        });
    }
    let threshold = 1e-12 * max_sv;
    svd.solve(b, threshold)
        .map_err(|_| SolverError::Singular {
            what: "SVD pseudo-inverse failed",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_solve_round_trip() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 10.0]);
        let x = solve_square(&a, &b).unwrap();
        let r = &a * &x - &b;
        assert!(r.norm() < 1e-12);
    }

    #[test]
    fn underdetermined_solve_is_minimum_norm() {
        // x + y = 2 has the minimum-norm solution (1, 1).
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let b = DVector::from_vec(vec![2.0]);
        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn overdetermined_solve_is_least_squares() {
        // Fit x to [1, 1, 1]·x = [1, 2, 3]: mean 2.
        let a = DMatrix::from_row_slice(3, 1, &[1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_matrix_is_singular() {
        let a = DMatrix::zeros(2, 2);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(solve_least_squares(&a, &b).is_err());
    }
}
