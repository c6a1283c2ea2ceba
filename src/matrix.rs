//! This module defines the seam between the QL solver and dense linear algebra.
//!
//! The implicit QL algorithm only ever sees a symmetric tridiagonal matrix together with
//! the orthogonal transform that produced it. How that reduction is obtained is not its
//! concern, so it is expressed as a capability: anything that can turn a symmetric matrix
//! `S` into `(diag, subdiag, Q)` with `Qᵀ S Q = T` implements [`Tridiagonalize`].
//!
//! The crate ships [`crate::algorithms::householder::Householder`] as the default
//! implementation. Closures are accepted as well, which makes it straightforward to plug
//! in a reduction from another library, or a precomputed one in tests.
//!
//! The remaining helpers are the small pieces of dense arithmetic the solvers share.

use crate::{
    algorithms::TridiagonalSystem,
    error::{SvdError, SvdErrorKind},
};
use faer::{Mat, MatRef};

/// Reduces a real symmetric matrix to tridiagonal form.
///
/// Implementations must return a [`TridiagonalSystem`] whose accumulator `Q` is orthogonal
/// and satisfies `Qᵀ S Q = T`, where `T` is built from the returned diagonals. Only the
/// symmetric part of the input is meaningful.
pub trait Tridiagonalize {
    fn tridiagonalize(&self, symmetric: MatRef<'_, f64>) -> Result<TridiagonalSystem, SvdError>;
}

impl<F> Tridiagonalize for F
where
    F: Fn(MatRef<'_, f64>) -> Result<TridiagonalSystem, SvdError>,
{
    #[inline]
    fn tridiagonalize(&self, symmetric: MatRef<'_, f64>) -> Result<TridiagonalSystem, SvdError> {
        self(symmetric)
    }
}

/// Forms the Gram matrix `MᵀM`, which is symmetric positive-semidefinite.
pub fn gram(matrix: MatRef<'_, f64>) -> Mat<f64> {
    matrix.transpose() * matrix
}

/// Rejects matrices holding NaN or infinite entries, which would keep the QL
/// deflation test from ever succeeding.
pub(crate) fn ensure_finite(matrix: MatRef<'_, f64>) -> Result<(), SvdError> {
    for col in 0..matrix.ncols() {
        for row in 0..matrix.nrows() {
            if !matrix[(row, col)].is_finite() {
                return Err(SvdErrorKind::NonFiniteInput { row, col }.into());
            }
        }
    }
    Ok(())
}

/// Frobenius norm of `a - b`.
///
/// # Panics
///
/// Panics if the shapes of `a` and `b` differ.
pub fn frobenius_distance(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> f64 {
    assert_eq!(
        (a.nrows(), a.ncols()),
        (b.nrows(), b.ncols()),
        "Shape mismatch in frobenius_distance."
    );
    (a - b).norm_l2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn test_gram_of_rectangular_matrix() {
        let m: Mat<f64> = mat![[3.0, 0.0], [4.0, 5.0], [0.0, 1.0]];
        let s = gram(m.as_ref());
        let expected: Mat<f64> = mat![[25.0, 20.0], [20.0, 26.0]];
        assert_eq!(s, expected);
    }

    #[test]
    fn test_closure_acts_as_tridiagonalizer() {
        // A diagonal input is its own tridiagonal form under the identity transform.
        let reduce = |s: MatRef<'_, f64>| {
            let n = s.nrows();
            TridiagonalSystem::with_identity((0..n).map(|i| s[(i, i)]).collect(), vec![0.0; n])
        };
        let s: Mat<f64> = mat![[1.0, 0.0], [0.0, 9.0]];
        let system = reduce.tridiagonalize(s.as_ref()).unwrap();
        assert_eq!(system.diag, vec![1.0, 9.0]);
        assert_eq!(system.subdiag, vec![0.0, 0.0]);
    }

    #[test]
    fn test_non_finite_entries_are_located() {
        let m: Mat<f64> = mat![[1.0, 2.0], [f64::NAN, 4.0]];
        let err = ensure_finite(m.as_ref()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input matrix holds a non-finite value at (1, 0)."
        );
        assert!(ensure_finite(mat![[1.0, 2.0]].as_ref()).is_ok());
    }

    #[test]
    fn test_frobenius_distance() {
        let a: Mat<f64> = mat![[1.0, 2.0], [3.0, 4.0]];
        let b: Mat<f64> = mat![[1.0, 2.0], [0.0, 0.0]];
        assert!((frobenius_distance(a.as_ref(), b.as_ref()) - 5.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "Shape mismatch in frobenius_distance.")]
    fn test_frobenius_distance_shape_mismatch_panic() {
        let a = Mat::<f64>::zeros(2, 3);
        let b = Mat::<f64>::zeros(3, 2);
        frobenius_distance(a.as_ref(), b.as_ref());
    }
}
