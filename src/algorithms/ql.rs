//! Implicit QL algorithm with shifts for symmetric tridiagonal matrices.
//!
//! The solver works top-down over the eigenvalue index `l`. For each `l` it looks for
//! the first negligible sub-diagonal entry at or after `l`; while that boundary `m` is
//! past `l`, an implicitly shifted QL sweep chases the bulge from `m - 1` back up to `l`
//! with plane rotations, and the same rotations are applied to the accumulator columns.
//! Once `subdiag[l]` is negligible, `diag[l]` has converged and the block deflates.
//!
//! The rotation branch on `|f| > |g|` and the sign-aware shift denominator are what keep
//! the recurrence free of cancellation. They must not be simplified.

use super::{QlParams, TridiagonalSystem};
use crate::error::{SvdError, SvdErrorKind};
use faer::Mat;

/// Computes all eigenvalues and eigenvectors of a symmetric tridiagonal system in place.
///
/// On success `system.diag` holds the eigenvalues (in no particular order) and column `i`
/// of `system.accumulator` is the eigenvector belonging to `system.diag[i]`. The returned
/// value is the total number of QL sweeps performed.
///
/// # Errors
/// Returns a non-convergence error as soon as a single eigenvalue needs more than
/// `params.max_iterations` sweeps. The system is left in an intermediate state and must
/// not be used afterwards. A sweep that produces a non-finite entry fails with an
/// overflow error instead of iterating on NaN.
pub fn implicit_ql(system: &mut TridiagonalSystem, params: &QlParams) -> Result<usize, SvdError> {
    params.validate()?;

    let TridiagonalSystem {
        diag,
        subdiag,
        accumulator,
    } = system;
    let n = diag.len();
    let mut total_sweeps = 0;

    for l in 0..n {
        let mut iterations = 0;
        loop {
            let m = deflation_boundary(diag, subdiag, l, params.eps);
            if m == l {
                break;
            }
            if iterations >= params.max_iterations {
                return Err(SvdErrorKind::NoConvergence {
                    index: l,
                    iterations,
                }
                .into());
            }
            iterations += 1;
            sweep(diag, subdiag, accumulator, l, m);
            if !diag[l..=m].iter().chain(&subdiag[l..=m]).all(|x| x.is_finite()) {
                return Err(SvdErrorKind::Overflow {
                    stage: "QL iteration",
                }
                .into());
            }
        }
        log::trace!("eigenvalue {l} converged after {iterations} sweeps");
        total_sweeps += iterations;
    }

    Ok(total_sweeps)
}

/// Scans forward from `l` for the first negligible sub-diagonal entry.
///
/// The sentinel `subdiag[n - 1] == 0` is never reached by the test itself: the scan
/// stops at `n - 1` unconditionally.
fn deflation_boundary(diag: &[f64], subdiag: &[f64], l: usize, eps: f64) -> usize {
    let n = diag.len();
    let mut m = l;
    while m + 1 < n {
        if subdiag[m].abs() <= eps * (diag[m].abs() + diag[m + 1].abs()) {
            break;
        }
        m += 1;
    }
    m
}

/// One implicitly shifted QL sweep over the unreduced block `l..=m`.
fn sweep(diag: &mut [f64], subdiag: &mut [f64], z: &mut Mat<f64>, l: usize, m: usize) {
    // Shift from the leading 2x2 block. `subdiag[l]` is non-zero since `m > l`.
    let mut g = (diag[l + 1] - diag[l]) / (2.0 * subdiag[l]);
    let r = g.hypot(1.0);
    let shift_denom = if g >= 0.0 { g + r } else { g - r };
    g = diag[m] - diag[l] + subdiag[l] / shift_denom;

    let (mut sin, mut cos, mut p) = (1.0_f64, 1.0_f64, 0.0_f64);

    for i in (l..m).rev() {
        let f = sin * subdiag[i];
        let b = cos * subdiag[i];
        if f.abs() > g.abs() {
            cos = g / f;
            let r = cos.hypot(1.0);
            subdiag[i + 1] = f * r;
            sin = 1.0 / r;
            cos *= sin;
        } else {
            sin = if g != 0.0 { f / g } else { 0.0 };
            let r = sin.hypot(1.0);
            subdiag[i + 1] = g * r;
            cos = 1.0 / r;
            sin *= cos;
        }

        g = diag[i + 1] - p;
        let r = (diag[i] - g) * sin + 2.0 * cos * b;
        p = sin * r;
        diag[i + 1] = g + p;
        g = cos * r - b;

        rotate_columns(z, i, sin, cos);
    }

    diag[l] -= p;
    subdiag[l] = g;
    subdiag[m] = 0.0;
}

/// Applies the plane rotation `[[c, s], [-s, c]]` from the right to columns `i, i + 1`.
#[inline]
fn rotate_columns(z: &mut Mat<f64>, i: usize, sin: f64, cos: f64) {
    for k in 0..z.nrows() {
        let left = z[(k, i)];
        let right = z[(k, i + 1)];
        z[(k, i)] = cos * left - sin * right;
        z[(k, i + 1)] = sin * left + cos * right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: Vec<f64>) -> Vec<f64> {
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    fn assert_eigenpairs(t: &Mat<f64>, system: &TridiagonalSystem, tol: f64) {
        let n = system.dim();
        for j in 0..n {
            let lambda = system.diag[j];
            for i in 0..n {
                let tv: f64 = (0..n).map(|k| t[(i, k)] * system.accumulator[(k, j)]).sum();
                let residual = (tv - lambda * system.accumulator[(i, j)]).abs();
                assert!(
                    residual < tol,
                    "eigenpair {j} residual {residual} exceeds {tol}"
                );
            }
        }
    }

    #[test]
    fn test_two_by_two_known_spectrum() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3.
        let mut system = TridiagonalSystem::with_identity(vec![2.0, 2.0], vec![1.0]).unwrap();
        let t = system.to_dense();
        implicit_ql(&mut system, &QlParams::default()).unwrap();

        let eigs = sorted(system.diag.clone());
        assert!((eigs[0] - 1.0).abs() < 1e-12);
        assert!((eigs[1] - 3.0).abs() < 1e-12);
        assert_eigenpairs(&t, &system, 1e-10);
    }

    #[test]
    fn test_toeplitz_spectrum() {
        // tridiag(1, 2, 1) of order n has eigenvalues 2 + 2 cos(k pi / (n + 1)).
        let n = 6;
        let mut system = TridiagonalSystem::with_identity(vec![2.0; n], vec![1.0; n - 1]).unwrap();
        let t = system.to_dense();
        let sweeps = implicit_ql(&mut system, &QlParams::default()).unwrap();
        assert!(sweeps > 0);

        let expected = sorted(
            (1..=n)
                .map(|k| 2.0 + 2.0 * (k as f64 * std::f64::consts::PI / (n as f64 + 1.0)).cos())
                .collect(),
        );
        for (got, want) in sorted(system.diag.clone()).iter().zip(&expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
        assert_eigenpairs(&t, &system, 1e-8);
    }

    #[test]
    fn test_accumulator_stays_orthogonal() {
        let mut system = TridiagonalSystem::with_identity(
            vec![4.0, -1.0, 3.5, 0.0, 2.0],
            vec![1.5, -0.5, 2.0, 0.25],
        )
        .unwrap();
        implicit_ql(&mut system, &QlParams::default()).unwrap();

        let z = &system.accumulator;
        let gram = z.as_ref().transpose() * z.as_ref();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[(i, j)] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_diagonal_input_needs_no_sweeps() {
        let mut system =
            TridiagonalSystem::with_identity(vec![3.0, 1.0, 2.0], vec![0.0, 0.0]).unwrap();
        let sweeps = implicit_ql(&mut system, &QlParams::default()).unwrap();
        assert_eq!(sweeps, 0);
        assert_eq!(system.diag, vec![3.0, 1.0, 2.0]);
        assert_eq!(system.accumulator, Mat::<f64>::identity(3, 3));
    }

    #[test]
    fn test_zero_diagonal_spectrum() {
        // Spectrum of tridiag(1, 0, 1) of order 3 is {-sqrt 2, 0, sqrt 2}.
        let mut system =
            TridiagonalSystem::with_identity(vec![0.0, 0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let t = system.to_dense();
        implicit_ql(&mut system, &QlParams::default()).unwrap();
        let eigs = sorted(system.diag.clone());
        let root2 = 2.0_f64.sqrt();
        assert!((eigs[0] + root2).abs() < 1e-9);
        assert!(eigs[1].abs() < 1e-9);
        assert!((eigs[2] - root2).abs() < 1e-9);
        assert_eigenpairs(&t, &system, 1e-8);
    }

    #[test]
    fn test_vanishing_rotation_pivot() {
        // Equal leading diagonal entries give a unit shift denominator, and
        // diag[2] = diag[0] - subdiag[0] cancels the shift, so every rotation of the
        // sweep sees f == g == 0.
        let mut system =
            TridiagonalSystem::with_identity(vec![1.0, 1.0, 0.0], vec![1.0, 0.0]).unwrap();
        let t = system.to_dense();

        let TridiagonalSystem {
            diag,
            subdiag,
            accumulator,
        } = &mut system;
        sweep(diag, subdiag, accumulator, 0, 2);
        assert_eq!(system.diag, vec![1.0, 1.0, 0.0]);
        assert_eq!(system.subdiag, vec![1.0, 0.0, 0.0]);
        assert_eq!(system.accumulator, Mat::<f64>::identity(3, 3));

        implicit_ql(&mut system, &QlParams::default()).unwrap();
        let eigs = sorted(system.diag.clone());
        assert!(eigs[0].abs() < 1e-12);
        assert!(eigs[1].abs() < 1e-12);
        assert!((eigs[2] - 2.0).abs() < 1e-12);
        assert_eigenpairs(&t, &system, 1e-10);
    }

    #[test]
    fn test_non_finite_sweep_is_reported() {
        // diag[1] - diag[0] overflows in the shift; a zero tolerance keeps the
        // deflation test from accepting the overflowed bound.
        let mut system =
            TridiagonalSystem::with_identity(vec![-f64::MAX, f64::MAX], vec![1.0]).unwrap();
        let params = QlParams::new(0.0).with_max_iterations(10);
        let err = implicit_ql(&mut system, &params).unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn test_trivial_orders() {
        let mut empty = TridiagonalSystem::with_identity(vec![], vec![]).unwrap();
        assert_eq!(implicit_ql(&mut empty, &QlParams::default()).unwrap(), 0);

        let mut single = TridiagonalSystem::with_identity(vec![7.0], vec![]).unwrap();
        assert_eq!(implicit_ql(&mut single, &QlParams::default()).unwrap(), 0);
        assert_eq!(single.diag, vec![7.0]);
    }

    #[test]
    fn test_iteration_bound_reports_no_convergence() {
        // With a zero tolerance only an exactly vanishing sub-diagonal deflates,
        // which a single sweep over this block cannot produce.
        let mut system = TridiagonalSystem::with_identity(
            vec![4.0, 3.0, 2.0, 1.0],
            vec![1.0, 1.0, 1.0],
        )
        .unwrap();
        let params = QlParams::new(0.0).with_max_iterations(1);
        let err = implicit_ql(&mut system, &params).unwrap_err();
        assert!(err.is_no_convergence());
        assert_eq!(
            err.to_string(),
            "No convergence to eigenvalue 0 after 1 QL iterations."
        );
    }

    #[test]
    fn test_zero_bound_fails_before_any_sweep() {
        let mut system = TridiagonalSystem::with_identity(vec![2.0, 2.0], vec![1.0]).unwrap();
        let params = QlParams::default().with_max_iterations(0);
        assert!(implicit_ql(&mut system, &params).unwrap_err().is_no_convergence());
        assert_eq!(system.diag, vec![2.0, 2.0]);
    }

    #[test]
    fn test_invalid_tolerance_is_rejected() {
        let mut system = TridiagonalSystem::with_identity(vec![2.0, 2.0], vec![1.0]).unwrap();
        let err = implicit_ql(&mut system, &QlParams::new(-1e-3)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }
}
