//! Householder reduction of a symmetric matrix to tridiagonal form.
//!
//! Column `k` is reduced by a reflector `H = I - beta v vᵀ` that maps `S[k+1.., k]` onto
//! a multiple of the first unit vector. The two-sided update `S <- H S H` is carried out
//! as the symmetric rank-2 correction `S - v wᵀ - w vᵀ`, and the reflectors are
//! accumulated from the right into `Q`, so that `Qᵀ S Q = T` on return.

use super::TridiagonalSystem;
use crate::{
    error::{SvdError, SvdErrorKind},
    matrix::Tridiagonalize,
};
use faer::{Mat, MatRef};

/// Dense Householder tridiagonalization with accumulated transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Householder;

impl Tridiagonalize for Householder {
    fn tridiagonalize(&self, symmetric: MatRef<'_, f64>) -> Result<TridiagonalSystem, SvdError> {
        let n = symmetric.nrows();
        if symmetric.ncols() != n {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "tridiagonalization input columns",
                expected: n,
                actual: symmetric.ncols(),
            }
            .into());
        }

        let mut a = symmetric.to_owned();
        let mut q = Mat::<f64>::identity(n, n);
        let mut v = vec![0.0; n];
        let mut w = vec![0.0; n];

        for k in 0..n.saturating_sub(2) {
            // Scaled by the largest entry so the squares neither underflow nor overflow.
            let scale = (k + 1..n).map(|i| a[(i, k)].abs()).fold(0.0_f64, f64::max);
            if scale == 0.0 {
                continue;
            }
            let norm = scale
                * (k + 1..n)
                    .map(|i| (a[(i, k)] / scale).powi(2))
                    .sum::<f64>()
                    .sqrt();

            // Reflect onto the sign opposite to the leading entry to avoid cancellation.
            let x0 = a[(k + 1, k)];
            let alpha = if x0 >= 0.0 { -norm } else { norm };

            v.fill(0.0);
            v[k + 1] = x0 - alpha;
            for i in k + 2..n {
                v[i] = a[(i, k)];
            }
            // H only depends on the direction of v; |v[k + 1]| bounds every entry.
            let lead = v[k + 1].abs();
            for x in &mut v[k + 1..] {
                *x /= lead;
            }
            let v_norm_sq: f64 = v[k + 1..].iter().map(|x| x * x).sum();
            let beta = 2.0 / v_norm_sq;

            // w = p - (beta/2)(vᵀp) v, with p = beta S v.
            for (i, wi) in w.iter_mut().enumerate() {
                *wi = beta * (k + 1..n).map(|j| a[(i, j)] * v[j]).sum::<f64>();
            }
            let kappa = 0.5 * beta * (k + 1..n).map(|i| v[i] * w[i]).sum::<f64>();
            for (wi, vi) in w.iter_mut().zip(&v) {
                *wi -= kappa * vi;
            }

            for i in 0..n {
                for j in 0..n {
                    a[(i, j)] -= v[i] * w[j] + w[i] * v[j];
                }
            }

            // The reduced column is known exactly; drop the rounding residue.
            a[(k + 1, k)] = alpha;
            a[(k, k + 1)] = alpha;
            for i in k + 2..n {
                a[(i, k)] = 0.0;
                a[(k, i)] = 0.0;
            }

            for r in 0..n {
                let s = beta * (k + 1..n).map(|j| q[(r, j)] * v[j]).sum::<f64>();
                for j in k + 1..n {
                    q[(r, j)] -= s * v[j];
                }
            }
        }

        let diag = (0..n).map(|i| a[(i, i)]).collect();
        let subdiag = (0..n.saturating_sub(1)).map(|i| a[(i + 1, i)]).collect();
        TridiagonalSystem::new(diag, subdiag, q)
    }
}
