//! Singular value decomposition on top of the symmetric eigensolver.
//!
//! For an oriented matrix `B` (at least as many rows as columns) the right singular
//! vectors are the eigenvectors of `BᵀB` and the singular values are the square roots
//! of its eigenvalues. The left singular vectors follow as `U[:, i] = B V[:, i] / σᵢ`
//! for every strictly positive `σᵢ`.

use super::{EigenDecomposition, Orientation, QlParams, Svd, ql::implicit_ql};
use crate::{
    error::{SvdError, SvdErrorKind},
    matrix::{Tridiagonalize, ensure_finite, gram},
};
use faer::{Mat, MatRef};

/// Computes the eigenpairs of `MᵀM`, sorted by descending eigenvalue.
///
/// Negative eigenvalues are numerical noise of a positive-semidefinite matrix and are
/// clamped to exactly zero before sorting.
pub fn gram_eigen(
    matrix: MatRef<'_, f64>,
    params: &QlParams,
    reducer: &impl Tridiagonalize,
) -> Result<EigenDecomposition, SvdError> {
    ensure_finite(matrix)?;

    // Finite entries beyond about 1e154 still overflow the products of the Gram matrix.
    let s = gram(matrix);
    ensure_finite(s.as_ref()).map_err(|_| overflow("Gram matrix"))?;
    let mut system = reducer.tridiagonalize(s.as_ref())?;
    if !system.diag.iter().chain(&system.subdiag).all(|x| x.is_finite()) {
        return Err(overflow("tridiagonalization"));
    }
    let sweeps = implicit_ql(&mut system, params)?;
    log::debug!(
        "QL converged on a {n}x{n} Gram matrix after {sweeps} sweeps",
        n = system.dim()
    );

    let (eigenvalues, eigenvectors) = sort_eigenpairs(system.diag, system.accumulator);
    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
        sweeps,
    })
}

fn overflow(stage: &'static str) -> SvdError {
    SvdErrorKind::Overflow { stage }.into()
}

/// Clamps negative eigenvalues to zero and orders the eigenpairs descending.
pub(crate) fn sort_eigenpairs(mut values: Vec<f64>, vectors: Mat<f64>) -> (Vec<f64>, Mat<f64>) {
    for value in values.iter_mut() {
        // Also folds `-0.0` into `+0.0`, so the total order below treats them alike.
        if *value <= 0.0 {
            *value = 0.0;
        }
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let sorted_values = order.iter().map(|&j| values[j]).collect();
    let sorted_vectors = Mat::from_fn(vectors.nrows(), order.len(), |i, j| {
        vectors[(i, order[j])]
    });
    (sorted_values, sorted_vectors)
}

/// Derives the SVD of the oriented matrix from the eigendecomposition of its Gram matrix.
///
/// `oriented` must have at least as many rows as columns, and `eigen` must be the output
/// of [`gram_eigen`] for it.
pub fn build_svd(
    oriented: MatRef<'_, f64>,
    eigen: EigenDecomposition,
    orientation: Orientation,
) -> Svd {
    let rows = oriented.nrows();
    debug_assert!(rows >= oriented.ncols());

    let singular_values: Vec<f64> = eigen
        .eigenvalues
        .iter()
        .filter(|&&lambda| lambda > 0.0)
        .map(|lambda| lambda.sqrt())
        .collect();
    let rank = singular_values.len();

    let mut u = Mat::<f64>::zeros(rows, rows);
    for (i, &sigma) in singular_values.iter().enumerate() {
        let image = oriented * eigen.eigenvectors.as_ref().get(.., i..i + 1);
        for k in 0..rows {
            u[(k, i)] = image[(k, 0)] / sigma;
        }
    }

    Svd {
        u,
        singular_values,
        v: eigen.eigenvectors,
        rank,
        orientation,
    }
}

/// Number of singular values kept when `percent` percent of `rank` is removed.
///
/// Computes `ceil((100 - percent) / 100 · rank)`, so any non-zero retention keeps at
/// least one component.
///
/// # Errors
/// Returns an invalid-percentage error unless `0 <= percent <= 100`.
pub fn retained_rank(rank: usize, percent: f64) -> Result<usize, SvdError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(SvdErrorKind::InvalidPercentage(percent).into());
    }
    // Multiplying before dividing keeps whole percentages exact.
    let keep = ((100.0 - percent) * rank as f64 / 100.0).ceil();
    Ok((keep as usize).min(rank))
}

impl Svd {
    /// Shape `(rows, cols)` of the matrix that was decomposed, before orientation.
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols) = (self.u.nrows(), self.v.nrows());
        match self.orientation {
            Orientation::Original => (rows, cols),
            Orientation::Transposed => (cols, rows),
        }
    }

    /// Reconstructs the input from its leading `r` singular triplets.
    ///
    /// `r` is capped at [`Svd::rank`]. With `r == rank` the result equals the input up to
    /// rounding; with `r == 0` it is the zero matrix of the input's shape.
    pub fn reconstruct(&self, r: usize) -> Mat<f64> {
        let r = r.min(self.rank);
        let (rows, cols) = self.shape();
        if r == 0 {
            return Mat::zeros(rows, cols);
        }

        let u_r = self.u.as_ref().get(.., 0..r);
        let v_r = self.v.as_ref().get(.., 0..r);
        let sigma_r = Mat::from_fn(r, r, |i, j| {
            if i == j { self.singular_values[i] } else { 0.0 }
        });
        let reduced = u_r * &sigma_r * v_r.transpose();

        match self.orientation {
            Orientation::Original => reduced,
            Orientation::Transposed => reduced.as_ref().transpose().to_owned(),
        }
    }

    /// Reconstructs the input after removing `percent` percent of its rank.
    pub fn truncate(&self, percent: f64) -> Result<Mat<f64>, SvdError> {
        let r = retained_rank(self.rank, percent)?;
        log::debug!("retaining {r} of {} singular values", self.rank);
        Ok(self.reconstruct(r))
    }
}
