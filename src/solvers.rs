//! This module provides the high-level API: eigendecomposition of a Gram matrix, the
//! singular value decomposition, and rank truncation of a real matrix.
//!
//! Each entry point comes in two flavours. The short form uses [`QlParams::default`]
//! and the Householder tridiagonalization; the `_with_params` form accepts explicit
//! solver parameters, e.g. a looser tolerance to retry after a convergence failure.

use crate::{
    algorithms::{
        EigenDecomposition, Orientation, QlParams, Svd,
        householder::Householder,
        svd::{build_svd, gram_eigen, retained_rank},
    },
    error::SvdError,
};
use faer::{Mat, MatRef};

/// Computes the eigenpairs of `MᵀM` for an arbitrary real matrix `M`.
///
/// The eigenvalues are non-negative and sorted in descending order; column `i` of the
/// eigenvector matrix belongs to eigenvalue `i`.
///
/// # Errors
/// Fails if the QL iteration does not converge or the matrix holds non-finite values.
pub fn decompose(matrix: MatRef<'_, f64>) -> Result<EigenDecomposition, SvdError> {
    decompose_with_params(matrix, &QlParams::default())
}

/// Same as [`decompose`], with explicit solver parameters.
pub fn decompose_with_params(
    matrix: MatRef<'_, f64>,
    params: &QlParams,
) -> Result<EigenDecomposition, SvdError> {
    gram_eigen(matrix, params, &Householder)
}

/// Computes the singular value decomposition of `matrix`.
///
/// A matrix with more columns than rows is decomposed as its transpose, which keeps the
/// Gram matrix on the smaller dimension; [`Svd::orientation`] records this and
/// [`Svd::reconstruct`] undoes it.
pub fn svd(matrix: MatRef<'_, f64>) -> Result<Svd, SvdError> {
    svd_with_params(matrix, &QlParams::default())
}

/// Same as [`svd`], with explicit solver parameters.
pub fn svd_with_params(matrix: MatRef<'_, f64>, params: &QlParams) -> Result<Svd, SvdError> {
    let orientation = Orientation::of(matrix.nrows(), matrix.ncols());
    let oriented = match orientation {
        Orientation::Original => matrix,
        Orientation::Transposed => matrix.transpose(),
    };

    let eigen = gram_eigen(oriented, params, &Householder)?;
    Ok(build_svd(oriented, eigen, orientation))
}

/// Computes a reduced-rank approximation of `matrix` with `percent` percent of its
/// numerical rank removed.
///
/// `percent == 0` reproduces the input up to rounding, `percent == 100` yields the zero
/// matrix. The result always has the shape of the input.
///
/// # Errors
/// Fails with an invalid-percentage error unless `0 <= percent <= 100`. The percentage
/// is checked before any decomposition work is done. Finite entries large enough to
/// overflow `AᵀA` fail with an overflow error rather than producing NaN.
pub fn truncate(matrix: MatRef<'_, f64>, percent: f64) -> Result<Mat<f64>, SvdError> {
    truncate_with_params(matrix, percent, &QlParams::default())
}

/// Same as [`truncate`], with explicit solver parameters.
pub fn truncate_with_params(
    matrix: MatRef<'_, f64>,
    percent: f64,
    params: &QlParams,
) -> Result<Mat<f64>, SvdError> {
    // Rank 0 still validates the percentage.
    retained_rank(0, percent)?;
    svd_with_params(matrix, params)?.truncate(percent)
}
