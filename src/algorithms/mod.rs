//! Core numerical routines and the data types they share.
//!
//! ** NOTE: We recommend using the high-level functions in [`crate::solvers`] instead. This
//! module is intended for callers that need to drive the individual stages themselves,
//! for example to plug in a different tridiagonalization routine.
//!
//! The pipeline is split into three submodules:
//!
//! - [`householder`]: reduces a symmetric matrix to tridiagonal form, accumulating the
//!   orthogonal transform that is later fed to the QL solver.
//! - [`ql`]: the implicit QL algorithm with shifts, which converges the eigenvalues of a
//!   symmetric tridiagonal matrix one at a time and turns the accumulator into eigenvectors.
//! - [`svd`]: eigenpair post-processing, derivation of the singular value decomposition
//!   and rank truncation.

pub mod householder;
pub mod ql;
pub mod svd;

use crate::error::{SvdError, SvdErrorKind};
use faer::Mat;

/// Default relative deflation tolerance of the QL solver.
pub const DEFAULT_EPS: f64 = 1e-10;

/// Convergence controls for the implicit QL solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QlParams {
    /// A sub-diagonal entry `e[i]` is negligible once `|e[i]| <= eps * (|d[i]| + |d[i+1]|)`.
    pub eps: f64,
    /// Maximum number of QL sweeps spent on a single eigenvalue.
    pub max_iterations: usize,
}

impl QlParams {
    /// Creates parameters for tolerance `eps` with the iteration bound `⌊1/eps²⌋`.
    pub fn new(eps: f64) -> Self {
        Self {
            eps,
            max_iterations: iteration_bound(eps),
        }
    }

    /// Overrides the per-eigenvalue iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SvdError> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(SvdErrorKind::InvalidParameter(format!(
                "tolerance must be finite and non-negative, got {}",
                self.eps
            ))
            .into());
        }
        Ok(())
    }
}

impl Default for QlParams {
    fn default() -> Self {
        Self::new(DEFAULT_EPS)
    }
}

// Float-to-int casts saturate, so a zero tolerance yields `usize::MAX`.
fn iteration_bound(eps: f64) -> usize {
    (1.0 / (eps * eps)).floor() as usize
}

/// A symmetric tridiagonal matrix together with the accumulator of its eigenvectors.
///
/// This is the exclusive working state of one QL invocation. `subdiag[i]` couples
/// `diag[i]` and `diag[i + 1]`, and `subdiag` carries one trailing sentinel zero so that
/// both sequences have length `n`. The accumulator starts out as the orthogonal transform
/// that produced the tridiagonal form and ends up holding the eigenvectors as columns.
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    pub diag: Vec<f64>,
    pub subdiag: Vec<f64>,
    pub accumulator: Mat<f64>,
}

impl TridiagonalSystem {
    /// Builds a system from `n` diagonal entries and `n - 1` sub-diagonal entries.
    ///
    /// A sub-diagonal of length `n` is also accepted; its last entry is overwritten
    /// by the sentinel. The accumulator must be `n x n`.
    pub fn new(
        diag: Vec<f64>,
        mut subdiag: Vec<f64>,
        accumulator: Mat<f64>,
    ) -> Result<Self, SvdError> {
        let n = diag.len();
        if subdiag.len() + 1 == n {
            subdiag.push(0.0);
        } else if subdiag.len() != n {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "sub-diagonal length",
                expected: n.saturating_sub(1),
                actual: subdiag.len(),
            }
            .into());
        }
        if let Some(last) = subdiag.last_mut() {
            *last = 0.0;
        }
        if accumulator.nrows() != n {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "accumulator rows",
                expected: n,
                actual: accumulator.nrows(),
            }
            .into());
        }
        if accumulator.ncols() != n {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "accumulator columns",
                expected: n,
                actual: accumulator.ncols(),
            }
            .into());
        }
        Ok(Self {
            diag,
            subdiag,
            accumulator,
        })
    }

    /// Creates a system whose accumulator is the identity, so the solver yields the
    /// eigenvectors of the tridiagonal matrix itself.
    pub fn with_identity(diag: Vec<f64>, subdiag: Vec<f64>) -> Result<Self, SvdError> {
        let n = diag.len();
        Self::new(diag, subdiag, Mat::identity(n, n))
    }

    /// Returns the order `n` of the tridiagonal matrix.
    pub fn dim(&self) -> usize {
        self.diag.len()
    }

    /// Assembles the dense symmetric tridiagonal matrix.
    pub fn to_dense(&self) -> Mat<f64> {
        let n = self.dim();
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                self.diag[i]
            } else if i == j + 1 {
                self.subdiag[j]
            } else if j == i + 1 {
                self.subdiag[i]
            } else {
                0.0
            }
        })
    }
}

/// Eigenpairs of a Gram matrix `MᵀM`, sorted by descending eigenvalue.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Non-negative eigenvalues, non-increasing.
    pub eigenvalues: Vec<f64>,
    /// Column `i` is the unit eigenvector belonging to `eigenvalues[i]`.
    pub eigenvectors: Mat<f64>,
    /// Total number of QL sweeps the solver needed.
    pub sweeps: usize,
}

/// Whether the factors of an [`Svd`] describe the input matrix or its transpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Original,
    /// The input had more columns than rows and was decomposed as `Aᵀ`.
    Transposed,
}

impl Orientation {
    /// Picks the orientation for a `rows x cols` matrix, so that the Gram matrix
    /// is formed over the smaller dimension.
    pub fn of(rows: usize, cols: usize) -> Self {
        if rows < cols {
            Orientation::Transposed
        } else {
            Orientation::Original
        }
    }
}

/// A full singular value decomposition `B = U · diag(Σ) · Vᵀ` of the oriented matrix `B`.
///
/// `B` is the input itself when [`Orientation::Original`], and its transpose otherwise,
/// so that `B` always has at least as many rows as columns.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors, `rows x rows` of `B`. Columns past `rank` are zero.
    pub u: Mat<f64>,
    /// The `rank` strictly positive singular values, non-increasing.
    pub singular_values: Vec<f64>,
    /// Right singular vectors, `cols x cols` of `B`.
    pub v: Mat<f64>,
    /// Number of strictly positive singular values.
    pub rank: usize,
    pub orientation: Orientation,
}
