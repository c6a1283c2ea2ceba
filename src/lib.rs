//! Truncated singular value decomposition and low-rank matrix approximation.
//!
//! This crate computes the SVD of a real matrix `A` through the eigendecomposition of its
//! Gram matrix `AᵀA`, and uses it to build reduced-rank approximations of `A`. Applied per
//! colour plane, this is a simple lossy image compressor.
//!
//! Built on the [`faer`] linear algebra framework for dense storage and products, the
//! numerical core is a symmetric tridiagonal eigensolver implementing the implicit QL
//! algorithm with shifts.
//!
//! ## Pipeline
//!
//! 1. **Gram eigendecomposition** ([`decompose`]): forms `S = AᵀA`, reduces it to tridiagonal
//!    form with Householder reflections, runs the QL iteration, clamps negative eigenvalues
//!    to zero and sorts the eigenpairs in descending order.
//! 2. **SVD** ([`svd`]): takes `σᵢ = √λᵢ` for every strictly positive eigenvalue and derives
//!    the left singular vectors as `U[:, i] = A V[:, i] / σᵢ`. Wide matrices are decomposed
//!    as their transpose so that the Gram matrix is formed over the smaller dimension.
//! 3. **Truncation** ([`truncate`]): removes a percentage of the numerical rank and
//!    reconstructs `U_r Σ_r V_rᵀ` in the shape of the input.
//!
//! ## Example Usage
//!
//! ```rust
//! use faer::{Mat, mat};
//! use svd_compression::{decompose, svd, truncate};
//!
//! let a: Mat<f64> = mat![[3.0, 0.0], [4.0, 5.0]];
//!
//! // AᵀA = [[25, 20], [20, 25]] has eigenvalues 45 and 5.
//! let eigen = decompose(a.as_ref()).unwrap();
//! assert!((eigen.eigenvalues[0] - 45.0).abs() < 1e-9);
//! assert!((eigen.eigenvalues[1] - 5.0).abs() < 1e-9);
//!
//! let decomposition = svd(a.as_ref()).unwrap();
//! assert_eq!(decomposition.rank, 2);
//!
//! // Keeping the whole rank reproduces the input, dropping all of it gives zero.
//! let full = truncate(a.as_ref(), 0.0).unwrap();
//! assert!((&full - &a).norm_l2() < 1e-10);
//! assert_eq!(truncate(a.as_ref(), 100.0).unwrap(), Mat::<f64>::zeros(2, 2));
//! ```
//!
//! ## Images
//!
//! The [`utils`] module splits decoded images into per-channel matrices, compresses the
//! colour planes in parallel and writes the result back with 8 bits per sample.

// Declare the modules that form the crate's API structure.
pub mod algorithms;
pub mod error;
pub mod matrix;
pub mod solvers;
pub mod utils;

// Re-export the main API for convenient access.
pub use algorithms::{EigenDecomposition, Orientation, QlParams, Svd};
pub use error::SvdError;
pub use solvers::{
    decompose, decompose_with_params, svd, svd_with_params, truncate, truncate_with_params,
};
