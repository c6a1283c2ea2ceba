//! This module defines the custom error types for the library.
//!
//! Every failure that can arise while decomposing, truncating or encoding a matrix
//! is funnelled into a single public type, [`SvdError`]. The distinct conditions live
//! in the private [`SvdErrorKind`] enum so that new variants can be added without
//! breaking callers, who inspect errors through the predicate methods instead.
//!
//! [`thiserror`] generates the `Display` and `Error` implementations. Errors coming
//! from the `image` crate do not implement `PartialEq`, so they are stored by message.
use thiserror::Error;

/// Represents all possible errors that can occur while computing a truncated SVD.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct SvdError(#[from] SvdErrorKind);

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum SvdErrorKind {
    /// The QL sweeps for one eigenvalue exceeded the iteration bound without deflating.
    #[error("No convergence to eigenvalue {index} after {iterations} QL iterations.")]
    NoConvergence { index: usize, iterations: usize },

    /// A truncation percentage outside of `[0, 100]` (or NaN) was requested.
    #[error("Invalid compression percentage {0}: expected a value in [0, 100].")]
    InvalidPercentage(f64),

    /// Indicates that an invalid solver parameter was provided.
    #[error("Invalid solver parameter: {0}")]
    InvalidParameter(String),

    /// Two pieces of input that must agree in size do not.
    #[error("Dimension mismatch in {context}: expected {expected}, found {actual}.")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The input matrix contains NaN or an infinity.
    #[error("Input matrix holds a non-finite value at ({row}, {col}).")]
    NonFiniteInput { row: usize, col: usize },

    /// A finite input whose magnitude overflows an intermediate quantity.
    #[error("Floating-point overflow in {stage}: the input magnitude is out of range.")]
    Overflow { stage: &'static str },

    /// A set of channel planes does not share a single shape.
    #[error("Channel {index} has shape {actual:?}, expected {expected:?}.")]
    ChannelShape {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Wraps a decoding or encoding failure reported by the `image` crate.
    #[error("Image codec error: {0}")]
    Image(String),
}

impl SvdError {
    /// Returns `true` if the QL iteration failed to converge.
    pub fn is_no_convergence(&self) -> bool {
        matches!(self.0, SvdErrorKind::NoConvergence { .. })
    }

    /// Returns `true` if a truncation percentage was out of range.
    pub fn is_invalid_percentage(&self) -> bool {
        matches!(self.0, SvdErrorKind::InvalidPercentage(_))
    }

    /// Returns `true` if the input was finite but overflowed during the decomposition.
    pub fn is_overflow(&self) -> bool {
        matches!(self.0, SvdErrorKind::Overflow { .. })
    }

    /// Returns `true` if a solver parameter was rejected.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self.0, SvdErrorKind::InvalidParameter(_))
    }
}

impl From<image::ImageError> for SvdError {
    fn from(err: image::ImageError) -> Self {
        SvdErrorKind::Image(err.to_string()).into()
    }
}

// Compare through the inner `SvdErrorKind`.
impl PartialEq for SvdError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
