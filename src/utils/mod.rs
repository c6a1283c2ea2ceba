//! Image-facing utilities built on top of the core solvers.
//!
//! This module is organized into two submodules:
//!
//! - **`channels`**: Groups colour planes with an optional alpha plane and truncates the
//!   colour planes concurrently. Alpha is passed through untouched.
//!
//! - **`image_io`**: Decodes image files into `f64` channel matrices and encodes
//!   reconstructed planes back to 8 bits per sample.
//!

pub mod channels;
pub mod image_io;
