//! Per-channel compression of multi-plane images.
//!
//! An image is held as one `f64` matrix per colour plane plus an optional alpha plane.
//! Colour planes are independent, so they are truncated concurrently with [`rayon`];
//! every plane owns its own decomposition state. Alpha is never compressed.

use crate::{
    algorithms::QlParams,
    error::{SvdError, SvdErrorKind},
    solvers::truncate_with_params,
};
use faer::Mat;
use rayon::prelude::*;

/// Plane arrangement of a [`ChannelImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Number of colour planes, alpha excluded.
    pub fn color_planes(self) -> usize {
        match self {
            ChannelLayout::Gray | ChannelLayout::GrayAlpha => 1,
            ChannelLayout::Rgb | ChannelLayout::Rgba => 3,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ChannelLayout::GrayAlpha | ChannelLayout::Rgba)
    }
}

/// Colour planes of one image, each `height x width`, with an optional alpha plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelImage {
    layout: ChannelLayout,
    planes: Vec<Mat<f64>>,
    alpha: Option<Mat<f64>>,
}

impl ChannelImage {
    /// Groups planes under `layout`, checking plane count and that all shapes agree.
    pub fn new(
        layout: ChannelLayout,
        planes: Vec<Mat<f64>>,
        alpha: Option<Mat<f64>>,
    ) -> Result<Self, SvdError> {
        if planes.len() != layout.color_planes() {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "colour plane count",
                expected: layout.color_planes(),
                actual: planes.len(),
            }
            .into());
        }
        if alpha.is_some() != layout.has_alpha() {
            return Err(SvdErrorKind::DimensionMismatch {
                context: "alpha plane count",
                expected: usize::from(layout.has_alpha()),
                actual: usize::from(alpha.is_some()),
            }
            .into());
        }

        let expected = (planes[0].nrows(), planes[0].ncols());
        for (index, plane) in planes.iter().chain(alpha.iter()).enumerate() {
            let actual = (plane.nrows(), plane.ncols());
            if actual != expected {
                return Err(SvdErrorKind::ChannelShape {
                    index,
                    expected,
                    actual,
                }
                .into());
            }
        }

        Ok(Self {
            layout,
            planes,
            alpha,
        })
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn planes(&self) -> &[Mat<f64>] {
        &self.planes
    }

    pub fn alpha(&self) -> Option<&Mat<f64>> {
        self.alpha.as_ref()
    }

    /// Returns `(height, width)` in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.planes[0].nrows(), self.planes[0].ncols())
    }

    /// Removes `percent` percent of the rank of every colour plane. Alpha is copied as is.
    pub fn compress(&self, percent: f64, params: &QlParams) -> Result<Self, SvdError> {
        let planes = compress_channels(&self.planes, percent, params)?;
        Ok(Self {
            layout: self.layout,
            planes,
            alpha: self.alpha.clone(),
        })
    }
}

/// Truncates each channel independently and in parallel, preserving order.
///
/// # Errors
/// Returns the error of a failing channel; the other results are discarded.
pub fn compress_channels(
    channels: &[Mat<f64>],
    percent: f64,
    params: &QlParams,
) -> Result<Vec<Mat<f64>>, SvdError> {
    channels
        .par_iter()
        .enumerate()
        .map(|(index, channel)| {
            log::debug!(
                "compressing channel {index} ({}x{})",
                channel.nrows(),
                channel.ncols()
            );
            truncate_with_params(channel.as_ref(), percent, params)
        })
        .collect()
}

/// Converts a reconstructed sample to 8 bits, rounding and saturating at the range ends.
#[inline]
pub fn to_u8(sample: f64) -> u8 {
    // NaN casts to 0.
    sample.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::frobenius_distance;
    use faer::mat;

    fn plane(seed: f64) -> Mat<f64> {
        Mat::from_fn(4, 5, |i, j| ((i * 5 + j) as f64 * seed).sin() * 100.0 + 120.0)
    }

    #[test]
    fn test_to_u8_saturates() {
        assert_eq!(to_u8(-3.2), 0);
        assert_eq!(to_u8(12.4), 12);
        assert_eq!(to_u8(12.5), 13);
        assert_eq!(to_u8(254.6), 255);
        assert_eq!(to_u8(300.0), 255);
        assert_eq!(to_u8(f64::NAN), 0);
    }

    #[test]
    fn test_layout_plane_counts() {
        assert_eq!(ChannelLayout::Gray.color_planes(), 1);
        assert_eq!(ChannelLayout::Rgba.color_planes(), 3);
        assert!(ChannelLayout::GrayAlpha.has_alpha());
        assert!(!ChannelLayout::Rgb.has_alpha());
    }

    #[test]
    fn test_new_rejects_wrong_plane_count() {
        let err = ChannelImage::new(ChannelLayout::Rgb, vec![plane(1.0)], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in colour plane count: expected 3, found 1."
        );
        assert!(
            ChannelImage::new(ChannelLayout::Gray, vec![plane(1.0)], Some(plane(2.0))).is_err()
        );
    }

    #[test]
    fn test_new_rejects_mismatched_shapes() {
        let err = ChannelImage::new(
            ChannelLayout::GrayAlpha,
            vec![plane(1.0)],
            Some(Mat::zeros(5, 4)),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Channel 1 has shape (5, 4), expected (4, 5)."
        );
    }

    #[test]
    fn test_compress_keeps_alpha_untouched() {
        let alpha = plane(0.3);
        let image = ChannelImage::new(
            ChannelLayout::Rgba,
            vec![plane(1.0), plane(2.0), plane(3.0)],
            Some(alpha.clone()),
        )
        .unwrap();

        let compressed = image.compress(100.0, &QlParams::default()).unwrap();
        assert_eq!(compressed.layout(), ChannelLayout::Rgba);
        assert_eq!(compressed.alpha(), Some(&alpha));
        for p in compressed.planes() {
            assert_eq!(*p, Mat::<f64>::zeros(4, 5));
        }
    }

    #[test]
    fn test_parallel_channels_match_sequential() {
        let channels = vec![plane(1.0), plane(0.5), mat![[1.0, 2.0], [3.0, 4.0]]];
        let params = QlParams::default();
        let parallel = compress_channels(&channels, 40.0, &params).unwrap();
        for (channel, got) in channels.iter().zip(&parallel) {
            let want = truncate_with_params(channel.as_ref(), 40.0, &params).unwrap();
            assert!(frobenius_distance(got.as_ref(), want.as_ref()) < 1e-9);
        }
    }

    #[test]
    fn test_channel_error_propagates() {
        let channels = vec![plane(1.0), plane(2.0)];
        let err = compress_channels(&channels, -1.0, &QlParams::default()).unwrap_err();
        assert!(err.is_invalid_percentage());
    }
}
