//! Conversion between image files and [`ChannelImage`] planes.
//!
//! Decoding goes through the `image` crate. Whatever the source depth, samples are
//! brought to 8 bits per channel and stored as `f64` matrices indexed `(row, col)`,
//! i.e. `(y, x)`. Encoding rounds and saturates every sample back to `u8`.

use super::channels::{ChannelImage, ChannelLayout, to_u8};
use crate::error::SvdError;
use faer::Mat;
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, ImageFormat, Luma, LumaA, Pixel, Rgb,
    RgbImage, Rgba, RgbaImage,
};
use std::path::Path;

/// Decodes the image at `path` into channel planes.
pub fn load(path: impl AsRef<Path>) -> Result<ChannelImage, SvdError> {
    let path = path.as_ref();
    let image = image::open(path)?;
    log::debug!(
        "decoded {:?} as {:?} ({}x{})",
        path,
        image.color(),
        image.width(),
        image.height()
    );
    from_dynamic(&image)
}

/// Encodes `image` to `path`; the format is inferred from the extension.
///
/// Formats without an alpha channel (JPEG) receive the colour planes only.
pub fn save(image: &ChannelImage, path: impl AsRef<Path>) -> Result<(), SvdError> {
    let path = path.as_ref();
    let mut encoded = to_dynamic(image);
    if image.layout().has_alpha() && ImageFormat::from_path(path)? == ImageFormat::Jpeg {
        log::warn!("{path:?} cannot store alpha; writing colour planes only");
        encoded = match image.layout() {
            ChannelLayout::GrayAlpha => DynamicImage::ImageLuma8(encoded.to_luma8()),
            _ => DynamicImage::ImageRgb8(encoded.to_rgb8()),
        };
    }
    encoded.save(path)?;
    Ok(())
}

/// Splits a decoded image into planes according to its colour type.
pub fn from_dynamic(image: &DynamicImage) -> Result<ChannelImage, SvdError> {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => {
            let buf = image.to_luma8();
            ChannelImage::new(ChannelLayout::Gray, vec![plane(&buf, 0)], None)
        }
        (false, true) => {
            let buf = image.to_luma_alpha8();
            ChannelImage::new(
                ChannelLayout::GrayAlpha,
                vec![plane(&buf, 0)],
                Some(plane(&buf, 1)),
            )
        }
        (true, false) => {
            let buf = image.to_rgb8();
            ChannelImage::new(
                ChannelLayout::Rgb,
                (0..3).map(|c| plane(&buf, c)).collect(),
                None,
            )
        }
        (true, true) => {
            let buf = image.to_rgba8();
            ChannelImage::new(
                ChannelLayout::Rgba,
                (0..3).map(|c| plane(&buf, c)).collect(),
                Some(plane(&buf, 3)),
            )
        }
    }
}

/// Merges planes back into an 8-bit image.
pub fn to_dynamic(image: &ChannelImage) -> DynamicImage {
    let (height, width) = image.dimensions();
    let (w, h) = (width as u32, height as u32);
    let planes = image.planes();
    let sample = |m: &Mat<f64>, x: u32, y: u32| to_u8(m[(y as usize, x as usize)]);

    match (image.layout(), image.alpha()) {
        (ChannelLayout::Gray, _) => DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, y| {
            Luma([sample(&planes[0], x, y)])
        })),
        (ChannelLayout::GrayAlpha, Some(alpha)) => {
            DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(w, h, |x, y| {
                LumaA([sample(&planes[0], x, y), sample(alpha, x, y)])
            }))
        }
        (ChannelLayout::Rgba, Some(alpha)) => {
            DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
                Rgba([
                    sample(&planes[0], x, y),
                    sample(&planes[1], x, y),
                    sample(&planes[2], x, y),
                    sample(alpha, x, y),
                ])
            }))
        }
        // `ChannelImage::new` guarantees the alpha plane for the alpha layouts.
        (_, _) => DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            Rgb([
                sample(&planes[0], x, y),
                sample(&planes[1], x, y),
                sample(&planes[2], x, y),
            ])
        })),
    }
}

fn plane<P>(buf: &ImageBuffer<P, Vec<u8>>, channel: usize) -> Mat<f64>
where
    P: Pixel<Subpixel = u8>,
{
    Mat::from_fn(buf.height() as usize, buf.width() as usize, |row, col| {
        buf.get_pixel(col as u32, row as u32).channels()[channel] as f64
    })
}
