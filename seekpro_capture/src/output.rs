use std::error::Error;
use std::path::Path;

use image::GrayImage;
use seekpro::Image;
use simple_error::SimpleError;

/// Stretch the image's value range onto 0..=255.
///
/// A flat image maps to all zeros.
pub fn rescale(image: &Image<i32>) -> Vec<u8> {
    let data = image.data();
    let (min, max) = data
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if max <= min {
        return vec![0; data.len()];
    }

    let span = (max as i64 - min as i64) as f64;
    data.iter()
        .map(|&v| ((v as i64 - min as i64) as f64 / span * 255.0) as u8)
        .collect()
}

/// Write a rescaled 8-bit grayscale PNG of `image` to `path`.
pub fn write_png(path: &Path, image: &Image<i32>) -> Result<(), Box<dyn Error>> {
    let width = image.width() as u32;
    let height = image.height() as u32;

    let gray = GrayImage::from_raw(width, height, rescale(image))
        .ok_or_else(|| SimpleError::new(format!("buffer does not fit {}x{}", width, height)))?;

    gray.save(path)?;
    Ok(())
}
