//! Decoding image files to f32 intensity and writing 8-bit grayscale exports.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, ImageReader, Luma};

use super::{CorrectedImage, Image, ImageLoadError};

/// ITU-R 601-2 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Load an image file as single-channel f32 intensity.
///
/// 8-bit and 16-bit grayscale files keep their stored values. Any other layout
/// is reduced to 8-bit RGB and converted with ITU-R 601-2 luma weights; alpha
/// is dropped.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image, ImageLoadError> {
    let path = path.as_ref();

    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| ImageLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let image = from_dynamic(decoded);
    log::debug!("Loaded {} image from {}", image.dimensions(), path.display());
    Ok(image)
}

pub(crate) fn from_dynamic(decoded: DynamicImage) -> Image {
    let width = decoded.width() as usize;
    let height = decoded.height() as usize;

    let pixels: Vec<f32> = match decoded {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        other => other
            .into_rgb8()
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                r as f32 * LUMA_R + g as f32 * LUMA_G + b as f32 * LUMA_B
            })
            .collect(),
    };

    Image::new(width, height, pixels)
}

/// Write the corrected image as 8-bit grayscale.
///
/// The format follows the file extension. A path without extension gets
/// `.png` appended. Returns the path actually written.
pub fn save_corrected<P: AsRef<Path>>(
    image: &CorrectedImage,
    path: P,
) -> Result<PathBuf, ImageLoadError> {
    let data = &image.data;
    let gray: GrayImage = ImageBuffer::from_fn(data.width() as u32, data.height() as u32, |x, y| {
        Luma([data[(x as usize, y as usize)]])
    });
    write_gray(&gray, path.as_ref())
}

/// Write an f32 image (e.g. a generated calibration frame) as 8-bit grayscale.
///
/// Samples are clamped to 0-255 and truncated.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> Result<PathBuf, ImageLoadError> {
    save_corrected(&image.to_u8(), path)
}

fn write_gray(gray: &GrayImage, path: &Path) -> Result<PathBuf, ImageLoadError> {
    let path = if path.extension().is_none() {
        path.with_extension("png")
    } else {
        path.to_path_buf()
    };

    let format =
        ImageFormat::from_path(&path).map_err(|_| ImageLoadError::UnsupportedFormat {
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;

    gray.save_with_format(&path, format)
        .map_err(|source| ImageLoadError::Encode {
            path: path.clone(),
            source,
        })?;

    log::info!(
        "Saved {}x{} grayscale image to {}",
        gray.width(),
        gray.height(),
        path.display()
    );
    Ok(path)
}
