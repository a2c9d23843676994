//! Decoding image files into raw pixel buffers of the size a model expects.

use std::path::Path;

use image::imageops::FilterType;

use crate::errors::{RecognitionError, RecognitionResult};
use crate::features::PixelLayout;

fn open(path: &Path, width: usize, height: usize) -> RecognitionResult<image::DynamicImage> {
    if !path.exists() {
        return Err(RecognitionError::ImageNotFound(path.to_owned()));
    }
    let image = image::open(path)
        .map_err(|e| RecognitionError::Image { path: path.to_owned(), reason: e.to_string() })?;
    let (w, h) = dims(path, width, height)?;
    trace!("{:?}: {}x{} resized to {}x{}", path, image.width(), image.height(), w, h);
    Ok(image.resize_exact(w, h, FilterType::Triangle))
}

fn dims(path: &Path, width: usize, height: usize) -> RecognitionResult<(u32, u32)> {
    let cvt = |v: usize| {
        u32::try_from(v).map_err(|_| RecognitionError::Image {
            path: path.to_owned(),
            reason: format!("target dimension {v} too large"),
        })
    };
    Ok((cvt(width)?, cvt(height)?))
}

/// Interleaved BGR bytes, `width * height * 3` long.
pub fn load_bgr(path: impl AsRef<Path>, width: usize, height: usize) -> RecognitionResult<Vec<u8>> {
    let mut pixels = open(path.as_ref(), width, height)?.to_rgb8().into_raw();
    for px in pixels.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    Ok(pixels)
}

/// Interleaved RGBA bytes, `width * height * 4` long.
pub fn load_rgba(path: impl AsRef<Path>, width: usize, height: usize) -> RecognitionResult<Vec<u8>> {
    Ok(open(path.as_ref(), width, height)?.to_rgba8().into_raw())
}

pub fn load(
    path: impl AsRef<Path>,
    layout: PixelLayout,
    width: usize,
    height: usize,
) -> RecognitionResult<Vec<u8>> {
    match layout {
        PixelLayout::Bgr => load_bgr(path, width, height),
        PixelLayout::Rgba => load_rgba(path, width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(dir: &Path, name: &str, rgb: [u8; 3]) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(8, 6, Rgb(rgb)).save(&path).unwrap();
        path
    }

    #[test]
    fn bgr_is_resized_and_swapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = solid(dir.path(), "red.png", [200, 10, 0]);
        let bgr = load_bgr(&path, 4, 4).unwrap();
        assert_eq!(bgr.len(), 4 * 4 * 3);
        assert_eq!(&bgr[..3], &[0, 10, 200]);
    }

    #[test]
    fn rgba_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = solid(dir.path(), "red.png", [200, 10, 0]);
        let rgba = load(&path, PixelLayout::Rgba, 3, 2).unwrap();
        assert_eq!(rgba.len(), 3 * 2 * 4);
        assert_eq!(&rgba[..4], &[200, 10, 0, 255]);
    }

    #[test]
    fn missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bgr(dir.path().join("timber-wolf.jpg"), 4, 4).unwrap_err();
        assert!(matches!(err, RecognitionError::ImageNotFound(_)));
    }

    #[test]
    fn garbage_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = load_bgr(&path, 4, 4).unwrap_err();
        assert!(matches!(err, RecognitionError::Image { .. }));
    }
}
