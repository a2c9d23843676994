//! Interleaved pixels to planar feature vectors.
//!
//! Classifiers trained on BGR ImageNet data expect their input as three
//! contiguous planes: every blue sample in row-major pixel order, then every
//! green sample, then every red sample. Byte values are widened to `f32` and
//! passed through untouched: no mean subtraction, no scaling to `[0, 1]`.
//! Models expecting normalized input must be given a normalization layer of
//! their own.

use std::fmt;
use std::str::FromStr;

use crate::errors::{RecognitionError, RecognitionResult};

/// Number of colour planes in a feature vector.
pub const CHANNELS: usize = 3;

/// Byte layout of a raw pixel buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PixelLayout {
    /// Interleaved blue, green, red. Three bytes per pixel.
    #[default]
    Bgr,
    /// Interleaved red, green, blue, alpha. Four bytes per pixel.
    Rgba,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Bgr => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

impl FromStr for PixelLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<PixelLayout, String> {
        match &*s.to_ascii_lowercase() {
            "bgr" => Ok(PixelLayout::Bgr),
            "rgba" => Ok(PixelLayout::Rgba),
            other => Err(format!("unknown pixel layout {other:?} (expected bgr or rgba)")),
        }
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PixelLayout::Bgr => write!(f, "bgr"),
            PixelLayout::Rgba => write!(f, "rgba"),
        }
    }
}

/// Planar B, G, R samples of a `width`x`height` image.
///
/// Always exactly `width * height * 3` values long.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl FeatureVector {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// One colour plane: 0 is blue, 1 green, 2 red.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is not below [`CHANNELS`].
    pub fn plane(&self, channel: usize) -> &[f32] {
        let pixels = self.width * self.height;
        &self.data[channel * pixels..(channel + 1) * pixels]
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

/// Bytes needed to hold a `width`x`height` image in `layout`.
pub fn required_len(width: usize, height: usize, layout: PixelLayout) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(layout.bytes_per_pixel())
}

fn check_len(
    image: &[u8],
    width: usize,
    height: usize,
    layout: PixelLayout,
) -> RecognitionResult<usize> {
    let expected = required_len(width, height, layout)
        .ok_or(RecognitionError::InvalidInput { expected: usize::MAX, actual: image.len() })?;
    if image.len() < expected {
        return Err(RecognitionError::InvalidInput { expected, actual: image.len() });
    }
    Ok(expected)
}

/// Convert an interleaved BGR buffer into a planar feature vector.
///
/// Bytes past `width * height * 3` are ignored.
pub fn extract(image: &[u8], width: usize, height: usize) -> RecognitionResult<FeatureVector> {
    let size = check_len(image, width, height, PixelLayout::Bgr)?;
    let image = &image[..size];
    let mut data = Vec::with_capacity(size);
    for c in 0..CHANNELS {
        data.extend(image.iter().skip(c).step_by(CHANNELS).map(|&v| v as f32));
    }
    debug_assert_eq!(data.len(), size);
    Ok(FeatureVector { data, width, height })
}

/// Drop the alpha channel of an RGBA buffer and reorder what is left to BGR.
pub fn rgba_to_bgr(image: &[u8], width: usize, height: usize) -> RecognitionResult<Vec<u8>> {
    let size = check_len(image, width, height, PixelLayout::Rgba)?;
    let mut bgr = Vec::with_capacity(size / 4 * 3);
    for px in image[..size].chunks_exact(4) {
        bgr.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    Ok(bgr)
}

/// [`extract`] for either supported layout.
pub fn extract_with_layout(
    image: &[u8],
    layout: PixelLayout,
    width: usize,
    height: usize,
) -> RecognitionResult<FeatureVector> {
    match layout {
        PixelLayout::Bgr => extract(image, width, height),
        PixelLayout::Rgba => extract(&rgba_to_bgr(image, width, height)?, width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn image_and_dims(bpp: usize) -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
        (1usize..12, 1usize..12)
            .prop_flat_map(move |(w, h)| (Just(w), Just(h), vec(any::<u8>(), w * h * bpp)))
    }

    proptest! {
        #[test]
        fn output_length_is_three_planes((w, h, img) in image_and_dims(3)) {
            let fv = extract(&img, w, h).unwrap();
            prop_assert_eq!(fv.len(), w * h * 3);
        }

        #[test]
        fn planar_from_interleaved((w, h, img) in image_and_dims(3)) {
            let fv = extract(&img, w, h).unwrap();
            let pixels = w * h;
            for c in 0..3 {
                for p in 0..pixels {
                    prop_assert_eq!(fv.as_slice()[c * pixels + p], img[p * 3 + c] as f32);
                }
            }
        }

        #[test]
        fn rgba_planes_match_bgr((w, h, img) in image_and_dims(4)) {
            let fv = extract_with_layout(&img, PixelLayout::Rgba, w, h).unwrap();
            let pixels = w * h;
            for p in 0..pixels {
                prop_assert_eq!(fv.plane(0)[p], img[p * 4 + 2] as f32);
                prop_assert_eq!(fv.plane(1)[p], img[p * 4 + 1] as f32);
                prop_assert_eq!(fv.plane(2)[p], img[p * 4] as f32);
            }
        }
    }

    #[test]
    fn single_pixel() {
        let fv = extract(&[10, 20, 30], 1, 1).unwrap();
        assert_eq!(fv.as_slice(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn values_are_not_normalized() {
        let fv = extract(&[255, 0, 128, 1, 2, 3], 2, 1).unwrap();
        assert_eq!(fv.into_inner(), vec![255.0, 1.0, 0.0, 2.0, 128.0, 3.0]);
    }

    #[test]
    fn short_buffer_is_invalid() {
        let err = extract(&[0; 11], 2, 2).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidInput { expected: 12, actual: 11 }));
    }

    #[test]
    fn long_buffer_is_truncated() {
        let fv = extract(&[1, 2, 3, 99, 99], 1, 1).unwrap();
        assert_eq!(fv.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn overflowing_geometry_is_invalid() {
        let err = extract(&[0; 3], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidInput { .. }));
    }

    #[test]
    fn rgba_strips_alpha() {
        let bgr = rgba_to_bgr(&[1, 2, 3, 255, 4, 5, 6, 0], 2, 1).unwrap();
        assert_eq!(bgr, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn rgba_short_buffer_is_invalid() {
        let err = rgba_to_bgr(&[1, 2, 3], 1, 1).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidInput { expected: 4, actual: 3 }));
    }

    #[test]
    #[should_panic]
    fn plane_past_red_panics() {
        let fv = extract(&[1, 2, 3], 1, 1).unwrap();
        fv.plane(CHANNELS);
    }

    #[test]
    fn layout_parsing() {
        assert_eq!("BGR".parse::<PixelLayout>(), Ok(PixelLayout::Bgr));
        assert_eq!("rgba".parse::<PixelLayout>(), Ok(PixelLayout::Rgba));
        assert!("rgb".parse::<PixelLayout>().is_err());
    }
}
