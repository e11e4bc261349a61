//! Output dimensions for a thumbnail rendered into a target box.

use crate::domain::entities::ImageSize;

/// Computes thumbnail dimensions for `source` fitted to `target`.
///
/// Landscape sources are fitted by height and portrait or square sources by
/// width, with the other side following the source aspect ratio. Results
/// are rounded to the nearest pixel and never drop below 1.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fit_to_box(source: ImageSize, target: ImageSize) -> ImageSize {
    let aspect = source.aspect_ratio();

    let (width, height) = if aspect > 1.0 {
        let height = f64::from(target.height);
        (height * aspect, height)
    } else {
        let width = f64::from(target.width);
        (width, width / aspect)
    };

    ImageSize::new(to_pixels(width), to_pixels(height))
}

/// Shrinks `size` so neither side exceeds `max_side`, keeping the aspect ratio.
///
/// The long side becomes exactly `max_side`; the short side is rounded and
/// never drops below 1.
#[must_use]
pub fn clamp_long_side(size: ImageSize, max_side: u32) -> ImageSize {
    let long = size.width.max(size.height);
    if long <= max_side {
        return size;
    }

    let scale = |side: u32| to_pixels(f64::from(side) * f64::from(max_side) / f64::from(long));
    if size.width >= size.height {
        ImageSize::new(max_side, scale(size.height).min(max_side))
    } else {
        ImageSize::new(scale(size.width).min(max_side), max_side)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f64) -> u32 {
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_fits_height() {
        let out = fit_to_box(ImageSize::new(4000, 2000), ImageSize::new(150, 150));
        assert_eq!(out, ImageSize::new(300, 150));
    }

    #[test]
    fn test_portrait_fits_width() {
        let out = fit_to_box(ImageSize::new(1000, 3000), ImageSize::new(300, 300));
        assert_eq!(out, ImageSize::new(300, 900));
    }

    #[test]
    fn test_square_fits_width() {
        let out = fit_to_box(ImageSize::new(512, 512), ImageSize::new(600, 600));
        assert_eq!(out, ImageSize::new(600, 600));
    }

    #[test]
    fn test_aspect_preserved_within_rounding() {
        let source = ImageSize::new(1234, 567);
        let out = fit_to_box(source, ImageSize::new(150, 150));

        assert_eq!(out.height, 150);
        let expected = f64::from(out.height) * source.aspect_ratio();
        assert!((f64::from(out.width) - expected).abs() <= 0.5);
    }

    #[test]
    fn test_extreme_aspect_never_collapses() {
        let out = fit_to_box(ImageSize::new(1, 10_000), ImageSize::new(150, 150));
        assert_eq!(out.width, 150);
        assert_eq!(out.height, 1_500_000);

        let out = fit_to_box(ImageSize::new(10_000, 1), ImageSize::new(150, 150));
        assert_eq!(out.height, 150);
        assert!(out.width >= 1);
    }

    #[test]
    fn test_clamp_keeps_small_sizes() {
        let size = ImageSize::new(300, 150);
        assert_eq!(clamp_long_side(size, 2400), size);
    }

    #[test]
    fn test_clamp_scales_tall_size() {
        let out = clamp_long_side(ImageSize::new(600, 90_000), 9600);
        assert_eq!(out, ImageSize::new(64, 9600));
    }

    #[test]
    fn test_clamp_scales_wide_size() {
        let out = clamp_long_side(ImageSize::new(45_000, 300), 4800);
        assert_eq!(out, ImageSize::new(4800, 32));
    }

    #[test]
    fn test_clamp_short_side_never_collapses() {
        let out = clamp_long_side(ImageSize::new(600, 6_000_000), 9600);
        assert_eq!(out, ImageSize::new(1, 9600));
    }
}
