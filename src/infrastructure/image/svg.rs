//! SVG rasterization.

use image::{DynamicImage, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::domain::entities::ImageSize;
use crate::domain::errors::LoadError;
use crate::domain::services::{clamp_long_side, fit_to_box};

/// Short side an SVG is rasterized at when its intrinsic size is smaller.
pub const MIN_RASTER_SIDE: u32 = 600;

/// Long side an SVG raster never exceeds.
pub const MAX_RASTER_SIDE: u32 = 4096;

/// Returns true if `url` names an `.svg` file or `bytes` start with SVG markup.
#[must_use]
pub fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    let by_extension = url
        .rsplit_once('.')
        .is_some_and(|(_, extension)| extension.eq_ignore_ascii_case("svg"));
    by_extension || sniff_markup(bytes)
}

fn sniff_markup(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Size of the raster an SVG with intrinsic size `natural` is drawn into.
#[must_use]
pub fn raster_size(natural: ImageSize) -> ImageSize {
    let scaled = if natural.width.min(natural.height) < MIN_RASTER_SIDE {
        fit_to_box(natural, ImageSize::new(MIN_RASTER_SIDE, MIN_RASTER_SIDE))
    } else {
        natural
    };
    clamp_long_side(scaled, MAX_RASTER_SIDE)
}

/// Parses and renders an SVG document.
///
/// Returns the raster and the document's intrinsic size.
///
/// # Errors
/// Returns a decode error if the document is invalid or has no usable size.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn rasterize(url: &str, bytes: &[u8]) -> Result<(DynamicImage, ImageSize), LoadError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| LoadError::decode(url, format!("failed to parse svg: {e}")))?;

    let size = tree.size();
    let (width, height) = (size.width(), size.height());
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LoadError::decode(url, "svg has no usable size"));
    }

    let natural = ImageSize::new(
        (width.ceil() as u32).max(1),
        (height.ceil() as u32).max(1),
    );
    let raster = raster_size(natural);

    let mut pixmap = tiny_skia::Pixmap::new(raster.width, raster.height)
        .ok_or_else(|| LoadError::decode(url, format!("cannot allocate {raster} svg raster")))?;
    let transform = tiny_skia::Transform::from_scale(
        raster.width as f32 / width,
        raster.height as f32 / height,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut rgba = RgbaImage::new(raster.width, raster.height);
    for (dst, src) in rgba.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }

    Ok((DynamicImage::ImageRgba8(rgba), natural))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const RED_RECT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
        <rect width="200" height="100" fill="#ff0000"/>
    </svg>"##;

    #[test_case("file:///a/logo.svg", b"" ; "extension")]
    #[test_case("file:///a/LOGO.SVG", b"" ; "upper extension")]
    #[test_case("file:///a/blob", b"  <svg xmlns='http://www.w3.org/2000/svg'/>" ; "bare root")]
    #[test_case("file:///a/blob", b"<?xml version='1.0'?>\n<svg/>" ; "xml prolog")]
    fn test_detected(url: &str, bytes: &[u8]) {
        assert!(looks_like_svg(url, bytes));
    }

    #[test_case("file:///a/photo.png", b"\x89PNG\r\n" ; "png")]
    #[test_case("file:///a/svg", b"GIF89a" ; "svg only in path")]
    #[test_case("file:///a/data.xml", b"<?xml version='1.0'?><feed/>" ; "other xml")]
    fn test_not_detected(url: &str, bytes: &[u8]) {
        assert!(!looks_like_svg(url, bytes));
    }

    #[test]
    fn test_raster_size_upscales_small_documents() {
        assert_eq!(raster_size(ImageSize::new(200, 100)), ImageSize::new(1200, 600));
        assert_eq!(raster_size(ImageSize::new(800, 900)), ImageSize::new(800, 900));
        assert_eq!(raster_size(ImageSize::new(10, 1000)), ImageSize::new(41, 4096));
    }

    #[test]
    fn test_rasterize_renders_content() {
        let (image, natural) = rasterize("file:///r.svg", RED_RECT.as_bytes()).unwrap();

        assert_eq!(natural, ImageSize::new(200, 100));
        assert_eq!((image.width(), image.height()), (1200, 600));
        let center = image.to_rgba8().get_pixel(600, 300).0;
        assert_eq!(center, [255, 0, 0, 255]);
    }

    #[test]
    fn test_view_box_only_document() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 20"/>"#;

        let (image, natural) = rasterize("file:///v.svg", svg.as_bytes()).unwrap();

        assert_eq!(natural, ImageSize::new(10, 20));
        assert_eq!((image.width(), image.height()), (600, 1200));
    }

    #[test]
    fn test_invalid_document_is_decode_error() {
        let err = rasterize("file:///bad.svg", b"<svg><unclosed").unwrap_err();
        assert!(err.is_decode());
    }
}
