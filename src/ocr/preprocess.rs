use image::{GrayImage, Luma, RgbaImage};

/// Converts a captured RGBA frame to grayscale for OCR.
pub fn grayscale_frame(img: &RgbaImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Binarizes dark label text: pixels below the threshold become black
/// (text), everything else white (background).
///
/// Recommended thresholds:
/// - Printed labels under even light: 110
/// - Glossy labels with glare: 90
pub fn threshold_dark_text(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] < threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Full frame preparation: grayscale, plus binarization when a threshold is
/// configured.
pub fn prepare_frame(img: &RgbaImage, threshold: Option<u8>) -> GrayImage {
    let gray = grayscale_frame(img);
    match threshold {
        Some(t) => threshold_dark_text(&gray, t),
        None => gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_grayscale_dimensions_preserved() {
        let img = RgbaImage::from_pixel(8, 4, Rgba([120, 60, 200, 255]));
        let gray = grayscale_frame(&img);
        assert_eq!(gray.dimensions(), (8, 4));
    }

    #[test]
    fn test_threshold_dark_text() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([20])); // dark text
        img.put_pixel(1, 0, Luma([200])); // background
        img.put_pixel(2, 0, Luma([110])); // exactly at threshold -> background

        let result = threshold_dark_text(&img, 110);
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(1, 0)[0], 255);
        assert_eq!(result.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_prepare_frame_without_threshold_keeps_grays() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([128, 128, 128, 255]));
        let gray = prepare_frame(&img, None);
        assert!(gray.pixels().all(|p| p[0] != 0 && p[0] != 255));
    }
}
