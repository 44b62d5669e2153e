//! Color mode conversion

use image::{DynamicImage, Rgba, RgbaImage};

use crate::service::ColorMode;

/// Total ink coverage allowed in the CMYK pass, in percent
pub const TOTAL_INK_LIMIT: f32 = 260.0;

pub fn apply_color_mode(image: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::Rgb => image,
        ColorMode::Grayscale => image.grayscale(),
        ColorMode::Cmyk => approximate_cmyk(&image),
    }
}

/// Approximate print colorspace: separate into 8-bit CMYK, cap total ink,
/// project back to RGB. The encoders have no CMYK output, so this only shifts
/// colors the way a naive press conversion would.
pub fn approximate_cmyk(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let output = RgbaImage::from_fn(width, height, |x, y| {
        let p = rgba.get_pixel(x, y);
        let [c, m, y_, k] = rgb_to_cmyk(p[0], p[1], p[2]);
        let [r, g, b] = cmyk_to_rgb(c, m, y_, k);
        Rgba([r, g, b, p[3]])
    });

    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(output)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(output).to_rgb8())
    }
}

/// Naive separation with 8-bit ink channels and total-ink limiting
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> [u8; 4] {
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let k = 1.0 - r.max(g).max(b);

    if k >= 1.0 {
        return [0, 0, 0, 255];
    }

    let mut c = (1.0 - r - k) / (1.0 - k);
    let mut m = (1.0 - g - k) / (1.0 - k);
    let mut y = (1.0 - b - k) / (1.0 - k);

    let total = (c + m + y + k) * 100.0;
    if total > TOTAL_INK_LIMIT {
        let room = (TOTAL_INK_LIMIT / 100.0 - k).max(0.0);
        let scale = room / (c + m + y);
        c *= scale;
        m *= scale;
        y *= scale;
    }

    let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [quantize(c), quantize(m), quantize(y), quantize(k)]
}

pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = k as f32 / 255.0;
    let channel = |v: u8| (255.0 * (1.0 - v as f32 / 255.0) * (1.0 - k)).round() as u8;
    [channel(c), channel(m), channel(y)]
}
