use std::io::{self, Write};

use image::RgbImage;

use crate::color::Color;

/// Floating-point accumulation image, row-writable.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCl {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

impl ImageCl {
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        ImageCl {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    pub fn set_row(&mut self, y: usize, row: &[Color]) {
        if y >= self.height {
            return;
        }
        for (i, c) in row.iter().take(self.width).enumerate() {
            self.data[y * self.width + i] = *c;
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        self.data[y * self.width + x]
    }

    /// Quantize to 8-bit RGB: `round(clamp(c, 0, 1) * 255)` per channel.
    pub fn to_rgb8(&self) -> RgbImage {
        let quant = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        let mut img = RgbImage::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let c = self.get_pixel(x as usize, y as usize);
            *pixel = image::Rgb([quant(c.x), quant(c.y), quant(c.z)]);
        }
        img
    }
}

/// Write a binary portable pixmap: `P6\n<w> <h>\n255\n` followed by raw RGB
/// bytes in scanline order, top row first.
pub fn write_pnm(img: &RgbImage, sink: &mut impl Write) -> io::Result<()> {
    write!(sink, "P6\n{} {}\n255\n", img.width(), img.height())?;
    sink.write_all(img.as_raw())
}

/// FNV-1a hash over the raw pixel bytes, for cheap determinism checks.
pub fn image_hash(img: &RgbImage) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in img.as_raw() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}
