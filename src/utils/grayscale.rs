//! Color to intensity conversion
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Frames at or above `PARALLEL_MIN_PIXELS` are converted row-parallel with
//! rayon; smaller ones stay on the calling thread.

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Below this many pixels, thread hand-off costs more than it saves
const PARALLEL_MIN_PIXELS: usize = 640 * 480;

/// Byte positions of the color channels inside one packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Bytes per pixel
    pub stride: usize,
    /// Offset of red
    pub r: usize,
    /// Offset of green
    pub g: usize,
    /// Offset of blue
    pub b: usize,
}

impl ChannelLayout {
    /// Packed R, G, B
    pub const RGB: Self = Self {
        stride: 3,
        r: 0,
        g: 1,
        b: 2,
    };
    /// Packed R, G, B, A
    pub const RGBA: Self = Self {
        stride: 4,
        r: 0,
        g: 1,
        b: 2,
    };
    /// Packed B, G, R, A
    pub const BGRA: Self = Self {
        stride: 4,
        r: 2,
        g: 1,
        b: 0,
    };
}

#[inline]
fn luma(px: &[u8], layout: ChannelLayout) -> u8 {
    let lum = (COEF_R * px[layout.r] as u32 + COEF_G * px[layout.g] as u32 + COEF_B * px[layout.b] as u32)
        >> 8;
    lum.min(255) as u8
}

fn convert_row(src: &[u8], dst: &mut [u8], layout: ChannelLayout) {
    for (out, px) in dst.iter_mut().zip(src.chunks_exact(layout.stride)) {
        *out = luma(px, layout);
    }
}

/// Convert a packed color image to intensities.
///
/// `pixels` must hold at least `width * height * layout.stride` bytes.
pub fn to_grayscale(pixels: &[u8], width: usize, height: usize, layout: ChannelLayout) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return gray;
    }
    let row_bytes = width * layout.stride;
    if width * height >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width)
            .zip(pixels.par_chunks(row_bytes))
            .for_each(|(dst, src)| convert_row(src, dst, layout));
    } else {
        for (dst, src) in gray.chunks_mut(width).zip(pixels.chunks(row_bytes)) {
            convert_row(src, dst, layout);
        }
    }
    gray
}

/// Convert RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgb, width, height, ChannelLayout::RGB)
}

/// Convert RGBA image to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgba, width, height, ChannelLayout::RGBA)
}

/// Convert BGRA image to grayscale (ignores alpha channel)
pub fn bgra_to_grayscale(bgra: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(bgra, width, height, ChannelLayout::BGRA)
}
