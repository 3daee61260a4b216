//! ECC200 symbol generator
//!
//! Encodes bytes in ASCII encodation (digit pairs, upper shift, FNC1 for
//! 0x1D), adds Reed-Solomon blocks, places the codewords and draws the
//! finder pattern. [`render`] turns a module matrix into a grayscale
//! [`Frame`] in either polarity. Used for fixtures, benches and the CLI.

use std::time::Duration;

use tracing::trace;

use crate::decoder::blocks::{block_data_len, interleave, Block};
use crate::decoder::placement::Placement;
use crate::decoder::reed_solomon::ReedSolomonEncoder;
use crate::error::EncodeError;
use crate::models::{Frame, ModuleMatrix, Polarity, SymbolShape, SymbolSize};

const PAD: u8 = 129;
const FNC1: u8 = 232;
const UPPER_SHIFT: u8 = 235;

/// ASCII encodation of `data`.
///
/// Consecutive digits pack two per codeword and 0x1D becomes FNC1, so a
/// leading 0x1D marks the symbol as GS1.
pub fn encode_ascii(data: &[u8]) -> Vec<u8> {
    let mut codewords = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        match data.get(i + 1) {
            Some(&next) if b.is_ascii_digit() && next.is_ascii_digit() => {
                codewords.push(130 + (b - b'0') * 10 + (next - b'0'));
                i += 2;
                continue;
            }
            _ => {}
        }
        if b == 0x1D {
            codewords.push(FNC1);
        } else if b < 128 {
            codewords.push(b + 1);
        } else {
            codewords.push(UPPER_SHIFT);
            codewords.push(b - 127);
        }
        i += 1;
    }
    codewords
}

/// Fill `codewords` up to `capacity` with pad codewords.
///
/// The first pad is plain 129, later ones are 253-state randomized by their
/// 1-based position.
pub fn pad_codewords(codewords: &mut Vec<u8>, capacity: usize) {
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        let position = codewords.len() + 1;
        let mut value = PAD as usize + ((149 * position) % 253) + 1;
        if value > 254 {
            value -= 254;
        }
        codewords.push(value as u8);
    }
}

/// Data codewords of `size` followed by interleaved ECC, in symbol order
pub fn symbol_codewords(data: &[u8], size: SymbolSize) -> Vec<u8> {
    let count = size.blocks();
    let encoder = ReedSolomonEncoder::new(size.ecc_per_block());
    let blocks: Vec<Block> = (0..count)
        .map(|b| {
            let num_data = block_data_len(size, b);
            let mut codewords: Vec<u8> = data.iter().skip(b).step_by(count).copied().collect();
            codewords.extend(encoder.ecc(&codewords));
            Block {
                codewords,
                num_data,
            }
        })
        .collect();
    interleave(size, &blocks)
}

/// Encode `data` into the smallest symbol of the requested shape
pub fn encode(data: &[u8], shape: SymbolShape) -> Result<ModuleMatrix, EncodeError> {
    let codewords = encode_ascii(data);
    let size = SymbolSize::smallest_for(codewords.len(), shape).ok_or(EncodeError::TooLong {
        codewords: codewords.len(),
    })?;
    Ok(build(codewords, size))
}

/// Encode `data` into a specific symbol size
pub fn encode_with_size(data: &[u8], size: SymbolSize) -> Result<ModuleMatrix, EncodeError> {
    let codewords = encode_ascii(data);
    if codewords.len() > size.data_codewords() {
        return Err(EncodeError::TooLong {
            codewords: codewords.len(),
        });
    }
    Ok(build(codewords, size))
}

fn build(mut codewords: Vec<u8>, size: SymbolSize) -> ModuleMatrix {
    let used = codewords.len();
    pad_codewords(&mut codewords, size.data_codewords());
    let stream = symbol_codewords(&codewords, size);

    let mut matrix = ModuleMatrix::with_finder_pattern(size);
    Placement::for_size(size).write(&mut matrix, &stream);
    trace!(symbol = %size, used, capacity = size.data_codewords(), "encoded symbol");
    matrix
}

/// How to draw a module matrix into a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixels per module edge
    pub module_px: usize,
    /// Quiet zone around the symbol, in modules
    pub quiet_zone: usize,
    /// Which tone the modules get
    pub polarity: Polarity,
    /// Gray level of dark pixels
    pub dark: u8,
    /// Gray level of light pixels
    pub light: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_px: 6,
            quiet_zone: 2,
            polarity: Polarity::DarkOnLight,
            dark: 20,
            light: 235,
        }
    }
}

impl RenderOptions {
    /// Set the tone of the marks
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set the side of one module in pixels
    pub fn with_module_px(mut self, module_px: usize) -> Self {
        self.module_px = module_px;
        self
    }
}

/// Draw `matrix` as an axis-aligned Gray8 frame.
///
/// With `dark + light == 255` the two polarities are exact tonal inverses
/// of each other.
pub fn render(matrix: &ModuleMatrix, options: &RenderOptions) -> Result<Frame, EncodeError> {
    if options.module_px == 0 {
        return Err(EncodeError::InvalidRender("module_px must be positive".to_string()));
    }
    if options.dark >= options.light {
        return Err(EncodeError::InvalidRender(format!(
            "dark level {} is not below light level {}",
            options.dark, options.light
        )));
    }
    let size = matrix.size();
    let px = options.module_px;
    let width = (size.cols() + 2 * options.quiet_zone) * px;
    let height = (size.rows() + 2 * options.quiet_zone) * px;

    let (ink, background) = match options.polarity {
        Polarity::DarkOnLight => (options.dark, options.light),
        Polarity::LightOnDark => (options.light, options.dark),
    };
    let mut data = vec![background; width * height];
    for row in 0..size.rows() {
        for col in 0..size.cols() {
            if !matrix.get(row, col) {
                continue;
            }
            let x0 = (col + options.quiet_zone) * px;
            let y0 = (row + options.quiet_zone) * px;
            for y in y0..y0 + px {
                data[y * width + x0..y * width + x0 + px].fill(ink);
            }
        }
    }
    Ok(Frame::gray(width, height, data, Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelFormat;

    #[test]
    fn test_encode_ascii() {
        assert_eq!(encode_ascii(b"12345"), vec![142, 164, 54]);
        assert_eq!(encode_ascii(b"A"), vec![66]);
        assert_eq!(encode_ascii(b"\x1D01"), vec![232, 131]);
        assert_eq!(encode_ascii(&[0xE9]), vec![235, 106]);
        assert_eq!(encode_ascii(b"1A"), vec![50, 66]);
    }

    #[test]
    fn test_pad_sequence() {
        let mut codewords = vec![66];
        pad_codewords(&mut codewords, 5);
        // Position 3: 129 + (447 % 253) + 1 = 324 - 254 = 70
        assert_eq!(codewords[1], 129);
        assert_eq!(codewords[2], 70);
        assert_eq!(codewords.len(), 5);
    }

    #[test]
    fn test_iso_example_stream() {
        // "123456" in 10x10
        let data = encode_ascii(b"123456");
        let size = SymbolSize::from_dimensions(10, 10).unwrap();
        assert_eq!(
            symbol_codewords(&data, size),
            vec![142, 164, 186, 114, 25, 5, 88, 102]
        );
    }

    #[test]
    fn test_too_long() {
        let data = vec![b'A'; 1600];
        assert_eq!(
            encode(&data, SymbolShape::Square),
            Err(EncodeError::TooLong { codewords: 1600 })
        );
        let small = SymbolSize::from_dimensions(10, 10).unwrap();
        assert!(encode_with_size(b"ABCD", small).is_err());
    }

    #[test]
    fn test_render_polarities_are_inverse() {
        let matrix = encode(b"HELLO", SymbolShape::Square).unwrap();
        let options = RenderOptions::default();
        let light = render(&matrix, &options).unwrap();
        let dark = render(&matrix, &options.with_polarity(Polarity::LightOnDark)).unwrap();
        assert_eq!(light.format(), PixelFormat::Gray8);
        assert_eq!(light.width(), (matrix.size().cols() + 4) * 6);
        assert!(light
            .data()
            .iter()
            .zip(dark.data())
            .all(|(&a, &b)| a as u16 + b as u16 == 255));
    }

    #[test]
    fn test_invalid_render_options() {
        let matrix = encode(b"1", SymbolShape::Square).unwrap();
        let options = RenderOptions::default().with_module_px(0);
        assert!(matches!(render(&matrix, &options), Err(EncodeError::InvalidRender(_))));
    }
}
