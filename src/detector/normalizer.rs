//! Frame normalization: raw pixels to a single-channel intensity grid

use crate::error::{Result, ScanError};
use crate::models::{Frame, IntensityGrid, PixelFormat};
use crate::utils::grayscale::{bgra_to_grayscale, rgb_to_grayscale, rgba_to_grayscale};

/// Intensity grid plus the tone of the frame border
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    /// Luma samples
    pub grid: IntensityGrid,
    /// Mean intensity of the border band, a cheap proxy for the background tone
    pub estimated_background_level: u8,
}

/// Convert a frame to intensities and estimate its background level.
///
/// Fails with [`ScanError::UnsupportedFormat`] for unknown pixel formats,
/// empty frames, and buffers whose length does not match the format.
pub fn normalize(frame: &Frame) -> Result<NormalizedFrame> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return Err(ScanError::UnsupportedFormat(format!(
            "empty frame {width}x{height}"
        )));
    }
    let expected = frame.format().buffer_len(width, height).ok_or_else(|| {
        ScanError::UnsupportedFormat(format!("cannot read {:?} pixels", frame.format()))
    })?;
    let data = frame.data();
    if data.len() != expected {
        return Err(ScanError::UnsupportedFormat(format!(
            "{:?} {width}x{height} needs {expected} bytes, got {}",
            frame.format(),
            data.len()
        )));
    }

    let luma = match frame.format() {
        PixelFormat::Gray8 => data.to_vec(),
        PixelFormat::Nv12 => data[..width * height].to_vec(),
        PixelFormat::Rgb8 => rgb_to_grayscale(data, width, height),
        PixelFormat::Rgba8 => rgba_to_grayscale(data, width, height),
        PixelFormat::Bgra8 => bgra_to_grayscale(data, width, height),
        PixelFormat::Other(code) => {
            return Err(ScanError::UnsupportedFormat(format!("fourcc {code:#010x}")));
        }
    };

    let grid = IntensityGrid::new(width, height, luma)
        .ok_or_else(|| ScanError::UnsupportedFormat("luma plane size mismatch".to_string()))?;
    let estimated_background_level = border_mean(&grid);

    Ok(NormalizedFrame {
        grid,
        estimated_background_level,
    })
}

/// Mean of the band `max(1, min(w, h) / 16)` pixels wide along the frame edge
pub fn border_mean(grid: &IntensityGrid) -> u8 {
    let (width, height) = (grid.width(), grid.height());
    let band = (width.min(height) / 16).max(1);
    let mut sum = 0u64;
    let mut count = 0u64;
    for y in 0..height {
        let in_band_row = y < band || y + band >= height;
        for x in 0..width {
            if in_band_row || x < band || x + band >= width {
                sum += grid.get(x, y) as u64;
                count += 1;
            }
        }
    }
    if count == 0 {
        return 0;
    }
    ((sum + count / 2) / count) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_gray_frame_background() {
        let mut data = vec![240u8; 64 * 64];
        for y in 16..48 {
            for x in 16..48 {
                data[y * 64 + x] = 10;
            }
        }
        let normalized = normalize(&Frame::gray(64, 64, data, Duration::ZERO)).unwrap();
        assert_eq!(normalized.estimated_background_level, 240);
        assert_eq!(normalized.grid.get(20, 20), 10);
    }

    #[test]
    fn test_rgb_and_nv12() {
        let rgb = Frame::new(2, 2, PixelFormat::Rgb8, vec![255u8; 12], Duration::ZERO);
        let normalized = normalize(&rgb).unwrap();
        assert_eq!(normalized.grid.data(), &[254, 254, 254, 254]);

        // 2x2 luma followed by one interleaved UV pair
        let nv12 = Frame::new(2, 2, PixelFormat::Nv12, vec![1, 2, 3, 4, 128, 128], Duration::ZERO);
        assert_eq!(normalize(&nv12).unwrap().grid.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_unsupported_inputs() {
        let other = Frame::new(4, 4, PixelFormat::Other(0x5659_5559), vec![0u8; 32], Duration::ZERO);
        assert!(matches!(normalize(&other), Err(ScanError::UnsupportedFormat(_))));

        let short = Frame::new(4, 4, PixelFormat::Rgb8, vec![0u8; 47], Duration::ZERO);
        assert!(matches!(normalize(&short), Err(ScanError::UnsupportedFormat(_))));

        let empty = Frame::gray(0, 4, Vec::new(), Duration::ZERO);
        assert!(matches!(normalize(&empty), Err(ScanError::UnsupportedFormat(_))));
    }
}
