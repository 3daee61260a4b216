use std::sync::Arc;
use std::time::Duration;

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One luma byte per pixel
    Gray8,
    /// Packed R, G, B
    Rgb8,
    /// Packed R, G, B, A
    Rgba8,
    /// Packed B, G, R, A (the usual camera preview layout)
    Bgra8,
    /// Bi-planar YUV 4:2:0; only the full-resolution luma plane is read
    Nv12,
    /// Anything else, identified by its FourCC code
    Other(u32),
}

impl PixelFormat {
    /// Bytes the buffer must hold for a `width x height` frame, `None` if
    /// the format cannot be interpreted
    pub fn buffer_len(&self, width: usize, height: usize) -> Option<usize> {
        let pixels = width.checked_mul(height)?;
        match self {
            PixelFormat::Gray8 => Some(pixels),
            PixelFormat::Rgb8 => pixels.checked_mul(3),
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => pixels.checked_mul(4),
            PixelFormat::Nv12 => {
                let chroma = width.div_ceil(2) * height.div_ceil(2) * 2;
                pixels.checked_add(chroma)
            }
            PixelFormat::Other(_) => None,
        }
    }
}

/// One captured still image.
///
/// The pixel buffer is shared (`Arc`) so a frame source can hand the same
/// capture to several consumers without copying; the pipeline never
/// mutates it.
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Arc<[u8]>,
    timestamp: Duration,
}

impl Frame {
    /// Wrap a raw buffer. Layout is validated when the frame is normalized.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
        timestamp: Duration,
    ) -> Self {
        Self {
            width,
            height,
            format,
            data: data.into(),
            timestamp,
        }
    }

    /// Single-channel frame
    pub fn gray(width: usize, height: usize, data: Vec<u8>, timestamp: Duration) -> Self {
        Self::new(width, height, PixelFormat::Gray8, data, timestamp)
    }

    /// Convert a decoded image file into a frame, keeping its channel layout
    /// where it maps onto a supported format
    pub fn from_image(image: &image::DynamicImage, timestamp: Duration) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        match image {
            image::DynamicImage::ImageLuma8(gray) => {
                Self::gray(width, height, gray.as_raw().clone(), timestamp)
            }
            image::DynamicImage::ImageRgba8(rgba) => Self::new(
                width,
                height,
                PixelFormat::Rgba8,
                rgba.as_raw().clone(),
                timestamp,
            ),
            other => Self::new(
                width,
                height,
                PixelFormat::Rgb8,
                other.to_rgb8().into_raw(),
                timestamp,
            ),
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Buffer layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Capture time relative to the start of the stream
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}
