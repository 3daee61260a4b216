use super::{Point, Polarity};

/// Single-channel intensity image (0 = black, 255 = white)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IntensityGrid {
    /// Wrap row-major intensities; `None` if the length does not match
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Grid width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major samples
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Intensity at (x, y)
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Tonal inverse (`255 - v`)
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| 255 - v).collect(),
        }
    }

    /// Working copy where ink of the given polarity is bright.
    ///
    /// Dark-on-light symbols get inverted, light-on-dark ones are copied
    /// as-is, so everything downstream only ever looks for bright ink.
    pub fn ink(&self, polarity: Polarity) -> InkGrid {
        let data = match polarity {
            Polarity::DarkOnLight => self.data.iter().map(|&v| 255 - v).collect(),
            Polarity::LightOnDark => self.data.clone(),
        };
        InkGrid {
            width: self.width,
            height: self.height,
            data,
            polarity,
        }
    }
}

/// Polarity-normalized grid: high values are ink, low values background
#[derive(Debug, Clone)]
pub struct InkGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
    polarity: Polarity,
}

impl InkGrid {
    /// Grid width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major ink levels
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Polarity this grid was derived under
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Ink level at (x, y)
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Whether a continuous position lies on the grid
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f32 && p.y < self.height as f32
    }

    /// Bilinear ink level at a continuous position (pixel centers at +0.5),
    /// clamped at the borders
    pub fn sample(&self, p: &Point) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let px = (p.x - 0.5).clamp(0.0, max_x);
        let py = (p.y - 0.5).clamp(0.0, max_y);
        let x0 = px.floor() as usize;
        let y0 = py.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = px - x0 as f32;
        let fy = py - y0 as f32;

        let top = self.get(x0, y0) as f32 * (1.0 - fx) + self.get(x1, y0) as f32 * fx;
        let bottom = self.get(x0, y1) as f32 * (1.0 - fx) + self.get(x1, y1) as f32 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}
