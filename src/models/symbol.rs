/// ECC200 symbol size class.
///
/// Holds the geometry of the symbol (total modules, data region layout) and
/// its Reed-Solomon block structure. Only the 30 standard sizes exist; get
/// them through [`SymbolSize::all`], [`SymbolSize::from_dimensions`] or
/// [`SymbolSize::smallest_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolSize {
    rows: usize,
    cols: usize,
    region_rows: usize,
    region_cols: usize,
    data_codewords: usize,
    ecc_per_block: usize,
    blocks: usize,
}

/// Requested symbol shape when picking a size for a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolShape {
    /// Square symbols only (10x10 .. 144x144)
    #[default]
    Square,
    /// Rectangular symbols only (8x18 .. 16x48)
    Rectangle,
    /// Whichever is smallest
    Any,
}

const fn size(
    rows: usize,
    cols: usize,
    region_rows: usize,
    region_cols: usize,
    data_codewords: usize,
    ecc_per_block: usize,
    blocks: usize,
) -> SymbolSize {
    SymbolSize {
        rows,
        cols,
        region_rows,
        region_cols,
        data_codewords,
        ecc_per_block,
        blocks,
    }
}

/// ISO/IEC 16022 Table 7, ordered by data capacity within each shape.
static SYMBOL_SIZES: [SymbolSize; 30] = [
    size(10, 10, 8, 8, 3, 5, 1),
    size(12, 12, 10, 10, 5, 7, 1),
    size(14, 14, 12, 12, 8, 10, 1),
    size(16, 16, 14, 14, 12, 12, 1),
    size(18, 18, 16, 16, 18, 14, 1),
    size(20, 20, 18, 18, 22, 18, 1),
    size(22, 22, 20, 20, 30, 20, 1),
    size(24, 24, 22, 22, 36, 24, 1),
    size(26, 26, 24, 24, 44, 28, 1),
    size(32, 32, 14, 14, 62, 36, 1),
    size(36, 36, 16, 16, 86, 42, 1),
    size(40, 40, 18, 18, 114, 48, 1),
    size(44, 44, 20, 20, 144, 56, 1),
    size(48, 48, 22, 22, 174, 68, 1),
    size(52, 52, 24, 24, 204, 42, 2),
    size(64, 64, 14, 14, 280, 56, 2),
    size(72, 72, 16, 16, 368, 36, 4),
    size(80, 80, 18, 18, 456, 48, 4),
    size(88, 88, 20, 20, 576, 56, 4),
    size(96, 96, 22, 22, 696, 68, 4),
    size(104, 104, 24, 24, 816, 56, 6),
    size(120, 120, 18, 18, 1050, 68, 6),
    size(132, 132, 20, 20, 1304, 62, 8),
    size(144, 144, 22, 22, 1558, 62, 10),
    size(8, 18, 6, 16, 5, 7, 1),
    size(8, 32, 6, 14, 10, 11, 1),
    size(12, 26, 10, 24, 16, 14, 1),
    size(12, 36, 10, 16, 22, 18, 1),
    size(16, 36, 14, 16, 32, 24, 1),
    size(16, 48, 14, 22, 49, 28, 1),
];

impl SymbolSize {
    /// Every standard size, squares first
    pub fn all() -> &'static [SymbolSize] {
        &SYMBOL_SIZES
    }

    /// Look up the size with exactly these module dimensions
    pub fn from_dimensions(rows: usize, cols: usize) -> Option<SymbolSize> {
        SYMBOL_SIZES
            .iter()
            .copied()
            .find(|s| s.rows == rows && s.cols == cols)
    }

    /// Smallest size of the given shape holding `data_codewords`
    pub fn smallest_for(data_codewords: usize, shape: SymbolShape) -> Option<SymbolSize> {
        SYMBOL_SIZES
            .iter()
            .copied()
            .filter(|s| match shape {
                SymbolShape::Square => s.is_square(),
                SymbolShape::Rectangle => !s.is_square(),
                SymbolShape::Any => true,
            })
            .filter(|s| s.data_codewords >= data_codewords)
            .min_by_key(|s| (s.data_codewords, s.rows * s.cols))
    }

    /// Total module rows, finder pattern included
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total module columns, finder pattern included
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the symbol is square
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Data rows inside one data region
    pub fn region_rows(&self) -> usize {
        self.region_rows
    }

    /// Data columns inside one data region
    pub fn region_cols(&self) -> usize {
        self.region_cols
    }

    /// Number of data regions stacked vertically
    pub fn regions_vertical(&self) -> usize {
        self.rows / (self.region_rows + 2)
    }

    /// Number of data regions side by side
    pub fn regions_horizontal(&self) -> usize {
        self.cols / (self.region_cols + 2)
    }

    /// Rows of the mapping matrix (all data regions, patterns stripped)
    pub fn mapping_rows(&self) -> usize {
        self.region_rows * self.regions_vertical()
    }

    /// Columns of the mapping matrix
    pub fn mapping_cols(&self) -> usize {
        self.region_cols * self.regions_horizontal()
    }

    /// Data codewords carried by the symbol
    pub fn data_codewords(&self) -> usize {
        self.data_codewords
    }

    /// Error correction codewords across all blocks
    pub fn ecc_codewords(&self) -> usize {
        self.ecc_per_block * self.blocks
    }

    /// Error correction codewords per interleaved block
    pub fn ecc_per_block(&self) -> usize {
        self.ecc_per_block
    }

    /// Number of interleaved Reed-Solomon blocks
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Data plus error correction codewords
    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_codewords()
    }

    /// Codeword errors each block can correct
    pub fn correction_capacity(&self) -> usize {
        self.ecc_per_block / 2
    }

    /// Whether the module at (row, col) belongs to a finder or alignment pattern
    pub fn is_function_module(&self, row: usize, col: usize) -> bool {
        let r = row % (self.region_rows + 2);
        let c = col % (self.region_cols + 2);
        r == 0 || r == self.region_rows + 1 || c == 0 || c == self.region_cols + 1
    }

    /// Expected ink state of a function module, `None` for data modules.
    ///
    /// Each data region has a solid left column and bottom row and alternating
    /// top row and right column, with ink on even columns and odd rows.
    pub fn function_module_value(&self, row: usize, col: usize) -> Option<bool> {
        if !self.is_function_module(row, col) {
            return None;
        }
        let r = row % (self.region_rows + 2);
        let c = col % (self.region_cols + 2);
        if c == 0 || r == self.region_rows + 1 {
            Some(true)
        } else if r == 0 {
            Some(c % 2 == 0)
        } else {
            Some(r % 2 == 1)
        }
    }

    /// Symbol position of a mapping-matrix cell
    pub fn mapping_to_symbol(&self, row: usize, col: usize) -> (usize, usize) {
        (
            row + 2 * (row / self.region_rows) + 1,
            col + 2 * (col / self.region_cols) + 1,
        )
    }
}

impl std::fmt::Display for SymbolSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
