use super::{BitMatrix, SymbolSize};

/// Sampled module grid of one complete symbol (finder pattern included).
///
/// `true` means the module carries ink. Dimensions always match a standard
/// [`SymbolSize`], which is what makes the type safe to hand to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: SymbolSize,
    modules: BitMatrix,
}

impl ModuleMatrix {
    /// Blank matrix with only the finder and alignment patterns drawn
    pub fn with_finder_pattern(size: SymbolSize) -> Self {
        let mut modules = BitMatrix::new(size.cols(), size.rows());
        for row in 0..size.rows() {
            for col in 0..size.cols() {
                if let Some(true) = size.function_module_value(row, col) {
                    modules.set(col, row, true);
                }
            }
        }
        Self { size, modules }
    }

    /// Wrap a bit matrix; `None` unless its dimensions are a standard size
    pub fn from_bits(modules: BitMatrix) -> Option<Self> {
        let size = SymbolSize::from_dimensions(modules.height(), modules.width())?;
        Some(Self { size, modules })
    }

    /// Symbol size class
    pub fn size(&self) -> SymbolSize {
        self.size
    }

    /// Module value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.modules.get(col, row)
    }

    /// Set module at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.modules.set(col, row, value);
    }

    /// Flip module at (row, col)
    pub fn toggle(&mut self, row: usize, col: usize) {
        self.modules.toggle(col, row);
    }

    /// Fraction of function-pattern modules holding their expected value
    pub fn finder_pattern_agreement(&self) -> f32 {
        let mut total = 0usize;
        let mut matching = 0usize;
        for row in 0..self.size.rows() {
            for col in 0..self.size.cols() {
                if let Some(expected) = self.size.function_module_value(row, col) {
                    total += 1;
                    if self.get(row, col) == expected {
                        matching += 1;
                    }
                }
            }
        }
        if total == 0 {
            return 0.0;
        }
        matching as f32 / total as f32
    }
}
