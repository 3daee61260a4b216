//! ECC200 codeword placement ("utah" shapes swept diagonally across the
//! mapping matrix, with four special corner shapes)

use crate::models::{ModuleMatrix, SymbolSize};

/// Symbol positions `(row, col)` of the eight bits of one codeword, MSB first
pub type CodewordModules = [(usize, usize); 8];

struct Placer {
    size: SymbolSize,
    rows: isize,
    cols: isize,
    assigned: Vec<bool>,
    codewords: Vec<CodewordModules>,
}

impl Placer {
    fn new(size: SymbolSize) -> Self {
        let rows = size.mapping_rows() as isize;
        let cols = size.mapping_cols() as isize;
        Self {
            size,
            rows,
            cols,
            assigned: vec![false; (rows * cols) as usize],
            codewords: Vec::with_capacity(size.total_codewords()),
        }
    }

    fn is_assigned(&self, row: isize, col: isize) -> bool {
        self.assigned[(row * self.cols + col) as usize]
    }

    /// Wrap an out-of-range position back into the mapping matrix and claim it
    fn module(&mut self, mut row: isize, mut col: isize) -> (usize, usize) {
        if row < 0 {
            row += self.rows;
            col += 4 - ((self.rows + 4) % 8);
        }
        if col < 0 {
            col += self.cols;
            row += 4 - ((self.cols + 4) % 8);
        }
        self.assigned[(row * self.cols + col) as usize] = true;
        self.size.mapping_to_symbol(row as usize, col as usize)
    }

    fn place(&mut self, offsets: [(isize, isize); 8]) {
        let mut bits = [(0usize, 0usize); 8];
        for (bit, (row, col)) in bits.iter_mut().zip(offsets) {
            *bit = self.module(row, col);
        }
        self.codewords.push(bits);
    }

    fn utah(&mut self, row: isize, col: isize) {
        self.place([
            (row - 2, col - 2),
            (row - 2, col - 1),
            (row - 1, col - 2),
            (row - 1, col - 1),
            (row - 1, col),
            (row, col - 2),
            (row, col - 1),
            (row, col),
        ]);
    }

    fn corner1(&mut self) {
        let (nr, nc) = (self.rows, self.cols);
        self.place([
            (nr - 1, 0),
            (nr - 1, 1),
            (nr - 1, 2),
            (0, nc - 2),
            (0, nc - 1),
            (1, nc - 1),
            (2, nc - 1),
            (3, nc - 1),
        ]);
    }

    fn corner2(&mut self) {
        let (nr, nc) = (self.rows, self.cols);
        self.place([
            (nr - 3, 0),
            (nr - 2, 0),
            (nr - 1, 0),
            (0, nc - 4),
            (0, nc - 3),
            (0, nc - 2),
            (0, nc - 1),
            (1, nc - 1),
        ]);
    }

    fn corner3(&mut self) {
        let (nr, nc) = (self.rows, self.cols);
        self.place([
            (nr - 3, 0),
            (nr - 2, 0),
            (nr - 1, 0),
            (0, nc - 2),
            (0, nc - 1),
            (1, nc - 1),
            (2, nc - 1),
            (3, nc - 1),
        ]);
    }

    fn corner4(&mut self) {
        let (nr, nc) = (self.rows, self.cols);
        self.place([
            (nr - 1, 0),
            (nr - 1, nc - 1),
            (0, nc - 3),
            (0, nc - 2),
            (0, nc - 1),
            (1, nc - 3),
            (1, nc - 2),
            (1, nc - 1),
        ]);
    }

    fn run(mut self) -> Placement {
        let (nr, nc) = (self.rows, self.cols);
        let mut row: isize = 4;
        let mut col: isize = 0;

        loop {
            if row == nr && col == 0 {
                self.corner1();
            }
            if row == nr - 2 && col == 0 && nc % 4 != 0 {
                self.corner2();
            }
            if row == nr - 2 && col == 0 && nc % 8 == 4 {
                self.corner3();
            }
            if row == nr + 4 && col == 2 && nc % 8 == 0 {
                self.corner4();
            }

            // Sweep up and to the right
            loop {
                if row < nr && col >= 0 && !self.is_assigned(row, col) {
                    self.utah(row, col);
                }
                row -= 2;
                col += 2;
                if row < 0 || col >= nc {
                    break;
                }
            }
            row += 1;
            col += 3;

            // Sweep down and to the left
            loop {
                if row >= 0 && col < nc && !self.is_assigned(row, col) {
                    self.utah(row, col);
                }
                row += 2;
                col -= 2;
                if row >= nr || col < 0 {
                    break;
                }
            }
            row += 3;
            col += 1;

            if row >= nr && col >= nc {
                break;
            }
        }

        let spare_corner = !self.is_assigned(nr - 1, nc - 1);
        Placement {
            size: self.size,
            codewords: self.codewords,
            spare_corner,
        }
    }
}

/// Module layout of every codeword of one symbol size
#[derive(Debug, Clone)]
pub struct Placement {
    size: SymbolSize,
    codewords: Vec<CodewordModules>,
    spare_corner: bool,
}

impl Placement {
    /// Walk the placement of `size`
    pub fn for_size(size: SymbolSize) -> Self {
        Placer::new(size).run()
    }

    /// Bit positions of each codeword, in stream order
    pub fn codewords(&self) -> &[CodewordModules] {
        &self.codewords
    }

    /// Whether the bottom-right 2x2 of the mapping matrix carries no data.
    ///
    /// Writers fill it with a fixed checker (ink top-left and bottom-right).
    pub fn has_spare_corner(&self) -> bool {
        self.spare_corner
    }

    /// Read the codeword stream out of a sampled matrix
    pub fn read(&self, matrix: &ModuleMatrix) -> Vec<u8> {
        debug_assert_eq!(matrix.size(), self.size);
        self.codewords
            .iter()
            .map(|bits| {
                bits.iter()
                    .fold(0u8, |acc, &(row, col)| (acc << 1) | matrix.get(row, col) as u8)
            })
            .collect()
    }

    /// Write a codeword stream (data followed by ECC) into `matrix`
    pub fn write(&self, matrix: &mut ModuleMatrix, codewords: &[u8]) {
        debug_assert_eq!(matrix.size(), self.size);
        for (bits, &value) in self.codewords.iter().zip(codewords) {
            for (i, &(row, col)) in bits.iter().enumerate() {
                matrix.set(row, col, (value >> (7 - i)) & 1 == 1);
            }
        }
        if self.has_spare_corner() {
            let nr = self.size.mapping_rows();
            let nc = self.size.mapping_cols();
            for (row, col, ink) in [
                (nr - 2, nc - 2, true),
                (nr - 2, nc - 1, false),
                (nr - 1, nc - 2, false),
                (nr - 1, nc - 1, true),
            ] {
                let (r, c) = self.size.mapping_to_symbol(row, col);
                matrix.set(r, c, ink);
            }
        }
    }
}
