//! Connected components of the binarized ink mask
//! Finds 8-connected ink regions and keeps their outline for shape analysis

use crate::models::{BitMatrix, Point};

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of the set holding `x`
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// One connected ink region
#[derive(Debug, Clone)]
pub struct Component {
    /// Number of ink pixels
    pub pixel_count: usize,
    /// Bounding box, inclusive: (min_x, min_y, max_x, max_y)
    pub bbox: (usize, usize, usize, usize),
    /// Ink pixels with at least one 4-neighbour outside the region
    pub boundary: Vec<(usize, usize)>,
}

impl Component {
    /// Bounding box width in pixels
    pub fn width(&self) -> usize {
        self.bbox.2 - self.bbox.0 + 1
    }

    /// Bounding box height in pixels
    pub fn height(&self) -> usize {
        self.bbox.3 - self.bbox.1 + 1
    }

    /// Outer pixel corners of the boundary pixels, the input for hull fitting
    pub fn outline_points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.boundary.len() * 4);
        for &(x, y) in &self.boundary {
            let (x, y) = (x as f32, y as f32);
            points.push(Point::new(x, y));
            points.push(Point::new(x + 1.0, y));
            points.push(Point::new(x, y + 1.0));
            points.push(Point::new(x + 1.0, y + 1.0));
        }
        points
    }
}

/// Label 8-connected ink regions, keeping those with at least `min_pixels`
/// pixels. Output is ordered by first pixel in raster order.
pub fn find_components(matrix: &BitMatrix, min_pixels: usize) -> Vec<Component> {
    let width = matrix.width();
    let height = matrix.height();

    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    let mut uf = UnionFind::new(width * height + 1);

    // First pass: provisional labels, merging equivalent ones
    for y in 0..height {
        for x in 0..width {
            if !matrix.get(x, y) {
                continue;
            }

            let mut neighbors = [0u32; 4];
            let mut found = 0;
            let mut push = |label: u32| {
                neighbors[found] = label;
                found += 1;
            };

            if x > 0 && matrix.get(x - 1, y) {
                push(labels[y * width + x - 1]);
            }
            if y > 0 {
                let above = (y - 1) * width;
                if matrix.get(x, y - 1) {
                    push(labels[above + x]);
                }
                if x > 0 && matrix.get(x - 1, y - 1) {
                    push(labels[above + x - 1]);
                }
                if x + 1 < width && matrix.get(x + 1, y - 1) {
                    push(labels[above + x + 1]);
                }
            }

            let idx = y * width + x;
            match neighbors[..found].iter().copied().min() {
                None => {
                    labels[idx] = next_label;
                    next_label += 1;
                }
                Some(min_label) => {
                    labels[idx] = min_label;
                    for &l in &neighbors[..found] {
                        if l != min_label {
                            uf.union(min_label, l);
                        }
                    }
                }
            }
        }
    }

    // Second pass: gather statistics per root label
    let mut slot_of_root: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
    let mut components: Vec<Component> = Vec::new();
    let is_ink = |x: isize, y: isize| {
        x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
            && matrix.get(x as usize, y as usize)
    };

    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                components.push(Component {
                    pixel_count: 0,
                    bbox: (x, y, x, y),
                    boundary: Vec::new(),
                });
                components.len() - 1
            });

            let component = &mut components[slot];
            component.pixel_count += 1;
            component.bbox.0 = component.bbox.0.min(x);
            component.bbox.1 = component.bbox.1.min(y);
            component.bbox.2 = component.bbox.2.max(x);
            component.bbox.3 = component.bbox.3.max(y);

            let (xi, yi) = (x as isize, y as isize);
            if !is_ink(xi - 1, yi) || !is_ink(xi + 1, yi) || !is_ink(xi, yi - 1) || !is_ink(xi, yi + 1)
            {
                component.boundary.push((x, y));
            }
        }
    }

    components.retain(|c| c.pixel_count >= min_pixels);
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_components() {
        let mut matrix = BitMatrix::new(10, 10);
        // 2x2 square at (2,2)
        matrix.set(2, 2, true);
        matrix.set(3, 2, true);
        matrix.set(2, 3, true);
        matrix.set(3, 3, true);

        let regions = find_components(&matrix, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, (2, 2, 3, 3));
        assert_eq!(regions[0].pixel_count, 4);
        assert_eq!(regions[0].boundary.len(), 4);
    }

    #[test]
    fn test_diagonal_pixels_join() {
        let mut matrix = BitMatrix::new(6, 6);
        matrix.set(1, 1, true);
        matrix.set(2, 2, true);
        matrix.set(3, 1, true);
        matrix.set(5, 5, true);

        let regions = find_components(&matrix, 1);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].pixel_count, 3);
        assert!(find_components(&matrix, 2).len() == 1);
    }

    #[test]
    fn test_u_shape_merges_late() {
        // Two arms that only meet on the bottom row
        let mut matrix = BitMatrix::new(5, 4);
        for y in 0..4 {
            matrix.set(0, y, true);
            matrix.set(4, y, true);
        }
        for x in 0..5 {
            matrix.set(x, 3, true);
        }
        let regions = find_components(&matrix, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 11);
        assert_eq!(regions[0].width(), 5);
        assert_eq!(regions[0].height(), 4);
    }
}
