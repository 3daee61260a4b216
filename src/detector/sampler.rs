//! Symbol sampler: candidate quad to module matrix
//!
//! The clock tracks give a first guess of the grid dimensions. Every
//! standard size near that guess is tried with its own perspective
//! transform, and the one whose sampled finder and alignment patterns agree
//! best with the expected layout wins.

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::detector::locator::quad_levels;
use crate::error::{Result, ScanError};
use crate::models::{BitMatrix, Candidate, InkGrid, ModuleMatrix, Point, SymbolSize};
use crate::utils::geometry::PerspectiveTransform;

/// Offsets of the 3x3 vote inside a cell, in modules
const VOTE_OFFSETS: [f32; 3] = [-0.25, 0.0, 0.25];
/// Votes (of 9) at or above which a cell is confidently ink
const CONFIDENT_INK: usize = 7;
/// Votes (of 9) at or below which a cell is confidently background
const CONFIDENT_BACKGROUND: usize = 2;
/// Allowed gap between the clock-track estimate and a shortlisted size
const SIZE_SLACK: usize = 2;

/// Sampled module grid plus sampling quality
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSymbol {
    /// The sampled grid, finder pattern included
    pub matrix: ModuleMatrix,
    /// Fraction of function modules matching the expected pattern
    pub finder_match: f32,
    /// Fraction of cells whose vote had a clear majority
    pub confident_fraction: f32,
    /// Module columns and rows counted along the clock tracks
    pub clock_counts: (usize, usize),
}

/// Sample the module grid inside a located finder pattern.
///
/// Fails with [`ScanError::SamplingFailure`] when no standard size fits the
/// pattern well enough or too many cells are ambiguous.
pub fn sample(ink: &InkGrid, candidate: &Candidate, config: &ScanConfig) -> Result<SampledSymbol> {
    let corners = &candidate.corners;
    let threshold = quad_levels(ink, corners)
        .ok_or_else(|| ScanError::SamplingFailure("flat symbol region".to_string()))?
        .threshold();

    let clock_counts = count_clock_modules(ink, candidate, threshold);
    let shortlist: Vec<SymbolSize> = SymbolSize::all()
        .iter()
        .copied()
        .filter(|s| {
            s.cols().abs_diff(clock_counts.0) <= SIZE_SLACK
                && s.rows().abs_diff(clock_counts.1) <= SIZE_SLACK
        })
        .collect();
    let sizes: &[SymbolSize] = if shortlist.is_empty() {
        SymbolSize::all()
    } else {
        &shortlist
    };
    trace!(?clock_counts, shortlisted = shortlist.len(), "size shortlist");

    let mut best: Option<(SymbolSize, PerspectiveTransform, f32)> = None;
    for &size in sizes {
        let Some(transform) = grid_transform(size, corners) else {
            continue;
        };
        let score = finder_agreement(ink, threshold, size, &transform);
        if best.as_ref().is_none_or(|(_, _, s)| score > *s) {
            best = Some((size, transform, score));
        }
    }
    let (size, transform, finder_match) = best
        .ok_or_else(|| ScanError::SamplingFailure("degenerate candidate quad".to_string()))?;
    if finder_match < config.min_finder_match {
        return Err(ScanError::SamplingFailure(format!(
            "best size {size} matches the finder pattern at {finder_match:.2}"
        )));
    }

    let mut modules = BitMatrix::new(size.cols(), size.rows());
    let mut confident = 0usize;
    for row in 0..size.rows() {
        for col in 0..size.cols() {
            let votes = cell_votes(ink, threshold, &transform, row, col);
            if votes >= CONFIDENT_INK || votes <= CONFIDENT_BACKGROUND {
                confident += 1;
            }
            modules.set(col, row, votes >= 5);
        }
    }
    let confident_fraction = confident as f32 / (size.rows() * size.cols()) as f32;
    debug!(
        %size,
        finder_match,
        confident_fraction,
        "sampled module grid"
    );
    if confident_fraction < config.min_confident_fraction {
        return Err(ScanError::SamplingFailure(format!(
            "only {:.0}% of cells sampled with confidence",
            confident_fraction * 100.0
        )));
    }

    let matrix = ModuleMatrix::from_bits(modules)
        .ok_or_else(|| ScanError::SamplingFailure(format!("{size} is not a standard size")))?;
    Ok(SampledSymbol {
        matrix,
        finder_match,
        confident_fraction,
        clock_counts,
    })
}

/// Map module-grid coordinates (x = column, y = row) onto the candidate quad
fn grid_transform(size: SymbolSize, corners: &[Point; 4]) -> Option<PerspectiveTransform> {
    let (cols, rows) = (size.cols() as f32, size.rows() as f32);
    let grid = [
        Point::new(0.0, 0.0),
        Point::new(cols, 0.0),
        Point::new(cols, rows),
        Point::new(0.0, rows),
    ];
    PerspectiveTransform::from_points(&grid, corners)
}

fn is_ink(ink: &InkGrid, threshold: f32, transform: &PerspectiveTransform, x: f32, y: f32) -> bool {
    transform
        .transform(&Point::new(x, y))
        .is_some_and(|p| ink.contains(&p) && ink.sample(&p) >= threshold)
}

fn finder_agreement(
    ink: &InkGrid,
    threshold: f32,
    size: SymbolSize,
    transform: &PerspectiveTransform,
) -> f32 {
    let mut total = 0usize;
    let mut matching = 0usize;
    for row in 0..size.rows() {
        for col in 0..size.cols() {
            if let Some(expected) = size.function_module_value(row, col) {
                total += 1;
                let center = (col as f32 + 0.5, row as f32 + 0.5);
                if is_ink(ink, threshold, transform, center.0, center.1) == expected {
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

fn cell_votes(
    ink: &InkGrid,
    threshold: f32,
    transform: &PerspectiveTransform,
    row: usize,
    col: usize,
) -> usize {
    let mut votes = 0;
    for dy in VOTE_OFFSETS {
        for dx in VOTE_OFFSETS {
            let x = col as f32 + 0.5 + dx;
            let y = row as f32 + 0.5 + dy;
            votes += is_ink(ink, threshold, transform, x, y) as usize;
        }
    }
    votes
}

/// Module columns and rows estimated from the ink runs half a module inside
/// the top and right edges (each clock track has one ink module per two)
fn count_clock_modules(ink: &InkGrid, candidate: &Candidate, threshold: f32) -> (usize, usize) {
    let [top_left, top_right, bottom_right, bottom_left] = candidate.corners;
    let half = candidate.module_size / 2.0;
    // Inward offsets: down the left edge for the top track, along the bottom
    // edge (toward the left) for the right track
    let down = top_left.to(&bottom_left).normalized().unwrap_or_default().scale(half);
    let left = bottom_right.to(&bottom_left).normalized().unwrap_or_default().scale(half);

    let top_runs = count_runs(
        ink,
        threshold,
        &top_left.translate(down.x, down.y),
        &top_right.translate(down.x + left.x, down.y + left.y),
    );
    let right_runs = count_runs(
        ink,
        threshold,
        &top_right.translate(left.x + down.x, left.y + down.y),
        &bottom_right.translate(left.x, left.y),
    );
    (2 * top_runs, 2 * right_runs)
}

fn count_runs(ink: &InkGrid, threshold: f32, a: &Point, b: &Point) -> usize {
    let stations = (a.distance(b) * 2.0) as usize;
    let stations = stations.clamp(32, 8192);
    let mut runs = 0;
    let mut inside = false;
    for i in 0..stations {
        let p = a.lerp(b, (i as f32 + 0.5) / stations as f32);
        let on = ink.sample(&p) >= threshold;
        if on && !inside {
            runs += 1;
        }
        inside = on;
    }
    runs
}
