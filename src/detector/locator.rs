//! Finder-pattern locator
//!
//! Looks for the ECC200 finder pattern in an [`InkGrid`]: a solid "L" along
//! two adjacent sides and an alternating clock track along the other two.
//!
//! 1. Adaptive threshold and 8-connected components. The L is solid, so the
//!    whole pattern ends up in one component together with the data modules
//!    touching it.
//! 2. Convex hull of the component outline, reduced to a quadrilateral.
//! 3. The corner whose two sides are solid ink is the L vertex; the fourth
//!    corner is completed as a parallelogram, since clock modules are often
//!    not connected to the rest of the symbol.
//! 4. Every side is refined to sub-pixel precision by fitting a line to the
//!    background-to-ink crossings found along its normal.
//! 5. Solid and clock sides are scored on the refined quad.

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::detector::connected_components::{Component, find_components};
use crate::models::{Candidate, InkGrid, Point};
use crate::utils::binarization::{adaptive_binarize, adaptive_radius, otsu_threshold};
use crate::utils::geometry::{Line, convex_hull};

/// Minimum ink fraction of a solid finder side
const SOLID_MIN: f32 = 0.85;
/// Minimum ink/background transitions along a clock side
const CLOCK_MIN_TRANSITIONS: usize = 3;
/// Sampling offset inside a side when scoring it, in pixels
const SIDE_INSET: f32 = 1.0;
/// Smallest accepted bounding box side, in pixels
const MIN_EXTENT: usize = 8;
/// Step of the edge searches, in pixels
const SEARCH_STEP: f32 = 0.25;
/// Shortest plausible L leg, in modules (the smallest symbol is 8 modules)
const MIN_LEG_MODULES: f32 = 4.0;

/// Ink levels of a symbol region, split by Otsu's method
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkLevels {
    /// Mean ink of the background class
    pub background: f32,
    /// Mean ink of the ink class
    pub ink: f32,
}

impl InkLevels {
    /// Decision level halfway between the two classes
    pub fn threshold(&self) -> f32 {
        (self.background + self.ink) / 2.0
    }
}

/// Ink levels of the pixels whose centers fall inside a convex quad
pub fn quad_levels(ink: &InkGrid, corners: &[Point; 4]) -> Option<InkLevels> {
    let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let max_x = (corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil() as usize)
        .min(ink.width());
    let max_y = (corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil() as usize)
        .min(ink.height());

    let mut histogram = [0u32; 256];
    for y in min_y..max_y {
        for x in min_x..max_x {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if inside_quad(corners, &center) {
                histogram[ink.get(x, y) as usize] += 1;
            }
        }
    }

    let split = otsu_threshold(&histogram)? as usize;
    let class_mean = |range: std::ops::Range<usize>| {
        let (count, sum) = range.fold((0u64, 0u64), |(c, s), v| {
            (c + histogram[v] as u64, s + histogram[v] as u64 * v as u64)
        });
        (count > 0).then(|| sum as f32 / count as f32)
    };
    Some(InkLevels {
        background: class_mean(0..split)?,
        ink: class_mean(split..256)?,
    })
}

/// Whether `p` lies inside (or on) the convex quad, for either winding
pub fn inside_quad(corners: &[Point; 4], p: &Point) -> bool {
    let mut positive = false;
    let mut negative = false;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let side = a.to(&b).cross(&a.to(p));
        positive |= side > 0.0;
        negative |= side < 0.0;
    }
    !(positive && negative)
}

/// Find finder-pattern candidates in an ink grid, best first.
///
/// An empty result means no finder pattern is present under this polarity.
pub fn locate(ink: &InkGrid, config: &ScanConfig) -> Vec<Candidate> {
    let radius = adaptive_radius(ink.width(), ink.height());
    let binary = adaptive_binarize(ink, radius, config.threshold_constant);
    let components = find_components(&binary, config.min_component_pixels);
    trace!(
        polarity = %ink.polarity(),
        components = components.len(),
        "connected components"
    );

    let mut candidates: Vec<Candidate> = components
        .iter()
        .filter(|c| c.width() >= MIN_EXTENT && c.height() >= MIN_EXTENT)
        .filter_map(|c| examine_component(ink, c))
        .filter(|c| c.confidence >= config.min_confidence_threshold)
        .collect();

    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    debug!(
        polarity = %ink.polarity(),
        candidates = candidates.len(),
        best = candidates.first().map(|c| c.confidence),
        "finder pattern search"
    );
    candidates
}

fn examine_component(ink: &InkGrid, component: &Component) -> Option<Candidate> {
    let hull = convex_hull(&component.outline_points());
    let quad = hull_quad(&hull)?;
    let levels = quad_levels(ink, &quad)?;
    let threshold = levels.threshold();

    // L vertex: corner whose two adjacent sides are solid, preferring long legs
    let centroid = quad_centroid(&quad);
    let vertex = (0..4)
        .filter_map(|k| {
            let prev = quad[(k + 3) % 4];
            let next = quad[(k + 1) % 4];
            let a = side_profile(ink, threshold, &quad[k], &prev, &centroid).ink_fraction;
            let b = side_profile(ink, threshold, &quad[k], &next, &centroid).ink_fraction;
            let shorter_leg = quad[k].distance(&prev).min(quad[k].distance(&next));
            (a.min(b) >= SOLID_MIN).then_some((k, shorter_leg))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?
        .0;

    let bottom_left = quad[vertex];
    let (mut top_left, mut bottom_right) = (quad[(vertex + 3) % 4], quad[(vertex + 1) % 4]);
    if bottom_left.to(&top_left).cross(&bottom_left.to(&bottom_right)) < 0.0 {
        std::mem::swap(&mut top_left, &mut bottom_right);
    }
    let top_right = top_left.translate(
        bottom_right.x - bottom_left.x,
        bottom_right.y - bottom_left.y,
    );
    let initial = [top_left, top_right, bottom_right, bottom_left];

    let module_size = estimate_module_size(ink, threshold, &initial)?;
    let shorter_leg = bottom_left.distance(&top_left).min(bottom_left.distance(&bottom_right));
    if shorter_leg < MIN_LEG_MODULES * module_size {
        return None;
    }
    let corners = refine_corners(ink, threshold, &initial, module_size);
    let confidence = score_finder(ink, threshold, &corners)?;
    trace!(
        corners = ?corners,
        module_size,
        confidence,
        "finder candidate"
    );

    Some(Candidate {
        corners,
        polarity: ink.polarity(),
        confidence,
        module_size,
    })
}

/// Quadrilateral spanned by the hull diameter and the farthest hull point on
/// either side of it
fn hull_quad(hull: &[Point]) -> Option<[Point; 4]> {
    if hull.len() < 3 {
        return None;
    }
    let mut diameter = (0, 0, 0.0f32);
    for i in 0..hull.len() {
        for j in (i + 1)..hull.len() {
            let d = hull[i].distance_squared(&hull[j]);
            if d > diameter.2 {
                diameter = (i, j, d);
            }
        }
    }
    let (a, c) = (hull[diameter.0], hull[diameter.1]);
    let axis = Line::through(&a, &c)?;

    let mut left = (a, 0.0f32);
    let mut right = (a, 0.0f32);
    for p in hull {
        let d = axis.signed_distance(p);
        if d > left.1 {
            left = (*p, d);
        }
        if d < right.1 {
            right = (*p, d);
        }
    }
    if left.1 < 2.0 || -right.1 < 2.0 {
        return None;
    }
    Some([a, left.0, c, right.0])
}

fn quad_centroid(quad: &[Point; 4]) -> Point {
    Point::new(
        quad.iter().map(|p| p.x).sum::<f32>() / 4.0,
        quad.iter().map(|p| p.y).sum::<f32>() / 4.0,
    )
}

/// Unit normal of the segment `a -> b` pointing toward `inside`
fn inward_normal(a: &Point, b: &Point, inside: &Point) -> Option<Point> {
    let dir = a.to(b).normalized()?;
    let normal = Point::new(-dir.y, dir.x);
    Some(if normal.dot(&a.to(inside)) < 0.0 {
        normal.scale(-1.0)
    } else {
        normal
    })
}

/// Thresholded samples along a side, just inside the quad
#[derive(Debug, Clone, Copy)]
struct SideProfile {
    ink_fraction: f32,
    transitions: usize,
}

fn side_profile(ink: &InkGrid, threshold: f32, a: &Point, b: &Point, inside: &Point) -> SideProfile {
    let Some(normal) = inward_normal(a, b, inside) else {
        return SideProfile {
            ink_fraction: 0.0,
            transitions: 0,
        };
    };
    let stations = (a.distance(b) as usize).clamp(16, 1024);
    let offset = normal.scale(SIDE_INSET);

    let mut inked = 0usize;
    let mut transitions = 0usize;
    let mut previous: Option<bool> = None;
    for i in 0..stations {
        let t = 0.05 + 0.9 * (i as f32 + 0.5) / stations as f32;
        let p = a.lerp(b, t).translate(offset.x, offset.y);
        let on = ink.sample(&p) >= threshold;
        inked += on as usize;
        if previous.is_some_and(|prev| prev != on) {
            transitions += 1;
        }
        previous = Some(on);
    }
    SideProfile {
        ink_fraction: inked as f32 / stations as f32,
        transitions,
    }
}

/// Lower-octile thickness of the two solid legs, a module pitch estimate
/// that tolerates ink modules lying against the legs
fn estimate_module_size(ink: &InkGrid, threshold: f32, corners: &[Point; 4]) -> Option<f32> {
    let [top_left, _, bottom_right, bottom_left] = *corners;
    let centroid = quad_centroid(corners);
    let max_depth = top_left.distance(&bottom_left).min(bottom_left.distance(&bottom_right)) / 2.0;

    let mut thickness = Vec::new();
    for (a, b) in [(bottom_left, top_left), (bottom_left, bottom_right)] {
        let normal = inward_normal(&a, &b, &centroid)?;
        let stations = (a.distance(&b) as usize).clamp(8, 512);
        for i in 0..stations {
            let t = 0.05 + 0.9 * (i as f32 + 0.5) / stations as f32;
            let base = a.lerp(&b, t);
            let at = |s: f32| base.translate(normal.x * s, normal.y * s);
            let mut depth = 0.0;
            let mut previous = ink.sample(&at(depth));
            while depth < max_depth {
                let next = ink.sample(&at(depth + SEARCH_STEP));
                if next < threshold {
                    let fraction = (previous - threshold) / (previous - next).max(f32::EPSILON);
                    thickness.push(depth + SEARCH_STEP * fraction.clamp(0.0, 1.0));
                    break;
                }
                previous = next;
                depth += SEARCH_STEP;
            }
        }
    }
    if thickness.is_empty() {
        return None;
    }
    thickness.sort_by(f32::total_cmp);
    Some(thickness[thickness.len() / 8].max(1.0))
}

/// Sub-pixel edge line of one side: crossings of the ink threshold found by
/// walking inward along the normal, filtered to the outermost layer
fn refine_side(
    ink: &InkGrid,
    threshold: f32,
    a: &Point,
    b: &Point,
    inside: &Point,
    module_size: f32,
) -> Option<Line> {
    let normal = inward_normal(a, b, inside)?;
    let reach = (1.5 * module_size).max(2.0);
    let stations = ((a.distance(b) / 2.0) as usize).clamp(8, 256);

    let mut crossings = Vec::with_capacity(stations);
    for i in 0..stations {
        let t = 0.05 + 0.9 * (i as f32 + 0.5) / stations as f32;
        let base = a.lerp(b, t);
        let at = |s: f32| base.translate(normal.x * s, normal.y * s);

        let mut s = -reach;
        let mut previous = ink.sample(&at(s));
        if previous >= threshold {
            continue;
        }
        while s < reach {
            let next = ink.sample(&at(s + SEARCH_STEP));
            if next >= threshold {
                let fraction = (threshold - previous) / (next - previous);
                crossings.push(at(s + SEARCH_STEP * fraction));
                break;
            }
            previous = next;
            s += SEARCH_STEP;
        }
    }

    // Clock stations over blank modules cross one module deeper; keep the
    // outermost layer only
    let mut line = Line::fit(&crossings)?;
    for _ in 0..3 {
        let depth = |p: &Point| line.origin.to(p).dot(&normal);
        let outermost = crossings.iter().map(depth).fold(f32::INFINITY, f32::min);
        let limit = outermost + 0.5 * module_size;
        let kept: Vec<Point> = crossings.iter().copied().filter(|p| depth(p) <= limit).collect();
        if kept.len() < 4 {
            return None;
        }
        line = Line::fit(&kept)?;
        crossings = kept;
    }
    Some(line)
}

fn refine_corners(
    ink: &InkGrid,
    threshold: f32,
    initial: &[Point; 4],
    module_size: f32,
) -> [Point; 4] {
    let centroid = quad_centroid(initial);
    // Sides in order: top, right, bottom, left
    let sides: Vec<Option<Line>> = (0..4)
        .map(|i| {
            refine_side(
                ink,
                threshold,
                &initial[i],
                &initial[(i + 1) % 4],
                &centroid,
                module_size,
            )
        })
        .collect();

    let mut corners = *initial;
    for (i, corner) in corners.iter_mut().enumerate() {
        // Corner i joins side i-1 and side i
        let before = &sides[(i + 3) % 4];
        let after = &sides[i];
        let refined = match (before, after) {
            (Some(l1), Some(l2)) => l1.intersect(l2),
            _ => None,
        };
        if let Some(p) = refined.filter(|p| p.distance(&initial[i]) <= 3.0 * module_size) {
            *corner = p;
        }
    }
    corners
}

/// Solid score times clock score, `None` if either half of the pattern is missing
fn score_finder(ink: &InkGrid, threshold: f32, corners: &[Point; 4]) -> Option<f32> {
    let [top_left, top_right, bottom_right, bottom_left] = *corners;
    let centroid = quad_centroid(corners);

    let left = side_profile(ink, threshold, &bottom_left, &top_left, &centroid);
    let bottom = side_profile(ink, threshold, &bottom_left, &bottom_right, &centroid);
    let solid = left.ink_fraction.min(bottom.ink_fraction);
    if solid < SOLID_MIN {
        return None;
    }

    let top = side_profile(ink, threshold, &top_left, &top_right, &centroid);
    let right = side_profile(ink, threshold, &top_right, &bottom_right, &centroid);
    if top.transitions < CLOCK_MIN_TRANSITIONS || right.transitions < CLOCK_MIN_TRANSITIONS {
        return None;
    }
    let clock_score = |p: SideProfile| 1.0 - ((p.ink_fraction - 0.5).abs() * 2.0);
    let clock = clock_score(top).min(clock_score(right));

    Some((solid * clock).clamp(0.0, 1.0))
}
