//! DataMatrix detection modules
//!
//! This module contains everything between a raw frame and a module grid:
//! - Frame normalization (pixels to intensities, background tone)
//! - Polarity planning (which orientations to try, in what order)
//! - Finder pattern location (the solid "L" and its clock tracks)
//! - Module grid sampling (size selection and perspective sampling)

/// Union-find labelling of binarized ink
pub mod connected_components;
/// L-shaped finder pattern location with sub-pixel corners
pub mod locator;
/// Frame to intensity grid conversion
pub mod normalizer;
/// Polarity attempt planning and hint updates
pub mod polarity;
/// Module grid sampling through a perspective transform
pub mod sampler;
