//! Utility functions for image processing
//!
//! This module provides helper functions for DataMatrix detection:
//! - Grayscale conversion (RGB/RGBA/BGRA to luminance)
//! - Binarization (integral-image adaptive threshold and Otsu levels)
//! - Geometry (perspective transforms, line fitting, convex hulls)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
