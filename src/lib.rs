//! Cover a region boundary with circles of bounded radius that lie entirely
//! inside it.
//!
//! A regular grid of maximum-radius candidates is laid over the boundary's
//! bounding box. Candidates fully inside are kept, candidates crossing the
//! boundary are pushed inward and shrunk until they fit, and if nothing fits
//! at the maximum radius the whole pipeline runs once more at the minimum.

pub mod batch;
pub mod boundary;
pub mod classify;
pub mod config;
pub mod coverage;
pub mod csv_output;
pub mod distance_model;
pub mod error;
pub mod grid;
pub mod label;
pub mod refine;
pub mod svg_output;

use geo::Coord;

pub use boundary::BoundaryDataset;
pub use config::{CoordinateMode, CoverageConfig};
pub use coverage::{compute_coverage, compute_coverage_report, compute_region_coverage, RadiusRange};
pub use distance_model::{CoordinateSystem, DistanceModel, Geographic, Projected};
pub use error::CoverageError;

/// A circle that fits inside the region boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCircle {
    /// Center in the coordinate system of the input boundary
    pub center: Coord<f64>,
    /// Radius in kilometers
    pub radius: u32,
    /// Sub-region (state/province) name, filled in by [`label::label_circles`]
    pub label: Option<String>,
}

impl ResultCircle {
    pub fn new(center: Coord<f64>, radius: u32) -> Self {
        Self { center, radius, label: None }
    }
}
