use clap::ValueEnum;

use crate::coverage::RadiusRange;
use crate::distance_model::{CoordinateSystem, Geographic, Projected, KM_PER_DEGREE, METERS_PER_KM};
use crate::error::{CoverageError, Result};

/// Coordinate system of the boundary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CoordinateMode {
    /// Longitude/latitude degrees, with cos-latitude correction
    #[default]
    Geographic,
    /// Linear projected units (meters by default), no correction
    Projected,
}

/// Everything a coverage run needs besides the boundary itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageConfig {
    pub radii: RadiusRange,
    pub coordinate_system: CoordinateSystem,
}

impl CoverageConfig {
    /// Validate the radius range and build the distance model for `mode`.
    ///
    /// `scale` overrides km per degree (geographic) or units per km
    /// (projected); `None` keeps the defaults.
    pub fn new(min_km: u32, max_km: u32, mode: CoordinateMode, scale: Option<f64>) -> Result<Self> {
        let radii = RadiusRange::new(min_km, max_km)?;
        if let Some(scale) = scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(CoverageError::InvalidScale(scale));
            }
        }
        let coordinate_system = match mode {
            CoordinateMode::Geographic => CoordinateSystem::Geographic(Geographic {
                km_per_degree: scale.unwrap_or(KM_PER_DEGREE),
            }),
            CoordinateMode::Projected => CoordinateSystem::Projected(Projected {
                units_per_km: scale.unwrap_or(METERS_PER_KM),
            }),
        };

        Ok(Self { radii, coordinate_system })
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            radii: RadiusRange { min_km: 1, max_km: 10 },
            coordinate_system: CoordinateSystem::default(),
        }
    }
}
