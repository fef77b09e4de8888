use geo::{Coord, LineString, Polygon};
use geo::algorithm::scale::Scale;

/// Approximate length of one degree of latitude in kilometers
pub const KM_PER_DEGREE: f64 = 111.0;

/// Linear units per kilometer for meter-based projections (e.g. EPSG:3857)
pub const METERS_PER_KM: f64 = 1000.0;

/// Number of segments used to approximate a disc as a polygon
pub const DISC_SEGMENTS: usize = 64;

/// Keeps the horizontal stretch finite at the poles
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Converts kilometer distances into the coordinate units of the boundary.
///
/// Every length the coverage algorithm works with is expressed in kilometers
/// and pushed through this trait, so the same grid/classify/refine code runs
/// on both degree-based and projected boundaries.
pub trait DistanceModel {
    /// Coordinate units spanned by `km` along the y axis
    fn to_disc_radius(&self, km: f64) -> f64;

    /// Horizontal stretch factor at ordinate `y`
    fn x_stretch(&self, y: f64) -> f64;

    /// Offset from a candidate center to its axis neighbours, one radius away
    fn neighbor_offset(&self, center: Coord<f64>, radius_km: f64) -> (f64, f64) {
        let r = self.to_disc_radius(radius_km);
        (r * self.x_stretch(center.y), r)
    }

    /// Offset of a single 1 km push step at `center`
    fn step_size(&self, center: Coord<f64>) -> (f64, f64) {
        self.neighbor_offset(center, 1.0)
    }

    /// Disc of `radius_km` around `center`, stretched along x when the
    /// coordinate system needs it
    fn disc(&self, center: Coord<f64>, radius_km: f64) -> Polygon<f64> {
        let circle = buffer(center, self.to_disc_radius(radius_km));
        let stretch = self.x_stretch(center.y);
        if stretch == 1.0 {
            circle
        } else {
            circle.scale_around_point(stretch, 1.0, center)
        }
    }
}

/// Degree-based coordinates (longitude, latitude).
///
/// A degree of longitude shrinks with `cos(latitude)`, so every horizontal
/// distance is divided by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geographic {
    pub km_per_degree: f64,
}

impl Default for Geographic {
    fn default() -> Self {
        Self { km_per_degree: KM_PER_DEGREE }
    }
}

impl DistanceModel for Geographic {
    fn to_disc_radius(&self, km: f64) -> f64 {
        km / self.km_per_degree
    }

    fn x_stretch(&self, y: f64) -> f64 {
        1.0 / y.to_radians().cos().abs().max(MIN_COS_LATITUDE)
    }
}

/// Linear projected coordinates, no latitude correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub units_per_km: f64,
}

impl Default for Projected {
    fn default() -> Self {
        Self { units_per_km: METERS_PER_KM }
    }
}

impl DistanceModel for Projected {
    fn to_disc_radius(&self, km: f64) -> f64 {
        km * self.units_per_km
    }

    fn x_stretch(&self, _y: f64) -> f64 {
        1.0
    }
}

/// Runtime choice between the two distance models
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSystem {
    Geographic(Geographic),
    Projected(Projected),
}

impl CoordinateSystem {
    pub fn is_geographic(&self) -> bool {
        matches!(self, CoordinateSystem::Geographic(_))
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        CoordinateSystem::Geographic(Geographic::default())
    }
}

impl DistanceModel for CoordinateSystem {
    fn to_disc_radius(&self, km: f64) -> f64 {
        match self {
            CoordinateSystem::Geographic(m) => m.to_disc_radius(km),
            CoordinateSystem::Projected(m) => m.to_disc_radius(km),
        }
    }

    fn x_stretch(&self, y: f64) -> f64 {
        match self {
            CoordinateSystem::Geographic(m) => m.x_stretch(y),
            CoordinateSystem::Projected(m) => m.x_stretch(y),
        }
    }
}

/// Circular buffer around a point, approximated with [`DISC_SEGMENTS`] edges
pub fn buffer(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let mut coords: Vec<Coord<f64>> = (0..DISC_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / (DISC_SEGMENTS as f64);
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();

    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::new(coords), vec![])
}
