/// Whole-run failures of a coverage computation.
///
/// Per-candidate failures never surface here; they only drop that candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoverageError {
    #[error("region '{0}' not found in the boundary dataset")]
    RegionNotFound(String),
    #[error("degenerate region geometry: {0}")]
    DegenerateGeometry(String),
    #[error("invalid radius range: min {min} km, max {max} km (need 1 <= min <= max)")]
    InvalidRadius { min: u32, max: u32 },
    #[error("invalid distance scale {0} (need a finite value above 0)")]
    InvalidScale(f64),
}

pub type Result<T> = std::result::Result<T, CoverageError>;
