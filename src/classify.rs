use geo::Polygon;
use geo::algorithm::contains::Contains;
use geo::algorithm::intersects::Intersects;

use crate::grid::Candidate;

/// Where a candidate disc sits relative to the region boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Disc lies entirely inside the polygon
    Accepted,
    /// Disc crosses the polygon boundary (partially inside)
    Contested,
    /// Disc misses the polygon, or swallows it whole
    Outside,
}

pub fn classify(candidate: &Candidate, polygon: &Polygon<f64>) -> Classification {
    if polygon.contains(&candidate.disc) {
        Classification::Accepted
    } else if overlaps(&candidate.disc, polygon) {
        Classification::Contested
    } else {
        Classification::Outside
    }
}

/// Candidates split by [`classify`], in generation order
#[derive(Debug, Default)]
pub struct Partition {
    pub accepted: Vec<Candidate>,
    pub contested: Vec<Candidate>,
    /// Number of candidates dropped as outside
    pub outside: usize,
}

pub fn partition<I>(candidates: I, polygon: &Polygon<f64>) -> Partition
where
    I: IntoIterator<Item = Candidate>,
{
    let mut result = Partition::default();

    for candidate in candidates {
        match classify(&candidate, polygon) {
            Classification::Accepted => result.accepted.push(candidate),
            Classification::Contested => result.contested.push(candidate),
            Classification::Outside => result.outside += 1,
        }
    }

    result
}

/// Interiors meet but neither shape contains the other
fn overlaps(disc: &Polygon<f64>, polygon: &Polygon<f64>) -> bool {
    disc.intersects(polygon) && !disc.contains(polygon) && !polygon.contains(disc)
}
