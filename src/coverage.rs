use geo::{Coord, Line, LineString, Polygon, Rect};
use geo::algorithm::area::Area;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use tracing::debug;

use crate::boundary::BoundaryDataset;
use crate::classify::partition;
use crate::distance_model::DistanceModel;
use crate::error::{CoverageError, Result};
use crate::grid::{compute_bounding_box, generate};
use crate::refine::{refine, Refinement};
use crate::ResultCircle;

/// Inclusive range of allowed circle radii, in kilometers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusRange {
    pub min_km: u32,
    pub max_km: u32,
}

impl RadiusRange {
    pub fn new(min_km: u32, max_km: u32) -> Result<Self> {
        if min_km == 0 || min_km > max_km {
            return Err(CoverageError::InvalidRadius { min: min_km, max: max_km });
        }
        Ok(Self { min_km, max_km })
    }

    pub fn contains(&self, radius_km: u32) -> bool {
        (self.min_km..=self.max_km).contains(&radius_km)
    }
}

/// Counters for one generate/classify/refine pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub radius_km: u32,
    pub candidates: usize,
    pub accepted: usize,
    pub contested: usize,
    pub outside: usize,
    /// Contested candidates that produced a shrunk circle
    pub refined: usize,
}

/// Circles of a run plus the statistics of every pass that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    pub circles: Vec<ResultCircle>,
    /// One entry for the max-radius pass, two when the fallback ran
    pub passes: Vec<PassStats>,
}

impl CoverageReport {
    pub fn used_fallback(&self) -> bool {
        self.passes.len() > 1
    }
}

/// Cover `polygon` with circles whose radii lie in `radii`.
///
/// Runs one pass at the maximum radius and, if it yields nothing, a single
/// fallback pass at the minimum radius. An empty result is a valid outcome.
pub fn compute_coverage<M: DistanceModel + ?Sized>(
    polygon: &Polygon<f64>,
    radii: RadiusRange,
    model: &M,
) -> Result<Vec<ResultCircle>> {
    compute_coverage_report(polygon, radii, model).map(|report| report.circles)
}

/// Look `name` up in `dataset` and cover it, see [`compute_coverage`]
pub fn compute_region_coverage<M: DistanceModel + ?Sized>(
    dataset: &BoundaryDataset,
    name: &str,
    radii: RadiusRange,
    model: &M,
) -> Result<Vec<ResultCircle>> {
    let polygon = dataset
        .find(name)
        .ok_or_else(|| CoverageError::RegionNotFound(name.to_string()))?;
    compute_coverage(polygon, radii, model)
}

/// [`compute_coverage`] keeping per-pass statistics
pub fn compute_coverage_report<M: DistanceModel + ?Sized>(
    polygon: &Polygon<f64>,
    radii: RadiusRange,
    model: &M,
) -> Result<CoverageReport> {
    let radii = RadiusRange::new(radii.min_km, radii.max_km)?;
    validate_polygon(polygon)?;
    let bbox = compute_bounding_box(polygon)
        .ok_or_else(|| CoverageError::DegenerateGeometry("empty exterior ring".to_string()))?;

    let mut report = CoverageReport::default();

    let (circles, stats) = run_pass(polygon, bbox, radii, model);
    debug!(?stats, "max-radius pass finished");
    report.passes.push(stats);

    if !circles.is_empty() {
        report.circles = circles;
        return Ok(report);
    }

    let fallback = RadiusRange { min_km: radii.min_km, max_km: radii.min_km };
    let (circles, stats) = run_pass(polygon, bbox, fallback, model);
    debug!(?stats, "min-radius fallback pass finished");
    report.passes.push(stats);
    report.circles = circles;

    Ok(report)
}

fn run_pass<M: DistanceModel + ?Sized>(
    polygon: &Polygon<f64>,
    bbox: Rect<f64>,
    radii: RadiusRange,
    model: &M,
) -> (Vec<ResultCircle>, PassStats) {
    let part = partition(generate(bbox, radii.max_km as f64, model), polygon);

    let mut stats = PassStats {
        radius_km: radii.max_km,
        candidates: part.accepted.len() + part.contested.len() + part.outside,
        accepted: part.accepted.len(),
        contested: part.contested.len(),
        outside: part.outside,
        refined: 0,
    };

    let mut circles: Vec<ResultCircle> = part
        .accepted
        .iter()
        .map(|c| ResultCircle::new(c.center, radii.max_km))
        .collect();

    for candidate in &part.contested {
        if let Refinement::Fitted(circle) =
            refine(candidate, polygon, radii.min_km, radii.max_km, model)
        {
            circles.push(circle);
            stats.refined += 1;
        }
    }

    (circles, stats)
}

/// Reject boundaries the containment primitives cannot give meaningful
/// answers for.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    let exterior = polygon.exterior();

    if exterior.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(CoverageError::DegenerateGeometry("non-finite coordinate".to_string()));
    }

    let ring = dedup_ring(exterior);
    if ring.len() < 4 {
        return Err(CoverageError::DegenerateGeometry(format!(
            "exterior ring has {} distinct vertices",
            ring.len().saturating_sub(1)
        )));
    }

    if polygon.unsigned_area() <= 0.0 {
        return Err(CoverageError::DegenerateGeometry("zero area".to_string()));
    }

    if let Some(at) = find_self_intersection(&ring) {
        return Err(CoverageError::DegenerateGeometry(format!(
            "exterior ring self-intersects at ({}, {})",
            at.x, at.y
        )));
    }

    Ok(())
}

/// Closed ring without consecutive duplicate vertices or zero-width spikes
/// (`a -> b -> a` backtracks, common in digitized coastlines)
fn dedup_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for &c in ring.coords() {
        if coords.last() == Some(&c) {
            continue;
        }
        if coords.len() >= 2 && coords[coords.len() - 2] == c {
            coords.pop();
            continue;
        }
        coords.push(c);
    }

    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }

    coords
}

/// First crossing between two non-adjacent edges of a closed ring.
///
/// Edges are swept in order of their left end, so each one is only compared
/// with the edges whose x range overlaps its own.
fn find_self_intersection(ring: &[Coord<f64>]) -> Option<Coord<f64>> {
    let lines: Vec<Line<f64>> = ring.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let bounds: Vec<Rect<f64>> = lines.iter().map(|l| Rect::new(l.start, l.end)).collect();
    let n = lines.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| bounds[a].min().x.total_cmp(&bounds[b].min().x));

    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            if bounds[j].min().x > bounds[i].max().x {
                break;
            }
            if !rects_touch(&bounds[i], &bounds[j]) {
                continue;
            }

            let (lo, hi) = (i.min(j), i.max(j));
            let adjacent = hi == lo + 1 || (lo == 0 && hi == n - 1);
            match line_intersection(lines[i], lines[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if !adjacent {
                        return Some(intersection);
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    if !adjacent || intersection.start != intersection.end {
                        return Some(intersection.start);
                    }
                }
            }
        }
    }

    None
}

fn rects_touch(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}
