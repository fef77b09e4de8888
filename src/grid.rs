use geo::{Coord, Polygon, Rect};

use crate::distance_model::DistanceModel;

/// A provisional disc on the candidate grid.
///
/// Candidates are never moved or shrunk in place; the refiner builds a new
/// one for every step.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub center: Coord<f64>,
    pub disc: Polygon<f64>,
}

impl Candidate {
    pub fn new<M: DistanceModel + ?Sized>(center: Coord<f64>, radius_km: f64, model: &M) -> Self {
        Self {
            center,
            disc: model.disc(center, radius_km),
        }
    }
}

/// Axis-aligned bounding box of the polygon exterior
///
/// Returns `None` for an empty exterior.
pub fn compute_bounding_box(polygon: &Polygon<f64>) -> Option<Rect<f64>> {
    let coords: Vec<_> = polygon.exterior().coords().collect();
    if coords.is_empty() {
        return None;
    }

    let min_x = coords.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
    let max_x = coords.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = coords.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
    let max_y = coords.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

    Some(Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }))
}

/// Lazily generate equal-radius candidates covering `bbox`.
///
/// Rows are `2r` apart starting at `min_y + r`; within a row the spacing is
/// widened by the model's horizontal stretch at that row's ordinate.
pub fn generate<'a, M: DistanceModel + ?Sized>(
    bbox: Rect<f64>,
    radius_km: f64,
    model: &'a M,
) -> GridCandidates<'a, M> {
    let r = model.to_disc_radius(radius_km);
    GridCandidates {
        bbox,
        radius_km,
        r,
        model,
        y: bbox.min().y + r,
        x: None,
    }
}

/// Upper bound on the number of candidates [`generate`] yields for `bbox`.
///
/// Ignores the horizontal stretch, which only widens the spacing.
pub fn estimate_candidate_count<M: DistanceModel + ?Sized>(
    bbox: Rect<f64>,
    radius_km: f64,
    model: &M,
) -> f64 {
    let d = 2.0 * model.to_disc_radius(radius_km);
    if d <= 0.0 {
        return 0.0;
    }
    (bbox.width() / d).ceil() * (bbox.height() / d).ceil()
}

/// Row-major iterator over grid candidates, see [`generate`]
pub struct GridCandidates<'a, M: ?Sized> {
    bbox: Rect<f64>,
    radius_km: f64,
    r: f64,
    model: &'a M,
    y: f64,
    /// Next x in the current row and the row's horizontal radius
    x: Option<(f64, f64)>,
}

impl<'a, M: DistanceModel + ?Sized> Iterator for GridCandidates<'a, M> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if !(self.r > 0.0) {
            return None;
        }

        loop {
            if self.y >= self.bbox.max().y {
                return None;
            }

            let (x, rx) = match self.x {
                Some(state) => state,
                None => {
                    let rx = self.r * self.model.x_stretch(self.y);
                    (self.bbox.min().x + rx, rx)
                }
            };

            if x < self.bbox.max().x {
                self.x = Some((advance(x, 2.0 * rx), rx));
                let center = Coord { x, y: self.y };
                return Some(Candidate::new(center, self.radius_km, self.model));
            }

            // Row exhausted
            self.x = None;
            self.y = advance(self.y, 2.0 * self.r);
        }
    }
}

/// `from + step`, or infinity when the step is lost to rounding so the
/// sequence still terminates
fn advance(from: f64, step: f64) -> f64 {
    let next = from + step;
    if next > from {
        next
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance_model::{Geographic, Projected};
    use geo::LineString;

    fn square(size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (size, 0.0),
                (size, size),
                (0.0, size),
                (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_bounding_box() {
        let bbox = compute_bounding_box(&square(10.0)).unwrap();
        assert_eq!(bbox.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bbox.max(), Coord { x: 10.0, y: 10.0 });

        let empty = Polygon::new(LineString::new(vec![]), vec![]);
        assert!(compute_bounding_box(&empty).is_none());
    }

    #[test]
    fn test_projected_grid_spacing() {
        let model = Projected::default();
        let bbox = compute_bounding_box(&square(100_000.0)).unwrap();
        let centers: Vec<_> = generate(bbox, 10.0, &model).map(|c| c.center).collect();

        assert_eq!(centers.len(), 25);
        assert_eq!(centers[0], Coord { x: 10_000.0, y: 10_000.0 });
        assert_eq!(centers[1], Coord { x: 30_000.0, y: 10_000.0 });
        assert_eq!(centers[5], Coord { x: 10_000.0, y: 30_000.0 });
        assert_eq!(centers[24], Coord { x: 90_000.0, y: 90_000.0 });
    }

    #[test]
    fn test_geographic_rows_widen_with_latitude() {
        let model = Geographic::default();
        let bbox = Rect::new(Coord { x: 0.0, y: 59.0 }, Coord { x: 2.0, y: 61.0 });
        let row: Vec<_> = generate(bbox, 11.1, &model).collect();
        assert!(!row.is_empty());

        let first_y = row[0].center.y;
        let same_row: Vec<_> = row.iter().filter(|c| c.center.y == first_y).collect();
        assert!(same_row.len() >= 2);
        let dx = same_row[1].center.x - same_row[0].center.x;
        let expected = 2.0 * 0.1 * model.x_stretch(first_y);
        assert!((dx - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_smaller_than_radius_is_empty() {
        let model = Projected::default();
        let bbox = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 50_000.0, y: 500.0 });
        assert_eq!(generate(bbox, 1.0, &model).count(), 0);

        let bbox = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 500.0, y: 50_000.0 });
        assert_eq!(generate(bbox, 1.0, &model).count(), 0);
    }

    #[test]
    fn test_regenerating_is_equivalent() {
        let model = Geographic::default();
        let bbox = Rect::new(Coord { x: 10.0, y: 40.0 }, Coord { x: 12.0, y: 41.0 });
        let a: Vec<_> = generate(bbox, 5.0, &model).map(|c| c.center).collect();
        let b: Vec<_> = generate(bbox, 5.0, &model).map(|c| c.center).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_vanishing_spacing_still_terminates() {
        // A radius far below f64 resolution at these coordinates
        let model = Geographic { km_per_degree: 1e300 };
        let bbox = Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 20.0, y: 20.0 });
        let centers: Vec<_> = generate(bbox, 1.0, &model).take(5).map(|c| c.center).collect();
        assert_eq!(centers, vec![Coord { x: 10.0, y: 10.0 }]);
    }

    #[test]
    fn test_estimate_candidate_count() {
        let model = Projected::default();
        let bbox = compute_bounding_box(&square(100_000.0)).unwrap();
        assert_eq!(estimate_candidate_count(bbox, 10.0, &model), 25.0);
    }
}
