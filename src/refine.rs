use std::fmt;

use geo::{Coord, Polygon};
use geo::algorithm::contains::Contains;
use tracing::trace;

use crate::distance_model::DistanceModel;
use crate::grid::Candidate;
use crate::ResultCircle;

/// Signed unit along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Neg,
    Zero,
    Pos,
}

impl Sign {
    /// Total mapping of an axis sum onto a sign; magnitudes above one clamp
    pub fn from_sum(sum: i32) -> Self {
        match sum.signum() {
            -1 => Sign::Neg,
            0 => Sign::Zero,
            _ => Sign::Pos,
        }
    }

    pub fn unit(self) -> i32 {
        match self {
            Sign::Neg => -1,
            Sign::Zero => 0,
            Sign::Pos => 1,
        }
    }

    fn factor(self) -> f64 {
        self.unit() as f64
    }

    fn symbol(self) -> char {
        match self {
            Sign::Neg => '-',
            Sign::Zero => '0',
            Sign::Pos => '+',
        }
    }
}

/// Push vector on the `{-1,0,+1} x {-1,0,+1}` lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub x: Sign,
    pub y: Sign,
}

impl Direction {
    pub const fn new(x: Sign, y: Sign) -> Self {
        Self { x, y }
    }

    /// Neighbour check order: top, then clockwise
    pub const NEIGHBOURS: [Direction; 8] = [
        Direction::new(Sign::Zero, Sign::Pos),
        Direction::new(Sign::Pos, Sign::Pos),
        Direction::new(Sign::Pos, Sign::Zero),
        Direction::new(Sign::Pos, Sign::Neg),
        Direction::new(Sign::Zero, Sign::Neg),
        Direction::new(Sign::Neg, Sign::Neg),
        Direction::new(Sign::Neg, Sign::Zero),
        Direction::new(Sign::Neg, Sign::Pos),
    ];

    pub fn is_diagonal(self) -> bool {
        self.x != Sign::Zero && self.y != Sign::Zero
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.x.symbol(), self.y.symbol())
    }
}

/// Outcome of refining one contested candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    Fitted(ResultCircle),
    /// No neighbour disc fits inside the polygon
    NoDirection,
    /// The radius fell below the minimum before the disc fit
    Exhausted(Direction),
}

/// Directions of the neighbour discs (at `max_km`) that fit inside `polygon`
pub fn accepted_neighbours<M: DistanceModel + ?Sized>(
    center: Coord<f64>,
    max_km: f64,
    polygon: &Polygon<f64>,
    model: &M,
) -> Vec<Direction> {
    let (dx, dy) = model.neighbor_offset(center, max_km);

    Direction::NEIGHBOURS
        .iter()
        .copied()
        .filter(|dir| {
            let neighbour = Coord {
                x: center.x + dir.x.factor() * dx,
                y: center.y + dir.y.factor() * dy,
            };
            polygon.contains(&model.disc(neighbour, max_km))
        })
        .collect()
}

/// Derive the push direction from the accepted neighbours.
///
/// A single neighbour gives its own direction. With several, only the
/// axis-aligned ones vote: their signs are summed per axis and clamped back
/// to a unit. The result may be `00`, in which case the disc shrinks in place.
pub fn resolve_direction(neighbours: &[Direction]) -> Option<Direction> {
    match neighbours {
        [] => None,
        [only] => Some(*only),
        many => {
            let (sum_x, sum_y) = many
                .iter()
                .filter(|d| !d.is_diagonal())
                .fold((0, 0), |(sx, sy), d| (sx + d.x.unit(), sy + d.y.unit()));
            Some(Direction::new(Sign::from_sum(sum_x), Sign::from_sum(sum_y)))
        }
    }
}

/// Push a contested candidate inward while shrinking it until it fits.
///
/// Every iteration moves the center one 1 km step along the resolved
/// direction and shrinks the radius by 1 km, starting at `max_km - 1`.
/// Gives up once the radius drops below `min_km`.
pub fn refine<M: DistanceModel + ?Sized>(
    candidate: &Candidate,
    polygon: &Polygon<f64>,
    min_km: u32,
    max_km: u32,
    model: &M,
) -> Refinement {
    let neighbours = accepted_neighbours(candidate.center, max_km as f64, polygon, model);
    let Some(direction) = resolve_direction(&neighbours) else {
        trace!(x = candidate.center.x, y = candidate.center.y, "no interior neighbours");
        return Refinement::NoDirection;
    };

    let mut center = candidate.center;
    for radius in (min_km..max_km).rev() {
        let (sx, sy) = model.step_size(center);
        center = Coord {
            x: center.x + direction.x.factor() * sx,
            y: center.y + direction.y.factor() * sy,
        };

        let shrunk = Candidate::new(center, radius as f64, model);
        if polygon.contains(&shrunk.disc) {
            trace!(%direction, radius, "border candidate fitted");
            return Refinement::Fitted(ResultCircle::new(center, radius));
        }
    }

    trace!(%direction, "border candidate exhausted");
    Refinement::Exhausted(direction)
}
