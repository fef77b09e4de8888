use tracing::debug;

use crate::boundary::BoundaryDataset;
use crate::ResultCircle;

/// Label each circle with the sub-region containing its center.
///
/// Circles whose center falls outside every sub-region keep their label.
/// Returns the number of circles labeled.
pub fn label_circles(circles: &mut [ResultCircle], subregions: &BoundaryDataset) -> usize {
    let mut labeled = 0;

    for circle in circles.iter_mut() {
        if let Some(name) = subregions.region_containing(circle.center) {
            circle.label = Some(name.to_string());
            labeled += 1;
        }
    }

    debug!(labeled, total = circles.len(), "circle sub-region names assigned");
    labeled
}
