use anyhow::{Context, Result};
use geo::{Coord, Polygon};
use svg::node::element::path::Data;
use svg::node::element::{Ellipse, Group, Path, Rectangle};
use svg::Document;
use tracing::debug;

use crate::distance_model::DistanceModel;
use crate::grid::compute_bounding_box;
use crate::ResultCircle;

const STROKE_WIDTH: f64 = 1.0;
const MARGIN: f64 = 20.0;

/// Plot bounding box, boundary and circles of one region as an SVG file.
///
/// `scale` is pixels per coordinate unit. The y axis is flipped so north is
/// up for geographic data.
pub fn write_svg<M: DistanceModel + ?Sized>(
    output_path: &std::path::Path,
    title: &str,
    boundary: &Polygon<f64>,
    circles: &[ResultCircle],
    model: &M,
    scale: f64,
) -> Result<()> {
    let bbox = compute_bounding_box(boundary).context("Cannot plot an empty boundary")?;
    let min_x = bbox.min().x;
    let max_y = bbox.max().y;

    let width = bbox.width() * scale;
    let height = bbox.height() * scale;
    let to_px = |c: Coord<f64>| ((c.x - min_x) * scale + MARGIN, (max_y - c.y) * scale + MARGIN);

    let mut document = Document::new()
        .set("viewBox", (0, 0, width as i32 + 40, height as i32 + 40))
        .set("width", format!("{}px", width as i32 + 40))
        .set("height", format!("{}px", height as i32 + 40))
        .set("data-region", title);

    let bbox_rect = Rectangle::new()
        .set("x", MARGIN)
        .set("y", MARGIN)
        .set("width", width)
        .set("height", height)
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", STROKE_WIDTH);
    document = document.add(bbox_rect);

    // Boundary polygon
    let mut path_data = Data::new();
    for (i, coord) in boundary.exterior().coords().enumerate() {
        let (x, y) = to_px(*coord);
        if i == 0 {
            path_data = path_data.move_to((x, y));
        } else {
            path_data = path_data.line_to((x, y));
        }
    }
    path_data = path_data.close();

    let boundary_path = Path::new()
        .set("fill", "none")
        .set("stroke", "blue")
        .set("stroke-width", STROKE_WIDTH)
        .set("d", path_data);
    document = document.add(boundary_path);

    // Circles, stretched along x where the model needs it
    let mut circles_group = Group::new()
        .set("fill", "none")
        .set("stroke", "red")
        .set("stroke-width", STROKE_WIDTH);

    for circle in circles {
        let (cx, cy) = to_px(circle.center);
        let r = model.to_disc_radius(circle.radius as f64) * scale;
        let ellipse = Ellipse::new()
            .set("cx", cx)
            .set("cy", cy)
            .set("rx", r * model.x_stretch(circle.center.y))
            .set("ry", r);
        circles_group = circles_group.add(ellipse);
    }
    document = document.add(circles_group);

    svg::save(output_path, &document)
        .with_context(|| format!("Failed to write SVG {}", output_path.display()))?;

    debug!(path = %output_path.display(), circles = circles.len(), "SVG plot written");
    Ok(())
}

/// Pixels per coordinate unit that make the longer bbox side `target_px` wide
pub fn fit_scale(boundary: &Polygon<f64>, target_px: f64) -> f64 {
    compute_bounding_box(boundary)
        .map(|bbox| bbox.width().max(bbox.height()))
        .filter(|extent| *extent > 0.0)
        .map(|extent| target_px / extent)
        .unwrap_or(1.0)
}
