use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::coverage::RadiusRange;
use crate::ResultCircle;

/// Decimal places kept for center coordinates
const COORD_DECIMALS: i32 = 7;

#[derive(Debug, Serialize)]
struct CircleRow {
    region: String,
    x: f64,
    y: f64,
    radius: u32,
}

/// `{dir}/{region}__{min}-{max}.csv`
pub fn output_path(dir: &Path, region: &str, radii: RadiusRange) -> PathBuf {
    dir.join(format!("{}__{}-{}.csv", region, radii.min_km, radii.max_km))
}

/// Write circles of `region` as CSV rows.
///
/// Columns are `Region, Longitude, Latitude, Radius` for geographic data and
/// `Region, X, Y, Radius` otherwise. The region cell is `{region}_{label}`.
pub fn write_csv(path: &Path, region: &str, circles: &[ResultCircle], geographic: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    let header = if geographic {
        ["Region", "Longitude", "Latitude", "Radius"]
    } else {
        ["Region", "X", "Y", "Radius"]
    };
    writer.write_record(header)?;

    for circle in circles {
        writer.serialize(CircleRow {
            region: format!("{}_{}", region, circle.label.as_deref().unwrap_or("")),
            x: round_coord(circle.center.x),
            y: round_coord(circle.center.y),
            radius: circle.radius,
        })?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

fn round_coord(value: f64) -> f64 {
    let factor = 10f64.powi(COORD_DECIMALS);
    (value * factor).round() / factor
}
