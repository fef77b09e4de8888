use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::boundary::BoundaryDataset;
use crate::config::CoverageConfig;
use crate::coverage::compute_coverage_report;
use crate::csv_output;
use crate::error::CoverageError;
use crate::grid::{compute_bounding_box, estimate_candidate_count};
use crate::label::label_circles;
use crate::svg_output;

/// Refuse grids above this many candidates unless overridden
pub const DEFAULT_CANDIDATE_LIMIT: f64 = 10e6;

/// Width in pixels of the longer side of SVG plots
const SVG_TARGET_PX: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub config: CoverageConfig,
    pub output_dir: PathBuf,
    pub svg_dir: Option<PathBuf>,
    /// `None` disables the candidate limit
    pub candidate_limit: Option<f64>,
}

/// What a successful region run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub circles: usize,
    pub used_fallback: bool,
    pub csv_path: PathBuf,
}

#[derive(Debug)]
pub struct RegionOutcome {
    pub region: String,
    pub result: Result<RegionSummary>,
}

/// Cover one region, label its circles and write its outputs
pub fn run_region(
    dataset: &BoundaryDataset,
    subregions: Option<&BoundaryDataset>,
    name: &str,
    options: &BatchOptions,
) -> Result<RegionSummary> {
    let config = &options.config;
    let model = &config.coordinate_system;

    let polygon = dataset
        .find(name)
        .ok_or_else(|| CoverageError::RegionNotFound(name.to_string()))?;

    if let (Some(limit), Some(bbox)) = (options.candidate_limit, compute_bounding_box(polygon)) {
        let estimate = estimate_candidate_count(bbox, config.radii.min_km as f64, model);
        if estimate > limit {
            anyhow::bail!(
                "region '{}' may need up to {} candidates (limit {}); override the limit to run it anyway",
                name,
                estimate,
                limit
            );
        }
    }

    let mut report = compute_coverage_report(polygon, config.radii, model)?;

    if let Some(subregions) = subregions {
        label_circles(&mut report.circles, subregions);
    }

    let csv_path = csv_output::output_path(&options.output_dir, name, config.radii);
    csv_output::write_csv(&csv_path, name, &report.circles, model.is_geographic())?;

    if let Some(ref svg_dir) = options.svg_dir {
        std::fs::create_dir_all(svg_dir)
            .with_context(|| format!("Failed to create SVG directory {}", svg_dir.display()))?;
        let svg_path = svg_dir.join(format!(
            "{}__{}-{}.svg",
            name, config.radii.min_km, config.radii.max_km
        ));
        let scale = svg_output::fit_scale(polygon, SVG_TARGET_PX);
        svg_output::write_svg(&svg_path, name, polygon, &report.circles, model, scale)?;
    }

    info!(
        region = %name,
        circles = report.circles.len(),
        fallback = report.used_fallback(),
        "region covered"
    );

    Ok(RegionSummary {
        circles: report.circles.len(),
        used_fallback: report.used_fallback(),
        csv_path,
    })
}

/// Run every region in `names` in parallel.
///
/// Each run owns its own results. A failed region does not stop the others;
/// once `interrupted` is set, regions not yet started are skipped.
pub fn run_batch(
    dataset: &BoundaryDataset,
    subregions: Option<&BoundaryDataset>,
    names: &[String],
    options: &BatchOptions,
    interrupted: &AtomicBool,
) -> Vec<RegionOutcome> {
    names
        .par_iter()
        .map(|name| {
            let result = if interrupted.load(Ordering::SeqCst) {
                Err(anyhow::anyhow!("skipped after interrupt"))
            } else {
                run_region(dataset, subregions, name, options)
            };

            if let Err(ref e) = result {
                warn!(region = %name, error = %e, "region failed");
            }

            RegionOutcome { region: name.clone(), result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::NamedRegion;
    use crate::config::CoordinateMode;
    use geo::{LineString, Polygon};

    fn dataset() -> BoundaryDataset {
        BoundaryDataset::from_regions(vec![NamedRegion {
            name: "Block".to_string(),
            polygon: Polygon::new(
                LineString::from(vec![
                    (0.0, 0.0),
                    (40_000.0, 0.0),
                    (40_000.0, 40_000.0),
                    (0.0, 40_000.0),
                    (0.0, 0.0),
                ]),
                vec![],
            ),
        }])
    }

    fn options(dir: &str, candidate_limit: Option<f64>) -> BatchOptions {
        BatchOptions {
            config: CoverageConfig::new(1, 10, CoordinateMode::Projected, None).unwrap(),
            output_dir: std::env::temp_dir().join(format!("circle-cover-{}-{}", dir, std::process::id())),
            svg_dir: None,
            candidate_limit,
        }
    }

    #[test]
    fn test_unknown_region_is_reported() {
        let opts = options("unknown", None);
        let err = run_region(&dataset(), None, "Nowhere", &opts).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoverageError>(),
            Some(&CoverageError::RegionNotFound("Nowhere".to_string()))
        );
    }

    #[test]
    fn test_candidate_limit() {
        let opts = options("limit", Some(10.0));
        assert!(run_region(&dataset(), None, "Block", &opts).is_err());
    }

    #[test]
    fn test_batch_keeps_going_after_failure() {
        let opts = options("batch", Some(DEFAULT_CANDIDATE_LIMIT));
        let names = vec!["Block".to_string(), "Nowhere".to_string()];
        let outcomes = run_batch(&dataset(), None, &names, &opts, &AtomicBool::new(false));

        assert_eq!(outcomes.len(), 2);
        let block = outcomes[0].result.as_ref().unwrap();
        assert_eq!(block.circles, 4);
        assert!(block.csv_path.exists());
        assert!(outcomes[1].result.is_err());

        std::fs::remove_dir_all(&opts.output_dir).ok();
    }

    #[test]
    fn test_unwritable_svg_dir_is_reported() {
        let mut opts = options("svg-blocked", None);
        std::fs::create_dir_all(&opts.output_dir).unwrap();
        let blocker = opts.output_dir.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        opts.svg_dir = Some(blocker.join("maps"));

        let err = run_region(&dataset(), None, "Block", &opts).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to create SVG directory"));

        std::fs::remove_dir_all(&opts.output_dir).ok();
    }

    #[test]
    fn test_interrupted_batch_skips_regions() {
        let opts = options("interrupted", None);
        let names = vec!["Block".to_string()];
        let outcomes = run_batch(&dataset(), None, &names, &opts, &AtomicBool::new(true));
        assert!(outcomes[0].result.is_err());
        assert!(!opts.output_dir.exists());
    }
}
