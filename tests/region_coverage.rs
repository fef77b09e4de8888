use circle_cover::batch::{run_region, BatchOptions};
use circle_cover::boundary::{BoundaryDataset, DEFAULT_NAME_PROPERTY};
use circle_cover::{
    compute_region_coverage, CoordinateMode, CoverageConfig, CoverageError, DistanceModel, RadiusRange,
};
use geo::Contains;

/// Two projected (meter) countries and two provinces splitting the first
const COUNTRIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "name": "Squareland" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [100000, 0], [100000, 100000], [0, 100000], [0, 0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "name": "Notch" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [0, 0], [90000, 0], [90000, 45000], [55000, 45000],
                    [55000, 75000], [90000, 75000], [90000, 130000], [0, 130000], [0, 0]
                ]]
            }
        }
    ]
}"#;

const PROVINCES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "name_en": "South" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [100000, 0], [100000, 50000], [0, 50000], [0, 0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "name_en": "North" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 50000], [100000, 50000], [100000, 100000], [0, 100000], [0, 50000]]]
            }
        }
    ]
}"#;

fn config() -> CoverageConfig {
    CoverageConfig::new(1, 10, CoordinateMode::Projected, None).unwrap()
}

#[test]
fn unknown_region_is_not_an_empty_success() {
    let dataset = BoundaryDataset::from_geojson_str(COUNTRIES, DEFAULT_NAME_PROPERTY).unwrap();
    let config = config();

    let result = compute_region_coverage(&dataset, "Atlantis", config.radii, &config.coordinate_system);
    assert_eq!(result, Err(CoverageError::RegionNotFound("Atlantis".to_string())));
}

#[test]
fn non_convex_region_circles_fit() {
    let dataset = BoundaryDataset::from_geojson_str(COUNTRIES, DEFAULT_NAME_PROPERTY).unwrap();
    let config = config();
    let model = &config.coordinate_system;

    let circles = compute_region_coverage(&dataset, "Notch", config.radii, model).unwrap();
    let polygon = dataset.find("Notch").unwrap();

    assert!(circles.iter().any(|c| c.radius == 10));
    assert!(circles.iter().any(|c| c.radius < 10));
    for circle in &circles {
        assert!(RadiusRange::new(1, 10).unwrap().contains(circle.radius));
        assert!(polygon.contains(&model.disc(circle.center, circle.radius as f64)));
    }
}

#[test]
fn region_run_writes_labeled_csv() {
    let dataset = BoundaryDataset::from_geojson_str(COUNTRIES, DEFAULT_NAME_PROPERTY).unwrap();
    let provinces = BoundaryDataset::from_geojson_str(PROVINCES, "name_en").unwrap();
    let output_dir = std::env::temp_dir().join(format!("circle-cover-it-{}", std::process::id()));

    let options = BatchOptions {
        config: config(),
        output_dir: output_dir.clone(),
        svg_dir: Some(output_dir.join("maps")),
        candidate_limit: None,
    };

    let summary = run_region(&dataset, Some(&provinces), "Squareland", &options).unwrap();
    assert_eq!(summary.circles, 25);
    assert!(!summary.used_fallback);
    assert_eq!(summary.csv_path, output_dir.join("Squareland__1-10.csv"));

    let csv = std::fs::read_to_string(&summary.csv_path).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Region,X,Y,Radius");
    assert_eq!(lines.len(), 26);
    assert_eq!(lines[1], "Squareland_South,10000.0,10000.0,10");
    assert!(lines.iter().any(|l| l.starts_with("Squareland_North,")));

    assert!(output_dir.join("maps").join("Squareland__1-10.svg").exists());

    std::fs::remove_dir_all(&output_dir).ok();
}
