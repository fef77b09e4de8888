use anyhow::{Context, Result};
use geo::{Coord, Geometry, Polygon};
use geo::algorithm::area::Area;
use geo::algorithm::contains::Contains;
use geojson::{Feature, GeoJson};
use std::path::Path;
use tracing::{debug, warn};

/// Property holding the region name in most boundary datasets
pub const DEFAULT_NAME_PROPERTY: &str = "name";

/// A named region boundary
#[derive(Debug, Clone)]
pub struct NamedRegion {
    pub name: String,
    pub polygon: Polygon<f64>,
}

/// Region boundaries that can be looked up by name or by location
#[derive(Debug, Clone, Default)]
pub struct BoundaryDataset {
    regions: Vec<NamedRegion>,
}

impl BoundaryDataset {
    pub fn from_regions(regions: Vec<NamedRegion>) -> Self {
        Self { regions }
    }

    /// Load a GeoJSON file, naming each feature by `name_property`
    pub fn load_geojson(path: &Path, name_property: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read boundary file {}", path.display()))?;
        let dataset = Self::from_geojson_str(&data, name_property)
            .with_context(|| format!("Failed to load boundaries from {}", path.display()))?;
        debug!(path = %path.display(), regions = dataset.len(), "boundary dataset loaded");
        Ok(dataset)
    }

    /// Parse a GeoJSON `FeatureCollection` (or single `Feature`).
    ///
    /// Features without a string name or without polygonal geometry are
    /// skipped. Multi-part geometries are reduced to their largest part.
    pub fn from_geojson_str(data: &str, name_property: &str) -> Result<Self> {
        let geojson: GeoJson = data.parse().context("Failed to parse GeoJSON")?;

        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                anyhow::bail!("Expected a FeatureCollection, found a bare geometry")
            }
        };

        let mut regions = Vec::new();
        for feature in features {
            if let Some(region) = feature_to_region(feature, name_property)? {
                regions.push(region);
            }
        }

        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Boundary of the first region named exactly `name`
    pub fn find(&self, name: &str) -> Option<&Polygon<f64>> {
        self.regions.iter().find(|r| r.name == name).map(|r| &r.polygon)
    }

    /// Region names in dataset order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }

    /// Name of the first region whose boundary contains `point`
    pub fn region_containing(&self, point: Coord<f64>) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.polygon.contains(&point))
            .map(|r| r.name.as_str())
    }
}

fn feature_to_region(feature: Feature, name_property: &str) -> Result<Option<NamedRegion>> {
    let Some(name) = feature
        .property(name_property)
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        debug!(property = name_property, "skipping feature without a name");
        return Ok(None);
    };

    let Some(geometry) = feature.geometry else {
        debug!(region = %name, "skipping feature without geometry");
        return Ok(None);
    };

    let geometry = Geometry::<f64>::try_from(geometry)
        .with_context(|| format!("Invalid geometry for region '{}'", name))?;

    Ok(largest_polygon(geometry, &name).map(|polygon| NamedRegion { name, polygon }))
}

fn largest_polygon(geometry: Geometry<f64>, name: &str) -> Option<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(polygon),
        Geometry::MultiPolygon(multi) => {
            let parts = multi.0.len();
            if parts > 1 {
                warn!(region = %name, parts, "multi-part boundary, keeping the largest part");
            }
            multi.0.into_iter().max_by(|a, b| {
                a.unsigned_area()
                    .partial_cmp(&b.unsigned_area())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        }
        _ => {
            debug!(region = %name, "skipping non-polygonal geometry");
            None
        }
    }
}
