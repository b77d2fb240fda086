//! Loading country features from GeoJSON.
//!
//! Accepts a `FeatureCollection` or a single `Feature`. Every feature with a
//! `Polygon` or `MultiPolygon` geometry becomes a [`CountryFeature`] named by
//! a string property (usually `"name"`).

use crate::error::{GeomoirError, Result};
use crate::index::CountryFeature;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Value};
use std::path::Path;

/// Parse country features from a GeoJSON document.
pub fn countries_from_geojson(text: &str, name_property: &str) -> Result<Vec<CountryFeature>> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(GeomoirError::InvalidInput(
                "GeoJSON must contain features, found a bare geometry".to_string(),
            ));
        }
    };

    let mut countries = Vec::with_capacity(features.len());
    for (position, feature) in features.iter().enumerate() {
        let name = feature_name(feature, name_property, position)?;

        let Some(geometry) = &feature.geometry else {
            log::warn!("Skipping feature '{}' without geometry", name);
            continue;
        };

        match multi_polygon(&geometry.value)? {
            Some(geometry) => countries.push(CountryFeature::new(name, geometry)),
            None => log::warn!(
                "Skipping feature '{}' with unsupported geometry type {}",
                name,
                geometry_type(&geometry.value)
            ),
        }
    }

    log::info!("Loaded {} country features", countries.len());
    Ok(countries)
}

/// Read and parse a GeoJSON file of country features.
pub fn load_countries<P: AsRef<Path>>(path: P, name_property: &str) -> Result<Vec<CountryFeature>> {
    let text = std::fs::read_to_string(path)?;
    countries_from_geojson(&text, name_property)
}

fn feature_name(feature: &Feature, name_property: &str, position: usize) -> Result<String> {
    match feature.property(name_property) {
        Some(value) => value.as_str().map(str::to_string).ok_or_else(|| {
            GeomoirError::InvalidInput(format!(
                "feature #{} has a non-string '{}' property",
                position, name_property
            ))
        }),
        None => Err(GeomoirError::InvalidInput(format!(
            "feature #{} has no '{}' property",
            position, name_property
        ))),
    }
}

fn multi_polygon(value: &Value) -> Result<Option<MultiPolygon<f64>>> {
    match value {
        Value::Polygon(rings) => Ok(Some(MultiPolygon::new(vec![polygon(rings)?]))),
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon::new(polygons)))
        }
        _ => Ok(None),
    }
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err(GeomoirError::InvalidInput(
            "Polygon must have at least one ring".to_string(),
        ));
    };

    let interiors = interiors
        .iter()
        .map(|r| ring(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(ring(exterior)?, interiors))
}

fn ring(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(GeomoirError::InvalidInput(
                "Coordinate must have at least 2 values".to_string(),
            )),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}
