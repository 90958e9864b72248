//! Persistence of scene and burst inventories.
//!
//! Both tables are stored as GeoJSON FeatureCollections (one feature per
//! row, WGS84). The property names are a format contract consumed by the
//! batch orchestrator and must not change.

use chrono::{DateTime, NaiveDate, Utc};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use geo_types::Polygon;
use serde_json::{json, Map};
use std::fs;
use std::path::Path;

use crate::types::{BurstRecord, S1Error, S1Result, SceneRecord};

const DATE_FORMAT: &str = "%Y%m%d";

/// Write the scene inventory to a GeoJSON file
pub fn write_scene_inventory(path: &Path, records: &[SceneRecord]) -> S1Result<()> {
    let features = records.iter().map(scene_to_feature).collect();
    write_collection(path, features)?;
    log::info!("Wrote {} scenes to {}", records.len(), path.display());
    Ok(())
}

/// Read a scene inventory written by [`write_scene_inventory`]
pub fn read_scene_inventory(path: &Path) -> S1Result<Vec<SceneRecord>> {
    read_collection(path)?
        .features
        .iter()
        .map(scene_from_feature)
        .collect()
}

/// Write the burst catalogue to a GeoJSON file
pub fn write_burst_inventory(path: &Path, records: &[BurstRecord]) -> S1Result<()> {
    let features = records.iter().map(burst_to_feature).collect();
    write_collection(path, features)?;
    log::info!("Wrote {} bursts to {}", records.len(), path.display());
    Ok(())
}

/// Read a burst catalogue written by [`write_burst_inventory`]
pub fn read_burst_inventory(path: &Path) -> S1Result<Vec<BurstRecord>> {
    read_collection(path)?
        .features
        .iter()
        .map(burst_from_feature)
        .collect()
}

fn write_collection(path: &Path, features: Vec<Feature>) -> S1Result<()> {
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

fn read_collection(path: &Path) -> S1Result<FeatureCollection> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(S1Error::InvalidInventory(format!(
            "{} is not a FeatureCollection",
            path.display()
        ))),
    }
}

fn scene_to_feature(record: &SceneRecord) -> Feature {
    let mut properties = Map::new();
    properties.insert("identifier".to_string(), json!(record.identifier));
    properties.insert(
        "polarisationmode".to_string(),
        json!(record.polarisation.to_string()),
    );
    properties.insert(
        "orbitdirection".to_string(),
        json!(record.orbit_direction.to_string()),
    );
    properties.insert(
        "acquisitiondate".to_string(),
        json!(record.acquisition_date.format(DATE_FORMAT).to_string()),
    );
    properties.insert(
        "relativeorbit".to_string(),
        json!(record.relative_orbit.to_string()),
    );
    properties.insert(
        "lastrelativeorbitnumber".to_string(),
        json!(record.last_relative_orbit),
    );
    properties.insert(
        "producttype".to_string(),
        json!(record.product_type.to_string()),
    );
    properties.insert("slicenumber".to_string(), json!(record.slice_number));
    properties.insert("size".to_string(), json!(record.size));
    properties.insert(
        "beginposition".to_string(),
        json!(record.begin_position.to_rfc3339()),
    );
    properties.insert(
        "endposition".to_string(),
        json!(record.end_position.to_rfc3339()),
    );
    properties.insert(
        "ingestiondate".to_string(),
        json!(record.ingestion_date.to_rfc3339()),
    );
    properties.insert("uuid".to_string(), json!(record.uuid));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&record.footprint))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn scene_from_feature(feature: &Feature) -> S1Result<SceneRecord> {
    Ok(SceneRecord {
        identifier: prop_str(feature, "identifier")?.to_string(),
        uuid: prop_str(feature, "uuid")?.to_string(),
        polarisation: prop_str(feature, "polarisationmode")?.parse()?,
        orbit_direction: prop_str(feature, "orbitdirection")?.parse()?,
        acquisition_date: parse_date(prop_str(feature, "acquisitiondate")?)?,
        relative_orbit: prop_str(feature, "relativeorbit")?.parse()?,
        last_relative_orbit: prop_u64(feature, "lastrelativeorbitnumber")? as u16,
        product_type: prop_str(feature, "producttype")?.parse()?,
        slice_number: prop_u64(feature, "slicenumber")? as u32,
        size: prop_str(feature, "size")?.to_string(),
        begin_position: parse_timestamp(prop_str(feature, "beginposition")?)?,
        end_position: parse_timestamp(prop_str(feature, "endposition")?)?,
        ingestion_date: parse_timestamp(prop_str(feature, "ingestiondate")?)?,
        footprint: feature_polygon(feature)?,
    })
}

fn burst_to_feature(record: &BurstRecord) -> Feature {
    let mut properties = Map::new();
    properties.insert("SceneID".to_string(), json!(record.scene_id));
    properties.insert("Track".to_string(), json!(record.track));
    properties.insert(
        "Direction".to_string(),
        json!(record.direction.to_string()),
    );
    properties.insert(
        "Date".to_string(),
        json!(record.date.format(DATE_FORMAT).to_string()),
    );
    properties.insert("SwathID".to_string(), json!(record.swath.to_string()));
    properties.insert("AnxTime".to_string(), json!(record.anx_time));
    properties.insert("BurstNr".to_string(), json!(record.burst_nr));
    properties.insert("bid".to_string(), json!(record.bid));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&record.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn burst_from_feature(feature: &Feature) -> S1Result<BurstRecord> {
    Ok(BurstRecord {
        bid: prop_str(feature, "bid")?.to_string(),
        scene_id: prop_str(feature, "SceneID")?.to_string(),
        track: prop_u64(feature, "Track")? as u16,
        direction: prop_str(feature, "Direction")?.parse()?,
        date: parse_date(prop_str(feature, "Date")?)?,
        swath: prop_str(feature, "SwathID")?.parse()?,
        anx_time: prop_i64(feature, "AnxTime")?,
        burst_nr: prop_u64(feature, "BurstNr")? as u32,
        geometry: feature_polygon(feature)?,
    })
}

fn prop_str<'a>(feature: &'a Feature, key: &str) -> S1Result<&'a str> {
    feature
        .property(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| missing_column(key))
}

fn prop_u64(feature: &Feature, key: &str) -> S1Result<u64> {
    feature
        .property(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| missing_column(key))
}

fn prop_i64(feature: &Feature, key: &str) -> S1Result<i64> {
    feature
        .property(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| missing_column(key))
}

fn feature_polygon(feature: &Feature) -> S1Result<Polygon<f64>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| missing_column("geometry"))?;
    Ok(Polygon::try_from(geometry.value.clone())?)
}

fn missing_column(key: &str) -> S1Error {
    S1Error::InvalidInventory(format!("inventory is missing required column {}", key))
}

fn parse_date(value: &str) -> S1Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| S1Error::InvalidFormat(format!("invalid date {}: {}", value, e)))
}

fn parse_timestamp(value: &str) -> S1Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| S1Error::InvalidFormat(format!("invalid timestamp {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrbitDirection, PolarisationMode, ProductType, Subswath, Track};
    use chrono::TimeZone;
    use geo_types::polygon;
    use tempfile::tempdir;

    fn footprint() -> Polygon<f64> {
        polygon![
            (x: 8.0, y: 47.0),
            (x: 9.0, y: 47.0),
            (x: 9.0, y: 48.0),
            (x: 8.0, y: 48.0),
            (x: 8.0, y: 47.0),
        ]
    }

    fn scene() -> SceneRecord {
        SceneRecord {
            identifier: "S1A_IW_SLC__1SDV_20200103T170815_20200103T170842_030639_0382D5_DADE"
                .to_string(),
            uuid: "0f2e8c31".to_string(),
            polarisation: PolarisationMode::VVVH,
            orbit_direction: OrbitDirection::Ascending,
            acquisition_date: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            relative_orbit: Track::with_segment(117, 2),
            last_relative_orbit: 117,
            product_type: ProductType::SLC,
            slice_number: 7,
            size: "4.1 GB".to_string(),
            begin_position: Utc.with_ymd_and_hms(2020, 1, 3, 17, 8, 15).unwrap(),
            end_position: Utc.with_ymd_and_hms(2020, 1, 3, 17, 8, 42).unwrap(),
            ingestion_date: Utc.with_ymd_and_hms(2020, 1, 4, 3, 12, 9).unwrap(),
            footprint: footprint(),
        }
    }

    #[test]
    fn test_scene_inventory_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.geojson");

        write_scene_inventory(&path, &[scene()]).unwrap();
        let restored = read_scene_inventory(&path).unwrap();
        assert_eq!(restored, vec![scene()]);
    }

    #[test]
    fn test_burst_inventory_persistence() {
        let record = BurstRecord {
            bid: "A117_IW1_12780".to_string(),
            scene_id: scene().identifier,
            track: 117,
            direction: OrbitDirection::Ascending,
            date: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            swath: Subswath::IW1,
            anx_time: 12780,
            burst_nr: 4,
            geometry: footprint(),
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("bursts.geojson");
        write_burst_inventory(&path, &[record.clone()]).unwrap();
        let restored = read_burst_inventory(&path).unwrap();
        assert_eq!(restored, vec![record]);
    }

    #[test]
    fn test_missing_column_is_a_hard_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{"identifier":"x"}}]}"#,
        )
        .unwrap();

        assert!(matches!(
            read_scene_inventory(&path),
            Err(S1Error::InvalidInventory(_))
        ));
    }
}
