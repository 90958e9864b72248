use chrono::{NaiveDate, TimeZone, Utc};
use geo_types::{polygon, Polygon};
use s1burst::core::refine::{forward_search, search_refinement, RefineConfig};
use s1burst::{OrbitDirection, PolarisationMode, ProductType, SceneRecord, Track};

fn square(x0: f64, y0: f64, width: f64, height: f64) -> Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + width, y: y0),
        (x: x0 + width, y: y0 + height),
        (x: x0, y: y0 + height),
        (x: x0, y: y0),
    ]
}

fn aoi() -> Polygon<f64> {
    square(0.0, 0.0, 2.0, 2.0)
}

fn scene(
    identifier: &str,
    polarisation: PolarisationMode,
    direction: OrbitDirection,
    track: u16,
    last_track: u16,
    date: (i32, u32, u32),
    footprint: Polygon<f64>,
) -> SceneRecord {
    SceneRecord {
        identifier: identifier.to_string(),
        uuid: format!("uuid-{}", identifier),
        polarisation,
        orbit_direction: direction,
        acquisition_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        relative_orbit: Track::new(track),
        last_relative_orbit: last_track,
        product_type: ProductType::SLC,
        slice_number: 1,
        size: "4.1 GB".to_string(),
        begin_position: Utc.with_ymd_and_hms(date.0, date.1, date.2, 17, 8, 15).unwrap(),
        end_position: Utc.with_ymd_and_hms(date.0, date.1, date.2, 17, 8, 42).unwrap(),
        ingestion_date: Utc.with_ymd_and_hms(date.0, date.1, date.2, 23, 0, 0).unwrap(),
        footprint,
    }
}

/// Two tracks, two repeat cycles: the west strip covers 2.5 of the 4.0 AOI,
/// the east strip 2.0, so both tracks are needed for each mosaic.
fn two_track_inventory() -> Vec<SceneRecord> {
    let west = || square(0.0, 0.0, 1.25, 2.0);
    let east = || square(1.0, 0.0, 1.0, 2.0);
    vec![
        scene("scene-t1-d1", PolarisationMode::VVVH, OrbitDirection::Descending, 1, 1, (2020, 1, 1), west()),
        scene("scene-t2-d2", PolarisationMode::VVVH, OrbitDirection::Descending, 2, 2, (2020, 1, 6), east()),
        scene("scene-t1-d3", PolarisationMode::VVVH, OrbitDirection::Descending, 1, 1, (2020, 1, 13), west()),
        scene("scene-t2-d4", PolarisationMode::VVVH, OrbitDirection::Descending, 2, 2, (2020, 1, 18), east()),
    ]
}

#[test]
fn test_pipeline_finds_two_mosaic_windows() {
    let _ = env_logger::try_init();
    let combinations = search_refinement(&aoi(), &two_track_inventory(), &RefineConfig::default());
    assert_eq!(combinations.len(), 1);

    let combo = &combinations[0];
    assert_eq!(combo.key(), "DESCENDING_VVVH");
    assert_eq!(combo.coverage_count(), 2);
    assert_eq!(combo.records.len(), 4);

    assert_eq!(combo.windows[0].start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(combo.windows[0].end, NaiveDate::from_ymd_opt(2020, 1, 6).unwrap());
    assert_eq!(combo.windows[1].start, NaiveDate::from_ymd_opt(2020, 1, 13).unwrap());
    assert_eq!(combo.windows[1].end, NaiveDate::from_ymd_opt(2020, 1, 18).unwrap());
}

#[test]
fn test_pipeline_is_idempotent_on_its_own_output() {
    let _ = env_logger::try_init();
    let config = RefineConfig::default();
    let first = search_refinement(&aoi(), &two_track_inventory(), &config);
    let second = search_refinement(&aoi(), &first[0].records, &config);

    assert_eq!(second.len(), 1);
    assert_eq!(second[0].windows, first[0].windows);

    let mut once: Vec<&str> = first[0].records.iter().map(|r| r.identifier.as_str()).collect();
    let mut twice: Vec<&str> = second[0].records.iter().map(|r| r.identifier.as_str()).collect();
    once.sort_unstable();
    twice.sort_unstable();
    assert_eq!(once, twice);
}

#[test]
fn test_non_covering_combination_is_excluded() {
    let _ = env_logger::try_init();
    let mut inventory = two_track_inventory();
    // a VV-only acquisition far too small to ever cover the AOI
    inventory.push(scene(
        "scene-vv-small",
        PolarisationMode::VV,
        OrbitDirection::Descending,
        7,
        7,
        (2020, 1, 2),
        square(0.0, 0.0, 0.3, 0.3),
    ));

    let combinations = search_refinement(&aoi(), &inventory, &RefineConfig::default());
    assert_eq!(combinations.len(), 1);
    assert_eq!(combinations[0].polarisation, PolarisationMode::VVVH);
}

#[test]
fn test_non_covering_combination_kept_without_complete_coverage() {
    let _ = env_logger::try_init();
    let inventory = vec![scene(
        "scene-partial",
        PolarisationMode::VV,
        OrbitDirection::Descending,
        7,
        7,
        (2020, 1, 2),
        square(0.0, 0.0, 1.0, 2.0),
    )];
    let config = RefineConfig {
        complete_coverage: false,
        mosaic_refine: false,
        ..RefineConfig::default()
    };

    let combinations = search_refinement(&aoi(), &inventory, &config);
    assert_eq!(combinations.len(), 1);
    assert_eq!(combinations[0].records.len(), 1);
    assert!(combinations[0].windows.is_empty());
}

#[test]
fn test_equator_crossing_corrected_end_to_end() {
    let _ = env_logger::try_init();
    let full = || square(0.0, 0.0, 2.0, 2.0);
    let inventory = vec![
        // post-crossing frame carries the incremented relative orbit
        scene("scene-a", PolarisationMode::VVVH, OrbitDirection::Ascending, 118, 117, (2020, 1, 1), full()),
        scene("scene-b", PolarisationMode::VVVH, OrbitDirection::Ascending, 117, 117, (2020, 1, 13), full()),
    ];

    let combinations = search_refinement(&aoi(), &inventory, &RefineConfig::default());
    assert_eq!(combinations.len(), 1);

    let combo = &combinations[0];
    for row in &combo.records {
        assert_eq!(row.relative_orbit.orbit, row.last_relative_orbit);
    }
    // one full coverage per date since either frame covers the AOI alone
    assert_eq!(combo.coverage_count(), 2);
}

#[test]
fn test_forward_search_example_scenario() {
    let _ = env_logger::try_init();
    // AOI area 4.0, area_reduce 0.05: the cumulative intersection reaches
    // 4.0 >= 3.95 on the second date, closing [date1, date2]; date3 starts a
    // fresh, never-completed window.
    let rows = vec![
        scene("scene-1", PolarisationMode::VVVH, OrbitDirection::Descending, 1, 1, (2020, 3, 1), square(0.0, 0.0, 1.25, 2.0)),
        scene("scene-2", PolarisationMode::VVVH, OrbitDirection::Descending, 2, 2, (2020, 3, 7), square(1.0, 0.0, 1.5, 2.0)),
        scene("scene-3", PolarisationMode::VVVH, OrbitDirection::Descending, 1, 1, (2020, 3, 13), square(0.0, 0.0, 1.25, 2.0)),
    ];

    let (windows, _visited) = forward_search(&aoi(), &rows, 0.05);
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].start, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
    assert_eq!(windows[0].end, NaiveDate::from_ymd_opt(2020, 3, 7).unwrap());
}
