use chrono::NaiveDate;
use geo_types::{Coord, LineString, Polygon};
use std::collections::HashMap;

use crate::io::annotation::SwathAnnotation;
use crate::types::{BurstFootprint, ORBITAL_PERIOD_SECONDS};

/// Burst footprint extractor: converts one subswath's annotation
/// (burst list + geolocation grid) into per-burst footprint records.
///
/// A burst spans `linesPerBurst` azimuth lines; its four corners are the
/// geolocation-grid entries at the first/last line and the first/last pixel.
pub fn extract_burst_footprints(
    scene_id: &str,
    track: u16,
    date: NaiveDate,
    annotation: &SwathAnnotation,
) -> Vec<BurstFootprint> {
    // Corner coordinates keyed by grid line, for the near and far range edge
    let mut first: HashMap<i64, Coord<f64>> = HashMap::new();
    let mut last: HashMap<i64, Coord<f64>> = HashMap::new();

    for point in &annotation.grid {
        let coord = Coord {
            x: round3(point.longitude),
            y: round3(point.latitude),
        };
        if point.pixel == 0 {
            first.insert(point.line, coord);
        } else if point.pixel == annotation.samples_per_burst - 1 {
            last.insert(point.line, coord);
        }
    }

    let mut footprints = Vec::with_capacity(annotation.burst_anx_times.len());

    for (i, raw_anx) in annotation.burst_anx_times.iter().enumerate() {
        let firstline = i as i64 * annotation.lines_per_burst;
        let lastline = (i as i64 + 1) * annotation.lines_per_burst;

        let mut ring: Vec<Coord<f64>> = Vec::with_capacity(5);

        // Fixed winding: first-line/first-pixel, first-line/last-pixel,
        // last-line/last-pixel, last-line/first-pixel
        push_corner(&mut ring, &first, firstline, scene_id, "first line/first pixel");
        push_corner(&mut ring, &last, firstline, scene_id, "first line/last pixel");
        push_corner(&mut ring, &last, lastline, scene_id, "last line/last pixel");
        push_corner(&mut ring, &first, lastline, scene_id, "last line/first pixel");

        if let Some(start) = ring.first().copied() {
            ring.push(start);
        }

        footprints.push(BurstFootprint {
            scene_id: scene_id.to_string(),
            track,
            date,
            swath: annotation.swath,
            anx_time: normalize_anx_time(*raw_anx),
            burst_nr: i as u32 + 1,
            geometry: Polygon::new(LineString::from(ring), vec![]),
        });
    }

    footprints
}

/// Normalize an azimuth-ANX time to integer deci-seconds, wrapped to one
/// orbital period so repeat-cycle boundaries do not shift the key.
pub fn normalize_anx_time(raw_seconds: f64) -> i64 {
    let mut seconds = raw_seconds;
    if seconds > ORBITAL_PERIOD_SECONDS {
        seconds %= ORBITAL_PERIOD_SECONDS;
    }
    (seconds * 10.0).round() as i64
}

/// Look up a grid corner at `line`, retrying at `line - 1` (the grid is
/// sometimes shifted by one line). A corner that stays missing is omitted
/// from the ring, not fatal.
fn push_corner(
    ring: &mut Vec<Coord<f64>>,
    corners: &HashMap<i64, Coord<f64>>,
    line: i64,
    scene_id: &str,
    which: &str,
) {
    match corners.get(&line).or_else(|| corners.get(&(line - 1))) {
        Some(coord) => ring.push(*coord),
        None => log::warn!(
            "{}: {} corner not found at line {}, degrading burst geometry",
            scene_id,
            which,
            line
        ),
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
