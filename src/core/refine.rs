//! Scene-inventory coverage refinement.
//!
//! Reduces a raw multi-track, multi-date search result to the minimal set of
//! acquisitions that fully cover the AOI, organized into discrete mosaic
//! date windows. Every stage is a pure `old table -> new table` function so
//! the pipeline stays composable and testable stage by stage.

use chrono::NaiveDate;
use geo::{Area, BooleanOps, Intersects};
use geo_types::{MultiPolygon, Polygon};
use std::collections::HashSet;

use crate::geometry::{aoi_intersection_area, union_all};
use crate::types::{OrbitDirection, PolarisationMode, SceneRecord, Track};

/// A date keeps its track only if its own AOI intersection is within this
/// many square degrees of the whole track's AOI intersection.
const FULL_CROSSING_TOLERANCE: f64 = 0.15;

/// Identifier length without the reprocessing-version suffix: two products
/// sharing this prefix are the same physical acquisition.
const IDENTIFIER_CORE_LENGTH: usize = 63;

/// Switches and tolerances for one refinement run
#[derive(Debug, Clone)]
pub struct RefineConfig {
    pub exclude_marginal: bool,
    pub full_aoi_crossing: bool,
    pub mosaic_refine: bool,
    /// Coverage slack in square degrees: the AOI counts as covered at
    /// `aoi_area - area_reduce`
    pub area_reduce: f64,
    /// Skip combinations whose footprints never reach full AOI coverage
    pub complete_coverage: bool,
}

impl Default for RefineConfig {
    fn default() -> Self {
        RefineConfig {
            exclude_marginal: true,
            full_aoi_crossing: true,
            mosaic_refine: true,
            area_reduce: 0.05,
            complete_coverage: true,
        }
    }
}

/// One contiguous date range whose combined acquisitions fully cover the AOI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Refined inventory for one `(polarisation, orbit direction)` combination
#[derive(Debug, Clone)]
pub struct RefinedCombination {
    pub polarisation: PolarisationMode,
    pub orbit_direction: OrbitDirection,
    pub windows: Vec<MosaicWindow>,
    pub records: Vec<SceneRecord>,
}

impl RefinedCombination {
    /// Key used for persisted inventories, e.g. `"ASCENDING_VVVH"`
    pub fn key(&self) -> String {
        let pols: String = self
            .polarisation
            .to_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("");
        format!("{}_{}", self.orbit_direction, pols)
    }

    /// Number of complete-coverage mosaics found
    pub fn coverage_count(&self) -> usize {
        self.windows.len()
    }
}

/// Run the full refinement pipeline per `(polarisation, orbit direction)`
/// combination. Combinations whose footprints never reach full AOI coverage
/// are reported with a warning and excluded from the output.
pub fn search_refinement(
    aoi: &Polygon<f64>,
    records: &[SceneRecord],
    config: &RefineConfig,
) -> Vec<RefinedCombination> {
    let aoi_area = aoi.unsigned_area();
    let mut refined_combinations = Vec::new();

    for (polarisation, direction) in combinations(records) {
        let subset: Vec<SceneRecord> = records
            .iter()
            .filter(|r| r.polarisation == polarisation && r.orbit_direction == direction)
            .cloned()
            .collect();

        log::info!(
            "Coverage analysis for {} frames of {} tracks in {} polarisation",
            subset.len(),
            direction,
            polarisation
        );

        let total_intersection =
            aoi_intersection_area(aoi, &union_all(subset.iter().map(|r| &r.footprint)));
        if total_intersection <= aoi_area - config.area_reduce && config.complete_coverage {
            log::warn!(
                "Set of footprints for {} {} does not fully cover the AOI, skipping",
                direction,
                polarisation
            );
            continue;
        }

        let mut refined = remove_double_entries(&subset);
        refined = remove_outside_aoi(aoi, &refined);

        if direction == OrbitDirection::Ascending {
            refined = correct_equator_crossing(&refined);
        }

        if config.exclude_marginal && unique_tracks(&refined).len() > 1 {
            refined = exclude_marginal_tracks(aoi, &refined, config.area_reduce);
        }

        if config.full_aoi_crossing {
            refined = remove_incomplete_tracks(aoi, &refined);
        }

        refined = repair_swath_continuity(&refined);

        let mut windows = Vec::new();
        if config.mosaic_refine {
            let (found, visited) = forward_search(aoi, &refined, config.area_reduce);
            refined = backward_search(aoi, &visited, &found, config.area_reduce);
            windows = found;
        }

        refined = dedup_rows(refined);

        if !refined.is_empty() {
            log::info!(
                "Found {} full coverage mosaics for {} {}",
                windows.len(),
                direction,
                polarisation
            );
            refined_combinations.push(RefinedCombination {
                polarisation,
                orbit_direction: direction,
                windows,
                records: refined,
            });
        }
    }

    refined_combinations
}

/// Stage 1: the same physical acquisition can be reprocessed and re-ingested
/// with a new version suffix. Group by the identifier without that suffix and
/// keep only the newest ingestion.
pub fn remove_double_entries(records: &[SceneRecord]) -> Vec<SceneRecord> {
    use std::collections::HashMap;

    let mut newest: HashMap<&str, chrono::DateTime<chrono::Utc>> = HashMap::new();
    for r in records {
        newest
            .entry(identifier_core(&r.identifier))
            .and_modify(|d| {
                if r.ingestion_date > *d {
                    *d = r.ingestion_date;
                }
            })
            .or_insert(r.ingestion_date);
    }

    let kept: Vec<SceneRecord> = records
        .iter()
        .filter(|r| newest[identifier_core(&r.identifier)] == r.ingestion_date)
        .cloned()
        .collect();

    log::info!("{} frames remain after double entry removal", kept.len());
    kept
}

/// Stage 2: drop footprints that do not intersect the AOI at all, then
/// deduplicate by identifier (a footprint touching several AOI parts must
/// not multiply rows).
pub fn remove_outside_aoi(aoi: &Polygon<f64>, records: &[SceneRecord]) -> Vec<SceneRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| r.footprint.intersects(aoi))
        .filter(|r| seen.insert(r.identifier.as_str()))
        .cloned()
        .collect()
}

/// Stage 3: ascending passes increment the relative-orbit counter right
/// after crossing the equator, splitting one physical track into two ids.
/// Decrement every mismatched relative orbit back onto its track.
pub fn correct_equator_crossing(records: &[SceneRecord]) -> Vec<SceneRecord> {
    records
        .iter()
        .map(|r| {
            let mut row = r.clone();
            if row.relative_orbit.segment.is_none()
                && row.relative_orbit.orbit != row.last_relative_orbit
            {
                log::debug!(
                    "{}: renumbering track {} to {}",
                    row.identifier,
                    row.relative_orbit.orbit,
                    row.relative_orbit.orbit - 1
                );
                row.relative_orbit = Track::new(row.relative_orbit.orbit - 1);
            }
            row
        })
        .collect()
}

/// Stage 4: a track is marginal when the union of all other tracks already
/// covers the AOI without it. At most one track is dropped per call, the
/// last redundant one found in the scan; callers re-run the refinement to
/// peel off further tracks one at a time.
pub fn exclude_marginal_tracks(
    aoi: &Polygon<f64>,
    records: &[SceneRecord],
    area_reduce: f64,
) -> Vec<SceneRecord> {
    let aoi_area = aoi.unsigned_area();
    let mut redundant: Option<Track> = None;

    for track in unique_tracks(records) {
        let other_union = union_all(
            records
                .iter()
                .filter(|r| r.relative_orbit != track)
                .map(|r| &r.footprint),
        );
        if aoi_intersection_area(aoi, &other_union) >= aoi_area - area_reduce {
            log::info!("Excluding marginal track {}", track);
            redundant = Some(track);
        }
    }

    match redundant {
        Some(track) => {
            let kept: Vec<SceneRecord> = records
                .iter()
                .filter(|r| r.relative_orbit != track)
                .cloned()
                .collect();
            log::info!("{} frames remain after marginal track exclusion", kept.len());
            kept
        }
        None => {
            log::info!("All remaining tracks are needed to cover the AOI");
            records.to_vec()
        }
    }
}

/// Stage 5: drop acquisition dates that only partially cross the AOI. A date
/// survives when its own AOI intersection comes within the tolerance of the
/// whole track's AOI intersection.
pub fn remove_incomplete_tracks(aoi: &Polygon<f64>, records: &[SceneRecord]) -> Vec<SceneRecord> {
    let mut kept = Vec::new();

    for track in unique_tracks(records) {
        let track_rows: Vec<&SceneRecord> = records
            .iter()
            .filter(|r| r.relative_orbit == track)
            .collect();
        let track_area = aoi_intersection_area(
            aoi,
            &union_all(track_rows.iter().map(|r| &r.footprint)),
        );

        for date in sorted_dates(track_rows.iter().copied()) {
            let date_rows: Vec<&SceneRecord> = track_rows
                .iter()
                .filter(|r| r.acquisition_date == date)
                .copied()
                .collect();
            let date_area = aoi_intersection_area(
                aoi,
                &union_all(date_rows.iter().map(|r| &r.footprint)),
            );

            if track_area <= date_area + FULL_CROSSING_TOLERANCE {
                kept.extend(date_rows.into_iter().cloned());
            }
        }
    }

    log::info!(
        "{} frames remain after removal of non-full AOI crossings",
        kept.len()
    );
    kept
}

/// Stage 6: per-track merging requires physically contiguous slices. A
/// `(track, date)` group with missing slices in the middle is split into
/// `"{track}.1"`, `"{track}.2"`, ... segments at every gap.
pub fn repair_swath_continuity(records: &[SceneRecord]) -> Vec<SceneRecord> {
    let mut repaired = records.to_vec();

    for track in unique_tracks(records) {
        for date in sorted_dates(records.iter().filter(|r| r.relative_orbit == track)) {
            let mut group: Vec<usize> = repaired
                .iter()
                .enumerate()
                .filter(|(_, r)| r.relative_orbit == track && r.acquisition_date == date)
                .map(|(i, _)| i)
                .collect();
            group.sort_by_key(|&i| repaired[i].slice_number);

            let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
                continue;
            };
            let min_slice = repaired[first].slice_number as i64;
            let max_slice = repaired[last].slice_number as i64;

            if (group.len() as i64) <= max_slice - min_slice {
                log::info!(
                    "Track {} on {} has non-continuous slices, splitting into segments",
                    track,
                    date
                );
                let mut segment = 1u16;
                let mut last_slice = min_slice - 1;
                for &i in &group {
                    let slice = repaired[i].slice_number as i64;
                    if slice - last_slice > 1 {
                        segment += 1;
                    }
                    repaired[i].relative_orbit = Track::with_segment(track.orbit, segment);
                    last_slice = slice;
                }
            }
        }
    }

    repaired
}

/// Stage 7: walk acquisition dates forward, accumulating footprint unions
/// until the AOI is covered; each time coverage is reached a mosaic window
/// closes and the next one starts at the following date.
///
/// Returns the windows and the rows visited while building them.
pub fn forward_search(
    aoi: &Polygon<f64>,
    records: &[SceneRecord],
    area_reduce: f64,
) -> (Vec<MosaicWindow>, Vec<SceneRecord>) {
    let aoi_area = aoi.unsigned_area();
    let mut windows = Vec::new();
    let mut visited = Vec::new();
    let mut running_union: Option<MultiPolygon<f64>> = None;
    let mut window_start: Option<NaiveDate> = None;

    for date in sorted_dates(records.iter()) {
        if window_start.is_none() {
            window_start = Some(date);
        }

        for track in unique_tracks_of_date(records, date) {
            let rows: Vec<&SceneRecord> = records
                .iter()
                .filter(|r| r.acquisition_date == date && r.relative_orbit == track)
                .collect();

            visited.extend(rows.iter().map(|r| (*r).clone()));

            let union = union_all(rows.iter().map(|r| &r.footprint));
            let accumulated = match running_union.take() {
                Some(acc) => acc.union(&union),
                None => union,
            };

            if aoi_intersection_area(aoi, &accumulated) >= aoi_area - area_reduce {
                if let Some(start) = window_start.take() {
                    windows.push(MosaicWindow { start, end: date });
                }
            } else {
                running_union = Some(accumulated);
            }
        }
    }

    (windows, visited)
}

/// Stage 8: re-scan each mosaic window backwards, taking each track at most
/// once and stopping as soon as the AOI is covered. Preferring the most
/// recent instance of every track minimizes the temporal spread within one
/// mosaic.
pub fn backward_search(
    aoi: &Polygon<f64>,
    records: &[SceneRecord],
    windows: &[MosaicWindow],
    area_reduce: f64,
) -> Vec<SceneRecord> {
    let aoi_area = aoi.unsigned_area();
    let mut kept = Vec::new();

    for window in windows {
        let subset: Vec<&SceneRecord> = records
            .iter()
            .filter(|r| r.acquisition_date >= window.start && r.acquisition_date <= window.end)
            .collect();

        let mut included_tracks: HashSet<Track> = HashSet::new();
        let mut candidates: Vec<SceneRecord> = Vec::new();
        let mut running_union: Option<MultiPolygon<f64>> = None;

        let mut dates = sorted_dates(subset.iter().copied());
        dates.reverse();

        'window: for date in dates {
            for track in unique_tracks_of_date_ref(&subset, date) {
                if !included_tracks.insert(track) {
                    continue;
                }

                let rows: Vec<&SceneRecord> = subset
                    .iter()
                    .filter(|r| r.acquisition_date == date && r.relative_orbit == track)
                    .copied()
                    .collect();

                candidates.extend(rows.iter().map(|r| (*r).clone()));

                let union = union_all(rows.iter().map(|r| &r.footprint));
                let accumulated = match running_union.take() {
                    Some(acc) => acc.union(&union),
                    None => union,
                };

                if aoi_intersection_area(aoi, &accumulated) >= aoi_area - area_reduce {
                    kept.append(&mut candidates);
                    break 'window;
                }
                running_union = Some(accumulated);
            }
        }
    }

    kept
}

fn identifier_core(identifier: &str) -> &str {
    identifier.get(..IDENTIFIER_CORE_LENGTH).unwrap_or(identifier)
}

fn combinations(records: &[SceneRecord]) -> Vec<(PolarisationMode, OrbitDirection)> {
    let mut combos = Vec::new();
    for r in records {
        let combo = (r.polarisation, r.orbit_direction);
        if !combos.contains(&combo) {
            combos.push(combo);
        }
    }
    combos
}

/// Distinct tracks in first-appearance order
fn unique_tracks(records: &[SceneRecord]) -> Vec<Track> {
    let mut tracks = Vec::new();
    for r in records {
        if !tracks.contains(&r.relative_orbit) {
            tracks.push(r.relative_orbit);
        }
    }
    tracks
}

fn unique_tracks_of_date(records: &[SceneRecord], date: NaiveDate) -> Vec<Track> {
    let mut tracks = Vec::new();
    for r in records.iter().filter(|r| r.acquisition_date == date) {
        if !tracks.contains(&r.relative_orbit) {
            tracks.push(r.relative_orbit);
        }
    }
    tracks
}

fn unique_tracks_of_date_ref(records: &[&SceneRecord], date: NaiveDate) -> Vec<Track> {
    let mut tracks = Vec::new();
    for r in records.iter().filter(|r| r.acquisition_date == date) {
        if !tracks.contains(&r.relative_orbit) {
            tracks.push(r.relative_orbit);
        }
    }
    tracks
}

/// Distinct acquisition dates, ascending
fn sorted_dates<'a, I>(records: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a SceneRecord>,
{
    let mut dates: Vec<NaiveDate> = records.into_iter().map(|r| r.acquisition_date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

fn dedup_rows(records: Vec<SceneRecord>) -> Vec<SceneRecord> {
    let mut seen: HashSet<(String, Track)> = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.identifier.clone(), r.relative_orbit)))
        .collect()
}
